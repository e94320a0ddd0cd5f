//! ICS record generation and parsing.
//!
//! Master records are stored as single-VEVENT calendars (RFC 5545).

mod generate;
mod parse;

pub use generate::generate_ics;
pub use parse::parse_event;

/// X- property carrying the creator's username
pub(crate) const CREATED_BY_PROPERTY: &str = "X-BLAZECAL-CREATED-BY";
