//! Core library for blazecal.
//!
//! Recurring calendar events over a store of master records:
//! - `rrule` parses and writes the FREQ/INTERVAL/COUNT/UNTIL rule grammar
//! - `recurrence` expands masters into occurrences inside a window
//! - `instance` builds and splits per-occurrence IDs
//! - `exception` excludes single dates from a series
//! - `grid` lays occurrences out as a month of whole weeks
//! - `calendar` ties these together over a `store::Transport`

pub mod calendar;
pub mod config;
pub mod constants;
pub mod date_range;
pub mod error;
pub mod event;
pub mod exception;
pub mod grid;
pub mod ics;
pub mod instance;
pub mod local;
pub mod recurrence;
pub mod remote;
pub mod rrule;
pub mod store;

pub use calendar::{Calendar, DeleteAction, DeleteOutcome, DeleteScope, MonthView, NewEvent};
pub use config::Config;
pub use date_range::DateRange;
pub use error::{CalError, CalResult};
pub use event::{Attendee, Event, EventTime, Recurrence};
pub use grid::{DayCell, MonthGrid, MonthYear};
pub use recurrence::Occurrence;
pub use rrule::{RecurrenceRule, RecurrenceSelector};
pub use store::{Store, Transport};
