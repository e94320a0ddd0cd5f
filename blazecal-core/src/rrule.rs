//! Recurrence rule codec.
//!
//! Only the FREQ/INTERVAL/COUNT/UNTIL subset of RFC 5545 RRULEs is understood.
//! Decoding picks out those fields and ignores everything else, so rules
//! written by other clients (e.g. with BYDAY) still load. Encoding always
//! produces the canonical `FREQ=..;INTERVAL=..[;COUNT=..|;UNTIL=..]` form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CalError, CalResult};
use crate::event::EventTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl FromStr for Frequency {
    type Err = CalError;

    fn from_str(s: &str) -> CalResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(CalError::MalformedRule(format!(
                "unsupported frequency '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a series ends. A rule without a bound repeats indefinitely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    /// Total number of occurrences, counting excluded ones
    Count(u32),
    /// Inclusive end. A plain date covers the whole day.
    Until(EventTime),
}

/// A decoded RRULE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub interval: u32,
    pub bound: Option<Bound>,
}

impl RecurrenceRule {
    /// An interval of 0 is treated as 1.
    pub fn new(frequency: Frequency, interval: u32, bound: Option<Bound>) -> Self {
        RecurrenceRule {
            frequency,
            interval: interval.max(1),
            bound,
        }
    }

    pub fn count(&self) -> Option<u32> {
        match self.bound {
            Some(Bound::Count(n)) => Some(n),
            _ => None,
        }
    }

    pub fn until(&self) -> Option<&EventTime> {
        match &self.bound {
            Some(Bound::Until(until)) => Some(until),
            _ => None,
        }
    }
}

/// Serialize a rule in canonical form. `INTERVAL` is always written, even
/// when it is 1.
pub fn encode(frequency: Frequency, interval: u32, bound: Option<&Bound>) -> String {
    let mut rule = format!("FREQ={};INTERVAL={}", frequency, interval);
    match bound {
        Some(Bound::Count(n)) => rule.push_str(&format!(";COUNT={}", n)),
        Some(Bound::Until(until)) => {
            rule.push_str(&format!(";UNTIL={}", until.to_ics_string()))
        }
        None => {}
    }
    rule
}

/// Parse an RRULE value.
///
/// Accepts an optional `RRULE:` prefix and backslash-escaped separators.
/// Fails with `MalformedRule` when FREQ is missing or unsupported, when a
/// numeric field is not a positive integer, when UNTIL is not a date, or when
/// both COUNT and UNTIL are present.
pub fn decode(input: &str) -> CalResult<RecurrenceRule> {
    let unescaped = input.trim().replace("\\;", ";").replace("\\,", ",");
    let body = unescaped.strip_prefix("RRULE:").unwrap_or(&unescaped);

    let mut frequency = None;
    let mut interval = None;
    let mut count = None;
    let mut until = None;

    for part in body.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_ascii_uppercase().as_str() {
            "FREQ" => frequency = Some(value.parse::<Frequency>()?),
            "INTERVAL" => interval = Some(parse_positive("INTERVAL", value)?),
            "COUNT" => count = Some(parse_positive("COUNT", value)?),
            "UNTIL" => {
                let time = EventTime::from_ics_str(value).ok_or_else(|| {
                    CalError::MalformedRule(format!("UNTIL value '{}' is not a date", value))
                })?;
                until = Some(time);
            }
            _ => {}
        }
    }

    let frequency = frequency
        .ok_or_else(|| CalError::MalformedRule(format!("'{}' has no FREQ", input.trim())))?;

    let bound = match (count, until) {
        (Some(_), Some(_)) => {
            return Err(CalError::MalformedRule(format!(
                "'{}' sets both COUNT and UNTIL",
                input.trim()
            )));
        }
        (Some(n), None) => Some(Bound::Count(n)),
        (None, Some(time)) => Some(Bound::Until(time)),
        (None, None) => None,
    };

    Ok(RecurrenceRule {
        frequency,
        interval: interval.unwrap_or(1),
        bound,
    })
}

fn parse_positive(field: &str, value: &str) -> CalResult<u32> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CalError::MalformedRule(format!(
            "{} value '{}' is not a positive integer",
            field, value
        ))),
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&encode(self.frequency, self.interval, self.bound.as_ref()))
    }
}

impl FromStr for RecurrenceRule {
    type Err = CalError;

    fn from_str(s: &str) -> CalResult<Self> {
        decode(s)
    }
}

impl TryFrom<String> for RecurrenceRule {
    type Error = CalError;

    fn try_from(value: String) -> CalResult<Self> {
        decode(&value)
    }
}

impl From<RecurrenceRule> for String {
    fn from(rule: RecurrenceRule) -> Self {
        rule.to_string()
    }
}

/// The simplified repeat choice offered when creating an event, written
/// `<FREQ>:<N>`: `DAILY:10` is daily for 10 days, `WEEKLY:4` weekly for 4
/// weeks, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceSelector {
    pub frequency: Frequency,
    pub count: u32,
}

impl RecurrenceSelector {
    /// The canonical rule stored for this selection.
    pub fn to_rule(&self) -> RecurrenceRule {
        RecurrenceRule::new(self.frequency, 1, Some(Bound::Count(self.count)))
    }
}

impl FromStr for RecurrenceSelector {
    type Err = CalError;

    fn from_str(s: &str) -> CalResult<Self> {
        let (frequency, count) = s.split_once(':').ok_or_else(|| {
            CalError::MalformedRule(format!("repeat '{}' must look like WEEKLY:4", s))
        })?;

        Ok(RecurrenceSelector {
            frequency: frequency.parse()?,
            count: parse_positive("repeat count", count.trim())?,
        })
    }
}
