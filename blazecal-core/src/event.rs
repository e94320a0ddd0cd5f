//! Master event types.
//!
//! A master record is what the remote store owns: the canonical fields of an
//! event plus, for repeating events, its rule and exclusion dates. Occurrences
//! are derived from masters at query time and never persisted.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CalError, CalResult};
use crate::rrule::RecurrenceRule;

/// A master calendar event as stored by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub uid: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,

    /// Rule and exclusion dates. Present only on masters that repeat.
    pub recurrence: Option<Recurrence>,

    /// Username of whoever created the event
    pub created_by: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,

    /// Unrecognized X- properties, kept so read-modify-write edits don't drop them
    #[serde(default)]
    pub custom_properties: Vec<(String, String)>,
}

/// Recurrence rule plus the dates removed from the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    pub rule: RecurrenceRule,
    /// Kept at the granularity they were written with; compared by date only
    #[serde(default)]
    pub exdates: Vec<EventTime>,
}

impl Recurrence {
    pub fn new(rule: RecurrenceRule) -> Self {
        Recurrence {
            rule,
            exdates: Vec::new(),
        }
    }

    /// Whether an occurrence on `date` is suppressed.
    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        self.exdates.iter().any(|exdate| exdate.date() == date)
    }
}

/// An event attendee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    /// Display name
    pub name: Option<String>,
    pub email: String,
}

impl Attendee {
    pub fn new(email: &str) -> Self {
        Attendee {
            name: None,
            email: email.to_string(),
        }
    }
}

/// Start or end of an event.
///
/// All-day events use `Date`. Timed events are either pinned to UTC or
/// floating (wall-clock time with no zone attached).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    Date(NaiveDate),
    DateTimeUtc(DateTime<Utc>),
    DateTimeFloating(NaiveDateTime),
}

impl EventTime {
    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// Calendar date of this time, ignoring time-of-day.
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::DateTimeUtc(dt) => dt.date_naive(),
            EventTime::DateTimeFloating(dt) => dt.date(),
        }
    }

    /// Wall-clock view used for window comparisons and recurrence stepping.
    /// Dates map to midnight, UTC times to their UTC wall clock.
    pub fn naive(&self) -> NaiveDateTime {
        match self {
            EventTime::Date(d) => d.and_time(NaiveTime::MIN),
            EventTime::DateTimeUtc(dt) => dt.naive_utc(),
            EventTime::DateTimeFloating(dt) => *dt,
        }
    }

    /// Build a time of the same kind as `self` from a wall-clock value.
    pub fn with_naive(&self, naive: NaiveDateTime) -> EventTime {
        match self {
            EventTime::Date(_) => EventTime::Date(naive.date()),
            EventTime::DateTimeUtc(_) => EventTime::DateTimeUtc(naive.and_utc()),
            EventTime::DateTimeFloating(_) => EventTime::DateTimeFloating(naive),
        }
    }

    /// End used when none is given: the next day for dates, an hour later otherwise.
    pub fn default_end(&self) -> EventTime {
        match self {
            EventTime::Date(d) => EventTime::Date(*d + Duration::days(1)),
            timed => timed.with_naive(timed.naive() + Duration::hours(1)),
        }
    }

    /// Compact iCalendar form: `YYYYMMDD`, `YYYYMMDDTHHMMSSZ` or `YYYYMMDDTHHMMSS`.
    pub fn to_ics_string(&self) -> String {
        match self {
            EventTime::Date(d) => d.format("%Y%m%d").to_string(),
            EventTime::DateTimeUtc(dt) => dt.format("%Y%m%dT%H%M%SZ").to_string(),
            EventTime::DateTimeFloating(dt) => dt.format("%Y%m%dT%H%M%S").to_string(),
        }
    }

    /// Parse the compact iCalendar form produced by [`EventTime::to_ics_string`].
    pub fn from_ics_str(s: &str) -> Option<EventTime> {
        let s = s.trim();
        if s.len() == 8 {
            return NaiveDate::parse_from_str(s, "%Y%m%d")
                .ok()
                .map(EventTime::Date);
        }
        match s.strip_suffix('Z') {
            Some(utc) => NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
                .ok()
                .map(|dt| EventTime::DateTimeUtc(dt.and_utc())),
            None => NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S")
                .ok()
                .map(EventTime::DateTimeFloating),
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            EventTime::DateTimeUtc(dt) => write!(f, "{} UTC", dt.format("%Y-%m-%d %H:%M")),
            EventTime::DateTimeFloating(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
        }
    }
}

impl Event {
    pub fn new(uid: &str, title: &str, start: EventTime, end: EventTime) -> Self {
        Event {
            uid: uid.to_string(),
            title: title.to_string(),
            description: None,
            location: None,
            start,
            end,
            recurrence: None,
            created_by: None,
            attendees: Vec::new(),
            custom_properties: Vec::new(),
        }
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_date()
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Check the record invariants: a non-empty uid, end not before start, and
    /// both endpoints either all-day dates or timestamps.
    pub fn validate(&self) -> CalResult<()> {
        if self.uid.is_empty() {
            return Err(CalError::InvalidEvent("event has an empty uid".into()));
        }
        if self.start.is_date() != self.end.is_date() {
            return Err(CalError::InvalidEvent(format!(
                "event '{}' mixes all-day and timed endpoints",
                self.uid
            )));
        }
        if self.end.naive() < self.start.naive() {
            return Err(CalError::InvalidEvent(format!(
                "event '{}' ends ({}) before it starts ({})",
                self.uid, self.end, self.start
            )));
        }
        Ok(())
    }

    /// The exclusion entry for `date`, formatted to match this event's start:
    /// a plain date for all-day events, otherwise the start's time-of-day on
    /// `date` in UTC.
    pub fn exclusion_for(&self, date: NaiveDate) -> EventTime {
        match &self.start {
            EventTime::Date(_) => EventTime::Date(date),
            EventTime::DateTimeUtc(dt) => {
                EventTime::DateTimeUtc(date.and_time(dt.time()).and_utc())
            }
            EventTime::DateTimeFloating(dt) => {
                EventTime::DateTimeUtc(date.and_time(dt.time()).and_utc())
            }
        }
    }

    /// Add `date` to the exclusion set.
    ///
    /// Returns `Ok(false)` without modifying anything when the date is already
    /// excluded. Fails with `NotRecurring` when the event has no rule.
    pub fn add_exclusion(&mut self, date: NaiveDate) -> CalResult<bool> {
        let exdate = self.exclusion_for(date);
        let recurrence = self
            .recurrence
            .as_mut()
            .ok_or_else(|| CalError::NotRecurring(self.uid.clone()))?;

        if recurrence.is_excluded(date) {
            return Ok(false);
        }

        recurrence.exdates.push(exdate);
        Ok(true)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rrule::{Bound, Frequency};

    fn weekly_master() -> Event {
        let start = NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut event = Event::new(
            "standup@blazecal",
            "Standup",
            EventTime::DateTimeFloating(start),
            EventTime::DateTimeFloating(start + chrono::Duration::hours(1)),
        );
        event.recurrence = Some(Recurrence::new(RecurrenceRule::new(
            Frequency::Weekly,
            1,
            Some(Bound::Count(4)),
        )));
        event
    }

    #[test]
    fn test_event_time_ics_string_roundtrip() {
        let times = [
            EventTime::Date(NaiveDate::from_ymd_opt(2026, 1, 28).unwrap()),
            EventTime::from_ics_str("20260128T220000Z").unwrap(),
            EventTime::from_ics_str("20260128T220000").unwrap(),
        ];
        for time in &times {
            assert_eq!(EventTime::from_ics_str(&time.to_ics_string()).as_ref(), Some(time));
        }
        assert!(matches!(times[1], EventTime::DateTimeUtc(_)));
        assert!(matches!(times[2], EventTime::DateTimeFloating(_)));
    }

    #[test]
    fn test_event_time_rejects_garbage() {
        assert_eq!(EventTime::from_ics_str("2026-01-28"), None);
        assert_eq!(EventTime::from_ics_str("20261399"), None);
    }

    #[test]
    fn test_default_end() {
        let date = EventTime::from_ics_str("20260131").unwrap();
        assert_eq!(date.default_end(), EventTime::from_ics_str("20260201").unwrap());

        let utc = EventTime::from_ics_str("20260131T233000Z").unwrap();
        assert_eq!(utc.default_end(), EventTime::from_ics_str("20260201T003000Z").unwrap());
    }

    #[test]
    fn test_validate_rejects_end_before_start() {
        let mut event = weekly_master();
        std::mem::swap(&mut event.start, &mut event.end);
        assert!(matches!(event.validate(), Err(CalError::InvalidEvent(_))));
    }

    #[test]
    fn test_validate_rejects_mixed_all_day() {
        let mut event = weekly_master();
        event.end = EventTime::Date(NaiveDate::from_ymd_opt(2026, 1, 6).unwrap());
        assert!(matches!(event.validate(), Err(CalError::InvalidEvent(_))));
    }

    #[test]
    fn test_exclusion_for_timed_event_uses_start_time_in_utc() {
        let event = weekly_master();
        let exdate = event.exclusion_for(NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
        assert_eq!(exdate.to_ics_string(), "20260112T090000Z");
    }

    #[test]
    fn test_exclusion_for_all_day_event_is_date_only() {
        let mut event = weekly_master();
        event.start = EventTime::Date(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        event.end = EventTime::Date(NaiveDate::from_ymd_opt(2026, 1, 6).unwrap());
        let exdate = event.exclusion_for(NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
        assert_eq!(exdate.to_ics_string(), "20260112");
    }

    #[test]
    fn test_add_exclusion_is_idempotent() {
        let mut event = weekly_master();
        let date = NaiveDate::from_ymd_opt(2026, 1, 12).unwrap();

        assert!(event.add_exclusion(date).unwrap());
        assert!(!event.add_exclusion(date).unwrap());

        let recurrence = event.recurrence.as_ref().unwrap();
        assert_eq!(recurrence.exdates.len(), 1);
        assert!(recurrence.is_excluded(date));
    }

    #[test]
    fn test_add_exclusion_requires_recurrence() {
        let mut event = weekly_master();
        event.recurrence = None;
        let result = event.add_exclusion(NaiveDate::from_ymd_opt(2026, 1, 12).unwrap());
        assert!(matches!(result, Err(CalError::NotRecurring(uid)) if uid == "standup@blazecal"));
    }
}
