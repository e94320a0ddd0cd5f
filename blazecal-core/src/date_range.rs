//! Query windows for fetching and expanding events.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::error::{CalError, CalResult};

/// Half-open wall-clock window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        DateRange { start, end }
    }

    /// Midnight of `first` up to (not including) midnight of `end_exclusive`.
    pub fn from_dates(first: NaiveDate, end_exclusive: NaiveDate) -> Self {
        DateRange {
            start: first.and_time(NaiveTime::MIN),
            end: end_exclusive.and_time(NaiveTime::MIN),
        }
    }

    /// `days` days starting at `now`. Fails when the end is not representable.
    pub fn upcoming(now: NaiveDateTime, days: i64) -> CalResult<Self> {
        let end = TimeDelta::try_days(days)
            .and_then(|span| now.checked_add_signed(span))
            .ok_or_else(|| {
                CalError::Config(format!("upcoming window of {days} days is out of range"))
            })?;
        Ok(DateRange { start: now, end })
    }

    pub fn contains(&self, time: NaiveDateTime) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether `[start, end)` intersects this window. A zero-length span
    /// counts when its instant lies inside the window.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        if end <= start {
            return self.contains(start);
        }
        start < self.end && end > self.start
    }

    /// `start` in the `YYYY-MM-DDTHH:MM:SS` form sent to providers.
    pub fn start_iso(&self) -> String {
        self.start.format("%Y-%m-%dT%H:%M:%S").to_string()
    }

    /// `end` in the `YYYY-MM-DDTHH:MM:SS` form sent to providers.
    pub fn end_iso(&self) -> String {
        self.end.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_from_dates_is_half_open() {
        let range = DateRange::from_dates(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        );
        assert!(range.contains(at(2026, 1, 1, 0)));
        assert!(range.contains(at(2026, 1, 31, 23)));
        assert!(!range.contains(at(2026, 2, 1, 0)));
    }

    #[test]
    fn test_upcoming_window() {
        let range = DateRange::upcoming(at(2026, 1, 1, 9), 30).unwrap();
        assert_eq!(range.start, at(2026, 1, 1, 9));
        assert_eq!(range.end, at(2026, 1, 31, 9));
    }

    #[test]
    fn test_upcoming_window_out_of_range() {
        assert!(matches!(
            DateRange::upcoming(at(2026, 1, 1, 0), 100_000_000),
            Err(CalError::Config(_))
        ));
        assert!(matches!(
            DateRange::upcoming(at(2026, 1, 1, 0), i64::MAX),
            Err(CalError::Config(_))
        ));
    }

    #[test]
    fn test_overlaps_spans_crossing_the_edges() {
        let range = DateRange::new(at(2026, 1, 10, 0), at(2026, 1, 11, 0));
        assert!(range.overlaps(at(2026, 1, 9, 22), at(2026, 1, 10, 1)));
        assert!(range.overlaps(at(2026, 1, 10, 23), at(2026, 1, 12, 0)));
        assert!(!range.overlaps(at(2026, 1, 9, 0), at(2026, 1, 10, 0)));
        assert!(!range.overlaps(at(2026, 1, 11, 0), at(2026, 1, 11, 1)));
    }

    #[test]
    fn test_overlaps_zero_length_span() {
        let range = DateRange::new(at(2026, 1, 10, 0), at(2026, 1, 11, 0));
        assert!(range.overlaps(at(2026, 1, 10, 0), at(2026, 1, 10, 0)));
        assert!(!range.overlaps(at(2026, 1, 11, 0), at(2026, 1, 11, 0)));
    }

    #[test]
    fn test_iso_strings() {
        let range = DateRange::new(at(2026, 1, 4, 0), at(2026, 2, 8, 0));
        assert_eq!(range.start_iso(), "2026-01-04T00:00:00");
        assert_eq!(range.end_iso(), "2026-02-08T00:00:00");
    }
}
