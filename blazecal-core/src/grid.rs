//! Month grids.
//!
//! A grid covers whole weeks: from the Sunday on or before the 1st to the
//! Saturday on or after the last day of the month, one cell per date.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use serde::Serialize;

use crate::date_range::DateRange;
use crate::error::{CalError, CalResult};
use crate::recurrence::Occurrence;

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct MonthYear {
    first: NaiveDate,
}

impl MonthYear {
    pub fn new(year: i32, month: u32) -> CalResult<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalError::InvalidMonth(format!("{year}-{month:02}")));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| MonthYear { first })
            .ok_or_else(|| CalError::InvalidMonth(format!("{year}-{month:02}")))
    }

    /// The month `date` falls in.
    pub fn containing(date: NaiveDate) -> Self {
        MonthYear {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    /// The month containing today's local date.
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first + Months::new(1) - Duration::days(1)
    }

    /// Sunday on or before the 1st up to the day after the Saturday on or
    /// after the last day.
    pub fn padded_range(&self) -> DateRange {
        let first = self.first_day();
        let last = self.last_day();
        let start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));
        let end = last + Duration::days(i64::from(7 - last.weekday().num_days_from_sunday()));
        DateRange::from_dates(start, end)
    }

    pub fn prev(&self) -> Option<MonthYear> {
        if self.year() == MIN_YEAR && self.month() == 1 {
            return None;
        }
        Some(MonthYear {
            first: self.first - Months::new(1),
        })
    }

    pub fn next(&self) -> Option<MonthYear> {
        if self.year() == MAX_YEAR && self.month() == 12 {
            return None;
        }
        Some(MonthYear {
            first: self.first + Months::new(1),
        })
    }

    /// Heading such as "January 2026".
    pub fn title(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for MonthYear {
    type Err = CalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalError::InvalidMonth(s.to_string());

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || !(1..=2).contains(&month.len()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        Self::new(year, month).map_err(|_| invalid())
    }
}

impl From<MonthYear> for String {
    fn from(month: MonthYear) -> Self {
        month.to_string()
    }
}

/// One date in the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    /// Day of month
    pub day: u32,
    /// Padding day from the previous or next month
    pub other_month: bool,
    pub today: bool,
    pub occurrences: Vec<Occurrence>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub month: MonthYear,
    pub title: String,
    pub prev: Option<MonthYear>,
    pub next: Option<MonthYear>,
    /// Sunday-first, a whole number of weeks
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    /// Cells seven at a time, Sunday to Saturday.
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }

    pub fn occurrence_count(&self) -> usize {
        self.cells.iter().map(|cell| cell.occurrences.len()).sum()
    }
}

/// Bucket occurrences by the date they start on, keeping their order.
pub fn group_by_date(occurrences: Vec<Occurrence>) -> BTreeMap<NaiveDate, Vec<Occurrence>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Occurrence>> = BTreeMap::new();
    for occurrence in occurrences {
        by_date.entry(occurrence.date()).or_default().push(occurrence);
    }
    by_date
}

/// Build the grid for `month` with `today` as the highlighted date.
///
/// Each cell takes the occurrences grouped under its exact date; groups
/// outside the padded weeks are dropped.
pub fn build_grid_at(
    month: MonthYear,
    mut by_date: BTreeMap<NaiveDate, Vec<Occurrence>>,
    today: NaiveDate,
) -> MonthGrid {
    let range = month.padded_range();
    let first = range.start.date();
    let end = range.end.date();

    let cells = first
        .iter_days()
        .take_while(|date| *date < end)
        .map(|date| DayCell {
            date,
            day: date.day(),
            other_month: date.month() != month.month() || date.year() != month.year(),
            today: date == today,
            occurrences: by_date.remove(&date).unwrap_or_default(),
        })
        .collect();

    MonthGrid {
        month,
        title: month.title(),
        prev: month.prev(),
        next: month.next(),
        cells,
    }
}

/// Build the grid for `month`, reading today's date from the local clock once.
pub fn build_grid(month: MonthYear, by_date: BTreeMap<NaiveDate, Vec<Occurrence>>) -> MonthGrid {
    build_grid_at(month, by_date, Local::now().date_naive())
}

/// The grid for `month` with no occurrences.
pub fn empty_grid(month: MonthYear) -> MonthGrid {
    build_grid(month, BTreeMap::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, EventTime};
    use crate::recurrence::expand;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(s: &str) -> MonthYear {
        s.parse().unwrap()
    }

    fn occurrence_on(uid: &str, day: NaiveDate) -> Occurrence {
        let event = Event::new(
            uid,
            uid,
            EventTime::Date(day),
            EventTime::Date(day + Duration::days(1)),
        );
        let window = DateRange::from_dates(day, day + Duration::days(1));
        expand(&event, &window).remove(0)
    }

    #[test]
    fn test_parse_and_display_month() {
        let jan = month("2026-01");
        assert_eq!(jan.year(), 2026);
        assert_eq!(jan.month(), 1);
        assert_eq!(jan.to_string(), "2026-01");
        assert_eq!(month("2026-3").to_string(), "2026-03");
        assert_eq!(jan.title(), "January 2026");
    }

    #[test]
    fn test_parse_rejects_bad_months() {
        for bad in ["2026", "2026-13", "2026-00", "26-01", "2026-001", "abcd-01", "0000-01", ""] {
            assert!(
                matches!(bad.parse::<MonthYear>(), Err(CalError::InvalidMonth(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_month_bounds() {
        let feb = month("2028-02");
        assert_eq!(feb.first_day(), date(2028, 2, 1));
        assert_eq!(feb.last_day(), date(2028, 2, 29));
        assert_eq!(month("2026-12").last_day(), date(2026, 12, 31));
    }

    #[test]
    fn test_prev_and_next_wrap_years() {
        assert_eq!(month("2026-01").prev(), Some(month("2025-12")));
        assert_eq!(month("2026-12").next(), Some(month("2027-01")));
        assert_eq!(month("0001-01").prev(), None);
        assert_eq!(month("9999-12").next(), None);
    }

    #[test]
    fn test_padded_range_january_2026() {
        // 2026-01-01 is a Thursday, 2026-01-31 a Saturday
        let range = month("2026-01").padded_range();
        assert_eq!(range.start.date(), date(2025, 12, 28));
        assert_eq!(range.end.date(), date(2026, 2, 1));
    }

    #[test]
    fn test_padded_range_month_starting_on_sunday() {
        // 2026-02-01 is a Sunday, 2026-02-28 a Saturday: exactly four weeks
        let range = month("2026-02").padded_range();
        assert_eq!(range.start.date(), date(2026, 2, 1));
        assert_eq!(range.end.date(), date(2026, 3, 1));
    }

    #[test]
    fn test_grid_shape() {
        for m in ["2026-01", "2026-02", "2026-03", "2026-08", "2028-02"] {
            let grid = build_grid_at(month(m), BTreeMap::new(), date(2026, 1, 15));
            assert_eq!(grid.cells.len() % 7, 0, "{m}");
            assert!(grid.weeks().all(|week| week.len() == 7));
            assert_eq!(grid.cells[0].date.weekday(), chrono::Weekday::Sun);
            assert_eq!(grid.cells.last().unwrap().date.weekday(), chrono::Weekday::Sat);
            assert!(grid.cells.windows(2).all(|w| w[1].date == w[0].date + Duration::days(1)));
        }
    }

    #[test]
    fn test_grid_flags() {
        let grid = build_grid_at(month("2026-01"), BTreeMap::new(), date(2026, 1, 15));

        assert_eq!(grid.title, "January 2026");
        assert_eq!(grid.cells.len(), 35);
        assert!(grid.cells[..4].iter().all(|c| c.other_month));
        assert!(grid.cells[4..].iter().all(|c| !c.other_month));
        assert_eq!(grid.cells[4].day, 1);

        let today: Vec<NaiveDate> = grid.cells.iter().filter(|c| c.today).map(|c| c.date).collect();
        assert_eq!(today, vec![date(2026, 1, 15)]);
    }

    #[test]
    fn test_grid_without_today() {
        let grid = build_grid_at(month("2026-01"), BTreeMap::new(), date(2030, 6, 1));
        assert!(grid.cells.iter().all(|c| !c.today));
    }

    #[test]
    fn test_today_in_padding_is_flagged_once() {
        let grid = build_grid_at(month("2026-01"), BTreeMap::new(), date(2025, 12, 30));
        assert_eq!(grid.cells.iter().filter(|c| c.today).count(), 1);
        assert!(grid.cells[2].today && grid.cells[2].other_month);
    }

    #[test]
    fn test_occurrences_land_on_their_date_only() {
        let occurrences = vec![
            occurrence_on("a", date(2026, 1, 5)),
            occurrence_on("b", date(2026, 1, 5)),
            occurrence_on("c", date(2025, 12, 29)),
            occurrence_on("far", date(2026, 3, 1)),
        ];
        let grid = build_grid_at(month("2026-01"), group_by_date(occurrences), date(2026, 1, 1));

        let cell = |d: NaiveDate| grid.cells.iter().find(|c| c.date == d).unwrap();
        let ids = |d: NaiveDate| -> Vec<String> {
            cell(d).occurrences.iter().map(|o| o.id.clone()).collect()
        };

        assert_eq!(ids(date(2026, 1, 5)), vec!["a", "b"]);
        assert_eq!(ids(date(2025, 12, 29)), vec!["c"]);
        assert_eq!(grid.occurrence_count(), 3);
    }

    #[test]
    fn test_empty_grid_has_no_occurrences() {
        let grid = empty_grid(month("2026-01"));
        assert_eq!(grid.cells.len(), 35);
        assert_eq!(grid.occurrence_count(), 0);
    }

    #[test]
    fn test_month_serializes_as_string() {
        let json = serde_json::to_value(month("2026-01")).unwrap();
        assert_eq!(json, serde_json::json!("2026-01"));
    }
}
