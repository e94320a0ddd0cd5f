//! Recurrence expansion.
//!
//! Expands a master event into the concrete occurrences that start inside a
//! query window, skipping dates on the master's exclusion list.

use chrono::{Days, Months, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::constants::MAX_EXPANSION_STEPS;
use crate::date_range::DateRange;
use crate::event::{Attendee, Event, EventTime};
use crate::instance::instance_id;
use crate::rrule::{Frequency, RecurrenceRule};

/// One appearance of a master on the calendar. Built per query, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    /// Instance ID for recurring masters, the master uid for singletons
    pub id: String,
    pub master_uid: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub all_day: bool,
    pub recurring: bool,
    pub created_by: Option<String>,
    pub attendees: Vec<Attendee>,
}

impl Occurrence {
    fn from_master(master: &Event, id: String, start: EventTime, end: EventTime) -> Self {
        Occurrence {
            id,
            master_uid: master.uid.clone(),
            title: master.title.clone(),
            description: master.description.clone(),
            location: master.location.clone(),
            start,
            end,
            all_day: master.is_all_day(),
            recurring: master.is_recurring(),
            created_by: master.created_by.clone(),
            attendees: master.attendees.clone(),
        }
    }

    /// Calendar date the occurrence starts on.
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }
}

/// Expand `master` into its occurrences within `range`, in chronological order.
///
/// A master without a rule yields itself iff it overlaps the window. A
/// recurring master is stepped forward from its own start until a candidate
/// starts at or after the window end, passes the rule's UNTIL, or the COUNT is
/// used up. Stepping stops after `MAX_EXPANSION_STEPS` regardless. Candidates
/// starting inside the window are emitted unless their date is excluded;
/// each keeps the master's duration.
pub fn expand(master: &Event, range: &DateRange) -> Vec<Occurrence> {
    let Some(recurrence) = &master.recurrence else {
        if range.overlaps(master.start.naive(), master.end.naive()) {
            return vec![Occurrence::from_master(
                master,
                master.uid.clone(),
                master.start.clone(),
                master.end.clone(),
            )];
        }
        return Vec::new();
    };

    let rule = &recurrence.rule;
    let anchor = master.start.naive();
    let duration = master.end.naive() - anchor;
    let max_steps = rule
        .count()
        .map_or(MAX_EXPANSION_STEPS, |count| count.min(MAX_EXPANSION_STEPS));

    let mut occurrences = Vec::new();

    let mut next = Some(anchor);
    for _ in 0..max_steps {
        let Some(start) = next else {
            break;
        };
        next = step_forward(start, rule);

        if start >= range.end {
            break;
        }
        if rule.until().is_some_and(|until| is_past_until(start, until)) {
            break;
        }
        if start < range.start {
            continue;
        }

        let date = start.date();
        if recurrence.is_excluded(date) {
            continue;
        }

        occurrences.push(Occurrence::from_master(
            master,
            instance_id(&master.uid, date),
            master.start.with_naive(start),
            master.end.with_naive(start + duration),
        ));
    }

    debug!(
        title = %master.title,
        uid = %master.uid,
        occurrences = occurrences.len(),
        "Expanded recurring event"
    );

    occurrences
}

/// Expand every master into `range` and merge the results by start time.
pub fn expand_all(masters: &[Event], range: &DateRange) -> Vec<Occurrence> {
    let mut occurrences: Vec<Occurrence> = masters
        .iter()
        .flat_map(|master| expand(master, range))
        .collect();

    occurrences.sort_by_key(|occurrence| occurrence.start.naive());
    occurrences
}

/// The candidate one interval after `current`. Month arithmetic follows
/// chrono, which clamps to the last day of the month, and the clamped date is
/// where the next step starts from.
fn step_forward(current: NaiveDateTime, rule: &RecurrenceRule) -> Option<NaiveDateTime> {
    let interval = rule.interval;
    match rule.frequency {
        Frequency::Daily => current.checked_add_days(Days::new(u64::from(interval))),
        Frequency::Weekly => current.checked_add_days(Days::new(u64::from(interval) * 7)),
        Frequency::Monthly => current.checked_add_months(Months::new(interval)),
        Frequency::Yearly => current.checked_add_months(Months::new(interval.checked_mul(12)?)),
    }
}

/// A date UNTIL includes its whole day; a timestamp UNTIL is compared exactly.
fn is_past_until(start: NaiveDateTime, until: &EventTime) -> bool {
    match until {
        EventTime::Date(date) => start.date() > *date,
        timed => start > timed.naive(),
    }
}
