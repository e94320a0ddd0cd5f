//! Calendar operations exposed to the CLI: month views, the upcoming list,
//! event creation and deletion.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::constants::MAX_UPCOMING_DAYS;
use crate::date_range::DateRange;
use crate::error::{CalError, CalResult};
use crate::event::{Attendee, Event, EventTime, Recurrence};
use crate::exception::{ExclusionOutcome, add_exclusion};
use crate::grid::{MonthGrid, MonthYear, build_grid_at, empty_grid, group_by_date};
use crate::instance::resolve;
use crate::recurrence::{Occurrence, expand_all};
use crate::rrule::RecurrenceSelector;
use crate::store::{Store, Transport};

/// Fields for a new event. A missing end defaults to one day after an
/// all-day start and one hour after a timed start.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: Option<EventTime>,
    pub created_by: Option<String>,
    pub attendees: Vec<Attendee>,
}

impl NewEvent {
    pub fn new(title: &str, start: EventTime) -> Self {
        NewEvent {
            title: title.to_string(),
            description: None,
            location: None,
            start,
            end: None,
            created_by: None,
            attendees: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    /// Only the addressed occurrence
    Single,
    /// The master and with it every occurrence
    Series,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteAction {
    ExclusionAdded(NaiveDate),
    AlreadyExcluded(NaiveDate),
    MasterDeleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub master_uid: String,
    pub action: DeleteAction,
    /// The full ID also names a stored master, so it could have meant that
    /// master rather than an occurrence of `master_uid`
    pub ambiguous_instance_id: bool,
}

/// A month grid plus the upcoming list. On failure `error` is set and the
/// affected part is left empty rather than partially filled.
#[derive(Debug)]
pub struct MonthView {
    pub grid: MonthGrid,
    pub upcoming: Vec<Occurrence>,
    pub error: Option<CalError>,
}

pub struct Calendar<T: Transport> {
    transport: T,
    uid_domain: String,
    upcoming_days: i64,
}

impl Calendar<Store> {
    /// A calendar over the store named in `config`.
    pub fn from_config(config: &Config) -> Self {
        Calendar::new(Store::from_config(config), config)
    }
}

impl<T: Transport> Calendar<T> {
    pub fn new(transport: T, config: &Config) -> Self {
        Calendar {
            transport,
            uid_domain: config.uid_domain.clone(),
            upcoming_days: config.upcoming_days,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn upcoming_days(&self) -> i64 {
        self.upcoming_days
    }

    /// The grid for `month` and the configured upcoming list, as of now.
    pub async fn get_month_view(&self, month: MonthYear) -> MonthView {
        self.month_view_at(month, Local::now().naive_local()).await
    }

    /// [`Calendar::get_month_view`] with an explicit clock.
    pub async fn month_view_at(&self, month: MonthYear, now: NaiveDateTime) -> MonthView {
        let grid = match self.month_grid(month, now.date()).await {
            Ok(grid) => grid,
            Err(e) => {
                warn!(month = %month, error = %e, "Failed to build month grid");
                return MonthView {
                    grid: empty_grid(month),
                    upcoming: Vec::new(),
                    error: Some(e),
                };
            }
        };

        match self.upcoming_at(now, self.upcoming_days).await {
            Ok(upcoming) => MonthView {
                grid,
                upcoming,
                error: None,
            },
            Err(e) => {
                warn!(error = %e, "Failed to fetch upcoming events");
                MonthView {
                    grid,
                    upcoming: Vec::new(),
                    error: Some(e),
                }
            }
        }
    }

    /// Expand every master over the padded weeks of `month` and bucket the
    /// occurrences into a grid.
    pub async fn month_grid(&self, month: MonthYear, today: NaiveDate) -> CalResult<MonthGrid> {
        let range = month.padded_range();
        let masters = self.transport.fetch_masters(&range).await?;
        let occurrences = expand_all(&masters, &range);

        info!(
            month = %month,
            masters = masters.len(),
            occurrences = occurrences.len(),
            "Built month grid"
        );
        Ok(build_grid_at(month, group_by_date(occurrences), today))
    }

    /// Occurrences in the next `days` days, in start order.
    pub async fn upcoming_events(&self, days: i64) -> CalResult<Vec<Occurrence>> {
        self.upcoming_at(Local::now().naive_local(), days).await
    }

    /// [`Calendar::upcoming_events`] from an explicit instant.
    pub async fn upcoming_at(&self, now: NaiveDateTime, days: i64) -> CalResult<Vec<Occurrence>> {
        if !(1..=MAX_UPCOMING_DAYS).contains(&days) {
            return Err(CalError::Config(format!(
                "upcoming window must be between 1 and {MAX_UPCOMING_DAYS} days, got {days}"
            )));
        }
        let range = DateRange::upcoming(now, days)?;
        let masters = self.transport.fetch_masters(&range).await?;
        Ok(expand_all(&masters, &range))
    }

    /// Store a new master and return its uid, `<uuid>@<uid_domain>`.
    pub async fn create_event(
        &self,
        new: NewEvent,
        repeat: Option<RecurrenceSelector>,
    ) -> CalResult<String> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(CalError::InvalidEvent("title must not be empty".into()));
        }

        let uid = format!("{}@{}", Uuid::new_v4(), self.uid_domain);
        let end = new.end.unwrap_or_else(|| new.start.default_end());

        let mut event = Event::new(&uid, title, new.start, end);
        event.description = new.description.filter(|d| !d.trim().is_empty());
        event.location = new.location.filter(|l| !l.trim().is_empty());
        event.created_by = new.created_by;
        event.attendees = new.attendees;
        event.recurrence = repeat.map(|selector| Recurrence::new(selector.to_rule()));
        event.validate()?;

        self.transport.put_master(&event).await?;

        info!(
            uid = %uid,
            title = %event.title,
            recurring = event.is_recurring(),
            "Created calendar event"
        );
        Ok(uid)
    }

    /// Delete an occurrence or a whole series.
    ///
    /// `Single` on an instance ID excludes that date from its master. `Single`
    /// on a plain master uid, and `Series` on anything, delete the master.
    pub async fn delete_event(&self, id: &str, scope: DeleteScope) -> CalResult<DeleteOutcome> {
        let instance = resolve(id);

        let ambiguous_instance_id =
            instance.is_instance() && self.transport.get_master(id).await?.is_some();
        if ambiguous_instance_id {
            warn!(
                id = %id,
                master_uid = %instance.master_uid,
                "ID names a stored master and an occurrence; treating it as an occurrence"
            );
        }

        let action = match (scope, instance.occurrence_date) {
            (DeleteScope::Single, Some(date)) => {
                match add_exclusion(&self.transport, &instance.master_uid, date).await? {
                    ExclusionOutcome::Added => DeleteAction::ExclusionAdded(date),
                    ExclusionOutcome::AlreadyExcluded => DeleteAction::AlreadyExcluded(date),
                }
            }
            _ => {
                self.transport.delete_master(&instance.master_uid).await?;
                DeleteAction::MasterDeleted
            }
        };

        info!(
            id = %id,
            master_uid = %instance.master_uid,
            action = ?action,
            "Deleted calendar event"
        );
        Ok(DeleteOutcome {
            master_uid: instance.master_uid,
            action,
            ambiguous_instance_id,
        })
    }
}
