//! TUI rendering for blazecal types.
//!
//! Extension traits that add colored terminal rendering to blazecal-core
//! types using owo_colors.

use blazecal_core::calendar::{DeleteAction, DeleteOutcome};
use blazecal_core::event::EventTime;
use blazecal_core::grid::{DayCell, MonthGrid};
use blazecal_core::recurrence::Occurrence;
use chrono::NaiveDate;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Occurrence {
    fn render(&self) -> String {
        let mut line = format!("{:<13} {}", time_label(self), self.title);
        if let Some(ref location) = self.location {
            line.push_str(&format!(" @ {}", location));
        }
        if self.recurring {
            line.push_str(" ↻");
        }
        format!("{}  {}", line, self.id.dimmed())
    }
}

impl Render for MonthGrid {
    fn render(&self) -> String {
        let mut lines = vec![self.title.bold().to_string()];
        lines.push(
            [" Sun", " Mon", " Tue", " Wed", " Thu", " Fri", " Sat"]
                .join(" ")
                .dimmed()
                .to_string(),
        );

        for week in self.weeks() {
            let row: Vec<String> = week.iter().map(render_cell).collect();
            lines.push(row.join(" "));
        }

        lines.push(String::new());

        let busy_days: Vec<&DayCell> = self
            .cells
            .iter()
            .filter(|cell| !cell.other_month && !cell.occurrences.is_empty())
            .collect();

        if busy_days.is_empty() {
            lines.push("   No events this month".dimmed().to_string());
        }
        for cell in busy_days {
            lines.push(day_heading(cell.date, cell.today));
            for occurrence in &cell.occurrences {
                lines.push(format!("   {}", occurrence.render()));
            }
        }

        let nav: Vec<String> = [
            self.prev.map(|m| format!("‹ {}", m)),
            self.next.map(|m| format!("{} ›", m)),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !nav.is_empty() {
            lines.push(String::new());
            lines.push(nav.join("   ").dimmed().to_string());
        }

        lines.join("\n")
    }
}

impl Render for DeleteOutcome {
    fn render(&self) -> String {
        match self.action {
            DeleteAction::ExclusionAdded(date) => format!(
                "  Removed the {} occurrence of {}",
                date.format("%Y-%m-%d"),
                self.master_uid
            )
            .green()
            .to_string(),
            DeleteAction::AlreadyExcluded(date) => format!(
                "  The {} occurrence of {} was already removed",
                date.format("%Y-%m-%d"),
                self.master_uid
            )
            .dimmed()
            .to_string(),
            DeleteAction::MasterDeleted => format!("  Deleted {}", self.master_uid)
                .green()
                .to_string(),
        }
    }
}

/// Occurrences grouped under a heading per day.
pub fn render_upcoming(occurrences: &[Occurrence], days: i64) -> String {
    let heading = format!("Next {} {}", days, pluralize("day", days as usize));
    let mut lines = vec![heading.bold().to_string()];

    if occurrences.is_empty() {
        lines.push("   No upcoming events".dimmed().to_string());
        return lines.join("\n");
    }

    let today = chrono::Local::now().date_naive();
    let mut current: Option<NaiveDate> = None;
    for occurrence in occurrences {
        let date = occurrence.date();
        if current != Some(date) {
            lines.push(day_heading(date, date == today));
            current = Some(date);
        }
        lines.push(format!("   {}", occurrence.render()));
    }

    lines.join("\n")
}

fn render_cell(cell: &DayCell) -> String {
    let label = cell_label(cell);
    if cell.today {
        label.reversed().to_string()
    } else if cell.other_month {
        label.dimmed().to_string()
    } else if !cell.occurrences.is_empty() {
        label.cyan().to_string()
    } else {
        label
    }
}

/// Four columns: right-aligned day number and a dot when anything is on.
fn cell_label(cell: &DayCell) -> String {
    let marker = if cell.occurrences.is_empty() { ' ' } else { '•' };
    format!("{:>3}{}", cell.day, marker)
}

fn day_heading(date: NaiveDate, today: bool) -> String {
    let heading = date.format("%a %d %b").to_string();
    if today {
        format!("{} {}", heading.bold(), "(today)".dimmed())
    } else {
        heading.bold().to_string()
    }
}

/// `all day`, or the start and end wall-clock times.
fn time_label(occurrence: &Occurrence) -> String {
    if occurrence.all_day {
        let days = (occurrence.end.date() - occurrence.start.date()).num_days();
        if days > 1 {
            return format!("{} days", days);
        }
        return "all day".to_string();
    }

    let suffix = if matches!(occurrence.start, EventTime::DateTimeUtc(_)) { " UTC" } else { "" };
    format!(
        "{}-{}{}",
        occurrence.start.naive().format("%H:%M"),
        occurrence.end.naive().format("%H:%M"),
        suffix
    )
}

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
