use anyhow::Result;
use blazecal_core::grid::{MonthGrid, MonthYear};
use blazecal_core::recurrence::Occurrence;
use blazecal_core::{Calendar, Transport};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::render::{Render, render_upcoming};
use crate::utils::tui;

#[derive(Serialize)]
struct MonthOutput<'a> {
    #[serde(flatten)]
    grid: &'a MonthGrid,
    upcoming: &'a [Occurrence],
    error: Option<String>,
}

pub async fn run<T: Transport>(
    calendar: &Calendar<T>,
    month: Option<&str>,
    json: bool,
) -> Result<()> {
    let month = match month {
        Some(input) => input.parse::<MonthYear>()?,
        None => MonthYear::current(),
    };

    let view = tui::with_spinner(
        &format!("Loading {}", month.title()),
        json,
        calendar.get_month_view(month),
    )
    .await;

    if json {
        let output = MonthOutput {
            grid: &view.grid,
            upcoming: &view.upcoming,
            error: view.error.as_ref().map(|e| e.to_string()),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", view.grid.render());
        println!();
        println!("{}", render_upcoming(&view.upcoming, calendar.upcoming_days()));
        if let Some(ref error) = view.error {
            eprintln!();
            eprintln!("{}", format!("Could not load events: {}", error).red());
        }
    }

    match view.error {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
