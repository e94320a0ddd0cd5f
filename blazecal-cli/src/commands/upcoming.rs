use anyhow::Result;
use blazecal_core::{Calendar, Transport};

use crate::render::render_upcoming;
use crate::utils::tui;

pub async fn run<T: Transport>(calendar: &Calendar<T>, days: i64, json: bool) -> Result<()> {
    let occurrences =
        tui::with_spinner("Loading upcoming events", json, calendar.upcoming_events(days)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&occurrences)?);
    } else {
        println!("{}", render_upcoming(&occurrences, days));
    }

    Ok(())
}
