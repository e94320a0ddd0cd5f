use anyhow::Result;
use blazecal_core::{Calendar, DeleteScope, Transport};
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::utils::tui;

pub async fn run<T: Transport>(
    calendar: &Calendar<T>,
    id: &str,
    series: bool,
    json: bool,
) -> Result<()> {
    let scope = if series { DeleteScope::Series } else { DeleteScope::Single };

    let outcome = tui::with_spinner("Deleting", json, calendar.delete_event(id, scope)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if outcome.ambiguous_instance_id {
        eprintln!(
            "{}",
            format!(
                "  Warning: '{}' is also the uid of a stored event; treated it as an occurrence of {}",
                id, outcome.master_uid
            )
            .yellow()
        );
    }
    println!("{}", outcome.render());

    Ok(())
}
