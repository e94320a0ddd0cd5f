//! Single-occurrence removal from a recurring series.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::error::{CalError, CalResult};
use crate::store::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionOutcome {
    Added,
    /// The date was already excluded; the record was not rewritten
    AlreadyExcluded,
}

/// Exclude `date` from the series `master_uid`.
///
/// Read-modify-write of the whole master: every other field is written back
/// as fetched. Concurrent edits to the same master race and the last write
/// wins.
pub async fn add_exclusion<T: Transport>(
    transport: &T,
    master_uid: &str,
    date: NaiveDate,
) -> CalResult<ExclusionOutcome> {
    let mut master = transport
        .get_master(master_uid)
        .await?
        .ok_or_else(|| CalError::NotFound(master_uid.to_string()))?;

    if !master.add_exclusion(date)? {
        info!(uid = %master_uid, %date, "Date already excluded");
        return Ok(ExclusionOutcome::AlreadyExcluded);
    }

    transport.put_master(&master).await?;

    info!(uid = %master_uid, %date, "Added exclusion");
    Ok(ExclusionOutcome::Added)
}
