//! Directory store: one `.ics` file per master record.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::date_range::DateRange;
use crate::error::{CalError, CalResult};
use crate::event::Event;
use crate::ics::{generate_ics, parse_event};
use crate::store::Transport;

/// Master records kept as `<dir>/<encoded uid>.ics`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    path: PathBuf,
}

impl DirectoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DirectoryStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_for(&self, uid: &str) -> PathBuf {
        self.path.join(format!("{}.ics", file_stem_for(uid)))
    }

    /// Load every master in the directory. A missing directory is an empty store.
    fn masters(&self) -> CalResult<Vec<Event>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.path).map_err(|e| io_failure(&self.path, e))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|e| e == "ics"))
            .collect();
        paths.sort();

        paths.iter().map(|path| read_master(path)).collect()
    }
}

impl Transport for DirectoryStore {
    async fn fetch_masters(&self, range: &DateRange) -> CalResult<Vec<Event>> {
        let masters: Vec<Event> = self
            .masters()?
            .into_iter()
            .filter(|event| {
                if event.is_recurring() {
                    event.start.naive() < range.end
                } else {
                    range.overlaps(event.start.naive(), event.end.naive())
                }
            })
            .collect();

        debug!(
            count = masters.len(),
            from = %range.start_iso(),
            to = %range.end_iso(),
            "Fetched masters from directory"
        );

        Ok(masters)
    }

    async fn get_master(&self, uid: &str) -> CalResult<Option<Event>> {
        let path = self.file_for(uid);
        if !path.exists() {
            return Ok(None);
        }

        let event = read_master(&path)?;
        Ok((event.uid == uid).then_some(event))
    }

    async fn put_master(&self, event: &Event) -> CalResult<()> {
        let ics_content = generate_ics(event)?;

        std::fs::create_dir_all(&self.path).map_err(|e| io_failure(&self.path, e))?;
        let path = self.file_for(&event.uid);
        std::fs::write(&path, ics_content).map_err(|e| io_failure(&path, e))?;

        info!(uid = %event.uid, path = %path.display(), "Saved master");
        Ok(())
    }

    async fn delete_master(&self, uid: &str) -> CalResult<()> {
        let path = self.file_for(uid);
        if !path.exists() {
            return Err(CalError::NotFound(uid.to_string()));
        }

        std::fs::remove_file(&path).map_err(|e| io_failure(&path, e))?;

        info!(uid = %uid, "Deleted master");
        Ok(())
    }
}

fn read_master(path: &Path) -> CalResult<Event> {
    let content = std::fs::read_to_string(path).map_err(|e| io_failure(path, e))?;
    parse_event(&content).map_err(|e| match e {
        CalError::IcsParse(msg) => CalError::IcsParse(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

fn io_failure(path: &Path, e: std::io::Error) -> CalError {
    CalError::TransportFailure(format!("{}: {}", path.display(), e))
}

/// File stem for a uid. Bytes outside `[A-Za-z0-9@._-]` are percent-encoded,
/// so distinct uids never share a file.
fn file_stem_for(uid: &str) -> String {
    let mut stem = String::with_capacity(uid.len());
    for byte in uid.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'@' | b'.' | b'_' | b'-' => {
                stem.push(byte as char)
            }
            _ => stem.push_str(&format!("%{:02X}", byte)),
        }
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use crate::rrule::decode;
    use chrono::NaiveDate;

    fn all_day(uid: &str, y: i32, m: u32, d: u32) -> Event {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        Event::new(
            uid,
            "Holiday",
            EventTime::Date(date),
            EventTime::Date(date + chrono::Duration::days(1)),
        )
    }

    fn january() -> DateRange {
        DateRange::from_dates(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        )
    }

    #[test]
    fn test_file_stem_encodes_unsafe_bytes() {
        assert_eq!(file_stem_for("abc-123@blazecal"), "abc-123@blazecal");
        assert_eq!(file_stem_for("a/b"), "a%2Fb");
        assert_ne!(file_stem_for("a/b"), file_stem_for("a_b"));
        assert_eq!(file_stem_for("a b%"), "a%20b%25");
    }

    #[tokio::test]
    async fn test_put_then_get_master() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let event = all_day("new-year@blazecal", 2026, 1, 1);

        store.put_master(&event).await.unwrap();

        assert!(dir.path().join("new-year@blazecal.ics").exists());
        assert_eq!(store.get_master("new-year@blazecal").await.unwrap(), Some(event));
        assert_eq!(store.get_master("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_replaces_whole_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let mut event = all_day("x", 2026, 1, 1);
        store.put_master(&event).await.unwrap();

        event.title = "Renamed".to_string();
        store.put_master(&event).await.unwrap();

        let stored = store.get_master("x").await.unwrap().unwrap();
        assert_eq!(stored.title, "Renamed");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_masters_filters_by_window() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        let inside = all_day("inside", 2026, 1, 15);
        let outside = all_day("outside", 2026, 3, 1);
        let mut series = all_day("series", 2025, 6, 1);
        series.recurrence = Some(crate::event::Recurrence::new(
            decode("FREQ=MONTHLY;INTERVAL=1").unwrap(),
        ));
        let mut future_series = all_day("future-series", 2026, 6, 1);
        future_series.recurrence = series.recurrence.clone();

        for event in [&inside, &outside, &series, &future_series] {
            store.put_master(event).await.unwrap();
        }

        let mut uids: Vec<String> = store
            .fetch_masters(&january())
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.uid)
            .collect();
        uids.sort();
        assert_eq!(uids, vec!["inside", "series"]);
    }

    #[tokio::test]
    async fn test_fetch_masters_on_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path().join("not-created-yet"));
        assert!(store.fetch_masters(&january()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_masters_surfaces_malformed_rule() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("broken.ics"),
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\nBEGIN:VEVENT\r\nUID:broken\r\n\
SUMMARY:Broken\r\nDTSTART:20260105T090000Z\r\nDTEND:20260105T100000Z\r\n\
RRULE:FREQ=HOURLY\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
        )
        .unwrap();

        let store = DirectoryStore::new(dir.path());
        let result = store.fetch_masters(&january()).await;
        assert!(matches!(result, Err(CalError::MalformedRule(_))));
    }

    #[tokio::test]
    async fn test_delete_master() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        store.put_master(&all_day("gone", 2026, 1, 2)).await.unwrap();

        store.delete_master("gone").await.unwrap();
        assert_eq!(store.get_master("gone").await.unwrap(), None);

        let again = store.delete_master("gone").await;
        assert!(matches!(again, Err(CalError::NotFound(uid)) if uid == "gone"));
    }
}
