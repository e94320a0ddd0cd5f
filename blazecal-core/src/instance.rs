//! Per-occurrence identifiers.
//!
//! An occurrence of a recurring master is addressed as `<master uid>-<YYYYMMDD>`.
//! Reversing that splits at the last `-`, which cannot tell an instance ID
//! apart from a master uid that itself ends in `-` and eight digits. That
//! collision is not resolved here; `Calendar::delete_event` probes the store
//! and flags it on the outcome.

use chrono::NaiveDate;

const DATE_SUFFIX_FORMAT: &str = "%Y%m%d";

/// Identifier of the occurrence of `master_uid` that starts on `date`.
pub fn instance_id(master_uid: &str, date: NaiveDate) -> String {
    format!("{}-{}", master_uid, date.format(DATE_SUFFIX_FORMAT))
}

/// An identifier split back into its master and occurrence date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    pub master_uid: String,
    /// Set when the identifier carried a valid `-YYYYMMDD` suffix
    pub occurrence_date: Option<NaiveDate>,
}

impl InstanceRef {
    pub fn is_instance(&self) -> bool {
        self.occurrence_date.is_some()
    }
}

/// Split an identifier received from a client.
///
/// If the text after the last `-` is exactly eight ASCII digits forming a
/// valid date, the identifier is an instance of the master named by the text
/// before it. Anything else (no dash, a leading dash, a non-date suffix) is
/// taken whole as a master uid.
pub fn resolve(id: &str) -> InstanceRef {
    if let Some((master_uid, date)) = split_instance(id) {
        return InstanceRef {
            master_uid: master_uid.to_string(),
            occurrence_date: Some(date),
        };
    }

    InstanceRef {
        master_uid: id.to_string(),
        occurrence_date: None,
    }
}

/// Whether a master uid would itself be read back as an instance ID.
pub fn has_instance_suffix(uid: &str) -> bool {
    split_instance(uid).is_some()
}

fn split_instance(id: &str) -> Option<(&str, NaiveDate)> {
    let (master_uid, suffix) = id.rsplit_once('-')?;
    if master_uid.is_empty() || suffix.len() != 8 || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let date = NaiveDate::parse_from_str(suffix, DATE_SUFFIX_FORMAT).ok()?;
    Some((master_uid, date))
}
