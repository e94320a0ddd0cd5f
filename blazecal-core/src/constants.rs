//! Shared constants.

/// Upper bound on recurrence steps per master, whatever the rule's own bound
pub const MAX_EXPANSION_STEPS: u32 = 1000;

/// Default length of the upcoming-events list, in days
pub const DEFAULT_UPCOMING_DAYS: i64 = 30;

/// Longest upcoming-events window accepted, in days
pub const MAX_UPCOMING_DAYS: i64 = 3660;

/// Domain appended to generated event uids
pub const DEFAULT_UID_DOMAIN: &str = "blazecal";
