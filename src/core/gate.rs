// Pure gating rules: duplicate suppression, daily cap, quality threshold.
//
// Purpose
// - Keep the anti-fraud decisions as side-effect-free functions the ingestion
//   pipeline composes with ledger queries.
//
// Testing guidance
// - Boundary values matter: the window edge, the cap edge, quality 69 vs 70.

use chrono::{DateTime, Utc};

/// Two punches of the same type within this window collapse into a duplicate.
pub const DUPLICATE_WINDOW_MINUTES: i64 = 15;

/// Hard per-employee cap of appended punches per calendar day.
pub const MAX_DAILY_PUNCHES: u32 = 10;

/// Below this match confidence a punch carries an advisory warning.
pub const MIN_VERIFICATION_QUALITY: u8 = 70;

/// A punch is a duplicate when an accepted punch of the same type exists
/// within the window, on either side of the new punch time.
pub fn is_duplicate_of(last_accepted_same_type: DateTime<Utc>, punch_time: DateTime<Utc>) -> bool {
    let spacing = (punch_time - last_accepted_same_type).num_seconds().abs();
    spacing <= DUPLICATE_WINDOW_MINUTES * 60
}

/// The cap rejects the punch that would exceed MAX_DAILY_PUNCHES, counting
/// Accepted and Duplicate entries already appended for the day.
pub fn daily_limit_reached(appended_today: u32) -> bool {
    appended_today >= MAX_DAILY_PUNCHES
}

pub fn is_low_quality(verification_quality: u8) -> bool {
    verification_quality < MIN_VERIFICATION_QUALITY
}
