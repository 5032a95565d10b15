//! Day matching: which players have their birthday today?
//!
//! Matching is plain string equality against the stored `MM-DD` value, no
//! calendar normalization. It is a pure function of a registry snapshot and
//! the today-string; calling it twice for the same day matches twice, so
//! once-per-day semantics come from the scheduler, not from here.

use chrono::Local;
use uuid::Uuid;

use super::registry::store::BirthdayRegistry;

/// The current local date as `MM-DD`.
pub fn today_string() -> String {
    Local::now().format("%m-%d").to_string()
}

/// All players whose stored birthday equals `today`.
pub fn due_on(registry: &BirthdayRegistry, today: &str) -> Vec<Uuid> {
    registry
        .entries()
        .into_iter()
        .filter(|(_, date)| date == today)
        .map(|(id, _)| id)
        .collect()
}
