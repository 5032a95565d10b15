//! In-memory birthday records.
//!
//! One `MM-DD` date string per player UUID. Validation here is purely
//! syntactic: two digits, dash, two digits. Out-of-range values like
//! `13-40` are accepted and simply never match a real calendar day.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::core::error::BirthdayError;

lazy_static! {
    static ref DATE_SHAPE: Regex = Regex::new(r"^\d{2}-\d{2}$").unwrap();
}

/// Returns true if `date` has the `MM-DD` shape.
pub fn is_valid_date(date: &str) -> bool {
    DATE_SHAPE.is_match(date)
}

/// The mapping of player identity to birthday date string.
#[derive(Debug, Clone, Default)]
pub struct BirthdayRegistry {
    entries: HashMap<Uuid, String>,
}

impl BirthdayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the birthday for a player.
    ///
    /// Rejects anything that does not look like `MM-DD`; rejected input is
    /// never stored. The caller is responsible for persisting afterwards.
    pub fn set(&mut self, id: Uuid, date: &str) -> Result<(), BirthdayError> {
        if !is_valid_date(date) {
            return Err(BirthdayError::InvalidFormat(date.to_string()));
        }
        self.entries.insert(id, date.to_string());
        Ok(())
    }

    /// Remove a player's birthday. Returns true if a record existed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn get(&self, id: Uuid) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Snapshot of all records, in no particular order.
    pub fn entries(&self) -> Vec<(Uuid, String)> {
        self.entries
            .iter()
            .map(|(id, date)| (*id, date.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
