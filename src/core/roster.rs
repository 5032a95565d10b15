//! File-backed player directory.
//!
//! The binary's stand-in for a host-provided player listing: a flat
//! `roster.json` mapping player names to UUIDs. Library users embedding the
//! service supply their own `PlayerDirectory` instead.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use uuid::Uuid;

use super::service::PlayerDirectory;

#[derive(Debug, Default)]
pub struct RosterDirectory {
    by_name: HashMap<String, Uuid>,
    by_id: HashMap<Uuid, String>,
}

impl RosterDirectory {
    /// Load `roster.json` from the data directory.
    ///
    /// Missing or malformed files yield an empty roster (every lookup then
    /// misses); bad entries are skipped with a warning.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("roster.json");
        if !path.exists() {
            log::info!("No roster file at {:?}, player lookups will miss", path);
            return Self::default();
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read roster file {:?}: {}", path, e);
                return Self::default();
            }
        };
        let raw: HashMap<String, String> = match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("Malformed roster file {:?}: {}", path, e);
                return Self::default();
            }
        };

        let mut roster = Self::default();
        for (name, id) in raw {
            match id.parse::<Uuid>() {
                Ok(id) => {
                    roster.by_id.insert(id, name.clone());
                    roster.by_name.insert(name, id);
                }
                Err(e) => {
                    log::warn!("Skipping roster entry {:?} with bad id {:?}: {}", name, id, e);
                }
            }
        }
        roster
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl PlayerDirectory for RosterDirectory {
    fn resolve(&self, name: &str) -> Option<Uuid> {
        if let Some(id) = self.by_name.get(name) {
            return Some(*id);
        }
        // Fall back to a case-insensitive scan, as host player lookups do.
        self.by_name
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, id)| *id)
    }

    fn display_name(&self, id: Uuid) -> Option<String> {
        self.by_id.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_and_resolve() {
        let dir = tempdir().unwrap();
        let alice = Uuid::new_v4();
        let content = format!(r#"{{"Alice": "{}"}}"#, alice);
        fs::write(dir.path().join("roster.json"), content).unwrap();

        let roster = RosterDirectory::load(dir.path());
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.resolve("Alice"), Some(alice));
        assert_eq!(roster.resolve("alice"), Some(alice));
        assert_eq!(roster.resolve("Bob"), None);
        assert_eq!(roster.display_name(alice), Some("Alice".to_string()));
    }

    #[test]
    fn test_missing_file_is_empty_roster() {
        let dir = tempdir().unwrap();
        let roster = RosterDirectory::load(dir.path());
        assert!(roster.is_empty());
    }

    #[test]
    fn test_bad_entries_skipped() {
        let dir = tempdir().unwrap();
        let good = Uuid::new_v4();
        let content = format!(r#"{{"Alice": "{}", "Bob": "not-a-uuid"}}"#, good);
        fs::write(dir.path().join("roster.json"), content).unwrap();

        let roster = RosterDirectory::load(dir.path());
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.resolve("Bob"), None);
    }
}
