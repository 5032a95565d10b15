//! File-backed persistence for the birthday registry.
//!
//! The registry is stored as a single flat JSON object mapping UUID strings
//! to `MM-DD` date strings. The whole file is rewritten on every save.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::store::{is_valid_date, BirthdayRegistry};

/// Manages the on-disk copy of the registry.
pub struct RegistryFile {
    path: PathBuf,
}

impl RegistryFile {
    /// `data_dir` is the service data directory; the registry lives in
    /// `birthdays.json` inside it.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("birthdays.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the registry from disk.
    ///
    /// A missing file is the normal first-run case: an empty file is created
    /// and an empty registry returned. An unreadable or malformed file
    /// degrades to an empty registry; entries with an unparseable key or a
    /// bad date are skipped individually. Nothing here aborts startup.
    pub fn load(&self) -> BirthdayRegistry {
        if !self.path.exists() {
            log::info!("No registry file at {:?}, starting empty", self.path);
            if let Err(e) = self.create_empty() {
                log::warn!("Could not create registry file {:?}: {}", self.path, e);
            }
            return BirthdayRegistry::new();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Unreadable registry file {:?}: {}", self.path, e);
                return BirthdayRegistry::new();
            }
        };
        let raw: HashMap<String, String> = match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("Malformed registry file {:?}: {}", self.path, e);
                return BirthdayRegistry::new();
            }
        };

        let mut registry = BirthdayRegistry::new();
        for (key, date) in raw {
            let id = match key.parse::<Uuid>() {
                Ok(id) => id,
                Err(e) => {
                    log::warn!("Skipping registry entry with bad key {:?}: {}", key, e);
                    continue;
                }
            };
            if !is_valid_date(&date) {
                log::warn!("Skipping registry entry {} with bad date {:?}", id, date);
                continue;
            }
            // Cannot fail: the date was just validated.
            let _ = registry.set(id, &date);
        }

        registry
    }

    fn create_empty(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, "{}")
    }

    /// Write the full registry to disk, replacing the previous contents.
    ///
    /// Writes to a temporary sibling and renames it into place so a failed
    /// save never truncates previously durable data.
    pub fn save(&self, registry: &BirthdayRegistry) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let map: HashMap<String, String> = registry
            .entries()
            .into_iter()
            .map(|(id, date)| (id.to_string(), date))
            .collect();
        let content = serde_json::to_string_pretty(&map)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}
