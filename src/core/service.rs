//! The birthday service: owns the registry, exposes the command surface,
//! and runs the daily pass the scheduler triggers.
//!
//! Every mutation is written through to disk before the call returns. A
//! failed save is logged and the in-memory registry stays authoritative
//! until the next successful save; mutations never fail because of it.

use std::sync::Mutex;

use uuid::Uuid;

use super::error::BirthdayError;
use super::matcher;
use super::registry::persist::RegistryFile;
use super::registry::store::BirthdayRegistry;

/// Resolves player names and identities against the host's player listing.
pub trait PlayerDirectory: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Uuid>;
    fn display_name(&self, id: Uuid) -> Option<String>;
}

/// Executes the substituted action command for one matched player.
pub trait ActionInvoker: Send + Sync {
    fn invoke(&self, command: &str) -> Result<(), String>;
}

pub struct BirthdayService<D, A> {
    registry: Mutex<BirthdayRegistry>,
    file: RegistryFile,
    directory: D,
    invoker: A,
    /// Action template; `%player%` is replaced with the display name.
    command_template: String,
}

impl<D: PlayerDirectory, A: ActionInvoker> BirthdayService<D, A> {
    pub fn new(
        file: RegistryFile,
        registry: BirthdayRegistry,
        directory: D,
        invoker: A,
        command_template: String,
    ) -> Self {
        Self {
            registry: Mutex::new(registry),
            file,
            directory,
            invoker,
            command_template,
        }
    }

    /// Record a birthday for a named player, overwriting any previous one.
    pub fn set_birthday(&self, name: &str, date: &str) -> Result<(), BirthdayError> {
        let id = self
            .directory
            .resolve(name)
            .ok_or_else(|| BirthdayError::PlayerNotFound(name.to_string()))?;

        let mut registry = self.registry.lock().unwrap();
        registry.set(id, date)?;
        self.persist(&registry);
        Ok(())
    }

    /// Remove a named player's birthday. Ok(false) when none was recorded.
    pub fn remove_birthday(&self, name: &str) -> Result<bool, BirthdayError> {
        let id = self
            .directory
            .resolve(name)
            .ok_or_else(|| BirthdayError::PlayerNotFound(name.to_string()))?;

        let mut registry = self.registry.lock().unwrap();
        let removed = registry.remove(id);
        if removed {
            self.persist(&registry);
        }
        Ok(removed)
    }

    pub fn get_birthday(&self, name: &str) -> Result<Option<String>, BirthdayError> {
        let id = self
            .directory
            .resolve(name)
            .ok_or_else(|| BirthdayError::PlayerNotFound(name.to_string()))?;

        let registry = self.registry.lock().unwrap();
        Ok(registry.get(id).map(str::to_string))
    }

    /// All recorded birthdays as (display name, date), sorted
    /// case-insensitively by name. Players the directory can no longer
    /// resolve fall back to their UUID string.
    pub fn list_birthdays(&self) -> Vec<(String, String)> {
        let entries = self.registry.lock().unwrap().entries();
        let mut listed: Vec<(String, String)> = entries
            .into_iter()
            .map(|(id, date)| {
                let name = self
                    .directory
                    .display_name(id)
                    .unwrap_or_else(|| id.to_string());
                (name, date)
            })
            .collect();
        listed.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));
        listed
    }

    /// The scheduler's daily tick: match today and fire actions.
    pub fn run_daily_pass(&self) {
        self.run_pass_on(&matcher::today_string());
    }

    /// Match and fire for an explicit today-string.
    ///
    /// One player's failure (unresolvable name, action error) is logged and
    /// never aborts the rest of the pass.
    pub fn run_pass_on(&self, today: &str) {
        // Snapshot under the lock, invoke outside it.
        let due = {
            let registry = self.registry.lock().unwrap();
            matcher::due_on(&registry, today)
        };
        if due.is_empty() {
            log::debug!("No birthdays on {}", today);
            return;
        }
        log::info!("{} birthday(s) on {}", due.len(), today);

        for id in due {
            let name = match self.directory.display_name(id) {
                Some(name) => name,
                None => {
                    log::warn!("Skipping birthday for {}: display name unresolved", id);
                    continue;
                }
            };
            let command = self.command_template.replace("%player%", &name);
            if let Err(e) = self.invoker.invoke(&command) {
                log::warn!("Birthday action failed for {}: {}", name, e);
            }
        }
    }

    /// Flush the registry to disk, surfacing the error. Called on shutdown.
    pub fn flush(&self) -> Result<(), BirthdayError> {
        let registry = self.registry.lock().unwrap();
        self.file.save(&registry)?;
        Ok(())
    }

    fn persist(&self, registry: &BirthdayRegistry) {
        if let Err(e) = self.file.save(registry) {
            log::error!(
                "Failed to save registry to {:?}: {} (keeping in-memory state)",
                self.file.path(),
                e
            );
        }
    }
}
