//! Service wiring: config, registry hydration, scheduler lifecycle.

use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::{
    config::ConfigManager,
    registry::persist::RegistryFile,
    roster::RosterDirectory,
    scheduler::DailyScheduler,
    service::{ActionInvoker, BirthdayService},
};

/// Writes the substituted action command to the log. Embedding hosts swap
/// in an invoker that dispatches to their own console.
struct ConsoleInvoker;

impl ActionInvoker for ConsoleInvoker {
    fn invoke(&self, command: &str) -> Result<(), String> {
        log::info!("[ACTION] {}", command);
        Ok(())
    }
}

/// Run the service until ctrl-c.
pub async fn run() -> io::Result<()> {
    env_logger::init();

    let config_dir = env::var("BIRTHDAY_KEEPER_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    let config = ConfigManager::new(config_dir);
    let settings = config.load();
    // Write defaults back so a first run leaves an editable settings file.
    if let Err(e) = config.save(&settings) {
        log::warn!("Could not write settings file: {}", e);
    }

    let file = RegistryFile::new(&settings.data_dir);
    let registry = file.load();
    log::info!("Loaded {} birthday record(s)", registry.len());

    let directory = RosterDirectory::load(&settings.data_dir);
    log::info!("Roster knows {} player(s)", directory.len());

    let service = Arc::new(BirthdayService::new(
        file,
        registry,
        directory,
        ConsoleInvoker,
        settings.birthday_command,
    ));

    let mut scheduler = DailyScheduler::new();
    let pass_service = service.clone();
    scheduler.start_daily(move || pass_service.run_daily_pass());

    log::info!("birthday-keeper running, ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    // Disarm before the final flush so no tick races the shutdown save.
    scheduler.stop();
    if let Err(e) = service.flush() {
        log::error!("Final registry flush failed: {}", e);
    }
    log::info!("birthday-keeper stopped");

    Ok(())
}
