//! Command handlers for the stromme binary.
//!
//! Every command works on a [`Runtime`]: the loaded configuration plus a theme
//! controller wired to the preference store, the system clock and a timer queue.
//! Each handler lives in its own submodule.

pub mod run;
pub mod set;
pub mod status;
pub mod sun;

use anyhow::{Context, Result};
use std::rc::Rc;

use crate::args::{Cli, Command};
use crate::config::Config;
use crate::geo::LocationStore;
use crate::logger::Log;
use crate::store::{FileStore, MemoryStore, PreferenceStore};
use crate::theme::ThemeController;
use crate::timer::{Clock, SystemClock, TimerQueue};

/// Everything a command needs, composed from the configuration.
pub struct Runtime {
    pub config: Config,
    pub controller: ThemeController,
    pub queue: Rc<TimerQueue>,
    pub clock: Rc<dyn Clock>,
}

impl Runtime {
    /// Wire a controller for `config` around the given store and clock.
    pub fn new(
        config: Config,
        store: Box<dyn PreferenceStore>,
        clock: Rc<dyn Clock>,
    ) -> Result<Self> {
        let location = LocationStore::new(config.coordinate()?, config.offset_source())
            .context("Invalid location settings")?;
        let queue = Rc::new(TimerQueue::new(Rc::clone(&clock)));
        let controller = ThemeController::new(
            location,
            store,
            queue.clone(),
            Rc::clone(&clock),
            config.controller_options(),
        );

        Ok(Self {
            config,
            controller,
            queue,
            clock,
        })
    }
}

/// Load configuration as requested on the command line.
pub fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    }
}

/// Pick the preference store: on disk by default, in memory with `--ephemeral`.
pub fn preference_store(cli: &Cli, config: &Config) -> Box<dyn PreferenceStore> {
    if cli.ephemeral {
        Log::log_debug("Using in-memory preference store");
        Box::new(MemoryStore::new())
    } else {
        Box::new(FileStore::new(config.state_dir()))
    }
}

/// Run the command selected on the command line.
pub fn dispatch(cli: Cli) -> Result<()> {
    Log::set_debug(cli.debug);
    Log::log_version();

    let config = load_config(&cli)?;
    let store = preference_store(&cli, &config);
    let runtime = Runtime::new(config, store, Rc::new(SystemClock))?;

    match cli.action() {
        Command::Run => run::handle_run_command(&runtime)?,
        Command::Status => status::handle_status_command(&runtime),
        Command::Set { mode } => set::handle_set_command(&runtime, mode),
        Command::Toggle => set::handle_toggle_command(&runtime),
        Command::Sun { date } => sun::handle_sun_command(&runtime, date),
    }

    runtime.controller.shutdown();
    Log::log_end();
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::geo::OffsetSource;
    use crate::timer::ManualClock;
    use chrono::{TimeZone, Utc};

    /// Berlin at 12:00 CEST on midsummer, pinned to UTC+2.
    pub fn midsummer_runtime() -> (Runtime, ManualClock, MemoryStore) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 21, 10, 0, 0).unwrap());
        let store = MemoryStore::new();
        let config = Config {
            offset_source: Some(crate::config::OffsetSourceKind::Fixed),
            utc_offset_hours: Some(2.0),
            ..Config::default()
        };
        assert_eq!(config.offset_source(), OffsetSource::Fixed(2.0));
        let runtime =
            Runtime::new(config, Box::new(store.clone()), Rc::new(clock.clone())).unwrap();
        (runtime, clock, store)
    }
}
