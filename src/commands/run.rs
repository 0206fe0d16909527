//! Implementation of the `run` daemon.
//!
//! The daemon logs every theme the controller publishes and keeps the
//! controller's timer queue turning until SIGINT or SIGTERM. SIGHUP reloads
//! the configuration file and moves the controller to the new location.

use anyhow::Result;
use std::sync::mpsc::TryRecvError;
use std::thread;
use std::time::Duration;

use crate::commands::Runtime;
use crate::commands::status::describe_next_change;
use crate::config::Config;
use crate::constants::CHECK_INTERVAL_SECS;
use crate::logger::Log;
use crate::signals::{SignalMessage, SignalState, setup_signal_handler};
use crate::theme::ThemeMode;

const CHECK_INTERVAL: Duration = Duration::from_secs(CHECK_INTERVAL_SECS);

/// Run until a shutdown signal arrives.
pub fn handle_run_command(runtime: &Runtime) -> Result<()> {
    runtime.config.log_config();

    let signal_state = setup_signal_handler()?;
    let subscription = runtime.controller.subscribe(|theme| {
        Log::log_decorated(&format!("Theme changed to {theme}"));
        Ok(())
    });

    Log::log_block_start(&format!(
        "Showing {} theme (mode: {})",
        runtime.controller.effective_theme(),
        runtime.controller.mode()
    ));
    if runtime.controller.mode() == ThemeMode::Auto {
        Log::log_indented(&describe_next_change(
            runtime.controller.time_until_theme_change(),
        ));
    }

    run_until_stopped(runtime, &signal_state, || thread::sleep(CHECK_INTERVAL));

    runtime.controller.unsubscribe(&subscription);
    Log::log_block_start("Shutting down stromme...");
    Ok(())
}

/// The main loop: handle pending signals, run due timers, then wait.
///
/// `wait` is called once per iteration; the daemon sleeps for one check
/// interval, tests advance a manual clock instead.
pub fn run_until_stopped(runtime: &Runtime, signal_state: &SignalState, mut wait: impl FnMut()) {
    while signal_state.is_running() {
        loop {
            match signal_state.receiver.try_recv() {
                Ok(message) => handle_signal_message(runtime, message),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return,
            }
        }
        if !signal_state.is_running() {
            break;
        }

        runtime.queue.run_pending();
        wait();
    }
}

/// React to one signal message.
pub fn handle_signal_message(runtime: &Runtime, message: SignalMessage) {
    match message {
        SignalMessage::Shutdown => {}
        SignalMessage::Reload => reload_location(runtime),
    }
}

fn reload_location(runtime: &Runtime) {
    Log::log_block_start("Reloading configuration...");

    let reloaded = match &runtime.config.source_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let config = match reloaded {
        Ok(config) => config,
        Err(e) => {
            Log::log_warning(&format!("Keeping current settings: {e:#}"));
            return;
        }
    };

    let coordinate = match config.coordinate() {
        Ok(coordinate) => coordinate,
        Err(e) => {
            Log::log_warning(&format!("Keeping current location: {e:#}"));
            return;
        }
    };

    match runtime.controller.update_location(
        coordinate.latitude,
        coordinate.longitude,
        Some(coordinate.timezone),
    ) {
        Ok(()) => Log::log_decorated(&format!(
            "Location: {}",
            runtime.controller.location_name()
        )),
        Err(e) => Log::log_warning(&format!("Keeping current location: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::midsummer_runtime;
    use crate::theme::Theme;
    use chrono::Duration as ChronoDuration;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use std::sync::atomic::Ordering;
    use tempfile::tempdir;

    #[test]
    fn test_loop_exits_once_running_is_cleared() {
        Log::set_enabled(false);
        let (runtime, clock, _store) = midsummer_runtime();
        let (state, _sender) = SignalState::detached();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        runtime.controller.subscribe(move |theme| {
            sink.borrow_mut().push(theme);
            Ok(())
        });

        // Advance ten hours a minute at a time, past sunset at 21:25 CEST
        let mut iterations = 0;
        let running = state.running.clone();
        run_until_stopped(&runtime, &state, || {
            clock.advance(ChronoDuration::seconds(60));
            iterations += 1;
            if iterations == 600 {
                running.store(false, Ordering::SeqCst);
            }
        });

        assert_eq!(*seen.borrow(), vec![Theme::Dark]);
    }

    #[test]
    fn test_reload_moves_location() {
        Log::set_enabled(false);
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("stromme.toml");
        fs::write(
            &config_path,
            "latitude = 48.1351\nlongitude = 11.582\noffset_source = \"fixed\"\nutc_offset_hours = 2.0\n",
        )
        .unwrap();

        let (mut runtime, _clock, _store) = midsummer_runtime();
        runtime.config.source_path = Some(config_path);

        let (state, sender) = SignalState::detached();
        sender.send(SignalMessage::Reload).unwrap();
        sender.send(SignalMessage::Shutdown).unwrap();

        let mut waits = 0;
        let running = state.running.clone();
        run_until_stopped(&runtime, &state, || {
            waits += 1;
            running.store(false, Ordering::SeqCst);
        });

        assert_eq!(waits, 1);
        assert_eq!(runtime.controller.coordinate().latitude, 48.1351);
        assert_eq!(runtime.controller.location_name(), "48.14, 11.58");
    }

    #[test]
    fn test_broken_reload_keeps_location() {
        Log::set_enabled(false);
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("stromme.toml");
        fs::write(&config_path, "latitude = 95.0\nlongitude = 0.0\n").unwrap();

        let (mut runtime, _clock, _store) = midsummer_runtime();
        runtime.config.source_path = Some(config_path);
        handle_signal_message(&runtime, SignalMessage::Reload);
        assert_eq!(runtime.controller.location_name(), "Berlin, Germany");
    }
}
