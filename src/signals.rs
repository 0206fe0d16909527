//! Signal handling for the `run` daemon.
//!
//! A background thread owned by `signal-hook` turns POSIX signals into
//! [`SignalMessage`]s. The theme controller itself is single-threaded, so the
//! thread never touches it: it only flips the shared running flag and sends a
//! message that the main loop picks up between timer runs.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use crate::logger::Log;

/// What the main loop should do in response to a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Reload the configuration file and apply the new location (SIGHUP).
    Reload,
    /// Stop the daemon (SIGINT, SIGTERM).
    Shutdown,
}

/// Signal handling state shared with the main loop.
pub struct SignalState {
    /// Cleared once a shutdown signal arrives.
    pub running: Arc<AtomicBool>,
    pub receiver: Receiver<SignalMessage>,
}

impl SignalState {
    /// A state with no signal thread behind it; messages are sent through the returned sender.
    pub fn detached() -> (Self, Sender<SignalMessage>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                running: Arc::new(AtomicBool::new(true)),
                receiver,
            },
            sender,
        )
    }

    /// `false` once a shutdown signal has been received.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Map a raw signal number to its message.
pub fn message_for_signal(signal: i32) -> Option<SignalMessage> {
    match signal {
        SIGHUP => Some(SignalMessage::Reload),
        SIGINT | SIGTERM => Some(SignalMessage::Shutdown),
        _ => None,
    }
}

/// Register SIGINT, SIGTERM and SIGHUP and start the listener thread.
pub fn setup_signal_handler() -> Result<SignalState> {
    let (state, sender) = SignalState::detached();

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    let running = Arc::clone(&state.running);
    thread::spawn(move || {
        for signal in signals.forever() {
            let Some(message) = message_for_signal(signal) else {
                continue;
            };

            if message == SignalMessage::Shutdown {
                Log::log_pipe();
                Log::log_info(&format!("Shutdown signal received: {}", signal));
                running.store(false, Ordering::SeqCst);
            }

            if sender.send(message).is_err() {
                // Main loop is gone
                break;
            }
        }
    });

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_mapping() {
        assert_eq!(message_for_signal(SIGHUP), Some(SignalMessage::Reload));
        assert_eq!(message_for_signal(SIGINT), Some(SignalMessage::Shutdown));
        assert_eq!(message_for_signal(SIGTERM), Some(SignalMessage::Shutdown));
        assert_eq!(message_for_signal(signal_hook::consts::SIGUSR1), None);
    }

    #[test]
    fn test_detached_state_delivers_messages() {
        let (state, sender) = SignalState::detached();
        assert!(state.is_running());
        sender.send(SignalMessage::Reload).unwrap();
        assert_eq!(state.receiver.try_recv(), Ok(SignalMessage::Reload));
    }
}
