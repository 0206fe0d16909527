//! # Stromme
//!
//! Solar-time adaptive light/dark theme engine.
//!
//! Stromme decides whether an application should show its light or dark theme.
//! In `auto` mode the choice follows local sunrise and sunset, computed from a
//! configured location; `light` and `dark` pin the theme. The chosen mode is
//! persisted between runs and subscribers are told whenever the applied theme
//! changes.
//!
//! ## Architecture
//!
//! - **args**: Command-line parsing
//! - **commands**: Handlers for `run`, `status`, `set`, `toggle` and `sun`
//! - **config**: Configuration loading, validation, and default generation
//! - **constants**: Application-wide constants and defaults
//! - **error**: Typed errors for the library surface
//! - **geo**: Coordinates, the solar model, UTC offsets and the location store
//! - **logger**: Structured logging with visual formatting
//! - **signals**: Signal handling for the daemon
//! - **store**: Persistence of the theme preference
//! - **theme**: Theme types and the theme controller
//! - **timer**: Clocks and the repeating timer queue
//! - **utils**: Formatting helpers

pub mod args;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod logger;
pub mod signals;
pub mod store;
pub mod theme;
pub mod timer;
pub mod utils;

// Re-export important types for easier access
pub use config::Config;
pub use error::{Error, PolarCondition, Result};
pub use geo::{GeoCoordinate, LocationStore, OffsetSource, SolarTimes, compute_solar_times};
pub use logger::{Log, LogLevel};
pub use store::{FileStore, MemoryStore, PreferenceStore};
pub use theme::{ControllerOptions, RecheckNotify, Subscription, Theme, ThemeController, ThemeMode};
pub use timer::{Clock, ManualClock, Scheduler, SystemClock, TimerHandle, TimerQueue};
