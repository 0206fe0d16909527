//! Application constants and default values for stromme.
//!
//! This module contains the configuration defaults, validation limits,
//! and operational constants used throughout the application.

use crate::config::{OffsetSourceKind, RecheckNotify};

// ═══ Reference Location ═══
// The dashboard ships configured for Berlin until a location is set

pub const DEFAULT_LATITUDE: f64 = 52.52;
pub const DEFAULT_LONGITUDE: f64 = 13.405;
pub const DEFAULT_TIMEZONE: &str = "Europe/Berlin";
pub const DEFAULT_LOCATION_NAME: &str = "Berlin, Germany";
pub const LOCATION_NAME_TOLERANCE_DEG: f64 = 0.1; // How close counts as "the default city"

// ═══ Application Configuration Defaults ═══
// These values are used when config options are not specified by the user

pub const DEFAULT_OFFSET_SOURCE: OffsetSourceKind = OffsetSourceKind::System;
pub const DEFAULT_RECHECK_INTERVAL: u64 = 60; // seconds between Auto mode re-evaluations
pub const DEFAULT_RECHECK_NOTIFY: RecheckNotify = RecheckNotify::Changes;

// ═══ Validation Limits ═══

pub const MINIMUM_LATITUDE: f64 = -90.0;
pub const MAXIMUM_LATITUDE: f64 = 90.0;
pub const MINIMUM_LONGITUDE: f64 = -180.0;
pub const MAXIMUM_LONGITUDE: f64 = 180.0;

// Re-check interval limits
pub const MINIMUM_RECHECK_INTERVAL: u64 = 60; // one minute or coarser
pub const MAXIMUM_RECHECK_INTERVAL: u64 = 86_400; // once a day

// UTC offsets beyond a full day make no sense for a calendar date
pub const MAXIMUM_UTC_OFFSET_HOURS: f64 = 24.0;

// ═══ Solar Model Constants ═══

pub const AXIAL_TILT_DEG: f64 = 23.45;
pub const MINUTES_PER_DEGREE: f64 = 4.0; // The earth turns one degree every four minutes
pub const SOLAR_NOON_MINUTES: f64 = 720.0;

// ═══ Persistence ═══

pub const THEME_STORAGE_KEY: &str = "stromme-theme";
pub const STATE_DIR_NAME: &str = "stromme";

// ═══ Operational Timing Constants ═══

pub const CHECK_INTERVAL_SECS: u64 = 1; // How often the run loop checks the running flag

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1;

// ═══ Test Constants ═══
#[cfg(test)]
pub mod test_constants {
    pub const TEST_BERLIN_LATITUDE: f64 = 52.52;
    pub const TEST_BERLIN_LONGITUDE: f64 = 13.405;
    pub const TEST_SUMMER_OFFSET_HOURS: f64 = 2.0; // CEST
    pub const TEST_WINTER_OFFSET_HOURS: f64 = 1.0; // CET
}
