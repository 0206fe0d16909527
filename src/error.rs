//! Error types for the theme engine core.
//!
//! Only [`Error::InvalidCoordinate`] and [`Error::InvalidUtcOffset`] ever reach a caller.
//! Persistence and subscriber failures are caught where they happen and logged, and
//! invalid solar geometry is translated into a day/night signal by the location store.
//! They still get variants here so every failure is logged with the same wording.

use std::fmt;

/// Result type alias for operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Which side of the polar edge case the hour-angle computation fell on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolarCondition {
    /// The sun stays above the horizon for the whole day (midnight sun).
    PolarDay,
    /// The sun never rises.
    PolarNight,
}

impl fmt::Display for PolarCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolarCondition::PolarDay => write!(f, "polar day"),
            PolarCondition::PolarNight => write!(f, "polar night"),
        }
    }
}

/// Errors that can occur in the theme engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid coordinate: latitude {latitude} (must be -90..=90), longitude {longitude} (must be -180..=180)")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid UTC offset: {hours} hours (must be within -24..24)")]
    InvalidUtcOffset { hours: f64 },

    #[error("Failed to access preference '{key}': {source}")]
    Persistence {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Subscriber #{id} failed: {message}")]
    Subscriber { id: u64, message: String },

    #[error("No sunrise/sunset at latitude {latitude:.2} on day {day_of_year} ({condition})")]
    InvalidSolarGeometry {
        latitude: f64,
        day_of_year: u32,
        condition: PolarCondition,
    },
}

impl Error {
    /// Creates a persistence error for `key`.
    pub fn persistence(key: &str, source: std::io::Error) -> Self {
        Error::Persistence {
            key: key.to_string(),
            source,
        }
    }

    /// The polar condition, when this is an invalid solar geometry error.
    pub fn polar_condition(&self) -> Option<PolarCondition> {
        match self {
            Error::InvalidSolarGeometry { condition, .. } => Some(*condition),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_coordinate_message_names_both_values() {
        let err = Error::InvalidCoordinate {
            latitude: 200.0,
            longitude: 13.4,
        };
        let msg = err.to_string();
        assert!(msg.contains("200"));
        assert!(msg.contains("13.4"));
    }

    #[test]
    fn test_polar_condition_accessor() {
        let err = Error::InvalidSolarGeometry {
            latitude: 78.2,
            day_of_year: 172,
            condition: PolarCondition::PolarDay,
        };
        assert_eq!(err.polar_condition(), Some(PolarCondition::PolarDay));
        assert!(err.to_string().contains("polar day"));

        let other = Error::InvalidUtcOffset { hours: 30.0 };
        assert_eq!(other.polar_condition(), None);
    }

    #[test]
    fn test_persistence_error_keeps_source() {
        use std::error::Error as _;
        let err = Error::persistence(
            "stromme-theme",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        );
        assert!(err.to_string().contains("stromme-theme"));
        assert!(err.source().is_some());
    }
}
