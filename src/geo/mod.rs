//! Geographic location and sunrise/sunset calculations.
//!
//! ## Module Structure
//!
//! - [`solar`]: Approximate solar-position model turning a date, a coordinate and a
//!   UTC offset into sunrise/sunset timestamps
//! - [`timezone`]: Which UTC offset feeds the solar model (system clock, the
//!   coordinate's own timezone, or a pinned offset)
//! - [`location`]: The single stored coordinate and everything derived from it
//!   (day/night signal, hemisphere, season, day length, display name)

pub mod location;
pub mod solar;
pub mod timezone;

pub use location::{FormattedSunTimes, Hemisphere, LocationStore, Season, ThemeChange};
pub use solar::{SolarTimes, compute_solar_times};
pub use timezone::OffsetSource;

use crate::constants::{
    DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_TIMEZONE, MAXIMUM_LATITUDE, MAXIMUM_LONGITUDE,
    MINIMUM_LATITUDE, MINIMUM_LONGITUDE,
};
use crate::error::{Error, Result};

/// A geographic coordinate with its IANA timezone label.
///
/// The fields are plain data; [`LocationStore::update`] re-validates before
/// storing, so an out-of-range literal is rejected at the point of update.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Informational unless the location offset source is selected.
    pub timezone: String,
}

impl GeoCoordinate {
    /// Create a coordinate, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64, timezone: impl Into<String>) -> Result<Self> {
        validate_coordinates(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
            timezone: timezone.into(),
        })
    }

    /// Check this coordinate's ranges.
    pub fn validate(&self) -> Result<()> {
        validate_coordinates(self.latitude, self.longitude)
    }
}

impl Default for GeoCoordinate {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl std::fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lat_dir = if self.latitude >= 0.0 { "N" } else { "S" };
        let lon_dir = if self.longitude >= 0.0 { "E" } else { "W" };
        write!(
            f,
            "{:.4}°{}, {:.4}°{}",
            self.latitude.abs(),
            lat_dir,
            self.longitude.abs(),
            lon_dir
        )
    }
}

/// Check latitude/longitude ranges. NaN fails both range checks.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    let lat_ok = (MINIMUM_LATITUDE..=MAXIMUM_LATITUDE).contains(&latitude);
    let lon_ok = (MINIMUM_LONGITUDE..=MAXIMUM_LONGITUDE).contains(&longitude);
    if lat_ok && lon_ok {
        Ok(())
    } else {
        Err(Error::InvalidCoordinate {
            latitude,
            longitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(GeoCoordinate::new(40.7128, -74.0060, "America/New_York").is_ok());
        assert!(GeoCoordinate::new(90.0, 180.0, "UTC").is_ok());
        assert!(GeoCoordinate::new(-90.0, -180.0, "UTC").is_ok());

        assert!(GeoCoordinate::new(91.0, 0.0, "UTC").is_err());
        assert!(GeoCoordinate::new(-91.0, 0.0, "UTC").is_err());
        assert!(GeoCoordinate::new(200.0, 0.0, "UTC").is_err());
        assert!(GeoCoordinate::new(0.0, 181.0, "UTC").is_err());
        assert!(GeoCoordinate::new(0.0, -360.0, "UTC").is_err());
        assert!(GeoCoordinate::new(f64::NAN, 0.0, "UTC").is_err());
        assert!(GeoCoordinate::new(0.0, f64::INFINITY, "UTC").is_err());

        let literal = GeoCoordinate {
            latitude: 200.0,
            longitude: 0.0,
            timezone: "UTC".into(),
        };
        assert!(matches!(
            literal.validate(),
            Err(Error::InvalidCoordinate { latitude, .. }) if latitude == 200.0
        ));
    }

    #[test]
    fn test_default_is_berlin() {
        let coord = GeoCoordinate::default();
        assert_eq!(coord.latitude, 52.52);
        assert_eq!(coord.longitude, 13.405);
        assert_eq!(coord.timezone, "Europe/Berlin");
        assert!(coord.validate().is_ok());
    }

    #[test]
    fn test_display_uses_compass_directions() {
        let coord = GeoCoordinate::new(-33.8688, 151.2093, "Australia/Sydney").unwrap();
        assert_eq!(coord.to_string(), "33.8688°S, 151.2093°E");
    }
}
