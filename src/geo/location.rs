//! The stored dashboard location and everything derived from it.
//!
//! [`LocationStore`] owns exactly one [`GeoCoordinate`] and the [`OffsetSource`]
//! used to turn instants into local calendar days. The day/night signal that
//! drives Auto mode comes from here, as do the informational queries shown on the
//! dashboard (sun times, day length, season, location name).

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use std::fmt;

use crate::constants::{
    DEFAULT_LATITUDE, DEFAULT_LOCATION_NAME, DEFAULT_LONGITUDE, LOCATION_NAME_TOLERANCE_DEG,
};
use crate::error::{Error, PolarCondition, Result};
use crate::geo::solar::{SolarTimes, compute_solar_times, fixed_offset};
use crate::geo::{GeoCoordinate, OffsetSource};
use crate::logger::Log;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    Northern,
    Southern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hemisphere::Northern => write!(f, "northern"),
            Hemisphere::Southern => write!(f, "southern"),
        }
    }
}

/// Sun times ready for display ("HH:MM", 24-hour) alongside the raw timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedSunTimes {
    pub sunrise: String,
    pub sunset: String,
    pub sunrise_time: DateTime<FixedOffset>,
    pub sunset_time: DateTime<FixedOffset>,
}

/// When the day/night signal flips next, and to what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeChange {
    pub until: Duration,
    pub next: Theme,
}

impl ThemeChange {
    /// Whole minutes until the change, rounded down.
    pub fn minutes(&self) -> i64 {
        self.until.num_minutes()
    }
}

/// Holds the current coordinate and answers solar questions about it.
#[derive(Debug, Clone, Default)]
pub struct LocationStore {
    coordinate: GeoCoordinate,
    offset_source: OffsetSource,
}

impl LocationStore {
    /// Create a store for `coordinate`.
    ///
    /// Fails if the coordinate is out of range or a fixed offset is not within ±24h.
    pub fn new(coordinate: GeoCoordinate, offset_source: OffsetSource) -> Result<Self> {
        coordinate.validate()?;
        validate_offset_source(offset_source)?;
        Ok(Self {
            coordinate,
            offset_source,
        })
    }

    /// The stored coordinate.
    pub fn coordinate(&self) -> &GeoCoordinate {
        &self.coordinate
    }

    /// Where the UTC offset for solar calculations comes from.
    pub fn offset_source(&self) -> OffsetSource {
        self.offset_source
    }

    /// Switch the offset source; an out-of-range fixed offset is rejected and the old one kept.
    pub fn set_offset_source(&mut self, offset_source: OffsetSource) -> Result<()> {
        validate_offset_source(offset_source)?;
        self.offset_source = offset_source;
        Ok(())
    }

    /// Replace the coordinate wholesale.
    ///
    /// An out-of-range coordinate is rejected with [`Error::InvalidCoordinate`]
    /// and the previous coordinate stays in place.
    pub fn update(&mut self, coordinate: GeoCoordinate) -> Result<()> {
        coordinate.validate()?;
        Log::log_debug(&format!("Location updated to {coordinate}"));
        self.coordinate = coordinate;
        Ok(())
    }

    /// Update latitude and longitude, keeping the current timezone label unless a new one is given.
    pub fn update_position(
        &mut self,
        latitude: f64,
        longitude: f64,
        timezone: Option<String>,
    ) -> Result<()> {
        let timezone = timezone.unwrap_or_else(|| self.coordinate.timezone.clone());
        self.update(GeoCoordinate {
            latitude,
            longitude,
            timezone,
        })
    }

    /// `at` expressed in the offset the solar model uses for this location.
    pub fn local_time(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        let hours = self.offset_source.offset_hours(&self.coordinate, at);
        at.with_timezone(&self.offset_for(hours))
    }

    /// Sunrise and sunset on `date` at the stored coordinate.
    pub fn solar_times(&self, date: NaiveDate) -> Result<SolarTimes> {
        let hours = self
            .offset_source
            .offset_hours_on(&self.coordinate, date);
        compute_solar_times(date, &self.coordinate, hours)
    }

    /// Day/night signal for the instant `at`.
    ///
    /// Light iff `sunrise <= at < sunset` on `at`'s local calendar day. Polar day
    /// maps to Light and polar night to Dark.
    pub fn current_theme_signal(&self, at: DateTime<Utc>) -> Theme {
        match self.solar_times_around(at) {
            Ok(times) => {
                if times.is_daylight(&at) {
                    Theme::Light
                } else {
                    Theme::Dark
                }
            }
            Err(err) => theme_for_unavailable_sun_times(&err),
        }
    }

    /// `true` when the sun is up at `at` (polar day included).
    pub fn is_daytime(&self, at: DateTime<Utc>) -> bool {
        self.current_theme_signal(at) == Theme::Light
    }

    /// Time until the signal flips, and the theme it flips to.
    ///
    /// Before sunrise the next change is sunrise, during the day it is sunset,
    /// and after sunset it is tomorrow's sunrise. Without a sunrise or sunset
    /// (polar conditions) the next check point is local midnight.
    pub fn time_until_theme_change(&self, at: DateTime<Utc>) -> ThemeChange {
        let local = self.local_time(at);
        let today = local.date_naive();

        let next_change = self.solar_times_around(at).ok().and_then(|times| {
            if at < times.sunrise {
                Some((times.sunrise, Theme::Light))
            } else if at < times.sunset {
                Some((times.sunset, Theme::Dark))
            } else {
                today
                    .succ_opt()
                    .and_then(|tomorrow| self.solar_times(tomorrow).ok())
                    .map(|tomorrow| (tomorrow.sunrise, Theme::Light))
            }
        });

        match next_change {
            Some((when, next)) => ThemeChange {
                until: when.with_timezone(&Utc) - at,
                next,
            },
            None => {
                let midnight = today
                    .succ_opt()
                    .map(|tomorrow| tomorrow.and_time(NaiveTime::MIN))
                    .and_then(|naive| local.offset().from_local_datetime(&naive).single())
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or(at + Duration::days(1));
                ThemeChange {
                    until: midnight - at,
                    next: self.current_theme_signal(midnight),
                }
            }
        }
    }

    /// Sunrise and sunset on `date` formatted as 24-hour "HH:MM".
    pub fn formatted_sun_times(&self, date: NaiveDate) -> Result<FormattedSunTimes> {
        let times = self.solar_times(date)?;
        Ok(FormattedSunTimes {
            sunrise: times.sunrise.format("%H:%M").to_string(),
            sunset: times.sunset.format("%H:%M").to_string(),
            sunrise_time: times.sunrise,
            sunset_time: times.sunset,
        })
    }

    /// Hours of daylight on `date`; 24.0 under polar day and 0.0 under polar night.
    pub fn day_length(&self, date: NaiveDate) -> f64 {
        match self.solar_times(date) {
            Ok(times) => times.day_length().num_seconds() as f64 / 3600.0,
            Err(err) => match err.polar_condition() {
                Some(PolarCondition::PolarDay) => 24.0,
                _ => 0.0,
            },
        }
    }

    /// Northern iff latitude is strictly positive; the equator counts as southern.
    pub fn hemisphere(&self) -> Hemisphere {
        if self.coordinate.latitude > 0.0 {
            Hemisphere::Northern
        } else {
            Hemisphere::Southern
        }
    }

    /// Meteorological season for `date`, reversed south of the equator.
    pub fn season(&self, date: NaiveDate) -> Season {
        let northern = match date.month() {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        };
        match self.hemisphere() {
            Hemisphere::Northern => northern,
            Hemisphere::Southern => match northern {
                Season::Spring => Season::Autumn,
                Season::Summer => Season::Winter,
                Season::Autumn => Season::Spring,
                Season::Winter => Season::Summer,
            },
        }
    }

    /// Human-readable name for the stored coordinate.
    pub fn location_name(&self) -> String {
        let near_default = (self.coordinate.latitude - DEFAULT_LATITUDE).abs()
            < LOCATION_NAME_TOLERANCE_DEG
            && (self.coordinate.longitude - DEFAULT_LONGITUDE).abs() < LOCATION_NAME_TOLERANCE_DEG;
        if near_default {
            DEFAULT_LOCATION_NAME.to_string()
        } else {
            format!(
                "{:.2}, {:.2}",
                self.coordinate.latitude, self.coordinate.longitude
            )
        }
    }

    /// Solar times for the local calendar day containing `at`.
    fn solar_times_around(&self, at: DateTime<Utc>) -> Result<SolarTimes> {
        let hours = self.offset_source.offset_hours(&self.coordinate, at);
        let local = at.with_timezone(&self.offset_for(hours));
        compute_solar_times(local.date_naive(), &self.coordinate, hours)
    }

    fn offset_for(&self, hours: f64) -> FixedOffset {
        // Resolved offsets are within ±24h: fixed ones are checked on construction
        // and system/location ones come from real timezones.
        fixed_offset(hours).unwrap_or_else(|_| Utc.fix())
    }
}

fn validate_offset_source(offset_source: OffsetSource) -> Result<()> {
    if let OffsetSource::Fixed(hours) = offset_source {
        fixed_offset(hours)?;
    }
    Ok(())
}

fn theme_for_unavailable_sun_times(err: &Error) -> Theme {
    match err.polar_condition() {
        Some(PolarCondition::PolarDay) => Theme::Light,
        Some(PolarCondition::PolarNight) => Theme::Dark,
        None => {
            Log::log_error(&format!("Cannot compute sun times: {err}"));
            Theme::Dark
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berlin_store() -> LocationStore {
        LocationStore::new(GeoCoordinate::default(), OffsetSource::Fixed(2.0)).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_signal_follows_sun_in_berlin() {
        let store = berlin_store();
        // 04:00 CEST, before sunrise at 04:50
        assert_eq!(store.current_theme_signal(utc(2024, 6, 21, 2, 0)), Theme::Dark);
        // 12:00 CEST
        assert_eq!(store.current_theme_signal(utc(2024, 6, 21, 10, 0)), Theme::Light);
        // 22:00 CEST, after sunset at 21:25
        assert_eq!(store.current_theme_signal(utc(2024, 6, 21, 20, 0)), Theme::Dark);
    }

    #[test]
    fn test_signal_boundaries_are_half_open() {
        let store = berlin_store();
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let times = store.solar_times(date).unwrap();
        let sunrise = times.sunrise.with_timezone(&Utc);
        let sunset = times.sunset.with_timezone(&Utc);
        assert_eq!(store.current_theme_signal(sunrise), Theme::Light);
        assert_eq!(store.current_theme_signal(sunset), Theme::Dark);
    }

    #[test]
    fn test_polar_conditions_map_to_themes() {
        let svalbard = GeoCoordinate::new(78.2232, 15.6267, "Arctic/Longyearbyen").unwrap();
        let store = LocationStore::new(svalbard, OffsetSource::Fixed(1.0)).unwrap();
        assert_eq!(store.current_theme_signal(utc(2024, 6, 21, 23, 0)), Theme::Light);
        assert_eq!(store.current_theme_signal(utc(2024, 12, 21, 12, 0)), Theme::Dark);

        let june = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let december = NaiveDate::from_ymd_opt(2024, 12, 21).unwrap();
        assert_eq!(store.day_length(june), 24.0);
        assert_eq!(store.day_length(december), 0.0);
        assert!(store.formatted_sun_times(june).is_err());
    }

    #[test]
    fn test_update_rejects_invalid_and_keeps_previous() {
        let mut store = berlin_store();
        let result = store.update_position(200.0, 13.405, None);
        assert!(matches!(result, Err(Error::InvalidCoordinate { .. })));
        assert_eq!(store.coordinate(), &GeoCoordinate::default());
    }

    #[test]
    fn test_update_position_keeps_timezone_label() {
        let mut store = berlin_store();
        store.update_position(48.1351, 11.5820, None).unwrap();
        assert_eq!(store.coordinate().timezone, "Europe/Berlin");

        store
            .update_position(40.7128, -74.0060, Some("America/New_York".into()))
            .unwrap();
        assert_eq!(store.coordinate().timezone, "America/New_York");
        assert_eq!(store.coordinate().latitude, 40.7128);
    }

    #[test]
    fn test_fixed_offset_out_of_range_rejected() {
        assert!(LocationStore::new(GeoCoordinate::default(), OffsetSource::Fixed(25.0)).is_err());
        let mut store = berlin_store();
        assert!(store.set_offset_source(OffsetSource::Fixed(-24.0)).is_err());
        assert_eq!(store.offset_source(), OffsetSource::Fixed(2.0));
    }

    #[test]
    fn test_time_until_theme_change() {
        let store = berlin_store();

        // 03:50 CEST: about an hour until sunrise
        let change = store.time_until_theme_change(utc(2024, 6, 21, 1, 50));
        assert_eq!(change.next, Theme::Light);
        assert_eq!(change.minutes(), 60);

        // Noon: next change is sunset
        let change = store.time_until_theme_change(utc(2024, 6, 21, 10, 0));
        assert_eq!(change.next, Theme::Dark);
        assert_eq!(change.minutes(), 9 * 60 + 25);

        // 23:00 CEST: next change is tomorrow's sunrise
        let change = store.time_until_theme_change(utc(2024, 6, 21, 21, 0));
        assert_eq!(change.next, Theme::Light);
        assert!(change.minutes() > 5 * 60 && change.minutes() < 6 * 60);
    }

    #[test]
    fn test_time_until_change_under_polar_day_is_midnight() {
        let svalbard = GeoCoordinate::new(78.2232, 15.6267, "Arctic/Longyearbyen").unwrap();
        let store = LocationStore::new(svalbard, OffsetSource::Fixed(2.0)).unwrap();
        // 20:00 local
        let change = store.time_until_theme_change(utc(2024, 6, 21, 18, 0));
        assert_eq!(change.minutes(), 4 * 60);
        assert_eq!(change.next, Theme::Light);
    }

    #[test]
    fn test_formatted_sun_times() {
        let store = berlin_store();
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let formatted = store.formatted_sun_times(date).unwrap();
        assert_eq!(formatted.sunrise, "04:50");
        assert_eq!(formatted.sunset, "21:25");
        assert_eq!(formatted.sunrise_time.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_day_length_in_hours() {
        let store = berlin_store();
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let hours = store.day_length(date);
        // 04:50:15 to 21:25:50
        assert!((hours - 16.593).abs() < 0.01, "{hours}");
    }

    #[test]
    fn test_hemisphere_and_season() {
        let mut store = berlin_store();
        let july = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let january = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let april = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let october = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();

        assert_eq!(store.hemisphere(), Hemisphere::Northern);
        assert_eq!(store.season(july), Season::Summer);
        assert_eq!(store.season(january), Season::Winter);
        assert_eq!(store.season(april), Season::Spring);
        assert_eq!(store.season(october), Season::Autumn);

        store
            .update_position(-33.8688, 151.2093, Some("Australia/Sydney".into()))
            .unwrap();
        assert_eq!(store.hemisphere(), Hemisphere::Southern);
        assert_eq!(store.season(july), Season::Winter);
        assert_eq!(store.season(january), Season::Summer);
        assert_eq!(store.season(april), Season::Autumn);
        assert_eq!(store.season(october), Season::Spring);

        store.update_position(0.0, 0.0, None).unwrap();
        assert_eq!(store.hemisphere(), Hemisphere::Southern);
    }

    #[test]
    fn test_location_name() {
        let mut store = berlin_store();
        assert_eq!(store.location_name(), "Berlin, Germany");

        store.update_position(52.55, 13.45, None).unwrap();
        assert_eq!(store.location_name(), "Berlin, Germany");

        store.update_position(48.1351, 11.582, None).unwrap();
        assert_eq!(store.location_name(), "48.14, 11.58");
    }
}
