//! Approximate solar-position model for sunrise and sunset.
//!
//! The model is deliberately simple: a sinusoidal declination, the sunrise
//! equation for the hour angle, and a three-term equation of time. It ignores
//! refraction and the solar disc, so results differ from a real ephemeris by
//! several minutes. That is fine for deciding when a dashboard goes dark.
//!
//! All angles in the public helpers are in degrees; times are minutes after
//! local midnight until the final conversion to timestamps.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use std::f64::consts::PI;

use crate::constants::{
    AXIAL_TILT_DEG, MAXIMUM_UTC_OFFSET_HOURS, MINUTES_PER_DEGREE, SOLAR_NOON_MINUTES,
};
use crate::error::{Error, PolarCondition, Result};
use crate::geo::GeoCoordinate;

/// Sunrise and sunset for one (date, coordinate, offset) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarTimes {
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
}

impl SolarTimes {
    /// Time between sunrise and sunset.
    pub fn day_length(&self) -> Duration {
        self.sunset - self.sunrise
    }

    /// Half-open daylight interval: the sunrise instant is day, the sunset instant is night.
    pub fn is_daylight<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> bool {
        *at >= self.sunrise && *at < self.sunset
    }
}

/// Day of the year, 1 on January 1st through 365/366.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// Solar declination in degrees for day `n`.
pub fn solar_declination(day_of_year: u32) -> f64 {
    let angle = 360.0 * (284.0 + day_of_year as f64) / 365.0;
    AXIAL_TILT_DEG * angle.to_radians().sin()
}

/// Sunrise hour angle in degrees.
///
/// Returns the polar condition instead when `acos` would be undefined: an
/// argument below -1 means the sun never sets, above 1 that it never rises.
pub fn hour_angle(latitude: f64, declination: f64) -> std::result::Result<f64, PolarCondition> {
    let cos_h = -latitude.to_radians().tan() * declination.to_radians().tan();
    if cos_h < -1.0 {
        Err(PolarCondition::PolarDay)
    } else if cos_h > 1.0 {
        Err(PolarCondition::PolarNight)
    } else {
        Ok(cos_h.acos().to_degrees())
    }
}

/// Equation of time in minutes for day `n`.
pub fn equation_of_time(day_of_year: u32) -> f64 {
    let b = 2.0 * PI * (day_of_year as f64 - 81.0) / 365.0;
    9.87 * (2.0 * b).sin() - 7.53 * b.cos() - 1.5 * b.sin()
}

/// Minutes between local clock noon and solar noon.
pub fn time_correction(longitude: f64, utc_offset_hours: f64, equation_of_time: f64) -> f64 {
    MINUTES_PER_DEGREE * (longitude - 15.0 * utc_offset_hours) + equation_of_time
}

/// Convert an offset in hours (possibly fractional, e.g. 5.5) into a `FixedOffset`.
pub fn fixed_offset(utc_offset_hours: f64) -> Result<FixedOffset> {
    if !utc_offset_hours.is_finite() || utc_offset_hours.abs() >= MAXIMUM_UTC_OFFSET_HOURS {
        return Err(Error::InvalidUtcOffset {
            hours: utc_offset_hours,
        });
    }
    FixedOffset::east_opt((utc_offset_hours * 3600.0).round() as i32).ok_or(
        Error::InvalidUtcOffset {
            hours: utc_offset_hours,
        },
    )
}

/// Compute sunrise and sunset for `date` at `coordinate`.
///
/// Both timestamps are anchored at local midnight of `date` in the given UTC
/// offset and rounded to whole seconds. Polar day/night is reported as
/// [`Error::InvalidSolarGeometry`] rather than a made-up time.
///
/// # Arguments
/// * `date` - Local calendar day to compute for
/// * `coordinate` - Where on earth
/// * `utc_offset_hours` - Offset of the local clock, strictly within ±24h
pub fn compute_solar_times(
    date: NaiveDate,
    coordinate: &GeoCoordinate,
    utc_offset_hours: f64,
) -> Result<SolarTimes> {
    let offset = fixed_offset(utc_offset_hours)?;
    let n = day_of_year(date);
    let declination = solar_declination(n);

    let hour_angle = hour_angle(coordinate.latitude, declination).map_err(|condition| {
        Error::InvalidSolarGeometry {
            latitude: coordinate.latitude,
            day_of_year: n,
            condition,
        }
    })?;

    let correction = time_correction(
        coordinate.longitude,
        utc_offset_hours,
        equation_of_time(n),
    );
    let sunrise_minutes = SOLAR_NOON_MINUTES - MINUTES_PER_DEGREE * hour_angle - correction;
    let sunset_minutes = SOLAR_NOON_MINUTES + MINUTES_PER_DEGREE * hour_angle - correction;

    let midnight = offset
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .single()
        .ok_or(Error::InvalidUtcOffset {
            hours: utc_offset_hours,
        })?;

    Ok(SolarTimes {
        sunrise: midnight + minutes_to_duration(sunrise_minutes),
        sunset: midnight + minutes_to_duration(sunset_minutes),
    })
}

fn minutes_to_duration(minutes: f64) -> Duration {
    Duration::seconds((minutes * 60.0).round() as i64)
}
