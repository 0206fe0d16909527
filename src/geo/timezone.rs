//! UTC offset resolution for the solar model.
//!
//! The solar model needs one UTC offset per calculation. Where it comes from is
//! configurable because the stored coordinate and the machine running the
//! dashboard are not always in the same timezone.

use chrono::{DateTime, Local, NaiveDate, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::geo::GeoCoordinate;
use crate::logger::Log;

/// Where the UTC offset for solar calculations comes from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OffsetSource {
    /// The offset of the environment's local timezone at the queried instant.
    #[default]
    System,
    /// The offset of the coordinate's own IANA timezone. Falls back to
    /// [`OffsetSource::System`] if the label is not a known timezone.
    Location,
    /// A pinned offset in hours, possibly fractional.
    Fixed(f64),
}

impl OffsetSource {
    /// Offset in hours that applies at `at` for `coordinate`.
    pub fn offset_hours(&self, coordinate: &GeoCoordinate, at: DateTime<Utc>) -> f64 {
        match self {
            OffsetSource::System => system_offset_hours(at),
            OffsetSource::Location => match parse_timezone(&coordinate.timezone) {
                Some(tz) => seconds_to_hours(
                    tz.offset_from_utc_datetime(&at.naive_utc())
                        .fix()
                        .local_minus_utc(),
                ),
                None => {
                    Log::log_warning(&format!(
                        "Unknown timezone '{}', using the system offset instead",
                        coordinate.timezone
                    ));
                    system_offset_hours(at)
                }
            },
            OffsetSource::Fixed(hours) => *hours,
        }
    }

    /// Offset in hours for a calendar date, sampled at noon UTC of that date.
    pub fn offset_hours_on(&self, coordinate: &GeoCoordinate, date: NaiveDate) -> f64 {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc();
        self.offset_hours(coordinate, noon)
    }

    /// Short name used in config files and status output.
    pub fn label(&self) -> String {
        match self {
            OffsetSource::System => "system".to_string(),
            OffsetSource::Location => "location".to_string(),
            OffsetSource::Fixed(hours) => format!("fixed ({})", format_offset(*hours)),
        }
    }
}

/// Parse an IANA timezone label such as `Europe/Berlin`.
pub fn parse_timezone(label: &str) -> Option<Tz> {
    label.parse::<Tz>().ok()
}

/// Format an offset in hours as `UTC+02:00` / `UTC+05:30` / `UTC-03:00`.
pub fn format_offset(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round() as i64;
    let sign = if total_minutes < 0 { '-' } else { '+' };
    let abs = total_minutes.abs();
    format!("UTC{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

fn system_offset_hours(at: DateTime<Utc>) -> f64 {
    seconds_to_hours(
        Local
            .offset_from_utc_datetime(&at.naive_utc())
            .local_minus_utc(),
    )
}

fn seconds_to_hours(seconds: i32) -> f64 {
    seconds as f64 / 3600.0
}
