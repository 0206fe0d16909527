//! Implementation of the `sun` command.

use chrono::NaiveDate;

use crate::commands::Runtime;
use crate::error::PolarCondition;
use crate::logger::Log;
use crate::utils::format_hours;

/// Print sunrise, sunset and day length for `date` (today when `None`).
pub fn handle_sun_command(runtime: &Runtime, date: Option<NaiveDate>) {
    let controller = &runtime.controller;
    let date = date.unwrap_or_else(|| controller.local_date());

    Log::log_block_start(&format!(
        "Sun times for {} on {}",
        controller.location_name(),
        date.format("%Y-%m-%d")
    ));

    match controller.formatted_sun_times(date) {
        Ok(times) => {
            Log::log_indented(&format!(
                "Sunrise: {} ({})",
                times.sunrise,
                times.sunrise_time.to_rfc3339()
            ));
            Log::log_indented(&format!(
                "Sunset: {} ({})",
                times.sunset,
                times.sunset_time.to_rfc3339()
            ));
        }
        Err(e) => match e.polar_condition() {
            Some(PolarCondition::PolarDay) => Log::log_indented("The sun does not set (polar day)"),
            Some(PolarCondition::PolarNight) => {
                Log::log_indented("The sun does not rise (polar night)")
            }
            None => Log::log_warning(&format!("Cannot compute sun times: {e}")),
        },
    }

    Log::log_indented(&format!(
        "Day length: {}",
        format_hours(controller.day_length(date))
    ));
    Log::log_indented(&format!(
        "Season: {} ({} hemisphere)",
        controller.season(date),
        controller.hemisphere()
    ));
}
