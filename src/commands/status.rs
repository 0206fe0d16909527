//! Implementation of the `status` command.

use crate::commands::Runtime;
use crate::geo::location::ThemeChange;
use crate::logger::Log;
use crate::theme::ThemeMode;
use crate::utils::{format_duration, format_hours};

/// Print mode, applied theme, location and today's sun times.
pub fn handle_status_command(runtime: &Runtime) {
    let controller = &runtime.controller;
    let today = controller.local_date();

    Log::log_block_start(&format!(
        "Theme: {} (mode: {})",
        controller.effective_theme(),
        controller.mode()
    ));
    if controller.mode() == ThemeMode::Auto {
        Log::log_indented(&describe_next_change(controller.time_until_theme_change()));
    }

    Log::log_block_start(&format!("Location: {}", controller.location_name()));
    Log::log_indented(&format!("Coordinates: {}", controller.coordinate()));
    Log::log_indented(&format!(
        "Season: {} ({} hemisphere)",
        controller.season(today),
        controller.hemisphere()
    ));

    match controller.formatted_sun_times(today) {
        Ok(times) => {
            Log::log_indented(&format!("Sunrise: {}", times.sunrise));
            Log::log_indented(&format!("Sunset: {}", times.sunset));
        }
        Err(e) => Log::log_indented(&format!("No sunrise or sunset today: {e}")),
    }
    Log::log_indented(&format!(
        "Day length: {}",
        format_hours(controller.day_length(today))
    ));
}

/// One-line description such as "Switches to dark in 9h 25m".
pub fn describe_next_change(change: ThemeChange) -> String {
    format!(
        "Switches to {} in {}",
        change.next,
        format_duration(change.until)
    )
}
