//! Implementation of the `set` and `toggle` commands.

use crate::commands::Runtime;
use crate::logger::Log;
use crate::theme::ThemeMode;

/// Persist a new theme mode.
pub fn handle_set_command(runtime: &Runtime, mode: ThemeMode) {
    let previous = runtime.controller.mode();
    runtime.controller.set_mode(mode);
    log_mode_change(runtime, previous);
}

/// Switch to the opposite of the applied theme, leaving Auto if it was on.
pub fn handle_toggle_command(runtime: &Runtime) {
    let previous = runtime.controller.mode();
    runtime.controller.toggle();
    log_mode_change(runtime, previous);
}

fn log_mode_change(runtime: &Runtime, previous: ThemeMode) {
    let controller = &runtime.controller;
    Log::log_block_start(&format!(
        "Theme mode: {} → {}",
        previous,
        controller.mode()
    ));
    Log::log_indented(&format!("Applied theme: {}", controller.effective_theme()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::midsummer_runtime;
    use crate::constants::THEME_STORAGE_KEY;
    use crate::store::PreferenceStore;
    use crate::theme::Theme;

    #[test]
    fn test_set_command_persists_mode() {
        Log::set_enabled(false);
        let (runtime, _clock, store) = midsummer_runtime();
        handle_set_command(&runtime, ThemeMode::Dark);
        assert_eq!(runtime.controller.effective_theme(), Theme::Dark);
        assert_eq!(
            store.get(THEME_STORAGE_KEY).unwrap().as_deref(),
            Some("dark")
        );
    }

    #[test]
    fn test_toggle_command_at_noon_goes_dark() {
        Log::set_enabled(false);
        let (runtime, _clock, store) = midsummer_runtime();
        handle_toggle_command(&runtime);
        assert_eq!(runtime.controller.mode(), ThemeMode::Dark);
        assert_eq!(
            store.get(THEME_STORAGE_KEY).unwrap().as_deref(),
            Some("dark")
        );
    }
}
