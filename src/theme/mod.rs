//! Theme state machine.
//!
//! The user picks a [`ThemeMode`]; the dashboard renders a [`Theme`]. Light and
//! Dark modes map straight through, while Auto follows the sun at the stored
//! location and is re-evaluated on a timer by the [`ThemeController`].

pub mod controller;
pub mod subscribers;

pub use controller::{ControllerOptions, RecheckNotify, ThemeController};
pub use subscribers::Subscription;

use std::fmt;
use std::str::FromStr;

/// The theme actually applied to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn opposite(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Lowercase name, as stored and shown.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    Auto,
}

impl ThemeMode {
    /// The persisted representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::Auto => "auto",
        }
    }

    /// The fixed theme for Light/Dark, `None` for Auto.
    pub fn fixed_theme(self) -> Option<Theme> {
        match self {
            ThemeMode::Light => Some(Theme::Light),
            ThemeMode::Dark => Some(Theme::Dark),
            ThemeMode::Auto => None,
        }
    }
}

impl From<Theme> for ThemeMode {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Light => ThemeMode::Light,
            Theme::Dark => ThemeMode::Dark,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored or typed mode string is not one of `light`, `dark`, `auto`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme mode '{0}' (expected light, dark or auto)")]
pub struct ParseThemeModeError(pub String);

impl FromStr for ThemeMode {
    type Err = ParseThemeModeError;

    /// Exact, case-sensitive match on the persisted values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "auto" => Ok(ThemeMode::Auto),
            other => Err(ParseThemeModeError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing_is_exact() {
        assert_eq!("light".parse::<ThemeMode>(), Ok(ThemeMode::Light));
        assert_eq!("dark".parse::<ThemeMode>(), Ok(ThemeMode::Dark));
        assert_eq!("auto".parse::<ThemeMode>(), Ok(ThemeMode::Auto));
        assert!("Dark".parse::<ThemeMode>().is_err());
        assert!("".parse::<ThemeMode>().is_err());
        assert!("system".parse::<ThemeMode>().is_err());
    }

    #[test]
    fn test_mode_string_round_trip() {
        for mode in [ThemeMode::Light, ThemeMode::Dark, ThemeMode::Auto] {
            assert_eq!(mode.as_str().parse::<ThemeMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_theme_opposite_and_conversion() {
        assert_eq!(Theme::Light.opposite(), Theme::Dark);
        assert_eq!(Theme::Dark.opposite(), Theme::Light);
        assert_eq!(ThemeMode::from(Theme::Dark), ThemeMode::Dark);
        assert_eq!(ThemeMode::Auto.fixed_theme(), None);
        assert_eq!(ThemeMode::default(), ThemeMode::Auto);
    }
}
