//! Configuration system for stromme with validation and private coordinate overrides.
//!
//! ## Configuration Sources
//!
//! The configuration lives in `$XDG_CONFIG_HOME/stromme/stromme.toml`. When it
//! does not exist a commented default is written there on first load. A
//! different file can be given with `--config`; that file is never created.
//!
//! An optional `geo.toml` next to the main file overrides `latitude` and
//! `longitude`, so the main settings can be shared or version controlled while
//! the dashboard's exact location stays private.
//!
//! ## Configuration Structure
//!
//! ```toml
//! latitude = 52.52                  # Geographic coordinates
//! longitude = 13.405
//! timezone = "Europe/Berlin"        # IANA timezone of the location
//!
//! offset_source = "system"          # "system", "location" or "fixed"
//! utc_offset_hours = 2.0            # Only used with offset_source = "fixed"
//!
//! recheck_interval = 60             # Seconds between Auto mode re-checks
//! recheck_notify = "changes"        # "changes" or "every_tick"
//!
//! state_dir = "/var/lib/stromme"    # Where the theme preference is stored
//! ```
//!
//! ## Validation
//!
//! - **Geographic validation**: latitude (-90° to +90°), longitude (-180° to +180°),
//!   both or neither
//! - **Offset validation**: `fixed` requires `utc_offset_hours` within ±24h
//! - **Interval validation**: re-check interval between one minute and one day
//!
//! Invalid configurations produce error messages naming the key and its valid range.

use anyhow::{Context, Result};
use chrono::Duration;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::geo::timezone::{format_offset, parse_timezone};
use crate::geo::{GeoCoordinate, OffsetSource, validate_coordinates};
use crate::logger::Log;
use crate::store::default_state_dir;
use crate::theme::ControllerOptions;
use crate::utils::path_for_display;

pub use crate::theme::RecheckNotify;

const CONFIG_DIR_NAME: &str = "stromme";
const CONFIG_FILE_NAME: &str = "stromme.toml";
const GEO_FILE_NAME: &str = "geo.toml";

/// Private coordinate overrides read from `geo.toml`.
#[derive(Debug, Deserialize, Clone)]
struct GeoConfig {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Which UTC offset the solar calculation uses.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OffsetSourceKind {
    /// The offset of the machine's local timezone.
    System,
    /// The offset of the configured `timezone`.
    Location,
    /// The pinned `utc_offset_hours`.
    Fixed,
}

impl OffsetSourceKind {
    /// The config file spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetSourceKind::System => "system",
            OffsetSourceKind::Location => "location",
            OffsetSourceKind::Fixed => "fixed",
        }
    }
}

/// Parsed `stromme.toml`.
///
/// Every field is optional in the file. After loading, defaults are filled in
/// and the values are validated, so the accessor methods never fail.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub offset_source: Option<OffsetSourceKind>,
    pub utc_offset_hours: Option<f64>,
    pub recheck_interval: Option<u64>, // seconds
    pub recheck_notify: Option<RecheckNotify>,
    pub state_dir: Option<PathBuf>,

    /// File this configuration was read from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
    /// `geo.toml` that overrode the coordinates, if any.
    #[serde(skip)]
    pub geo_override_path: Option<PathBuf>,
}

impl Config {
    /// Default location of `stromme.toml`.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Path of the `geo.toml` that sits next to `config_path`.
    pub fn geo_path_for(config_path: &Path) -> Option<PathBuf> {
        config_path.parent().map(|parent| parent.join(GEO_FILE_NAME))
    }

    /// Write a commented default configuration to `path`, creating parent directories.
    pub fn create_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }

        let content = ConfigBuilder::new()
            .add_section("Location")
            .add_setting(
                "latitude",
                &DEFAULT_LATITUDE.to_string(),
                "Geographic latitude (-90 to 90)",
            )
            .add_setting(
                "longitude",
                &DEFAULT_LONGITUDE.to_string(),
                "Geographic longitude (-180 to 180)",
            )
            .add_setting(
                "timezone",
                &format!("\"{}\"", DEFAULT_TIMEZONE),
                "IANA timezone of the location",
            )
            .add_section("Solar time")
            .add_setting(
                "offset_source",
                &format!("\"{}\"", DEFAULT_OFFSET_SOURCE.as_str()),
                "UTC offset for sun times: \"system\", \"location\" or \"fixed\" (set utc_offset_hours)",
            )
            .add_section("Auto mode")
            .add_setting(
                "recheck_interval",
                &DEFAULT_RECHECK_INTERVAL.to_string(),
                &format!(
                    "Seconds between theme re-checks ({}-{})",
                    MINIMUM_RECHECK_INTERVAL, MAXIMUM_RECHECK_INTERVAL
                ),
            )
            .add_setting(
                "recheck_notify",
                &format!("\"{}\"", DEFAULT_RECHECK_NOTIFY.as_str()),
                "Notify on re-check: \"changes\" or \"every_tick\"",
            )
            .build();

        fs::write(path, content + "\n")
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        Ok(())
    }

    fn apply_defaults_and_validate_fields(config: &mut Config) -> Result<()> {
        // Coordinates come as a pair
        match (config.latitude, config.longitude) {
            (Some(lat), Some(lon)) => validate_coordinates(lat, lon)?,
            (None, None) => {
                config.latitude = Some(DEFAULT_LATITUDE);
                config.longitude = Some(DEFAULT_LONGITUDE);
            }
            (Some(_), None) => anyhow::bail!("latitude is set but longitude is missing"),
            (None, Some(_)) => anyhow::bail!("longitude is set but latitude is missing"),
        }

        if config.timezone.is_none() {
            config.timezone = Some(DEFAULT_TIMEZONE.to_string());
        }

        let offset_source = *config.offset_source.get_or_insert(DEFAULT_OFFSET_SOURCE);
        match (offset_source, config.utc_offset_hours) {
            (OffsetSourceKind::Fixed, None) => {
                anyhow::bail!("offset_source = \"fixed\" requires utc_offset_hours")
            }
            (OffsetSourceKind::Fixed, Some(hours)) => {
                if !hours.is_finite() || hours.abs() >= MAXIMUM_UTC_OFFSET_HOURS {
                    anyhow::bail!(
                        "utc_offset_hours must be greater than -{} and less than {} (got {})",
                        MAXIMUM_UTC_OFFSET_HOURS,
                        MAXIMUM_UTC_OFFSET_HOURS,
                        hours
                    );
                }
            }
            (other, Some(_)) => Log::log_warning(&format!(
                "utc_offset_hours is ignored unless offset_source = \"fixed\" (currently \"{}\")",
                other.as_str()
            )),
            (_, None) => {}
        }

        if offset_source == OffsetSourceKind::Location
            && let Some(tz) = config.timezone.as_deref()
            && parse_timezone(tz).is_none()
        {
            Log::log_warning(&format!(
                "Unknown timezone '{tz}'; sun times will use the system offset"
            ));
        }

        let interval = *config
            .recheck_interval
            .get_or_insert(DEFAULT_RECHECK_INTERVAL);
        if !(MINIMUM_RECHECK_INTERVAL..=MAXIMUM_RECHECK_INTERVAL).contains(&interval) {
            anyhow::bail!(
                "recheck_interval must be between {} and {} seconds (got {})",
                MINIMUM_RECHECK_INTERVAL,
                MAXIMUM_RECHECK_INTERVAL,
                interval
            );
        }

        if config.recheck_notify.is_none() {
            config.recheck_notify = Some(DEFAULT_RECHECK_NOTIFY);
        }

        Ok(())
    }

    /// Load from an explicit path. Unlike [`Config::load`] this never creates the file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at specified path: {}",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        // geo.toml wins over the main file, and is validated with it
        Self::load_geo_override_from_path(&mut config, path);
        Self::apply_defaults_and_validate_fields(&mut config)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Apply `geo.toml` next to `config_path`. A missing file is fine; a broken
    /// one is reported and ignored.
    fn load_geo_override_from_path(config: &mut Config, config_path: &Path) {
        let Some(geo_path) = Self::geo_path_for(config_path) else {
            return;
        };
        if !geo_path.exists() {
            return;
        }

        match fs::read_to_string(&geo_path) {
            Ok(content) => match toml::from_str::<GeoConfig>(&content) {
                Ok(geo_config) => {
                    if let Some(lat) = geo_config.latitude {
                        config.latitude = Some(lat);
                    }
                    if let Some(lon) = geo_config.longitude {
                        config.longitude = Some(lon);
                    }
                    config.geo_override_path = Some(geo_path);
                }
                Err(e) => {
                    Log::log_warning(&format!(
                        "Failed to parse geo.toml: {}. Using coordinates from main config.",
                        e
                    ));
                }
            },
            Err(e) => {
                Log::log_warning(&format!(
                    "Failed to read geo.toml: {}. Using coordinates from main config.",
                    e
                ));
            }
        }
    }

    /// Load the default configuration file, writing a commented default first if needed.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)
                .context("Failed to create default config during load")?;
            Log::log_block_start(&format!(
                "Created default configuration at {}",
                path_for_display(&config_path)
            ));
        }

        Self::load_from_path(&config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                config_path.display()
            )
        })
    }

    /// The configured coordinate.
    pub fn coordinate(&self) -> Result<GeoCoordinate> {
        let coordinate = GeoCoordinate::new(
            self.latitude.unwrap_or(DEFAULT_LATITUDE),
            self.longitude.unwrap_or(DEFAULT_LONGITUDE),
            self.timezone
                .clone()
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
        )?;
        Ok(coordinate)
    }

    /// The resolved offset source. `fixed` without hours falls back to the system offset.
    pub fn offset_source(&self) -> OffsetSource {
        match self.offset_source.unwrap_or(DEFAULT_OFFSET_SOURCE) {
            OffsetSourceKind::System => OffsetSource::System,
            OffsetSourceKind::Location => OffsetSource::Location,
            OffsetSourceKind::Fixed => match self.utc_offset_hours {
                Some(hours) => OffsetSource::Fixed(hours),
                None => OffsetSource::System,
            },
        }
    }

    /// Re-check interval and notification policy for the theme controller.
    pub fn controller_options(&self) -> ControllerOptions {
        let interval = self.recheck_interval.unwrap_or(DEFAULT_RECHECK_INTERVAL);
        ControllerOptions {
            recheck_interval: Duration::seconds(interval as i64),
            recheck_notify: self.recheck_notify.unwrap_or(DEFAULT_RECHECK_NOTIFY),
        }
    }

    /// Directory holding the persisted theme preference.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(default_state_dir)
    }

    /// Print the effective configuration.
    pub fn log_config(&self) {
        match &self.source_path {
            Some(path) => Log::log_block_start(&format!(
                "Loaded configuration from {}",
                path_for_display(path)
            )),
            None => Log::log_block_start("Using built-in configuration"),
        }

        if let Some(geo_path) = &self.geo_override_path {
            Log::log_indented(&format!(
                "Loaded geo coordinates from {}",
                path_for_display(geo_path)
            ));
        }

        match self.coordinate() {
            Ok(coordinate) => {
                Log::log_indented(&format!("Location: {coordinate}"));
                Log::log_indented(&format!("Timezone: {}", coordinate.timezone));
            }
            Err(e) => Log::log_indented(&format!("Location: invalid ({e})")),
        }

        let offset = match self.offset_source() {
            OffsetSource::Fixed(hours) => format!("fixed at {}", format_offset(hours)),
            other => other.label(),
        };
        Log::log_indented(&format!("UTC offset source: {offset}"));

        let options = self.controller_options();
        Log::log_indented(&format!(
            "Re-check interval: {} seconds",
            options.recheck_interval.num_seconds()
        ));
        Log::log_indented(&format!(
            "Re-check notifications: {}",
            options.recheck_notify.as_str()
        ));
        Log::log_indented(&format!(
            "State directory: {}",
            path_for_display(&self.state_dir())
        ));
    }
}

/// Builds the commented default config with aligned comments.
///
/// Settings are padded to the widest `key = value` line so the trailing
/// comments form one column regardless of the default values.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{}]", title)));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{} = {}", key, value),
            comment: format!("# {}", comment),
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{}{}{}", line, padding, comment));
                }
            }
        }

        result.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    #[serial]
    fn test_config_load_default_creation() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("stromme").join("stromme.toml");

        // Save and restore XDG_CONFIG_HOME
        let original = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        Log::set_enabled(false);
        let result = Config::load();

        unsafe {
            match original {
                Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
                None => std::env::remove_var("XDG_CONFIG_HOME"),
            }
        }

        let config = result.unwrap();
        assert!(config_path.exists());
        assert_eq!(config.latitude, Some(DEFAULT_LATITUDE));
        assert_eq!(config.offset_source, Some(OffsetSourceKind::System));
        assert_eq!(config.source_path.as_deref(), Some(config_path.as_path()));
    }

    #[test]
    fn test_default_config_file_round_trips() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("stromme.toml");

        Config::create_default_config(&config_path).unwrap();
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("#[Location]"));
        assert!(content.contains("latitude = 52.52"));
        assert!(content.contains("timezone = \"Europe/Berlin\""));
        assert!(content.contains("recheck_notify = \"changes\""));

        let config = Config::load_from_path(&config_path).unwrap();
        assert_eq!(config.coordinate().unwrap(), GeoCoordinate::default());
        assert_eq!(config.controller_options(), ControllerOptions::default());
    }

    #[test]
    fn test_config_builder_aligns_comments() {
        let content = ConfigBuilder::new()
            .add_section("A")
            .add_setting("x", "1", "short")
            .add_setting("longer_key", "\"value\"", "long")
            .add_section("B")
            .build();

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "#[A]");
        let first = lines[1].find('#').unwrap();
        let second = lines[2].find('#').unwrap();
        assert_eq!(first, second);
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "#[B]");
    }

    #[test]
    fn test_config_toml_parsing() {
        let temp_dir = tempdir().unwrap();
        let path = write_config(
            temp_dir.path(),
            r#"
latitude = -33.8688
longitude = 151.2093
timezone = "Australia/Sydney"
offset_source = "location"
recheck_interval = 300
recheck_notify = "every_tick"
state_dir = "/var/lib/stromme"
"#,
        );

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.timezone.as_deref(), Some("Australia/Sydney"));
        assert_eq!(config.offset_source(), OffsetSource::Location);
        assert_eq!(
            config.controller_options().recheck_interval,
            Duration::seconds(300)
        );
        assert_eq!(
            config.controller_options().recheck_notify,
            RecheckNotify::EveryTick
        );
        assert_eq!(config.state_dir(), PathBuf::from("/var/lib/stromme"));
    }

    #[test]
    fn test_config_malformed_toml() {
        let malformed_content = r#"
latitude = "north"  # This should cause parsing to fail
"#;
        let result: std::result::Result<Config, _> = toml::from_str(malformed_content);
        assert!(result.is_err());

        let result: std::result::Result<Config, _> = toml::from_str("offset_source = \"sundial\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_coordinates() {
        let temp_dir = tempdir().unwrap();

        let path = write_config(temp_dir.path(), "latitude = 200.0\nlongitude = 13.4\n");
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid coordinate"));

        let path = write_config(temp_dir.path(), "latitude = 52.0\n");
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("longitude is missing"));
    }

    #[test]
    fn test_config_validation_fixed_offset() {
        let temp_dir = tempdir().unwrap();

        let path = write_config(temp_dir.path(), "offset_source = \"fixed\"\n");
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("requires utc_offset_hours"));

        let path = write_config(
            temp_dir.path(),
            "offset_source = \"fixed\"\nutc_offset_hours = 26.0\n",
        );
        assert!(Config::load_from_path(&path).is_err());

        let path = write_config(
            temp_dir.path(),
            "offset_source = \"fixed\"\nutc_offset_hours = 5.5\n",
        );
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.offset_source(), OffsetSource::Fixed(5.5));
    }

    #[test]
    fn test_config_validation_recheck_interval() {
        let temp_dir = tempdir().unwrap();

        for bad in [0, 59, 86_401] {
            let path = write_config(temp_dir.path(), &format!("recheck_interval = {bad}\n"));
            let err = Config::load_from_path(&path).unwrap_err();
            assert!(format!("{err:#}").contains("recheck_interval"), "{bad}");
        }

        for good in [60, 3600, 86_400] {
            let path = write_config(temp_dir.path(), &format!("recheck_interval = {good}\n"));
            assert!(Config::load_from_path(&path).is_ok(), "{good}");
        }
    }

    #[test]
    fn test_load_from_missing_path_does_not_create() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("missing.toml");
        assert!(Config::load_from_path(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_geo_toml_overrides_main_config() {
        let temp_dir = tempdir().unwrap();
        let path = write_config(temp_dir.path(), "latitude = 40.7128\nlongitude = -74.0060\n");
        fs::write(
            temp_dir.path().join("geo.toml"),
            "# Private location\nlatitude = 51.5074\nlongitude = -0.1278\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.latitude, Some(51.5074));
        assert_eq!(config.longitude, Some(-0.1278));
        assert!(config.geo_override_path.is_some());
    }

    #[test]
    fn test_geo_toml_supplies_missing_coordinates() {
        let temp_dir = tempdir().unwrap();
        let path = write_config(temp_dir.path(), "recheck_interval = 120\n");
        fs::write(
            temp_dir.path().join("geo.toml"),
            "latitude = 48.1351\nlongitude = 11.582\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.coordinate().unwrap().latitude, 48.1351);
    }

    #[test]
    fn test_malformed_geo_toml_fallback() {
        Log::set_enabled(false);
        let temp_dir = tempdir().unwrap();
        let path = write_config(temp_dir.path(), "latitude = 40.7128\nlongitude = -74.0060\n");
        fs::write(temp_dir.path().join("geo.toml"), "latitude = [broken").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.latitude, Some(40.7128));
        assert!(config.geo_override_path.is_none());
    }
}
