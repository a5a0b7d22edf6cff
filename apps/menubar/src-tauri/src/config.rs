//! User settings, persisted as `settings.json` in the platform config dir.
//!
//! Keys are camelCase so the popup frontend can send `{ nightscoutUrl }`
//! straight through the `save_settings` command.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_NIGHTSCOUT_URL: &str = "https://maigaard.herokuapp.com";
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 10_000;

/// `tokio::time::interval` panics on a zero period.
const MIN_REFRESH_INTERVAL_MS: u64 = 1_000;

/// How readings are shown in the tray
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationMode {
    /// Pick from the running platform
    #[default]
    Auto,
    /// Rendered glyph icons, one tray slot per part
    Icons,
    /// Tray title and tooltip text
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Base URL of the Nightscout site, without trailing slash.
    pub nightscout_url: String,

    /// Delay between refresh cycles. Read once at startup.
    pub refresh_interval_ms: u64,

    pub presentation: PresentationMode,

    /// Render `5.4` as `5,4` on icons.
    pub icon_decimal_comma: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nightscout_url: DEFAULT_NIGHTSCOUT_URL.to_string(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            presentation: PresentationMode::Auto,
            icon_decimal_comma: true,
        }
    }
}

impl Settings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(MIN_REFRESH_INTERVAL_MS))
    }

    /// Load settings from `path`. A missing file yields defaults, a file that
    /// does not parse is logged and replaced by defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<Settings>(&content) {
            Ok(mut settings) => {
                match normalize_url(&settings.nightscout_url) {
                    Ok(url) => settings.nightscout_url = url,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), "{e}, using default URL");
                        settings.nightscout_url = DEFAULT_NIGHTSCOUT_URL.to_string();
                    }
                }
                Ok(settings)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse settings, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// `<config dir>/nightscout-menubar/settings.json`
pub fn settings_path() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("nightscout-menubar").join("settings.json"))
}

/// Validate a user supplied base URL and strip trailing slashes.
pub fn normalize_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.nightscout_url, DEFAULT_NIGHTSCOUT_URL);
        assert_eq!(s.refresh_interval(), Duration::from_secs(10));
        assert_eq!(s.presentation, PresentationMode::Auto);
        assert!(s.icon_decimal_comma);
    }

    #[test]
    fn uses_camel_case_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["nightscoutUrl"], DEFAULT_NIGHTSCOUT_URL);
        assert_eq!(json["refreshIntervalMs"], 10_000);
        assert_eq!(json["presentation"], "auto");
        assert_eq!(json["iconDecimalComma"], true);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let s: Settings =
            serde_json::from_str(r#"{"nightscoutUrl": "https://cgm.example.org"}"#).unwrap();
        assert_eq!(s.nightscout_url, "https://cgm.example.org");
        assert_eq!(s.refresh_interval_ms, DEFAULT_REFRESH_INTERVAL_MS);
    }

    #[test]
    fn interval_is_clamped() {
        let s = Settings {
            refresh_interval_ms: 0,
            ..Settings::default()
        };
        assert_eq!(s.refresh_interval(), Duration::from_millis(MIN_REFRESH_INTERVAL_MS));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let s = Settings {
            nightscout_url: "https://cgm.example.org".into(),
            refresh_interval_ms: 30_000,
            presentation: PresentationMode::Text,
            icon_decimal_comma: false,
        };
        s.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), s);
    }

    #[test]
    fn invalid_stored_url_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"nightscoutUrl": "not a url", "refreshIntervalMs": 20000}"#)
            .unwrap();
        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.nightscout_url, DEFAULT_NIGHTSCOUT_URL);
        assert_eq!(s.refresh_interval_ms, 20_000);
    }

    #[test]
    fn normalizes_urls() {
        assert_eq!(
            normalize_url(" https://cgm.example.org/ ").unwrap(),
            "https://cgm.example.org"
        );
        assert_eq!(
            normalize_url("http://192.168.1.5:1337//").unwrap(),
            "http://192.168.1.5:1337"
        );
        assert!(matches!(normalize_url(""), Err(ConfigError::InvalidUrl(_))));
        assert!(matches!(normalize_url("cgm.example.org"), Err(ConfigError::InvalidUrl(_))));
        assert!(matches!(normalize_url("ftp://cgm.example.org"), Err(ConfigError::InvalidUrl(_))));
    }
}
