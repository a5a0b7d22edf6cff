use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::config::{normalize_url, Settings};
use crate::error::ConfigError;

/// Shared application state managed by Tauri.
pub struct AppState {
    settings: Mutex<Settings>,
    /// Where settings are persisted; `None` keeps them in memory only.
    settings_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(settings: Settings, settings_path: Option<PathBuf>) -> Self {
        Self {
            settings: Mutex::new(settings),
            settings_path,
        }
    }

    pub async fn settings(&self) -> Settings {
        self.settings.lock().await.clone()
    }

    pub async fn nightscout_url(&self) -> String {
        self.settings.lock().await.nightscout_url.clone()
    }

    /// The only writer of the base URL. The next refresh cycle picks it up.
    /// A failed write to disk is logged; the new URL stays in effect.
    pub async fn set_nightscout_url(&self, raw: &str) -> Result<String, ConfigError> {
        let url = normalize_url(raw)?;
        let mut settings = self.settings.lock().await;
        settings.nightscout_url = url.clone();

        if let Some(path) = &self.settings_path {
            if let Err(e) = settings.save_to(path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to persist settings");
            }
        }

        tracing::info!(url = %url, "Nightscout URL updated");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn setter_updates_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let state = AppState::new(Settings::default(), Some(path.clone()));

        let url = state.set_nightscout_url("https://cgm.example.org/").await.unwrap();
        assert_eq!(url, "https://cgm.example.org");
        assert_eq!(state.nightscout_url().await, "https://cgm.example.org");

        let stored = Settings::load_from(&path).unwrap();
        assert_eq!(stored.nightscout_url, "https://cgm.example.org");
    }

    #[tokio::test]
    async fn invalid_url_leaves_state_untouched() {
        let state = AppState::new(Settings::default(), None);
        let before = state.nightscout_url().await;
        assert!(state.set_nightscout_url("nope").await.is_err());
        assert_eq!(state.nightscout_url().await, before);
    }
}
