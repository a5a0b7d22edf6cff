use std::sync::Arc;

use tauri::State;

use crate::config::Settings;
use crate::state::AppState;
use crate::types::SettingsUpdate;

/// Current settings for the popup's settings form
#[tauri::command]
pub async fn get_settings(state: State<'_, Arc<AppState>>) -> Result<Settings, String> {
    Ok(state.settings().await)
}

/// Store a new Nightscout URL; the next refresh cycle uses it.
/// Returns the normalized URL.
#[tauri::command]
pub async fn save_settings(
    state: State<'_, Arc<AppState>>,
    settings: SettingsUpdate,
) -> Result<String, String> {
    state
        .set_nightscout_url(&settings.nightscout_url)
        .await
        .map_err(|e| e.to_string())
}
