// Prevents additional console window on Windows in release
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod commands;
mod config;
mod display;
mod error;
mod icon_render;
mod nightscout_client;
mod refresh;
mod state;
mod tray;
mod types;

use std::sync::Arc;

use tauri::Manager;
use tracing_subscriber::EnvFilter;

use config::Settings;
use icon_render::IconPaths;
use nightscout_client::NightscoutClient;
use refresh::Refresher;
use state::AppState;
use tray::{Presentation, TrayPresenter};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,nightscout_menubar=debug")),
        )
        .init();

    let settings_path = match config::settings_path() {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::warn!("{e}, settings will not be saved");
            None
        }
    };
    let settings = match settings_path.as_deref().map(Settings::load_from) {
        Some(Ok(settings)) => settings,
        Some(Err(e)) => {
            tracing::warn!(error = %e, "failed to read settings, using defaults");
            Settings::default()
        }
        None => Settings::default(),
    };

    let presentation = Presentation::select(settings.presentation);
    let period = settings.refresh_interval();
    let decimal_comma = settings.icon_decimal_comma;
    tracing::info!(url = %settings.nightscout_url, ?presentation, "starting");
    let state = Arc::new(AppState::new(settings, settings_path));

    tauri::Builder::default()
        .manage(Arc::clone(&state))
        .invoke_handler(tauri::generate_handler![
            commands::get_settings,
            commands::save_settings,
        ])
        .setup(move |app| {
            // Menu bar only, no Dock icon
            #[cfg(target_os = "macos")]
            app.set_activation_policy(tauri::ActivationPolicy::Accessory);

            tray::setup_tray(app, presentation)?;

            let icon_dir = app.path().app_cache_dir()?.join("tray");
            let presenter = TrayPresenter::new(
                app.handle().clone(),
                presentation,
                IconPaths::in_dir(&icon_dir),
                decimal_comma,
            );
            let refresher = Arc::new(Refresher::new(state, NightscoutClient::new()?, presenter));
            tauri::async_runtime::spawn(refresher.run(period));

            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
