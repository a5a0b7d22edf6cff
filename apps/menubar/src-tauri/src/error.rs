use std::path::PathBuf;

/// Failure to obtain properties from the Nightscout server.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to rasterize or write a tray icon.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("writing {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to push a display model onto the tray.
#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    #[error("tray icon `{0}` not found")]
    TrayMissing(&'static str),

    #[error("tauri error: {0}")]
    Tauri(#[from] tauri::Error),

    #[error("render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Failure to load, validate or persist settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid Nightscout URL `{0}`")]
    InvalidUrl(String),

    #[error("no config directory on this platform")]
    NoConfigDir,

    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
