use std::path::{Path, PathBuf};

use tauri::{
    image::Image,
    menu::{Menu, MenuItem},
    path::BaseDirectory,
    tray::{TrayIcon, TrayIconBuilder},
    App, AppHandle, Manager,
};

use crate::config::PresentationMode;
use crate::display::tray_title;
use crate::error::{PresentError, RenderError};
use crate::icon_render::{render_icon, IconLabels, IconPaths};
use crate::refresh::DisplaySink;
use crate::types::DisplayModel;

/// Embedded tray icons (compiled into binary)
const TEMPLATE_ICON_BYTES: &[u8] = include_bytes!("../icons/tray-idle.png");
const APP_ICON_BYTES: &[u8] = include_bytes!("../icons/icon.png");
const BLANK_ICON_BYTES: &[u8] = include_bytes!("../icons/tray-blank.png");

pub const MAIN_TRAY_ID: &str = "main";
const GLUCOSE_TRAY_ID: &str = "glucose";
const OPERATOR_TRAY_ID: &str = "operator";
const DELTA_TRAY_ID: &str = "delta";
const DIRECTION_TRAY_ID: &str = "direction";

const QUIT_ID: &str = "quit";

/// Direction codes that ship with an arrow asset.
const ARROW_CODES: [&str; 10] = [
    "DoubleUp",
    "SingleUp",
    "FortyFiveUp",
    "Flat",
    "FortyFiveDown",
    "SingleDown",
    "DoubleDown",
    "NOT COMPUTABLE",
    "RATE OUT OF RANGE",
    "NONE",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Rendered glyphs in separate tray slots (Windows, Linux)
    Icons,
    /// Title and tooltip on the main tray (macOS)
    Text,
}

impl Presentation {
    pub fn select(mode: PresentationMode) -> Self {
        match mode {
            PresentationMode::Icons => Presentation::Icons,
            PresentationMode::Text => Presentation::Text,
            PresentationMode::Auto => Self::for_os(std::env::consts::OS),
        }
    }

    fn for_os(os: &str) -> Self {
        match os {
            "macos" => Presentation::Text,
            "windows" | "linux" => Presentation::Icons,
            other => {
                tracing::warn!(os = other, "unsupported platform, using text tray");
                Presentation::Text
            }
        }
    }
}

/// Resource-relative path of the arrow icon for a direction code.
/// Unknown codes get the `NONE` arrow.
pub fn arrow_asset(code: &str) -> String {
    let code = if ARROW_CODES.contains(&code) { code } else { "NONE" };
    format!("assets/arrows/16x16_{}_white.png", code.replace(' ', "_"))
}

/// Create the tray icons. Icon slots are created first so they sit next to
/// each other, left of the main icon.
pub fn setup_tray(app: &App, presentation: Presentation) -> Result<(), Box<dyn std::error::Error>> {
    if presentation == Presentation::Icons {
        for id in [GLUCOSE_TRAY_ID, OPERATOR_TRAY_ID, DELTA_TRAY_ID, DIRECTION_TRAY_ID] {
            TrayIconBuilder::with_id(id)
                .icon(Image::from_bytes(BLANK_ICON_BYTES)?)
                .build(app)?;
        }
    }

    let menu = Menu::new(app)?;
    let quit = MenuItem::with_id(app, QUIT_ID, "Quit", true, Some("CmdOrCtrl+Q"))?;
    menu.append(&quit)?;

    // macOS draws template icons in the menu bar's own colour
    let icon_bytes = match presentation {
        Presentation::Text => TEMPLATE_ICON_BYTES,
        Presentation::Icons => APP_ICON_BYTES,
    };

    TrayIconBuilder::with_id(MAIN_TRAY_ID)
        .icon(Image::from_bytes(icon_bytes)?)
        .icon_as_template(presentation == Presentation::Text)
        .tooltip("Nightscout")
        .menu(&menu)
        .on_menu_event(|app, event| {
            handle_menu_event(app, event.id().0.as_str());
        })
        .build(app)?;

    Ok(())
}

fn handle_menu_event(app: &AppHandle, id: &str) {
    if id == QUIT_ID {
        tracing::info!("quit requested from tray menu");
        app.exit(0);
    }
}

/// Pushes display models onto the tray icons created by [`setup_tray`].
pub struct TrayPresenter {
    app: AppHandle,
    presentation: Presentation,
    icons: IconPaths,
    decimal_comma: bool,
}

impl TrayPresenter {
    pub fn new(app: AppHandle, presentation: Presentation, icons: IconPaths, decimal_comma: bool) -> Self {
        Self {
            app,
            presentation,
            icons,
            decimal_comma,
        }
    }

    fn tray(&self, id: &'static str) -> Result<TrayIcon, PresentError> {
        self.app.tray_by_id(id).ok_or(PresentError::TrayMissing(id))
    }

    fn present_text(&self, title: &str) -> Result<(), PresentError> {
        let tray = self.tray(MAIN_TRAY_ID)?;
        tray.set_tooltip(Some(title))?;
        tray.set_title(Some(title))?;
        Ok(())
    }

    async fn present_icons(&self, model: &DisplayModel) -> Result<(), PresentError> {
        let labels = IconLabels::from_model(model, self.decimal_comma);
        let paths = self.icons.clone();
        let rendered = tokio::task::spawn_blocking(move || render_slots(&labels, &paths)).await?;

        // A slot whose render failed keeps showing the previous reading.
        for (id, path, result) in rendered {
            match result {
                Ok(()) => self.load_icon(id, &path),
                Err(e) => tracing::warn!(tray = id, error = %e, "icon render failed, keeping previous icon"),
            }
        }

        match self
            .app
            .path()
            .resolve(arrow_asset(&model.direction_code), BaseDirectory::Resource)
        {
            Ok(arrow) => self.load_icon(DIRECTION_TRAY_ID, &arrow),
            Err(e) => tracing::warn!(error = %e, "cannot resolve arrow asset"),
        }

        self.tray(MAIN_TRAY_ID)?.set_tooltip(Some(tray_title(model)))?;
        Ok(())
    }

    fn load_icon(&self, id: &'static str, path: &Path) {
        let result = Image::from_path(path)
            .map_err(PresentError::from)
            .and_then(|image| Ok(self.tray(id)?.set_icon(Some(image))?));
        if let Err(e) = result {
            tracing::warn!(tray = id, path = %path.display(), error = %e, "failed to load tray icon");
        }
    }
}

impl DisplaySink for TrayPresenter {
    async fn present(&self, model: DisplayModel) -> Result<(), PresentError> {
        match self.presentation {
            Presentation::Text => self.present_text(&tray_title(&model)),
            Presentation::Icons => self.present_icons(&model).await,
        }
    }
}

/// Render the three text slots, in tray order.
fn render_slots(labels: &IconLabels, paths: &IconPaths) -> Vec<(&'static str, PathBuf, Result<(), RenderError>)> {
    [
        (GLUCOSE_TRAY_ID, &labels.glucose, &paths.glucose),
        (OPERATOR_TRAY_ID, &labels.operator, &paths.operator),
        (DELTA_TRAY_ID, &labels.delta, &paths.delta),
    ]
    .into_iter()
    .map(|(id, label, path)| (id, path.clone(), render_icon(label, path)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_selection() {
        assert_eq!(Presentation::for_os("macos"), Presentation::Text);
        assert_eq!(Presentation::for_os("windows"), Presentation::Icons);
        assert_eq!(Presentation::for_os("linux"), Presentation::Icons);
        assert_eq!(Presentation::for_os("freebsd"), Presentation::Text);
    }

    #[test]
    fn explicit_mode_overrides_platform() {
        assert_eq!(Presentation::select(PresentationMode::Icons), Presentation::Icons);
        assert_eq!(Presentation::select(PresentationMode::Text), Presentation::Text);
    }

    #[test]
    fn arrow_asset_keyed_by_direction_code() {
        assert_eq!(arrow_asset("FortyFiveUp"), "assets/arrows/16x16_FortyFiveUp_white.png");
        assert_eq!(
            arrow_asset("NOT COMPUTABLE"),
            "assets/arrows/16x16_NOT_COMPUTABLE_white.png"
        );
        assert_eq!(arrow_asset("Sideways"), "assets/arrows/16x16_NONE_white.png");
        assert_eq!(arrow_asset(""), "assets/arrows/16x16_NONE_white.png");
    }

    #[test]
    fn every_direction_has_a_bundled_arrow() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        for code in ARROW_CODES {
            let path = root.join(arrow_asset(code));
            assert!(path.exists(), "missing {}", path.display());
        }
    }

    #[test]
    fn icon_slots_render_reading() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IconPaths::in_dir(dir.path());
        let model = DisplayModel {
            glucose_value: "120".into(),
            delta_display: "+2".into(),
            direction_arrow: "↑".into(),
            direction_code: "FortyFiveUp".into(),
        };
        let labels = IconLabels::from_model(&model, true);

        let rendered = render_slots(&labels, &paths);
        let ids: Vec<_> = rendered.iter().map(|(id, _, _)| *id).collect();
        assert_eq!(ids, [GLUCOSE_TRAY_ID, OPERATOR_TRAY_ID, DELTA_TRAY_ID]);
        assert!(rendered.iter().all(|(_, _, r)| r.is_ok()));

        let decoded = |p: &Path| image::open(p).unwrap().to_rgba8();
        assert_eq!(decoded(&paths.glucose), crate::icon_render::render_icon_image("120"));
        assert_eq!(decoded(&paths.operator), crate::icon_render::render_icon_image("+"));
        assert_eq!(decoded(&paths.delta), crate::icon_render::render_icon_image("2"));
    }
}
