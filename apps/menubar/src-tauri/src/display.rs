use crate::types::{DisplayModel, RemoteProperties};

/// Build the display model for a properties payload.
/// Returns `None` when the payload carries no scaled glucose reading.
pub fn map_properties(props: &RemoteProperties) -> Option<DisplayModel> {
    let glucose_value = props
        .bgnow
        .as_ref()
        .and_then(|bg| bg.sgvs.first())
        .and_then(|sgv| sgv.scaled.as_ref())
        .and_then(|scaled| scaled.to_display())?;

    let delta_display = props
        .delta
        .as_ref()
        .and_then(|d| d.display.clone())
        .unwrap_or_default();
    let direction = props.direction.as_ref();
    let direction_arrow = direction.and_then(|d| d.label.clone()).unwrap_or_default();
    let direction_code = direction.and_then(|d| d.value.clone()).unwrap_or_default();

    Some(DisplayModel {
        glucose_value,
        delta_display,
        direction_arrow,
        direction_code,
    })
}

/// Text used for the tray title and tooltip, e.g. `" 120 +2 ↑"`
pub fn tray_title(model: &DisplayModel) -> String {
    format!(
        " {} {} {}",
        model.glucose_value, model.delta_display, model.direction_arrow
    )
}

/// Leading sign of a delta, or an empty string for an unsigned delta.
pub fn delta_operator(delta: &str) -> &str {
    match delta.chars().next() {
        Some(c @ ('+' | '-')) => &delta[..c.len_utf8()],
        _ => "",
    }
}

/// Delta magnitude with every `+`/`-` removed.
/// The sign is drawn as a separate icon, see [`delta_operator`].
pub fn sanitize_delta(delta: &str) -> String {
    delta.chars().filter(|c| !matches!(c, '+' | '-')).collect()
}
