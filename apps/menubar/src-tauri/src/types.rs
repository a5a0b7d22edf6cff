use serde::Deserialize;

/// Response of `GET /api/v2/properties` on a Nightscout server.
///
/// Only the blocks the tray needs are modelled; every block is optional
/// because Nightscout omits plugins that are disabled on the server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteProperties {
    pub bgnow: Option<BgNow>,
    pub delta: Option<DeltaInfo>,
    pub direction: Option<DirectionInfo>,
}

/// The `bgnow` plugin block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BgNow {
    #[serde(default)]
    pub sgvs: Vec<SgvEntry>,
}

/// A single sensor glucose value entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SgvEntry {
    pub scaled: Option<ScaledValue>,
}

/// Glucose value already converted to the user's unit.
/// mg/dL servers send a number, mmol/L servers send a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScaledValue {
    Text(String),
    Number(serde_json::Number),
}

impl ScaledValue {
    /// Display form of the value, `None` when the server sent an empty string.
    pub fn to_display(&self) -> Option<String> {
        match self {
            ScaledValue::Text(s) if s.trim().is_empty() => None,
            ScaledValue::Text(s) => Some(s.trim().to_string()),
            ScaledValue::Number(n) => Some(n.to_string()),
        }
    }
}

/// The `delta` plugin block. Fields may be absent or `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeltaInfo {
    pub display: Option<String>,
}

/// The `direction` plugin block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectionInfo {
    /// Human readable arrow glyph, e.g. `↗`
    pub label: Option<String>,
    /// Machine code, e.g. `FortyFiveUp`
    pub value: Option<String>,
}

/// What the tray shows for one reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayModel {
    pub glucose_value: String,
    pub delta_display: String,
    pub direction_arrow: String,
    pub direction_code: String,
}

/// Settings form payload sent by the popup window
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub nightscout_url: String,
}
