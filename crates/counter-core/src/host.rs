//! Parameters the host hands to a property inspector, and the action context embedded in them.

use serde::Deserialize;

use crate::protocol::ProtocolError;
use crate::settings::SettingsPatch;

/// Everything needed to open the sync connection. Delivered once by the host bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionParams {
    pub port: u16,
    pub registration_event: String,
    pub inspector_uuid: String,
    /// Host/application info. Opaque to the inspector.
    pub info: serde_json::Value,
    /// JSON-encoded [`ActionContext`].
    pub action_info: String,
}

/// The object a Stream Deck style host passes to `connectElgatoStreamDeckSocket`.
#[derive(Debug, Clone, Deserialize)]
pub struct HostInit {
    #[serde(rename = "inPort")]
    pub port: u16,
    #[serde(rename = "inPropertyInspectorUUID")]
    pub inspector_uuid: String,
    #[serde(rename = "inRegisterEvent")]
    pub register_event: String,
    #[serde(rename = "inInfo", default)]
    pub info: serde_json::Value,
    #[serde(rename = "inActionInfo")]
    pub action_info: serde_json::Value,
}

impl From<HostInit> for ConnectionParams {
    fn from(init: HostInit) -> Self {
        // Normally a JSON string; some hosts hand over the object itself.
        let action_info = match init.action_info {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        let info = match init.info {
            serde_json::Value::String(s) => {
                serde_json::from_str(&s).unwrap_or(serde_json::Value::String(s))
            }
            other => other,
        };
        Self {
            port: init.port,
            registration_event: init.register_event,
            inspector_uuid: init.inspector_uuid,
            info,
            action_info,
        }
    }
}

/// The action instance an inspector was opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionContext {
    pub action: Option<String>,
    pub context: String,
    pub device: Option<String>,
    pub settings: SettingsPatch,
}

#[derive(Deserialize)]
struct RawActionInfo {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    device: Option<String>,
    #[serde(default)]
    payload: Option<RawActionPayload>,
}

#[derive(Deserialize)]
struct RawActionPayload {
    #[serde(default)]
    settings: SettingsPatch,
}

impl ActionContext {
    pub fn parse(action_info: &str) -> Result<Self, ProtocolError> {
        let raw: RawActionInfo = serde_json::from_str(action_info)?;
        let context = raw.context.ok_or(ProtocolError::MissingField {
            event: "actionInfo",
            field: "context",
        })?;
        Ok(Self {
            action: raw.action,
            context,
            device: raw.device,
            settings: raw.payload.map(|p| p.settings).unwrap_or_default(),
        })
    }
}
