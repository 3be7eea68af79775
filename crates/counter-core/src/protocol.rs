//! JSON events the property inspector exchanges with the host over the WebSocket.

use futures::{Sink, SinkExt};
use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::Message;

use crate::settings::{CounterSettings, SettingsPatch};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{event}` event is missing `{field}`")]
    MissingField {
        event: &'static str,
        field: &'static str,
    },
}

/// Events sent to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutboundEvent {
    Register {
        event: String,
        uuid: String,
    },
    GetSettings {
        event: &'static str,
        context: String,
    },
    SetSettings {
        event: &'static str,
        context: String,
        payload: CounterSettings,
    },
}

impl OutboundEvent {
    /// Announce the socket to the host. The event name is host-supplied.
    pub fn register(event: &str, uuid: &str) -> Self {
        Self::Register {
            event: event.to_owned(),
            uuid: uuid.to_owned(),
        }
    }

    pub fn get_settings(context: &str) -> Self {
        Self::GetSettings {
            event: "getSettings",
            context: context.to_owned(),
        }
    }

    pub fn set_settings(context: &str, settings: &CounterSettings) -> Self {
        Self::SetSettings {
            event: "setSettings",
            context: context.to_owned(),
            payload: settings.clone(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Register { event, .. } => event.as_str(),
            Self::GetSettings { event, .. } | Self::SetSettings { event, .. } => *event,
        }
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Serialize `event` and write it to the socket as a text frame.
pub async fn send_event<S>(sink: &mut S, event: &OutboundEvent) -> Result<(), anyhow::Error>
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    let message = Message::Text(event.to_json()?.into());
    sink.send(message).await?;
    Ok(())
}

/// Events received from the host. Anything but a settings push decodes to `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    DidReceiveSettings {
        context: Option<String>,
        settings: SettingsPatch,
    },
    Other(String),
}

#[derive(Deserialize)]
struct RawEvent {
    event: String,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

impl InboundEvent {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let raw: RawEvent = serde_json::from_str(text)?;
        if raw.event != "didReceiveSettings" {
            return Ok(InboundEvent::Other(raw.event));
        }

        let missing = |field| ProtocolError::MissingField {
            event: "didReceiveSettings",
            field,
        };
        let settings = raw
            .payload
            .ok_or_else(|| missing("payload"))?
            .get("settings")
            .cloned()
            .ok_or_else(|| missing("payload.settings"))?;

        Ok(InboundEvent::DidReceiveSettings {
            context: raw.context,
            settings: serde_json::from_value(settings)?,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            InboundEvent::DidReceiveSettings { .. } => "didReceiveSettings",
            InboundEvent::Other(name) => name.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_json(event: &OutboundEvent) -> serde_json::Value {
        serde_json::from_str(&event.to_json().unwrap()).unwrap()
    }

    #[test]
    fn register_uses_host_supplied_event_name() {
        let event = OutboundEvent::register("registerPropertyInspector", "pi-1");
        assert_eq!(
            as_json(&event),
            json!({"event": "registerPropertyInspector", "uuid": "pi-1"})
        );
        assert_eq!(event.name(), "registerPropertyInspector");
    }

    #[test]
    fn get_settings_carries_only_the_context() {
        assert_eq!(
            as_json(&OutboundEvent::get_settings("ctxA")),
            json!({"event": "getSettings", "context": "ctxA"})
        );
    }

    #[test]
    fn set_settings_sends_the_full_snapshot() {
        let settings = CounterSettings {
            value: 7,
            step: 3,
            file: None,
            pattern: Some("{}!".to_owned()),
        };
        assert_eq!(
            as_json(&OutboundEvent::set_settings("ctxA", &settings)),
            json!({
                "event": "setSettings",
                "context": "ctxA",
                "payload": {"value": 7, "step": 3, "file": null, "pattern": "{}!"}
            })
        );
    }

    #[test]
    fn decodes_settings_push_without_context() {
        let event =
            InboundEvent::decode(r#"{"event":"didReceiveSettings","payload":{"settings":{"value":42}}}"#)
                .unwrap();
        assert_eq!(
            event,
            InboundEvent::DidReceiveSettings {
                context: None,
                settings: SettingsPatch {
                    value: Some(42),
                    ..SettingsPatch::default()
                },
            }
        );
    }

    #[test]
    fn settings_push_without_settings_is_malformed() {
        let err = InboundEvent::decode(r#"{"event":"didReceiveSettings","payload":{}}"#).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MissingField {
                field: "payload.settings",
                ..
            }
        ));
    }

    #[test]
    fn unknown_events_decode_as_other() {
        let event = InboundEvent::decode(r#"{"event":"sendToPropertyInspector","payload":[1,2]}"#)
            .unwrap();
        assert_eq!(event, InboundEvent::Other("sendToPropertyInspector".to_owned()));
    }

    #[test]
    fn garbage_is_a_json_error() {
        assert!(matches!(
            InboundEvent::decode("not json"),
            Err(ProtocolError::Json(_))
        ));
    }
}
