//! Settings synchronization between the property inspector and the plugin backend.
//!
//! [`SyncSession`] holds the protocol state and decides what to send; [`SyncClient`] drives it
//! over a WebSocket. There is exactly one connection per client and it is never reopened.

use anyhow::Context as _;
use futures::{Sink, StreamExt};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::form::{FieldEdit, FormState};
use crate::host::{ActionContext, ConnectionParams};
use crate::protocol::{InboundEvent, OutboundEvent, ProtocolError, send_event};
use crate::ui::{ChangeOrigin, FormEvent, FormEvents};

/// The backend always listens on the loopback interface.
pub const BACKEND_HOST: &str = "127.0.0.1";

#[derive(Debug)]
struct Handshake {
    registration_event: String,
    inspector_uuid: String,
}

#[derive(Debug)]
pub struct SyncSession {
    form: FormState,
    context: Option<String>,
    handshake: Option<Handshake>,
    open: bool,
}

impl SyncSession {
    pub fn new(form: FormState) -> Self {
        Self {
            form,
            context: None,
            handshake: None,
            open: false,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn into_form(self) -> FormState {
        self.form
    }

    /// Context id every outbound message is addressed to. Fixed by the first `initialize`.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Capture the context id and apply the settings embedded in the action info.
    ///
    /// Returns whether the form changed.
    pub fn initialize(&mut self, params: &ConnectionParams) -> Result<bool, ProtocolError> {
        let action = ActionContext::parse(&params.action_info)?;

        if self.context.is_none() {
            self.context = Some(action.context);
        } else if self.context.as_deref() != Some(action.context.as_str()) {
            log::warn!(
                "keeping context {:?}, ignoring {:?} from a later initialization",
                self.context,
                action.context
            );
        }
        self.handshake = Some(Handshake {
            registration_event: params.registration_event.clone(),
            inspector_uuid: params.inspector_uuid.clone(),
        });

        Ok(self.form.apply_patch(&action.settings))
    }

    /// The socket opened: register this inspector, then ask for the authoritative settings.
    pub fn on_open(&mut self) -> Vec<OutboundEvent> {
        let (Some(handshake), Some(context)) = (&self.handshake, &self.context) else {
            log::warn!("socket opened before initialization, skipping handshake");
            return Vec::new();
        };
        let events = vec![
            OutboundEvent::register(&handshake.registration_event, &handshake.inspector_uuid),
            OutboundEvent::get_settings(context),
        ];
        self.open = true;
        events
    }

    pub fn on_close(&mut self) {
        self.open = false;
    }

    /// Apply one inbound text frame. Returns whether the form changed.
    ///
    /// Only `didReceiveSettings` is acted upon; malformed frames are dropped.
    pub fn on_frame(&mut self, text: &str) -> bool {
        match InboundEvent::decode(text) {
            Ok(InboundEvent::DidReceiveSettings { settings, .. }) => {
                self.form.apply_patch(&settings)
            }
            Ok(other) => {
                log::trace!("ignoring {} event", other.name());
                false
            }
            Err(err) => {
                log::debug!("dropping malformed frame: {err}");
                false
            }
        }
    }

    /// Apply a local edit and build the full-snapshot `setSettings` for it.
    ///
    /// Returns `None` while the socket is not open: the edit stays local and is not queued.
    pub fn on_edit(&mut self, edit: &FieldEdit) -> Option<OutboundEvent> {
        let settings = self.form.edit(edit);
        match (&self.context, self.open) {
            (Some(context), true) => Some(OutboundEvent::set_settings(context, settings)),
            _ => {
                log::trace!("socket not open, {:?} edit stays local", edit.field);
                None
            }
        }
    }
}

/// Drives a [`SyncSession`] over the backend WebSocket.
#[derive(Debug)]
pub struct SyncClient {
    session: SyncSession,
    events: FormEvents,
}

impl Default for SyncClient {
    fn default() -> Self {
        Self::new(FormState::default())
    }
}

impl SyncClient {
    pub fn new(form: FormState) -> Self {
        Self {
            session: SyncSession::new(form),
            events: FormEvents::default(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    /// Run until the backend closes the connection, then return the final form state.
    ///
    /// Nothing touches the network until `init` resolves. Edits received before the socket is
    /// open only change local state.
    pub async fn run(
        mut self,
        mut init: oneshot::Receiver<ConnectionParams>,
        mut edits: mpsc::UnboundedReceiver<FieldEdit>,
    ) -> Result<FormState, anyhow::Error> {
        let mut edits_open = true;
        self.emit_changed(ChangeOrigin::Defaults);

        let params = loop {
            tokio::select! {
                params = &mut init => {
                    break params.context("host bridge went away without connection parameters")?;
                }
                edit = edits.recv(), if edits_open => match edit {
                    Some(edit) => {
                        self.apply_edit(&edit);
                    }
                    None => edits_open = false,
                },
            }
        };

        if self.session.initialize(&params)? {
            self.emit_changed(ChangeOrigin::ActionInfo);
        }

        let url = format!("ws://{BACKEND_HOST}:{}", params.port);
        log::info!("connecting to {url}");
        let connect = connect_async(url);
        tokio::pin!(connect);
        let stream = loop {
            tokio::select! {
                res = &mut connect => {
                    let (stream, _) = res.with_context(|| {
                        format!("failed to connect to backend on port {}", params.port)
                    })?;
                    break stream;
                }
                edit = edits.recv(), if edits_open => match edit {
                    Some(edit) => {
                        self.apply_edit(&edit);
                    }
                    None => edits_open = false,
                },
            }
        };

        let (mut write, mut read) = stream.split();
        for event in self.session.on_open() {
            send_or_drop(&mut write, &event).await;
        }
        self.events.emit(FormEvent::Connected {
            context: self.session.context().unwrap_or_default().to_owned(),
        });

        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if self.session.on_frame(text.as_str()) {
                            self.emit_changed(ChangeOrigin::Remote);
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        log::info!("backend closed the connection ({frame:?})");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        log::warn!("connection to backend failed: {err}");
                        break;
                    }
                    None => break,
                },
                edit = edits.recv(), if edits_open => match edit {
                    Some(edit) => {
                        if let Some(event) = self.apply_edit(&edit) {
                            send_or_drop(&mut write, &event).await;
                        }
                    }
                    None => edits_open = false,
                },
            }
        }

        self.session.on_close();
        self.events.emit(FormEvent::Disconnected);
        Ok(self.session.into_form())
    }

    fn apply_edit(&mut self, edit: &FieldEdit) -> Option<OutboundEvent> {
        let event = self.session.on_edit(edit);
        self.emit_changed(ChangeOrigin::Local);
        event
    }

    fn emit_changed(&self, origin: ChangeOrigin) {
        self.events.emit(FormEvent::Changed {
            settings: self.session.form().settings().clone(),
            origin,
        });
    }
}

// Fire-and-forget: no acknowledgement, no retry.
async fn send_or_drop<S>(sink: &mut S, event: &OutboundEvent)
where
    S: Sink<Message> + Unpin,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    if let Err(err) = send_event(sink, event).await {
        log::debug!("dropped {} event: {err:#}", event.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormField;
    use crate::settings::CounterSettings;
    use serde_json::json;

    fn params(action_info: serde_json::Value) -> ConnectionParams {
        ConnectionParams {
            port: 12345,
            registration_event: "registerPropertyInspector".to_owned(),
            inspector_uuid: "pi-uuid".to_owned(),
            info: serde_json::Value::Null,
            action_info: action_info.to_string(),
        }
    }

    fn open_session(settings: serde_json::Value) -> SyncSession {
        let mut session = SyncSession::new(FormState::default());
        session
            .initialize(&params(json!({"context": "ctxA", "payload": {"settings": settings}})))
            .unwrap();
        session.on_open();
        session
    }

    fn payload(event: Option<OutboundEvent>) -> serde_json::Value {
        let text = event.expect("expected an outbound event").to_json().unwrap();
        serde_json::from_str::<serde_json::Value>(&text).unwrap()
    }

    #[test]
    fn handshake_registers_then_requests_settings() {
        let mut session = SyncSession::new(FormState::default());
        session
            .initialize(&params(json!({"context": "ctxA", "payload": {"settings": {}}})))
            .unwrap();
        assert_eq!(
            session.on_open(),
            vec![
                OutboundEvent::register("registerPropertyInspector", "pi-uuid"),
                OutboundEvent::get_settings("ctxA"),
            ]
        );
        assert!(session.is_open());
    }

    #[test]
    fn no_handshake_before_initialization() {
        let mut session = SyncSession::new(FormState::default());
        assert!(session.on_open().is_empty());
        assert!(!session.is_open());
    }

    #[test]
    fn embedded_snapshot_is_applied_on_initialize() {
        let mut session = SyncSession::new(FormState::default());
        let changed = session
            .initialize(&params(json!({"context": "ctxA", "payload": {"settings": {"value": 4, "step": 3}}})))
            .unwrap();
        assert!(changed);
        assert_eq!(session.form().settings().value, 4);
        assert_eq!(session.form().settings().step, 3);
        assert_eq!(session.context(), Some("ctxA"));
    }

    #[test]
    fn context_is_fixed_by_the_first_initialization() {
        let mut session = SyncSession::new(FormState::default());
        session.initialize(&params(json!({"context": "ctxA"}))).unwrap();
        session.initialize(&params(json!({"context": "ctxB"}))).unwrap();
        session.on_open();
        let event = session.on_edit(&FieldEdit::new(FormField::Value, "1"));
        assert_eq!(payload(event)["context"], "ctxA");
    }

    #[test]
    fn edit_sends_the_full_snapshot() {
        let mut session = open_session(json!({"step": 3}));
        let event = session.on_edit(&FieldEdit::new(FormField::Value, "7"));
        assert_eq!(
            payload(event),
            json!({
                "event": "setSettings",
                "context": "ctxA",
                "payload": {"value": 7, "step": 3, "file": null, "pattern": null}
            })
        );
    }

    #[test]
    fn non_numeric_value_is_sent_as_zero() {
        let mut session = open_session(json!({"value": 9}));
        let event = session.on_edit(&FieldEdit::new(FormField::Value, "abc"));
        assert_eq!(session.form().settings().value, 0);
        assert_eq!(payload(event)["payload"]["value"], 0);
    }

    #[test]
    fn cleared_file_is_sent_as_null() {
        let mut session = open_session(json!({"file": "/tmp/count.txt"}));
        let event = session.on_edit(&FieldEdit::new(FormField::File, ""));
        assert_eq!(payload(event)["payload"]["file"], serde_json::Value::Null);
    }

    #[test]
    fn edits_before_open_stay_local() {
        let mut session = SyncSession::new(FormState::default());
        assert!(session.on_edit(&FieldEdit::new(FormField::Value, "5")).is_none());
        session.initialize(&params(json!({"context": "ctxA"}))).unwrap();
        assert!(session.on_edit(&FieldEdit::new(FormField::Step, "2")).is_none());
        assert_eq!(session.form().settings().value, 5);
        assert_eq!(session.form().settings().step, 2);
    }

    #[test]
    fn edits_after_close_stay_local() {
        let mut session = open_session(json!({}));
        session.on_close();
        assert!(session.on_edit(&FieldEdit::new(FormField::Value, "5")).is_none());
    }

    #[test]
    fn pushed_settings_only_touch_present_keys() {
        let mut session = open_session(json!({"value": 1, "step": 3, "pattern": "{}!"}));
        assert!(session.on_frame(r#"{"event":"didReceiveSettings","payload":{"settings":{"value":42}}}"#));
        assert_eq!(
            session.form().settings(),
            &CounterSettings {
                value: 42,
                step: 3,
                file: None,
                pattern: Some("{}!".to_owned()),
            }
        );
    }

    #[test]
    fn pushed_settings_before_embedded_snapshot_survive_absent_keys() {
        let mut session = SyncSession::new(FormState::default());
        session.on_frame(r#"{"event":"didReceiveSettings","payload":{"settings":{"value":42}}}"#);
        session
            .initialize(&params(json!({"context": "ctxA", "payload": {"settings": {"step": 2}}})))
            .unwrap();
        assert_eq!(session.form().settings().value, 42);
        assert_eq!(session.form().settings().step, 2);
    }

    #[test]
    fn other_events_and_garbage_are_ignored() {
        let mut session = open_session(json!({"value": 1}));
        let before = session.form().clone();
        assert!(!session.on_frame(r#"{"event":"sendToPropertyInspector","payload":{"value":9}}"#));
        assert!(!session.on_frame("{not json"));
        assert!(!session.on_frame(r#"{"event":"didReceiveSettings"}"#));
        assert_eq!(session.form(), &before);
        assert!(session.is_open());
    }
}
