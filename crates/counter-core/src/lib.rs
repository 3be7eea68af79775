//! Advanced Counter core.
//!
//! The settings model shared by the counter plugin and its property inspector, plus the
//! inspector's side of the host protocol and its settings sync client.

pub mod coerce;
pub mod form;
pub mod host;
pub mod protocol;
pub mod settings;
pub mod sync;
pub mod ui;

pub use form::{FieldEdit, FormField, FormState};
pub use host::{ActionContext, ConnectionParams, HostInit};
pub use protocol::{InboundEvent, OutboundEvent, ProtocolError};
pub use settings::{CounterSettings, SettingsPatch};
pub use sync::{SyncClient, SyncSession};
pub use ui::{ChangeOrigin, FormEvent};
