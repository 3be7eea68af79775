//! Form change notifications for whatever renders the inspector.

use crate::settings::CounterSettings;

use tokio::sync::broadcast;

/// Where a form change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Initial render before the host delivered anything.
    Defaults,
    /// Snapshot embedded in the action info.
    ActionInfo,
    /// `didReceiveSettings` pushed by the backend.
    Remote,
    /// The user edited a field.
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Changed {
        settings: CounterSettings,
        origin: ChangeOrigin,
    },
    Connected {
        context: String,
    },
    Disconnected,
}

const CHANNEL_CAPACITY: usize = 64;

/// Fan-out of [`FormEvent`]s to whatever renders the form.
#[derive(Debug, Clone)]
pub struct FormEvents {
    sender: broadcast::Sender<FormEvent>,
}

impl Default for FormEvents {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }
}

impl FormEvents {
    pub fn subscribe(&self) -> broadcast::Receiver<FormEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: FormEvent) {
        // No subscribers is fine.
        let _ = self.sender.send(event);
    }
}
