use counter_core::CounterSettings;

use crate::counter;

/// One call to make on the action instance, in the order returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    ShowAlert,
    SetSettings(CounterSettings),
    SetTitle(String),
}

/// Key or dial input: bump the value by `delta`, write the file, persist, retitle.
pub async fn increment(settings: &CounterSettings, delta: i64) -> Vec<Reply> {
    let next = counter::increment(settings, delta);
    log::debug!("counter {} -> {}", settings.value, next.value);

    let mut replies: Vec<Reply> = write_output(&next).await.into_iter().collect();
    replies.push(Reply::SetSettings(next.clone()));
    replies.push(title(&next));
    replies
}

pub async fn dial_rotate(settings: &CounterSettings, ticks: i16) -> Vec<Reply> {
    increment(settings, settings.step.saturating_mul(i64::from(ticks))).await
}

/// Settings changed elsewhere (usually the inspector).
pub async fn settings_received(settings: &CounterSettings) -> Vec<Reply> {
    let mut replies = vec![title(settings)];
    replies.extend(write_output(settings).await);
    replies
}

pub fn appear(settings: &CounterSettings) -> Vec<Reply> {
    vec![title(settings)]
}

fn title(settings: &CounterSettings) -> Reply {
    Reply::SetTitle(counter::title(settings))
}

async fn write_output(settings: &CounterSettings) -> Option<Reply> {
    match counter::write_output(settings).await {
        Ok(()) => None,
        Err(err) => {
            log::error!("{err:#}");
            Some(Reply::ShowAlert)
        }
    }
}
