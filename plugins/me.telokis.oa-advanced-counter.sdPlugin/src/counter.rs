use anyhow::Context as _;
use counter_core::CounterSettings;

pub const ACTION_UUID: &str = "me.telokis.oa-advanced-counter.counter";

/// Placeholder in the output pattern that is replaced with the value.
pub const VALUE_PLACEHOLDER: &str = "{}";

pub fn increment(settings: &CounterSettings, delta: i64) -> CounterSettings {
    CounterSettings {
        value: settings.value.saturating_add(delta),
        ..settings.clone()
    }
}

pub fn title(settings: &CounterSettings) -> String {
    settings.value.to_string()
}

pub fn render_output(settings: &CounterSettings) -> String {
    let value = settings.value.to_string();
    match &settings.pattern {
        Some(pattern) => pattern.replace(VALUE_PLACEHOLDER, &value),
        None => value,
    }
}

/// Write the rendered value to the configured file, if any.
pub async fn write_output(settings: &CounterSettings) -> Result<(), anyhow::Error> {
    let Some(path) = &settings.file else {
        return Ok(());
    };
    tokio::fs::write(path, render_output(settings))
        .await
        .with_context(|| format!("Error when writing to file '{path}'"))
}
