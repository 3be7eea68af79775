//! Persisted configuration of one counter instance and the partial updates applied to it.

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_VALUE: i64 = 0;
pub const DEFAULT_STEP: i64 = 1;

/// Durable configuration of one counter action instance.
///
/// Serializes with every key present; an unset `file` or `pattern` goes over the wire as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SettingsPatch")]
pub struct CounterSettings {
    pub value: i64,
    pub step: i64,
    pub file: Option<String>,
    pub pattern: Option<String>,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            value: DEFAULT_VALUE,
            step: DEFAULT_STEP,
            file: None,
            pattern: None,
        }
    }
}

impl CounterSettings {
    /// Overwrite every field present in `patch`, leave the others untouched.
    ///
    /// Returns whether anything changed.
    pub fn apply(&mut self, patch: &SettingsPatch) -> bool {
        let before = self.clone();

        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(step) = patch.step {
            self.step = step;
        }
        if let Some(file) = &patch.file {
            self.file = file.clone();
        }
        if let Some(pattern) = &patch.pattern {
            self.pattern = pattern.clone();
        }

        *self != before
    }
}

impl From<SettingsPatch> for CounterSettings {
    fn from(patch: SettingsPatch) -> Self {
        let mut settings = Self::default();
        settings.apply(&patch);
        settings
    }
}

/// A settings object as received from the wire: any subset of the four keys.
///
/// `None` means the key was absent. For `file` and `pattern`, `Some(None)` means the key was
/// present but `null` or empty, which clears the local field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, deserialize_with = "loose_int")]
    pub value: Option<i64>,
    #[serde(default, deserialize_with = "loose_int")]
    pub step: Option<i64>,
    #[serde(default, deserialize_with = "present_text")]
    pub file: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_text")]
    pub pattern: Option<Option<String>>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.step.is_none() && self.file.is_none() && self.pattern.is_none()
    }
}

// Hosts are not consistent about numeric settings: some round-trip form input as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseInt {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseInt {
    fn into_int(self) -> Option<i64> {
        match self {
            LooseInt::Int(v) => Some(v),
            LooseInt::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            LooseInt::Float(_) => None,
            LooseInt::Text(s) => crate::coerce::parse_int(&s),
        }
    }
}

fn loose_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LooseInt>::deserialize(deserializer)?.and_then(LooseInt::into_int))
}

fn present_text<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?;
    Ok(Some(text.filter(|s| !s.is_empty())))
}
