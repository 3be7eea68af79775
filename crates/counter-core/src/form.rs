//! The inspector's form: four editable fields mirroring [`CounterSettings`].

use std::str::FromStr;

use crate::coerce;
use crate::settings::{CounterSettings, DEFAULT_STEP, DEFAULT_VALUE, SettingsPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Value,
    Step,
    File,
    Pattern,
}

impl FromStr for FormField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "value" => Ok(FormField::Value),
            "step" => Ok(FormField::Step),
            "file" => Ok(FormField::File),
            "pattern" => Ok(FormField::Pattern),
            other => Err(anyhow::anyhow!("unknown field {other:?}")),
        }
    }
}

/// Raw user input for one field, before coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub field: FormField,
    pub raw: String,
}

impl FieldEdit {
    pub fn new(field: FormField, raw: impl Into<String>) -> Self {
        Self {
            field,
            raw: raw.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    settings: CounterSettings,
    step_fallback: i64,
}

impl Default for FormState {
    fn default() -> Self {
        Self::with_step_fallback(DEFAULT_STEP)
    }
}

impl FormState {
    /// `step_fallback` replaces step input that is not a number.
    pub fn with_step_fallback(step_fallback: i64) -> Self {
        Self {
            settings: CounterSettings::default(),
            step_fallback,
        }
    }

    pub fn settings(&self) -> &CounterSettings {
        &self.settings
    }

    pub fn apply_patch(&mut self, patch: &SettingsPatch) -> bool {
        self.settings.apply(patch)
    }

    /// Coerce `edit` into its field and return the resulting snapshot.
    pub fn edit(&mut self, edit: &FieldEdit) -> &CounterSettings {
        match edit.field {
            FormField::Value => self.settings.value = coerce::int_or(&edit.raw, DEFAULT_VALUE),
            FormField::Step => self.settings.step = coerce::int_or(&edit.raw, self.step_fallback),
            FormField::File => self.settings.file = coerce::optional_text(&edit.raw),
            FormField::Pattern => self.settings.pattern = coerce::optional_text(&edit.raw),
        }
        &self.settings
    }
}
