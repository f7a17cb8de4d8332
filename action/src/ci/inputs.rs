//! Step inputs

use std::collections::HashMap;
use std::env;

use crate::errors::ActionError;

/// Source of raw, string-typed step inputs
pub trait InputSource: Send + Sync {
    /// Raw value for `key`, if the runner provided one
    fn raw(&self, key: &str) -> Option<String>;

    /// Trimmed value, `None` when absent or empty
    fn optional(&self, key: &str) -> Option<String> {
        self.raw(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Trimmed value, failing with a configuration error naming the key
    fn required(&self, key: &str) -> Result<String, ActionError> {
        self.optional(key)
            .ok_or_else(|| ActionError::missing_input(key))
    }

    /// Boolean with an explicit-string default.
    ///
    /// Default-true inputs are true unless the value is exactly `"false"`;
    /// default-false inputs are false unless the value is exactly `"true"`.
    fn boolean(&self, key: &str, default_true: bool) -> bool {
        let value = self.raw(key).map(|v| v.trim().to_string()).unwrap_or_default();
        if default_true {
            value != "false"
        } else {
            value == "true"
        }
    }
}

/// Inputs exposed by the runner as `INPUT_<NAME>` environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvInputs;

impl EnvInputs {
    /// Environment variable name the runner uses for an input
    pub fn var_name(key: &str) -> String {
        format!("INPUT_{}", key.replace(' ', "_").to_uppercase())
    }
}

impl InputSource for EnvInputs {
    fn raw(&self, key: &str) -> Option<String> {
        env::var(Self::var_name(key)).ok()
    }
}

/// Inputs held in memory
#[derive(Debug, Clone, Default)]
pub struct MapInputs {
    values: HashMap<String, String>,
}

impl MapInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

impl InputSource for MapInputs {
    fn raw(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
