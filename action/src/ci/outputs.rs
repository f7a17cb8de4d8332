//! Step outputs and workflow annotations

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::errors::ActionError;

/// Destination of step outputs
pub trait OutputSink: Send + Sync {
    fn set_output(&self, key: &str, value: &str) -> Result<(), ActionError>;
}

/// Writes outputs the way the Actions runner expects them
#[derive(Debug, Clone, Default)]
pub struct GithubOutput {
    /// File named by `GITHUB_OUTPUT`; the legacy `::set-output` command is used when unset
    file: Option<PathBuf>,
}

impl GithubOutput {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os("GITHUB_OUTPUT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        )
    }
}

impl OutputSink for GithubOutput {
    fn set_output(&self, key: &str, value: &str) -> Result<(), ActionError> {
        debug!("output {}={}", key, value);
        match &self.file {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(format_output_entry(key, value).as_bytes())?;
            }
            None => {
                println!("::set-output name={}::{}", key, escape_data(value));
            }
        }
        Ok(())
    }
}

/// Format a `GITHUB_OUTPUT` file entry, switching to heredoc syntax for multiline values
pub fn format_output_entry(key: &str, value: &str) -> String {
    if value.contains('\n') {
        let delimiter = format!(
            "ghadelimiter_{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        format!("{key}<<{delimiter}\n{value}\n{delimiter}\n")
    } else {
        format!("{key}={value}\n")
    }
}

/// Outputs collected in memory
#[derive(Debug, Default)]
pub struct MemoryOutputs {
    entries: Mutex<Vec<(String, String)>>,
}

impl MemoryOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value written for `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()?
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OutputSink for MemoryOutputs {
    fn set_output(&self, key: &str, value: &str) -> Result<(), ActionError> {
        self.entries
            .lock()
            .map_err(|e| ActionError::Internal(e.to_string()))?
            .push((key.to_string(), value.to_string()));
        Ok(())
    }
}

/// Emit an error annotation on the workflow run
pub fn annotate_error(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Escape a value for use inside a workflow command
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
