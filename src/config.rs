use std::{fs, path::Path, time::Duration};

use serde::Deserialize;

use crate::error::{HarnessError, Result};

pub const PROGRAM_ENV: &str = "TASK_SHELL_PROGRAM";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct HarnessConfig {
    pub shell: ShellConfig,
    pub poll: PollConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub program: String,
    pub args: Vec<String>,
    pub prompt: String,
    pub exit_command: String,
    pub response_timeout_ms: u64,
    pub startup_timeout_ms: u64,
    /// A response line starting with any of these marks the command as failed.
    pub error_markers: Vec<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: "dataflow-shell".to_string(),
            args: Vec::new(),
            prompt: "dataflow:>".to_string(),
            exit_command: "exit".to_string(),
            response_timeout_ms: 30_000,
            startup_timeout_ms: 60_000,
            error_markers: vec!["Command failed".to_string(), "Error".to_string()],
        }
    }
}

impl ShellConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub max_wait_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            max_wait_ms: 3000,
        }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Number of sleep-then-check cycles the budget allows.
    pub fn max_cycles(&self) -> u64 {
        (self.max_wait_ms / self.interval_ms.max(1)).max(1)
    }
}

impl HarnessConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut config = Self::from_toml(&text)?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: HarnessConfig =
            toml::from_str(text).map_err(|e| HarnessError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(program) = std::env::var(PROGRAM_ENV) {
            if !program.trim().is_empty() {
                self.shell.program = program;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.shell.program.trim().is_empty() {
            return Err(HarnessError::Config("shell.program must not be empty".into()));
        }
        if self.shell.prompt.is_empty() {
            return Err(HarnessError::Config("shell.prompt must not be empty".into()));
        }
        if self.poll.interval_ms == 0 {
            return Err(HarnessError::Config("poll.interval_ms must be positive".into()));
        }
        Ok(())
    }
}
