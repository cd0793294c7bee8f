pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod shell;

pub use config::{HarnessConfig, PollConfig, ShellConfig};
pub use error::{HarnessError, Result};
pub use manager::{poll::PollOutcome, registry::TaskRegistry, task_template::TaskCommandTemplate};
pub use models::{command::ShellCommand, result::CommandResult, table::ResultTable};
pub use shell::{ProcessShell, ScriptedShell, Shell};
