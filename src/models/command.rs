use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Create { name: String, definition: String },
    Launch { name: String, composed_task_runner: Option<String> },
    ExecutionList { name: Option<String> },
    ExecutionStatus(u64),
    ExecutionLog { id: u64, platform: Option<String> },
    ExecutionStop(u64),
    ExecutionCleanup(u64),
    ExecutionCurrent,
    PlatformList,
    Validate(String),
    Destroy(String),
    DestroyAll,
    List,
}

impl ShellCommand {
    /// `definition` is resolved DSL text. Its quotes are written as `\"` when
    /// the command is rendered, since the value goes inside a quoted option.
    pub fn create(name: &str, definition: &str) -> Self {
        ShellCommand::Create {
            name: name.to_string(),
            definition: definition.to_string(),
        }
    }

    pub fn launch(name: &str) -> Self {
        ShellCommand::Launch {
            name: name.to_string(),
            composed_task_runner: None,
        }
    }

    pub fn launch_with_runner(name: &str, runner: &str) -> Self {
        ShellCommand::Launch {
            name: name.to_string(),
            composed_task_runner: Some(runner.to_string()),
        }
    }

    pub fn execution_list_by_name(name: &str) -> Self {
        ShellCommand::ExecutionList {
            name: Some(name.to_string()),
        }
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellCommand::Create { name, definition } => write!(
                f,
                "task create {} --definition \"{}\"",
                name,
                definition.replace('"', "\\\"")
            ),
            ShellCommand::Launch {
                name,
                composed_task_runner: None,
            } => write!(f, "task launch {}", name),
            ShellCommand::Launch {
                name,
                composed_task_runner: Some(runner),
            } => write!(f, "task launch {} --composedTaskRunnerName {}", name, runner),
            ShellCommand::ExecutionList { name: None } => write!(f, "task execution list"),
            ShellCommand::ExecutionList { name: Some(name) } => {
                write!(f, "task execution list --name {}", name)
            }
            ShellCommand::ExecutionStatus(id) => write!(f, "task execution status --id {}", id),
            ShellCommand::ExecutionLog { id, platform: None } => {
                write!(f, "task execution log --id {}", id)
            }
            ShellCommand::ExecutionLog {
                id,
                platform: Some(platform),
            } => write!(f, "task execution log --id {} --platform {}", id, platform),
            ShellCommand::ExecutionStop(id) => write!(f, "task execution stop --ids {}", id),
            ShellCommand::ExecutionCleanup(id) => write!(f, "task execution cleanup --id {}", id),
            ShellCommand::ExecutionCurrent => write!(f, "task execution current"),
            ShellCommand::PlatformList => write!(f, "task platform-list"),
            ShellCommand::Validate(name) => write!(f, "task validate {}", name),
            ShellCommand::Destroy(name) => write!(f, "task destroy --name {}", name),
            ShellCommand::DestroyAll => write!(f, "task all destroy --force"),
            ShellCommand::List => write!(f, "task list"),
        }
    }
}
