use std::fmt::Display;

use log::{debug, info};

use super::{
    definition,
    poll::{poll_until, PollOutcome},
    registry::TaskRegistry,
};
use crate::config::PollConfig;
use crate::error::{HarnessError, Result};
use crate::models::{
    command::ShellCommand,
    result::CommandResult,
    table::{columns, ResultTable},
};
use crate::shell::Shell;

const LOG_STARTED_MARKER: &str = "Starting";
const DEFAULT_EXECUTION_NAME: &str = "foo";
const INVALID_PLATFORM: &str = "foo";
const INVALID_EXECUTION_ID: u64 = 88;

/// Task commands run against a shell, mirroring the client-side task
/// operations. Every task created or launched is tracked so
/// `destroy_created_tasks` can clean up after a test.
pub struct TaskCommandTemplate<S: Shell> {
    shell: S,
    registry: TaskRegistry,
    poll: PollConfig,
}

impl<S: Shell> TaskCommandTemplate<S> {
    pub fn new(shell: S) -> Self {
        Self::with_poll(shell, PollConfig::default())
    }

    pub fn with_poll(shell: S, poll: PollConfig) -> Self {
        TaskCommandTemplate {
            shell,
            registry: TaskRegistry::new(),
            poll,
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut S {
        &mut self.shell
    }

    pub fn into_parts(self) -> (S, TaskRegistry) {
        (self.shell, self.registry)
    }

    /// Creates a task from a definition template, `%s`/`%d` placeholders
    /// filled from `values`, then checks the task shows up in `task list`.
    pub fn create(&mut self, name: &str, template: &str, values: &[&dyn Display]) -> Result<()> {
        let resolved = definition::resolve(template, values)?;
        let cr = self.run(&ShellCommand::create(name, &resolved))?;
        self.registry.track(name);

        let expected = format!("Created new task '{}'", name);
        if cr.rendering != expected {
            return Err(HarnessError::Mismatch {
                expected,
                actual: cr.rendering,
            });
        }
        info!("Created task '{}'.", name);
        self.verify_exists(name, &resolved)
    }

    pub fn launch(&mut self, name: &str) -> Result<u64> {
        self.launch_command(name, ShellCommand::launch(name))
    }

    pub fn launch_with_alternate_ctr(&mut self, name: &str, runner: &str) -> Result<u64> {
        self.launch_command(name, ShellCommand::launch_with_runner(name, runner))
    }

    /// Launches the task, waits for its execution to end and returns the log.
    pub fn get_task_execution_log(&mut self, name: &str) -> Result<String> {
        let id = self.launch_for_log(name)?;
        let command = ShellCommand::ExecutionLog { id, platform: None };
        let cr = self.run(&command)?;
        if !cr.contains(LOG_STARTED_MARKER) {
            return Err(HarnessError::UnexpectedResponse {
                command: command.to_string(),
                expected: LOG_STARTED_MARKER.to_string(),
                rendering: cr.rendering,
            });
        }
        Ok(cr.rendering)
    }

    pub fn get_task_execution_log_invalid_platform(&mut self, name: &str) -> Result<CommandResult> {
        let id = self.launch_for_log(name)?;
        self.run(&ShellCommand::ExecutionLog {
            id,
            platform: Some(INVALID_PLATFORM.to_string()),
        })
    }

    pub fn get_task_execution_log_invalid_id(&mut self) -> Result<CommandResult> {
        self.run(&ShellCommand::ExecutionLog {
            id: INVALID_EXECUTION_ID,
            platform: None,
        })
    }

    pub fn stop(&mut self, id: u64) -> Result<CommandResult> {
        self.run(&ShellCommand::ExecutionStop(id))
    }

    pub fn task_execution_list(&mut self) -> Result<CommandResult> {
        self.run(&ShellCommand::ExecutionList { name: None })
    }

    pub fn task_platform_list(&mut self) -> Result<CommandResult> {
        self.run(&ShellCommand::PlatformList)
    }

    /// Lists executions of the task named `foo`.
    pub fn task_execution_list_by_default_name(&mut self) -> Result<CommandResult> {
        self.task_execution_list_by_name(DEFAULT_EXECUTION_NAME)
    }

    pub fn task_execution_list_by_name(&mut self, name: &str) -> Result<CommandResult> {
        self.run(&ShellCommand::execution_list_by_name(name))
    }

    pub fn task_execution_current(&mut self) -> Result<CommandResult> {
        self.run(&ShellCommand::ExecutionCurrent)
    }

    pub fn task_validate(&mut self, name: &str) -> Result<CommandResult> {
        self.run(&ShellCommand::Validate(name.to_string()))
    }

    pub fn task_execution_status(&mut self, id: u64) -> Result<CommandResult> {
        self.run(&ShellCommand::ExecutionStatus(id))
    }

    pub fn task_execution_cleanup(&mut self, id: u64) -> Result<CommandResult> {
        self.run(&ShellCommand::ExecutionCleanup(id))
    }

    /// Destroys tracked tasks newest first, so composed task children go
    /// before their parents. A name is tracked once, at its first create or
    /// launch, so `create a; create b; launch a` tears down `b` then `a` and
    /// never destroys `a` twice. Stops at the first failure, leaving that task
    /// and the older ones tracked.
    pub fn destroy_created_tasks(&mut self) -> Result<()> {
        while let Some(name) = self.registry.last().map(str::to_string) {
            let cr = self.run(&ShellCommand::Destroy(name.clone()))?;
            if !cr.success {
                return Err(HarnessError::DestroyFailed {
                    task: name,
                    rendering: cr.rendering,
                });
            }
            info!("Destroyed task '{}'.", name);
            self.registry.pop();
        }
        Ok(())
    }

    pub fn destroy_task(&mut self, name: &str) -> Result<()> {
        let cr = self.run(&ShellCommand::Destroy(name.to_string()))?;
        if !cr.success {
            return Err(HarnessError::DestroyFailed {
                task: name.to_string(),
                rendering: cr.rendering,
            });
        }
        info!("Destroyed task '{}'.", name);
        self.registry.remove(name);
        Ok(())
    }

    pub fn destroy_all_tasks(&mut self) -> Result<()> {
        let cr = self.run(&ShellCommand::DestroyAll)?;
        if !cr.success {
            return Err(HarnessError::DestroyAllFailed {
                rendering: cr.rendering,
            });
        }
        info!("Destroyed all tasks.");
        self.registry.clear();
        Ok(())
    }

    /// Looks for a `task list` row with this name and definition. Doubled
    /// backslashes in `definition` are compared as single ones.
    pub fn verify_exists(&mut self, name: &str, definition: &str) -> Result<()> {
        let command = ShellCommand::List;
        let cr = self.run(&command)?;
        if !cr.success {
            return Err(HarnessError::CommandFailed {
                command: command.to_string(),
                rendering: cr.rendering,
            });
        }
        let table = require_table(&command, &cr)?;
        let expected = definition.replace("\\\\", "\\");

        let found = (0..table.row_count()).any(|row| {
            table.value(row, columns::TASK_NAME.index) == Some(name)
                && table.value(row, columns::TASK_DEFINITION.index) == Some(expected.as_str())
        });
        if found {
            Ok(())
        } else {
            Err(HarnessError::TaskNotFound(name.to_string()))
        }
    }

    fn run(&mut self, command: &ShellCommand) -> Result<CommandResult> {
        let line = command.to_string();
        let cr = self.shell.execute(&line)?;
        debug!("'{}' -> success={}", line, cr.success);
        Ok(cr)
    }

    fn launch_command(&mut self, name: &str, command: ShellCommand) -> Result<u64> {
        self.registry.track(name);
        let cr = self.run(&command)?;

        // the launch text carries the id only as prose, so read it back
        // from the execution list
        let list_command = ShellCommand::execution_list_by_name(name);
        let list = self.run(&list_command)?;
        let id = require_table(&list_command, &list)?
            .cell_u64(columns::LATEST_EXECUTION_ROW, columns::EXECUTION_ID)?;

        let expected = format!("with execution id {}", id);
        if !cr.contains(&expected) {
            return Err(HarnessError::UnexpectedResponse {
                command: command.to_string(),
                expected,
                rendering: cr.rendering,
            });
        }
        info!("Launched task '{}' with execution id {}.", name, id);
        Ok(id)
    }

    fn launch_for_log(&mut self, name: &str) -> Result<u64> {
        let id = self.launch(name)?;
        self.wait_for_end_time(id)?;
        Ok(id)
    }

    /// Waits for the execution's end time to be recorded. Running out of
    /// budget is not an error.
    pub fn wait_for_end_time(&mut self, id: u64) -> Result<PollOutcome> {
        let poll = self.poll;
        poll_until(poll, || self.is_ended(id))
    }

    fn is_ended(&mut self, id: u64) -> Result<bool> {
        let command = ShellCommand::ExecutionStatus(id);
        let cr = self.run(&command)?;
        if !cr.success {
            return Ok(false);
        }
        let end_time = require_table(&command, &cr)?
            .cell(columns::END_TIME_ROW, columns::STATUS_VALUE)?;
        Ok(end_time.is_some())
    }
}

fn require_table<'a>(command: &ShellCommand, cr: &'a CommandResult) -> Result<&'a ResultTable> {
    cr.table
        .as_ref()
        .ok_or_else(|| HarnessError::MissingTable(command.to_string()))
}
