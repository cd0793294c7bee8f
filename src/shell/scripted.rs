use std::collections::{HashMap, VecDeque};

use log::debug;

use super::Shell;
use crate::error::Result;
use crate::models::result::CommandResult;

/// In-memory shell answering from canned responses. Queued responses for a
/// line are consumed in order and the last one repeats.
#[derive(Debug, Default)]
pub struct ScriptedShell {
    responses: HashMap<String, VecDeque<CommandResult>>,
    history: Vec<String>,
}

impl ScriptedShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&mut self, line: impl Into<String>, result: CommandResult) -> &mut Self {
        self.responses.entry(line.into()).or_default().push_back(result);
        self
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn count(&self, line: &str) -> usize {
        self.history.iter().filter(|l| l.as_str() == line).count()
    }
}

impl Shell for ScriptedShell {
    fn execute(&mut self, line: &str) -> Result<CommandResult> {
        debug!("scripted: {}", line);
        self.history.push(line.to_string());
        let result = match self.responses.get_mut(line) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(result.unwrap_or_else(|| {
            CommandResult::failed(format!("Command failed: no scripted response for '{}'", line))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_responses_repeat_last() {
        let mut shell = ScriptedShell::new();
        shell
            .respond("task list", CommandResult::ok("first"))
            .respond("task list", CommandResult::ok("second"));

        assert_eq!(shell.execute("task list").unwrap().rendering, "first");
        assert_eq!(shell.execute("task list").unwrap().rendering, "second");
        assert_eq!(shell.execute("task list").unwrap().rendering, "second");
        assert_eq!(shell.count("task list"), 3);
    }

    #[test]
    fn unknown_line_fails() {
        let mut shell = ScriptedShell::new();
        let result = shell.execute("task launch nope").unwrap();
        assert!(!result.success);
        assert!(result.contains("no scripted response"));
    }
}
