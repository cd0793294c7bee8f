pub mod process;
pub mod scripted;

use crate::error::Result;
use crate::models::result::CommandResult;

pub use process::ProcessShell;
pub use scripted::ScriptedShell;

/// A command shell session. `Err` means the session itself broke; a command
/// the shell rejected comes back as a result with `success == false`.
pub trait Shell {
    fn execute(&mut self, line: &str) -> Result<CommandResult>;
}

impl<S: Shell + ?Sized> Shell for Box<S> {
    fn execute(&mut self, line: &str) -> Result<CommandResult> {
        (**self).execute(line)
    }
}
