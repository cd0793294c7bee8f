use std::fmt;

use super::table::ResultTable;

#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub success: bool,
    pub rendering: String,
    pub table: Option<ResultTable>,
}

impl CommandResult {
    pub fn ok(rendering: impl Into<String>) -> Self {
        Self {
            success: true,
            rendering: rendering.into(),
            table: None,
        }
    }

    pub fn failed(rendering: impl Into<String>) -> Self {
        Self {
            success: false,
            rendering: rendering.into(),
            table: None,
        }
    }

    /// Successful result whose table is parsed from the rendering.
    pub fn rendered_table(rendering: impl Into<String>) -> Self {
        let rendering = rendering.into();
        let table = ResultTable::parse(&rendering);
        Self {
            success: true,
            rendering,
            table,
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.rendering.contains(needle)
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendering)
    }
}
