use crate::error::{HarnessError, Result};

const VERTICALS: [char; 3] = ['|', '║', '│'];
const HORIZONTALS: [char; 4] = ['-', '=', '═', '─'];
const JUNCTIONS: &[char] = &[
    '+', '╔', '╗', '╚', '╝', '╠', '╣', '╦', '╩', '╬', '╤', '╧', '╪', '╟', '╢', '┌', '┐', '└', '┘',
    '┼', '├', '┤', '┬', '┴',
];

/// A cell position in a result table, named for error reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub index: usize,
    pub name: &'static str,
}

impl Column {
    pub const fn new(index: usize, name: &'static str) -> Self {
        Column { index, name }
    }
}

pub mod columns {
    use super::Column;

    pub const TASK_NAME: Column = Column::new(0, "Task Name");
    pub const TASK_DEFINITION: Column = Column::new(1, "Task Definition");
    pub const EXECUTION_ID: Column = Column::new(1, "ID");
    pub const STATUS_VALUE: Column = Column::new(1, "Value");

    /// Row 0 is the header, row 1 the most recent execution.
    pub const LATEST_EXECUTION_ROW: usize = 1;
    /// Row of the status table holding the execution end time.
    pub const END_TIME_ROW: usize = 6;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    rows: Vec<Vec<Option<String>>>,
}

impl ResultTable {
    pub fn from_rows(rows: Vec<Vec<Option<String>>>) -> Self {
        ResultTable { rows }
    }

    /// Parses the first table found in a shell rendering. Border lines set the
    /// column boundaries for the data lines that follow them, so cells may
    /// contain separator characters (`a || b`).
    pub fn parse(text: &str) -> Option<Self> {
        let mut rows = Vec::new();
        let mut boundaries: Option<Vec<usize>> = None;

        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            let trimmed = line.trim();
            if is_border(trimmed) {
                boundaries = Some(junction_positions(line));
                continue;
            }
            if !is_data(trimmed) {
                if !rows.is_empty() {
                    break;
                }
                boundaries = None;
                continue;
            }
            let cells = boundaries
                .as_deref()
                .and_then(|b| split_at_boundaries(line, b))
                .unwrap_or_else(|| split_on_separators(trimmed));
            rows.push(cells);
        }

        if rows.is_empty() {
            None
        } else {
            Some(ResultTable { rows })
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .and_then(|cell| cell.as_deref())
    }

    /// Like `value`, but a position outside the table is an error rather
    /// than an absent cell.
    pub fn cell(&self, row: usize, column: Column) -> Result<Option<&str>> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column.index))
            .map(|cell| cell.as_deref())
            .ok_or(HarnessError::MissingCell {
                row,
                column: column.index,
                name: column.name,
            })
    }

    pub fn cell_u64(&self, row: usize, column: Column) -> Result<u64> {
        let value = self.cell(row, column)?.unwrap_or_default();
        value.parse::<u64>().map_err(|_| HarnessError::InvalidCell {
            row,
            column: column.index,
            expected: "execution id",
            value: value.to_string(),
        })
    }
}

fn is_vertical(c: char) -> bool {
    VERTICALS.contains(&c)
}

fn is_junction(c: char) -> bool {
    JUNCTIONS.contains(&c)
}

/// A border is made only of drawing characters and has a junction or a run
/// of at least three horizontals, so a `| - |` data row is not one.
fn is_border(trimmed: &str) -> bool {
    let is_horizontal = |c: char| HORIZONTALS.contains(&c);
    let drawing_only = trimmed
        .chars()
        .all(|c| c == ' ' || is_junction(c) || is_vertical(c) || is_horizontal(c));
    if trimmed.is_empty() || !drawing_only || !trimmed.chars().any(is_horizontal) {
        return false;
    }
    let mut run = 0;
    let mut longest = 0;
    for c in trimmed.chars() {
        run = if is_horizontal(c) { run + 1 } else { 0 };
        longest = longest.max(run);
    }
    trimmed.chars().any(is_junction) || longest >= 3
}

fn is_data(trimmed: &str) -> bool {
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) => is_vertical(first) && is_vertical(last),
        _ => false,
    }
}

fn junction_positions(line: &str) -> Vec<usize> {
    line.chars()
        .enumerate()
        .filter(|(_, c)| is_junction(*c) || is_vertical(*c))
        .map(|(i, _)| i)
        .collect()
}

fn split_at_boundaries(line: &str, boundaries: &[usize]) -> Option<Vec<Option<String>>> {
    let chars: Vec<char> = line.chars().collect();
    if boundaries.len() < 2 {
        return None;
    }
    let aligned = boundaries
        .iter()
        .all(|&i| chars.get(i).is_some_and(|c| is_vertical(*c)));
    if !aligned {
        return None;
    }
    let cells = boundaries
        .windows(2)
        .map(|w| to_cell(&chars[w[0] + 1..w[1]].iter().collect::<String>()))
        .collect();
    Some(cells)
}

fn split_on_separators(trimmed: &str) -> Vec<Option<String>> {
    let inner = trimmed.strip_prefix(is_vertical).unwrap_or(trimmed);
    let inner = inner.strip_suffix(is_vertical).unwrap_or(inner);
    inner.split(is_vertical).map(to_cell).collect()
}

fn to_cell(raw: &str) -> Option<String> {
    let cell = raw.trim();
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}
