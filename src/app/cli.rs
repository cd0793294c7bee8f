use std::io::{self, Write};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    style::Stylize,
    terminal,
};

use task_shell_harness::Shell;

/// Forwards typed lines to the shell until `exit` or Esc.
pub fn run_interactive<S: Shell>(shell: &mut S) -> Result<()> {
    println!("Connected to shell. Enter a command or 'exit' to quit.");
    let mut commands_history: Vec<String> = Vec::new();
    let mut history_index = 0;

    loop {
        let Some(input) = read_line(&commands_history, &mut history_index)? else {
            break;
        };
        let line = input.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            println!("Exiting...");
            break;
        }

        commands_history.push(line.to_string());
        history_index = commands_history.len();

        let cr = shell.execute(line)?;
        if cr.success {
            println!("{}", cr.rendering);
        } else {
            println!("{}", cr.rendering.as_str().red());
        }
        if let Some(table) = &cr.table {
            println!("{}", format!("({} table rows)", table.row_count()).dark_grey());
        }
    }
    Ok(())
}

struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_line(history: &[String], history_index: &mut usize) -> Result<Option<String>> {
    let _raw = RawMode::enable()?;
    let mut input = String::new();
    redraw(&input)?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }
        match key_event.code {
            KeyCode::Enter => {
                print!("\r\n");
                io::stdout().flush()?;
                return Ok(Some(input));
            }
            KeyCode::Esc => {
                print!("\r\n");
                io::stdout().flush()?;
                return Ok(None);
            }
            KeyCode::Up => {
                if *history_index > 0 {
                    *history_index -= 1;
                }
                if let Some(command) = history.get(*history_index) {
                    input = command.clone();
                    redraw(&input)?;
                }
            }
            KeyCode::Down => {
                if *history_index < history.len() {
                    *history_index += 1;
                }
                input = history.get(*history_index).cloned().unwrap_or_default();
                redraw(&input)?;
            }
            KeyCode::Char(c) => {
                input.push(c);
                print!("{}", c);
                io::stdout().flush()?;
            }
            KeyCode::Backspace => {
                input.pop();
                redraw(&input)?;
            }
            _ => {}
        }
    }
}

fn redraw(input: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        cursor::MoveToColumn(0),
        terminal::Clear(terminal::ClearType::CurrentLine)
    )?;
    print!(">>> {}", input);
    stdout.flush()
}
