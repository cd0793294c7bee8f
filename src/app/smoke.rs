use anyhow::{ensure, Result};
use crossterm::style::Stylize;
use log::error;

use task_shell_harness::{PollOutcome, Shell, TaskCommandTemplate};

/// Create a task, launch it and wait for the execution to record an end
/// time. Created tasks are destroyed whether or not the steps pass.
pub fn run_smoke<S: Shell>(
    tasks: &mut TaskCommandTemplate<S>,
    name: &str,
    definition: &str) -> Result<()>
{
    let outcome = run_steps(tasks, name, definition);
    let cleanup = tasks.destroy_created_tasks();
    if let Err(e) = &cleanup {
        error!("Cleanup failed: {}", e);
    }

    match &outcome {
        Ok(()) => println!("{} smoke scenario for '{}'", "PASS".green().bold(), name),
        Err(e) => println!("{} smoke scenario for '{}': {}", "FAIL".red().bold(), name, e),
    }
    outcome?;
    cleanup?;
    Ok(())
}

fn run_steps<S: Shell>(
    tasks: &mut TaskCommandTemplate<S>,
    name: &str,
    definition: &str) -> Result<()>
{
    tasks.create(name, definition, &[])?;
    step("create", name);

    let id = tasks.launch(name)?;
    ensure!(id >= 1, "execution id {} is not positive", id);
    step("launch", &format!("execution id {}", id));

    match tasks.wait_for_end_time(id)? {
        PollOutcome::Ended { cycles } => step("end time", &format!("recorded after {} poll(s)", cycles)),
        PollOutcome::Exhausted { cycles } => {
            anyhow::bail!("execution {} had no end time after {} poll(s)", id, cycles)
        }
    }
    Ok(())
}

fn step(label: &str, detail: &str) {
    println!("  {} {}: {}", "ok".green(), label, detail);
}
