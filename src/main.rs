mod app;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use task_shell_harness::{
    config::PROGRAM_ENV, HarnessConfig, ProcessShell, Shell, TaskCommandTemplate,
};

#[derive(Parser)]
#[command(name = "task-shell-harness", about = "Drive task commands through an interactive shell")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    /// Shell executable, overriding the configured one
    #[arg(long, env = PROGRAM_ENV)]
    program: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, launch and clean up one task
    Smoke {
        #[arg(long, default_value = "t1")]
        name: String,
        #[arg(long, default_value = "timestamp")]
        definition: String,
    },
    /// Submit a single command line
    Exec {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Type commands against the shell
    Interactive,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    app::logging::init(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    if let Some(program) = cli.program.clone() {
        config.shell.program = program;
    }

    let mut shell = ProcessShell::spawn(config.shell.clone())?;
    info!("{}", shell.banner().trim());

    match cli.command {
        Commands::Smoke { name, definition } => {
            let mut tasks = TaskCommandTemplate::with_poll(shell, config.poll);
            app::smoke::run_smoke(&mut tasks, &name, &definition)?;
        }
        Commands::Exec { command } => {
            let cr = shell.execute(&command.join(" "))?;
            println!("{}", cr.rendering);
            if let Some(table) = &cr.table {
                info!("parsed table with {} row(s)", table.row_count());
            }
            if !cr.success {
                anyhow::bail!("command failed");
            }
        }
        Commands::Interactive => app::cli::run_interactive(&mut shell)?,
    }
    Ok(())
}
