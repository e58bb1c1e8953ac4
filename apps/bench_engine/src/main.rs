mod commands;
mod config;

use clap::{Parser, Subcommand};
use selector::TaskComplexity;

#[derive(Parser)]
#[command(
    name = "bench_engine",
    about = "Latency benchmark engine for completion endpoints"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Benchmark every configured target across the builtin scenarios
    Run {
        /// Exit non-zero when performance thresholds are violated
        #[arg(long)]
        strict: bool,
    },
    /// Run one ad-hoc task on two targets and compare them
    Compare {
        first: String,
        second: String,
        /// Task description used as the prompt
        #[arg(long, default_value = "general reasoning")]
        task: String,
        /// Task complexity: low, medium, high or extreme
        #[arg(long, default_value = "medium")]
        complexity: String,
    },
    /// List configured targets
    Targets,
    /// Show configuration and credential status
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("CRITICAL: {:#}", e);
            eprintln!("Please copy config.example.toml to config.toml and configure it.");
            std::process::exit(1);
        }
    };

    let _guard = telemetry::init(&config.engine.log_dir);

    // Arm the process-wide clock so every command can report its runtime.
    common::time::measure();

    let result = match cli.command {
        Command::Run { strict } => commands::run_suite(&config, strict).await,
        Command::Compare {
            first,
            second,
            task,
            complexity,
        } => {
            let complexity = complexity
                .parse::<TaskComplexity>()
                .map_err(|e| anyhow::anyhow!(e))?;
            commands::compare(&config, &first, &second, &task, complexity).await
        }
        Command::Targets => {
            commands::list_targets(&config);
            Ok(())
        }
        Command::Status => {
            commands::status(&config);
            Ok(())
        }
    };

    tracing::info!("Command finished in {:.2}s", common::time::measure());
    result
}
