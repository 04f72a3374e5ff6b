//! `docroute` command line front end.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and initialize logging.
//! 2. Load config ([`docroute::config::load_config`]) and build the provider table.
//! 3. Run the subcommand through a [`docroute::Orchestrator`].
//! 4. Render as terminal output ([`report::terminal`]) or JSON.
//!
//! Any routing or back-end error exits with status `1`.

mod cli;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{collect_options, Cli, Command, OutputFormat};
use docroute::config::load_config;
use docroute::{BackendId, Orchestrator};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "docroute=debug"
    } else {
        "docroute=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let config = load_config(&cwd, cli.config.as_deref())?;
    let orchestrator = Orchestrator::new(config.build_registry());

    match cli.command {
        Command::Detect { file, hint } => {
            let info = orchestrator.describe_routing(&file, hint.as_deref())?;
            match cli.format {
                OutputFormat::Terminal => report::terminal::render_routing(&file, &info),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
            }
        }
        Command::Analyze {
            file,
            hint,
            options,
        } => {
            let result = orchestrator.analyze(&file, hint.as_deref(), &collect_options(options))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Chunk {
            file,
            result,
            strategy,
            hint,
            options,
        } => {
            let content = std::fs::read_to_string(&result)
                .with_context(|| format!("failed to read {}", result.display()))?;
            let prior: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("invalid analysis result in {}", result.display()))?;
            let strategy = strategy.unwrap_or_else(|| config.default_strategy.clone());

            let chunks = orchestrator.chunk(
                &file,
                &prior,
                &strategy,
                hint.as_deref(),
                &collect_options(options),
            )?;
            println!("{}", serde_json::to_string_pretty(&chunks)?);
        }
        Command::Backends => {
            let backends: Vec<_> = BackendId::ALL
                .into_iter()
                .map(|id| orchestrator.backend_info(id))
                .collect();
            match cli.format {
                OutputFormat::Terminal => report::terminal::render_backends(&backends),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&backends)?),
            }
        }
        Command::Extensions { backend } => {
            let extensions = orchestrator.extensions_for(backend.as_ref().map(BackendId::from));
            match cli.format {
                OutputFormat::Terminal => report::terminal::render_extensions(&extensions),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&extensions)?),
            }
        }
    }

    Ok(())
}
