//! Command-line front end for the step planner.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use step_planner::config::{PlannerConfig, DEFAULT_CONFIG_FILE};
use step_planner::keys::{KeyGenerator, SequentialKeyGenerator};
use step_planner::ProtocolFile;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan liquid-handling protocol steps into robot commands")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan every step of a protocol file and write the timeline as JSON
    Plan {
        /// Protocol file with invariantContext, initialRobotState and steps
        #[arg(long)]
        protocol: PathBuf,

        /// Write output here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Use sequential command keys regardless of configuration
        #[arg(long)]
        deterministic_keys: bool,
    },
    /// Print the resolved configuration
    CheckConfig,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = PlannerConfig::load_from(&cli.config)
        .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;
    init_tracing(&config.application.log_level);

    match cli.command {
        Commands::Plan {
            protocol,
            output,
            deterministic_keys,
        } => plan(&config, &protocol, output.as_deref(), deterministic_keys),
        Commands::CheckConfig => {
            let rendered =
                toml::to_string_pretty(&config).context("failed to render configuration")?;
            print!("{rendered}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // Logs go to stderr so JSON on stdout stays parseable.
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn plan(
    config: &PlannerConfig,
    protocol_path: &Path,
    output: Option<&Path>,
    deterministic_keys: bool,
) -> Result<ExitCode> {
    let protocol = ProtocolFile::load(protocol_path)
        .with_context(|| format!("failed to load protocol {:?}", protocol_path))?;

    let mut keys: Box<dyn KeyGenerator> = if deterministic_keys {
        Box::new(SequentialKeyGenerator::new(config.keys.prefix.clone()))
    } else {
        config.keys.generator()
    };
    let timeline = protocol.plan(keys.as_mut());

    let json = if config.output.pretty {
        serde_json::to_string_pretty(&timeline)
    } else {
        serde_json::to_string(&timeline)
    }
    .context("failed to serialize timeline")?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {:?}", path))?
        }
        None => println!("{json}"),
    }

    let warnings: usize = timeline.frames.iter().map(|f| f.warnings.len()).sum();
    if warnings > 0 {
        warn!(warnings, "planning produced warnings");
    }

    match &timeline.error {
        None => {
            info!(
                steps = timeline.frames.len(),
                commands = timeline.flatten_commands().len(),
                "protocol planned"
            );
            Ok(ExitCode::SUCCESS)
        }
        Some(failure) => {
            for err in &failure.errors {
                error!(step_index = failure.step_index, "{err}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
