use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clic_engine::ProviderRegistry;
use clic_registry::{EngineConfig, build_clap, default_config_path, load_app, prepare_from_matches};
use clic_types::{App, EmptyCommandPolicy, SchemaMode, SpecPolicy};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "clic", version, about = "Compose command line interfaces from declarative specs")]
struct Cli {
    /// Verbose logging
    #[arg(long, global = true)]
    verbose: bool,
    /// Allow empty descriptions on apps and commands
    #[arg(long, global = true)]
    permissive: bool,
    /// Bind a no-op provider to commands with neither provider nor subcommands
    #[arg(long, global = true)]
    allow_empty: bool,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Load and validate a spec file or directory
    Validate { path: PathBuf },
    /// Print the normalized app
    Show {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Parse arguments against the app and print the prepared invocation
    Run {
        path: PathBuf,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Print the effective config, optionally saving it as the new default
    Config {
        #[arg(long)]
        save: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let policy = resolve_policy(&cli)?;
    let registry = ProviderRegistry::with_defaults();
    debug!(?policy, ?registry, "starting clic");

    match &cli.command {
        CliCommand::Validate { path } => {
            let app = load(path, &registry, &policy)?;
            println!("ok: {} ({} leaf commands)", app.name, app.leaf_paths().len());
        }
        CliCommand::Show { path, format } => {
            let app = load(path, &registry, &policy)?;
            let rendered = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&app)?,
                OutputFormat::Yaml => serde_yaml::to_string(&app)?,
            };
            println!("{rendered}");
        }
        CliCommand::Run { path, args } => {
            let app = load(path, &registry, &policy)?;
            let argv = std::iter::once(app.name.clone()).chain(args.iter().cloned());
            let matches = match build_clap(&app).try_get_matches_from(argv) {
                Ok(matches) => matches,
                Err(error) => error.exit(),
            };
            let prepared = prepare_from_matches(&app, &matches)?;
            println!("{}", serde_json::to_string_pretty(&prepared)?);
        }
        CliCommand::Config { save } => {
            let config = EngineConfig { policy };
            if *save {
                config.save().context("failed to save clic config")?;
                debug!(path = %default_config_path().display(), "saved config");
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .try_init();
}

/// The config file's policy with command-line overrides applied.
fn resolve_policy(cli: &Cli) -> Result<SpecPolicy> {
    let mut policy = EngineConfig::load().context("failed to load clic config")?.policy;
    if cli.permissive {
        policy.schema_mode = SchemaMode::Permissive;
    }
    if cli.allow_empty {
        policy.empty_command = EmptyCommandPolicy::Noop;
    }
    Ok(policy)
}

fn load(path: &Path, registry: &ProviderRegistry, policy: &SpecPolicy) -> Result<App> {
    load_app(path, registry, policy).with_context(|| format!("failed to load app from {}", path.display()))
}
