use anyhow::Context;
use clap::{Parser, Subcommand};
use locus_engine::common::formatter::format_outline;
use locus_engine::config::{ConfigLoader, LocusConfig, OutputFormat};
use locus_engine::formatter::{ResolutionReport, format_report};
use locus_engine::{FileSnapshotSource, LocatorSpec, Resolver, ResolverError, SnapshotSource};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "locus", version, about = "Resolve element locators against page snapshots")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to ./locus.yaml, then ~/.locus/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a locator file against a snapshot and report the outcome
    Resolve {
        /// JSON page snapshot
        #[arg(long)]
        snapshot: PathBuf,
        /// YAML or JSON locator
        #[arg(long)]
        locator: PathBuf,
        /// Print the report as JSON regardless of config
        #[arg(long)]
        json: bool,
    },
    /// Print a snapshot as an indented outline with node ids
    Inspect {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so reports on stdout stay machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref()).await?;

    match args.command {
        Command::Resolve {
            snapshot,
            locator,
            json,
        } => {
            let code = resolve(&config, &snapshot, &locator, json).await?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Command::Inspect { snapshot } => {
            let tree = FileSnapshotSource::new(&snapshot)
                .snapshot()
                .await
                .with_context(|| format!("loading {}", snapshot.display()))?;
            print!("{}", format_outline(&tree, &config.output.sensitive_fields)?);
        }
        Command::Config => {
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<LocusConfig> {
    let config = match path {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConfigLoader::load_default().await?,
    };
    debug!(strategies = ?config.resolver.strategy_order, "configuration loaded");
    Ok(config)
}

/// Returns the process exit code for the outcome.
async fn resolve(
    config: &LocusConfig,
    snapshot: &Path,
    locator: &Path,
    json: bool,
) -> anyhow::Result<i32> {
    let spec = LocatorSpec::load_from(locator)
        .await
        .with_context(|| format!("loading locator {}", locator.display()))?;
    let tree = FileSnapshotSource::new(snapshot)
        .snapshot()
        .await
        .with_context(|| format!("loading snapshot {}", snapshot.display()))?;

    let resolver = Resolver::from_config(&config.resolver);
    let outcome = resolver.resolve(&spec, tree.root().map_err(ResolverError::from)?);
    let report = ResolutionReport::from_outcome(&spec, &outcome, &tree);

    if json || config.output.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report));
    }

    Ok(match &outcome {
        Ok(_) => 0,
        Err(err) => err.exit_code(),
    })
}
