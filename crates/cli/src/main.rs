mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Generate tag manager templates from tracking data products.
#[derive(Parser)]
#[command(
    name = "tagsynth",
    version,
    about = "Generate tag manager templates from tracking data products"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Configuration file (defaults to ./tagsynth.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `tagsynth_resolver=debug` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a tag template from a data product file or catalog id
    Generate {
        /// Path to a data product JSON file, or a catalog data product id
        source: String,
        #[command(flatten)]
        resolution: ResolutionArgs,
        /// Directory to write the template into
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Also write the resolved data product, parameters, code and permissions
        #[arg(long)]
        intermediates: bool,
        /// Permissions template JSON replacing the built-in one
        #[arg(long)]
        permissions_template: Option<PathBuf>,
        /// Seed every event's context with an event_specification entity
        #[arg(long)]
        event_specification_context: bool,
    },

    /// Attach every referenced schema to a data product and print it
    Resolve {
        /// Path to a data product JSON file, or a catalog data product id
        source: String,
        #[command(flatten)]
        resolution: ResolutionArgs,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Download a data product from the catalog
    Fetch {
        /// Catalog data product id
        id: String,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Where schemas come from.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ResolutionArgs {
    /// Directory of schemas in registry layout, consulted first
    #[arg(long)]
    schemas: Option<PathBuf>,
    /// Never touch the network: only --schemas is consulted
    #[arg(long)]
    offline: bool,
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let app_config = match config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("configuration error: {}", e), cli.output, cli.quiet);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Generate {
            source,
            resolution,
            out,
            intermediates,
            permissions_template,
            event_specification_context,
        } => commands::generate::cmd_generate(
            &commands::generate::GenerateArgs {
                source,
                resolution,
                out,
                intermediates,
                permissions_template,
                event_specification_context,
            },
            &app_config,
            cli.output,
            cli.quiet,
        ),
        Commands::Resolve {
            source,
            resolution,
            out,
        } => commands::resolve::cmd_resolve(
            &source,
            &resolution,
            out.as_deref(),
            &app_config,
            cli.output,
            cli.quiet,
        ),
        Commands::Fetch { id, out } => {
            commands::fetch::cmd_fetch(&id, out.as_deref(), &app_config, cli.output, cli.quiet)
        }
    };

    if let Err(msg) = result {
        report_error(&msg, cli.output, cli.quiet);
        process::exit(1);
    }
}

/// Report an error message in the requested output format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}
