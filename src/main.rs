//! Cluster command line tool binary

use clap::{Parser, Subcommand};
use cluster_cli::{CacheStore, CliError, Config, HttpTransport, Result, ScopeExpander, StatusCommand};
use std::io::Write;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Query the running status of cluster services and expand scopes
#[derive(Parser, Debug)]
#[command(name = "cluster-cli", version, about, long_about = None)]
struct Cli {
    /// Log request and cache activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Query the current running status of cluster services
    ///
    /// When called without arguments, reports on every known service. One or
    /// more service names limit the report to those services.
    Status {
        /// Scrape the service manifest again even if the cache is fresh
        #[arg(long)]
        refresh: bool,

        /// Services to include in the report
        services: Vec<String>,
    },

    /// Expand the given scope set, including scopes implied by roles
    ExpandScope {
        #[arg(required = true)]
        scopes: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_tracing(cli.verbose);

    let config = Config::from_env();
    if let Err(e) = config.validate() {
        return report(Err(CliError::Config(e)), "error", &mut std::io::stderr());
    }

    match cli.command {
        Commands::Status { refresh, services } => report(
            status(&config, refresh, &services).await,
            "error",
            &mut std::io::stderr(),
        ),
        Commands::ExpandScope { scopes } => report(
            expand_scope(&config, &scopes).await,
            "Error expanding scopes",
            &mut std::io::stderr(),
        ),
    }
}

/// Print a failed command's error to `err` and pick the process exit code
fn report<W: Write>(result: Result<()>, prefix: &str, err: &mut W) -> ExitCode {
    ExitCode::from(exit_status(result, prefix, err))
}

fn exit_status<W: Write>(result: Result<()>, prefix: &str, err: &mut W) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            // Nothing left to report to if stderr itself is gone
            let _ = writeln!(err, "{}: {}", prefix, e);
            1
        }
    }
}

async fn status(config: &Config, refresh: bool, services: &[String]) -> Result<()> {
    debug!("Ping URL cache at {}", config.cache_path().display());

    let transport = HttpTransport::new(config.http_timeout)?;
    let cache = CacheStore::new(config.cache_path(), config.max_cache_age)?;
    let command = StatusCommand::new(&transport, cache, config.manifest_url.as_str())
        .force_refresh(refresh);

    let mut stdout = std::io::stdout().lock();
    command.run(services, &mut stdout).await?;
    Ok(())
}

async fn expand_scope(config: &Config, scopes: &[String]) -> Result<()> {
    let transport = HttpTransport::new(config.http_timeout)?;
    let expander = ScopeExpander::new(&transport, config.auth_url.as_str());

    for scope in expander.expand(scopes).await? {
        println!("{}", scope);
    }
    Ok(())
}

/// Initialize logging to stderr so it never mixes with command output
fn initialize_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact();

    let filter_layer = if verbose {
        tracing_subscriber::EnvFilter::new(default_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
