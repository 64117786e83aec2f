//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use rosterscout_core::pipeline::{ProgressReporter, RunSummary};
use rosterscout_core::report::{RosterInput, build_report};
use rosterscout_lookup::{ProfileFetcher, clean_name, resolve};
use rosterscout_shared::{AppConfig, Database, LookupConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// RosterScout: match a meet roster against public lifting results.
#[derive(Parser)]
#[command(
    name = "rosterscout",
    version,
    about = "Enrich a competition roster with each athlete's results history.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Results database selectable on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum DatabaseArg {
    Openipf,
    Openpowerlifting,
}

impl From<DatabaseArg> for Database {
    fn from(arg: DatabaseArg) -> Self {
        match arg {
            DatabaseArg::Openipf => Database::OpenIpf,
            DatabaseArg::Openpowerlifting => Database::OpenPowerlifting,
        }
    }
}

/// Lookup overrides shared by the commands that query the results database.
#[derive(clap::Args)]
pub(crate) struct LookupArgs {
    /// Results database to search (defaults to config, then openipf).
    #[arg(long)]
    pub database: Option<DatabaseArg>,

    /// Maximum roster entries resolving at once.
    #[arg(long)]
    pub max_in_flight: Option<u32>,

    /// Per-request timeout in seconds for profile fetches.
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build a JSON report for every athlete on a meet roster.
    Report {
        /// Any URL of the meet (roster, results, lifter page, ...).
        meet_url: String,

        /// Read the roster from a saved HTML page instead of fetching it.
        #[arg(long)]
        roster_html: Option<PathBuf>,

        /// Write the report to this file instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Look up a single athlete by name or roster label.
    Lookup {
        /// Display name or raw roster label, e.g. "105 - Anthony Hill".
        name: String,

        #[command(flatten)]
        lookup: LookupArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "rosterscout=info",
        1 => "rosterscout=debug",
        _ => "rosterscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so a report on stdout stays valid JSON.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Report {
            meet_url,
            roster_html,
            out,
            lookup,
        } => cmd_report(&meet_url, roster_html, out, &lookup).await,
        Command::Lookup { name, lookup } => cmd_lookup(&name, &lookup).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Merge config file values with command-line overrides.
fn resolve_lookup_config(config: &AppConfig, args: &LookupArgs) -> Result<LookupConfig> {
    let mut merged = config.clone();
    if let Some(database) = args.database {
        // A file-level base_url belongs to the file's database.
        merged.lookup.database = database.into();
        merged.lookup.base_url = None;
    }
    if let Some(n) = args.max_in_flight {
        merged.lookup.max_in_flight = n;
    }
    if let Some(secs) = args.timeout {
        merged.lookup.fetch_timeout_secs = secs;
    }
    Ok(LookupConfig::try_from(&merged)?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_report(
    meet_url: &str,
    roster_html: Option<PathBuf>,
    out: Option<PathBuf>,
    args: &LookupArgs,
) -> Result<()> {
    let config = load_config()?;
    let lookup = resolve_lookup_config(&config, args)?;

    let roster = match roster_html {
        Some(path) => {
            if !path.is_file() {
                return Err(eyre!("roster file '{}' does not exist", path.display()));
            }
            RosterInput::File(path)
        }
        None => RosterInput::Fetch {
            timeout: Duration::from_secs(config.roster.timeout_secs),
        },
    };

    info!(
        meet_url,
        database = %lookup.database,
        max_in_flight = lookup.max_in_flight,
        "building report"
    );

    let reporter = CliProgress::new();
    let result = build_report(meet_url, roster, &lookup, &reporter).await;
    reporter.spinner.finish_and_clear();
    let report = result?;

    let json = serde_json::to_string_pretty(&report)?;
    match out {
        Some(path) => {
            std::fs::write(&path, json)
                .map_err(|e| eyre!("failed to write '{}': {e}", path.display()))?;
            eprintln!();
            eprintln!("  Report written!");
            eprintln!("  Meet:    {}", report.meet_url);
            eprintln!("  People:  {}", report.people.len());
            eprintln!("  Matched: {}", report.matched_count());
            eprintln!("  Path:    {}", path.display());
            eprintln!();
        }
        None => println!("{json}"),
    }

    for person in report.people.iter().filter(|p| !p.is_matched()) {
        if let Some(url) = person.search_url(lookup.database) {
            info!(name = %person.name, search = %url, "no profile found");
        }
    }

    Ok(())
}

async fn cmd_lookup(name: &str, args: &LookupArgs) -> Result<()> {
    let config = load_config()?;
    let lookup = resolve_lookup_config(&config, args)?;

    let display_name = clean_name(name);
    if display_name.is_empty() {
        return Err(eyre!("name must not be empty"));
    }

    let fetcher = ProfileFetcher::new(&lookup)?;
    let outcome = resolve(&display_name, &fetcher).await;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn lookup_finished(&self, name: &str, found: bool, completed: usize, total: usize) {
        let mark = if found { "found" } else { "not found" };
        self.spinner
            .set_message(format!("Looking up [{completed}/{total}] {name}: {mark}"));
    }

    fn done(&self, summary: &RunSummary) {
        self.spinner.set_message(format!(
            "Matched {}/{} in {:.1}s",
            summary.matched,
            summary.total,
            summary.elapsed.as_secs_f64()
        ));
    }
}
