//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use eduscol_crawler::{HarvestReport, Harvester};
use eduscol_shared::{
    AppConfig, HarvestConfig, OrganizeConfig, ProgressReporter, init_config, load_config,
    load_config_from,
};
use eduscol_taxonomy::{OrganizeReport, Organizer};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// eduscol: harvest and organize official curriculum documents.
#[derive(Parser)]
#[command(
    name = "eduscol",
    version,
    about = "Harvest curriculum program documents and organize their extracted texts.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to load instead of ~/.eduscol/eduscol.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
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

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Crawl the portal and download every program document.
    Harvest {
        /// Site root carrying the discipline list.
        #[arg(long)]
        root_url: Option<String>,

        /// Download directory (defaults to `crawl.download_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Pause between disciplines, in milliseconds.
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Skip the static cycle documents.
        #[arg(long)]
        no_static: bool,

        /// Print the run report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Download only the static cycle documents.
    Static {
        /// Download directory (defaults to `crawl.download_dir`).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Copy extracted text files into the taxonomy tree.
    Organize {
        /// Tree of extracted text files.
        #[arg(long)]
        source: Option<PathBuf>,

        /// Root of the taxonomy tree.
        #[arg(long)]
        target: Option<PathBuf>,

        /// Print the run report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the taxonomy record for a folder and file name.
    Classify {
        /// Parent folder name (discipline or cycle).
        folder: String,

        /// File name.
        file: String,
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
        0 => "eduscol=info",
        1 => "eduscol=debug",
        _ => "eduscol=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

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
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Command::Harvest {
            root_url,
            out,
            delay_ms,
            no_static,
            json,
        } => {
            let mut harvest = HarvestConfig::from(&config);
            if let Some(root_url) = root_url {
                harvest.root_url = root_url;
            }
            if let Some(out) = out {
                harvest.download_dir = out;
            }
            if let Some(delay_ms) = delay_ms {
                harvest.discipline_delay = Duration::from_millis(delay_ms);
            }
            if no_static {
                harvest.include_static = false;
            }
            cmd_harvest(harvest, json).await
        }
        Command::Static { out } => {
            let mut harvest = HarvestConfig::from(&config);
            if let Some(out) = out {
                harvest.download_dir = out;
            }
            cmd_static(harvest).await
        }
        Command::Organize {
            source,
            target,
            json,
        } => {
            let mut organize = OrganizeConfig::from(&config);
            if let Some(source) = source {
                organize.source_dir = source;
            }
            if let Some(target) = target {
                organize.target_dir = target;
            }
            cmd_organize(&organize, json)
        }
        Command::Classify { folder, file } => cmd_classify(&folder, &file),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

/// Load the config named by `--config`, or the default file.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_harvest(config: HarvestConfig, json: bool) -> Result<()> {
    info!(
        root = %config.root_url,
        out = %config.download_dir.display(),
        include_static = config.include_static,
        "starting harvest"
    );

    let harvester = Harvester::new(config)?;
    let reporter = CliProgress::new();
    let result = harvester.run(&reporter).await;
    reporter.done();
    let report = result.map_err(|e| eyre!("harvest aborted: {e}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_harvest_summary(&report);
    }

    Ok(())
}

async fn cmd_static(config: HarvestConfig) -> Result<()> {
    info!(out = %config.download_dir.display(), "downloading static resources");

    let harvester = Harvester::new(config)?;
    let reporter = CliProgress::new();
    reporter.phase("Downloading static resources");

    let mut report = HarvestReport::default();
    harvester.load_static_resources(&mut report, &reporter).await;
    reporter.done();

    println!();
    println!("  Static resources");
    println!("  Downloaded: {}", report.static_downloaded);
    println!("  Failed:     {}", report.static_failed);
    println!();

    Ok(())
}

fn cmd_organize(config: &OrganizeConfig, json: bool) -> Result<()> {
    let organizer = Organizer::new(&config.target_dir);
    let reporter = CliProgress::new();
    reporter.phase("Organizing text files");

    let result = organizer.organize_tree(&config.source_dir, &reporter);
    reporter.done();
    let report: OrganizeReport = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("  Organized: {}", report.organized);
        println!("  Failed:    {}", report.failed);
        println!("  Target:    {}", config.target_dir.display());
        println!(
            "  Time:      {:.1}s",
            Duration::from_millis(report.elapsed_ms).as_secs_f64()
        );
        println!();
    }

    Ok(())
}

fn cmd_classify(folder: &str, file: &str) -> Result<()> {
    let record = eduscol_taxonomy::classify(folder, file);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

fn print_harvest_summary(report: &HarvestReport) {
    println!();
    println!("  Harvest finished");
    println!(
        "  Disciplines: {} ({} skipped)",
        report.disciplines_found, report.disciplines_skipped
    );
    println!(
        "  Programs:    {} included, {} excluded, {} malformed, {} ambiguous",
        report.programs_included,
        report.programs_excluded,
        report.programs_malformed,
        report.ambiguous_titles.len()
    );
    println!(
        "  Documents:   {} downloaded, {} failed",
        report.documents_downloaded, report.documents_failed
    );
    println!(
        "  Static:      {} downloaded, {} failed",
        report.static_downloaded, report.static_failed
    );
    println!(
        "  Time:        {:.1}s",
        Duration::from_millis(report.elapsed_ms).as_secs_f64()
    );

    if !report.ambiguous_titles.is_empty() {
        println!();
        println!("  Titles to review:");
        for title in &report.ambiguous_titles {
            println!("    - {title}");
        }
    }
    println!();
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
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn discipline_started(&self, name: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Discipline [{current}/{total}] {name}"));
    }

    fn document_saved(&self, path: &str) {
        self.spinner.set_message(format!("Saved {path}"));
    }

    fn file_organized(&self, path: &str, current: usize) {
        self.spinner.set_message(format!("Organized [{current}] {path}"));
    }

    fn done(&self) {
        self.spinner.finish_and_clear();
    }
}
