//! cfgdiff - daily network device configuration diff reports
//!
//! The `cfgdiff` command minimizes device config diffs taken from a git
//! backup repository.
//!
//! ## Commands
//!
//! - `report`: Diff every backed-up device and write the daily report
//! - `normalize`: Minimize a single diff read from a file or stdin
//! - `vlans`: Expand or compress VLAN range lists

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

use cfgdiff_core::{
    compress, expand_within, is_git_repo, list_config_files, render_text, report_subject,
    write_report, Collector, DiffNormalizer, GitDiffSource, NoiseFilter, NormalizeConfig, Report,
    Settings, VlanId, DEFAULT_MAX_VLANS_PER_LINE, DEFAULT_MAX_VLAN_ID, DEFAULT_PREAMBLE_LINES,
};

#[derive(Parser)]
#[command(name = "cfgdiff")]
#[command(author = "Stevedores Org")]
#[command(version = cfgdiff_core::VERSION)]
#[command(about = "Daily network device configuration diff reports", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff every device in the backup repository and write the report
    Report {
        /// Settings file (YAML)
        #[arg(short, long, default_value = "settings.yml", env = "CFGDIFF_SETTINGS")]
        settings: PathBuf,

        /// Also print every changed device to stdout
        #[arg(long)]
        dry_run: bool,
    },

    /// Minimize one unified diff (reads stdin when FILE is omitted)
    Normalize {
        /// Diff file
        file: Option<PathBuf>,

        /// Header lines to skip before the first hunk
        #[arg(long, default_value_t = DEFAULT_PREAMBLE_LINES)]
        preamble: usize,

        /// Range tokens per wrapped VLAN line
        #[arg(long, default_value_t = DEFAULT_MAX_VLANS_PER_LINE)]
        max_per_line: usize,

        /// Highest VLAN id accepted in a trunk statement
        #[arg(long, default_value_t = DEFAULT_MAX_VLAN_ID)]
        max_vlan_id: VlanId,

        /// Noise regex; lines matching it are dropped (repeatable)
        #[arg(long = "trash")]
        trash: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// VLAN range list utilities
    Vlans {
        /// Highest VLAN id accepted in a list
        #[arg(long, global = true, default_value_t = DEFAULT_MAX_VLAN_ID)]
        max_id: VlanId,

        #[command(subcommand)]
        action: VlanAction,
    },
}

#[derive(Subcommand)]
enum VlanAction {
    /// Print every id in a range list, one per line
    Expand {
        /// Range list, e.g. 1-3,10
        list: String,
    },
    /// Canonicalize a range or comma-separated id list
    Compress {
        /// Range list, e.g. 3,1,2,10
        list: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    cfgdiff_core::telemetry::init_tracing(cli.json, level);

    match cli.command {
        Commands::Report { settings, dry_run } => {
            let output = cmd_report(&settings, dry_run).await?;
            print!("{output}");
            Ok(())
        }
        Commands::Normalize {
            file,
            preamble,
            max_per_line,
            max_vlan_id,
            trash,
            format,
        } => {
            let diff = read_input(file.as_deref())?;
            let config = NormalizeConfig::default()
                .with_preamble_lines(preamble)
                .with_max_vlans_per_line(max_per_line)
                .with_max_vlan_id(max_vlan_id)
                .with_noise(NoiseFilter::new(&trash).context("Invalid --trash pattern")?);
            println!("{}", cmd_normalize(&diff, config, format)?);
            Ok(())
        }
        Commands::Vlans { max_id, action } => {
            let output = match action {
                VlanAction::Expand { list } => cmd_vlans_expand(&list, max_id)?,
                VlanAction::Compress { list } => cmd_vlans_compress(&list, max_id)?,
            };
            println!("{output}");
            Ok(())
        }
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read diff from stdin")?;
            Ok(buf)
        }
    }
}

/// Run the daily report. Returns what should go to stdout: the rendered
/// devices on `--dry-run`, otherwise nothing.
async fn cmd_report(settings_path: &Path, dry_run: bool) -> Result<String> {
    let settings = Settings::load(settings_path)
        .with_context(|| format!("Failed to load settings from {:?}", settings_path))?;

    if !is_git_repo(&settings.backup_dir) {
        bail!(
            "Backup directory {:?} is not a git work tree",
            settings.backup_dir
        );
    }

    let files = list_config_files(&settings.backup_dir)
        .with_context(|| format!("Failed to list {:?}", settings.backup_dir))?;
    info!(devices = files.len(), backup_dir = ?settings.backup_dir, "Collecting diffs");

    let normalizer = DiffNormalizer::new(
        settings
            .normalize_config()
            .context("Invalid TRASH_LINES pattern")?,
    );
    let hostnames = settings
        .hostname_matcher()
        .context("Invalid HOSTNAME_PREFIXES pattern")?;
    let source = Arc::new(GitDiffSource::new(
        &settings.backup_dir,
        &settings.command_git_diff,
    ));

    let outcomes = Collector::new(source, normalizer, hostnames)
        .with_max_concurrent(settings.max_concurrent)
        .collect(&files)
        .await;

    let report = Report::from_outcomes(Local::now(), &outcomes);
    let path = write_report(&settings.results_dir, &report)
        .with_context(|| format!("Failed to write report to {:?}", settings.results_dir))?;

    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, cfgdiff_core::DeviceOutcome::Failed { .. }))
        .count();
    info!(
        subject = %report_subject(&report),
        changed = report.devices.len(),
        failed,
        path = %path.display(),
        "Report written"
    );

    if dry_run {
        Ok(render_text(&report))
    } else {
        Ok(String::new())
    }
}

fn cmd_normalize(diff: &str, config: NormalizeConfig, format: OutputFormat) -> Result<String> {
    let normalized = DiffNormalizer::new(config)
        .normalize(diff)
        .context("Failed to normalize diff")?;

    match (normalized, format) {
        (Some(diff), OutputFormat::Text) => Ok(diff.rendered().join("\n")),
        (None, OutputFormat::Text) => Ok("no meaningful change".to_string()),
        (diff, OutputFormat::Json) => {
            serde_json::to_string_pretty(&diff).context("Failed to serialize normalized diff")
        }
    }
}

fn cmd_vlans_expand(list: &str, max_id: VlanId) -> Result<String> {
    let ids =
        expand_within(list, max_id).with_context(|| format!("Invalid VLAN list {:?}", list))?;
    Ok(ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn cmd_vlans_compress(list: &str, max_id: VlanId) -> Result<String> {
    let ids =
        expand_within(list, max_id).with_context(|| format!("Invalid VLAN list {:?}", list))?;
    Ok(compress(ids))
}
