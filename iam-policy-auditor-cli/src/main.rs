//! Scan a single IAM policy file to identify missing resource constraints.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use iam_policy_auditor_scan::{scan, Exclusions};
use serde_json::Value;

mod report;

#[derive(Debug, Parser)]
#[command(
    name = "iam-policy-auditor",
    version,
    about = "Scan an IAM policy for missing resource constraints and high-risk permissions"
)]
struct Cli {
    /// Path of the IAM policy file to evaluate; reads standard input when omitted
    #[arg(long)]
    input_file: Option<PathBuf>,

    /// A yaml file containing actions and resource ARNs to ignore when scanning
    #[arg(long)]
    exclusions_file: Option<PathBuf>,

    /// If issues are found, only print the high priority risks (Resource
    /// Exposure, Privilege Escalation, Data Exfiltration)
    #[arg(long)]
    high_priority_only: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    let (policy, policy_name) = load_policy(cli.input_file.as_deref())?;
    let exclusions = load_exclusions(cli.exclusions_file.as_deref())?;

    let finding = scan(&policy, &policy_name, &policy_name, &exclusions)?;
    report::print_finding(finding.as_ref(), cli.high_priority_only);

    Ok(())
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

/// Load the policy object from the input file, or from standard input under
/// the fixed identity "StdinPolicy".
fn load_policy(input_file: Option<&Path>) -> Result<(Value, String)> {
    match input_file {
        Some(path) => {
            log::debug!("Opening {}", path.display());
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let policy: Value = serde_json::from_str(&text)
                .with_context(|| format!("invalid JSON in {}", path.display()))?;
            let policy_name = path
                .file_stem()
                .map_or_else(|| "Policy".to_string(), |stem| stem.to_string_lossy().into_owned());
            Ok((policy, policy_name))
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read standard input")?;
            let policy: Value =
                serde_json::from_str(&text).context("invalid JSON on standard input")?;
            Ok((policy, "StdinPolicy".to_string()))
        }
    }
}

/// Load exclusions from the given YAML file, falling back to the embedded
/// defaults.
fn load_exclusions(exclusions_file: Option<&Path>) -> Result<Exclusions> {
    match exclusions_file {
        Some(path) => {
            log::debug!("Loading exclusions from {}", path.display());
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Exclusions::from_yaml_str(&text)
                .with_context(|| format!("invalid exclusions in {}", path.display()))
        }
        None => Exclusions::default_exclusions().context("failed to load default exclusions"),
    }
}
