use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, ArgGroup, ArgMatches, Command, value_parser};
use dlookup_engine::{AvailabilityCache, ProcessCommandRunner, ProviderRegistry};
use dlookup_tui::StartupPlan;
use dlookup_util::path_processing::app_config_dir;
use dlookup_util::{AppConfig, expand_tilde, read_targets_file};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LOG_PATH_ENV: &str = "DLOOKUP_LOG_PATH";
const LOG_FILE_NAME: &str = "dlookup.log";
const CONFIG_ARG: &str = "config";
const BATCH_GROUP: &str = "batch";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<OsString> = std::env::args_os().collect();
    let config = load_config(config_override(&args).as_deref());

    let registry = ProviderRegistry::with_default_providers(
        Arc::new(ProcessCommandRunner),
        Arc::new(AvailabilityCache::system()),
        config.report.provider_timeout_secs.map(Duration::from_secs),
    )
    .context("failed to register lookup providers")?;

    let matches = build_cli(&registry).get_matches_from(args);

    let missing = registry.missing_commands();
    if !missing.is_empty() {
        warn!(missing = %missing.join(", "), "required commands missing");
        eprintln!("Warning: Required commands missing: {}", missing.join(", "));
        eprintln!("Please install them. Some lookup types may fail.");
    }

    let plan = match batch_selection(&matches, &registry) {
        Some((provider, file)) => batch_plan(provider, &file)?,
        None => StartupPlan::Interactive,
    };

    dlookup_tui::run(registry, config, plan).await
}

/// Send logs to `$DLOOKUP_LOG_PATH` or the config directory; the terminal
/// belongs to the TUI. Logs are dropped when no file can be opened.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);

    match open_log_file() {
        Some(file) => {
            let _ = builder.with_writer(Mutex::new(file)).try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::sink).try_init();
        }
    }
}

fn open_log_file() -> Option<fs::File> {
    let path = match std::env::var(LOG_PATH_ENV) {
        Ok(value) if !value.trim().is_empty() => expand_tilde(&value),
        _ => app_config_dir()?.join(LOG_FILE_NAME),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Pull `--config <PATH>` out of the raw arguments.
///
/// The config decides how the registry is built, and the registry decides
/// which flags exist, so this runs before the full parse.
fn config_override(args: &[OsString]) -> Option<PathBuf> {
    let flag = format!("--{CONFIG_ARG}");
    let prefix = format!("{flag}=");
    let mut iter = args.iter().skip(1).filter_map(|arg| arg.to_str());
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }
        if arg == flag {
            return iter.next().map(expand_tilde);
        }
        if let Some(value) = arg.strip_prefix(&prefix) {
            return Some(expand_tilde(value));
        }
    }
    None
}

/// Load the config, falling back to defaults so a broken file never blocks startup.
fn load_config(override_path: Option<&Path>) -> AppConfig {
    let path = match override_path {
        Some(path) => path.to_path_buf(),
        None => match AppConfig::default_path() {
            Ok(path) => path,
            Err(error) => {
                warn!(error = %error, "no config location, using defaults");
                return AppConfig::default();
            }
        },
    };
    match AppConfig::load_or_create(&path) {
        Ok(config) => {
            info!(path = %path.display(), "config loaded");
            config
        }
        Err(error) => {
            warn!(error = %error, "config unreadable, using defaults");
            eprintln!("Warning: {error}. Using default settings.");
            AppConfig::default()
        }
    }
}

/// Build the argument parser: one `--<flag> <FILE>` per registered provider,
/// at most one of which may be given.
fn build_cli(registry: &ProviderRegistry) -> Command {
    let providers = registry.providers();
    let mut command = Command::new("dlookup")
        .about("Tabbed terminal UI for dig, nslookup and whois lookups")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new(CONFIG_ARG)
                .long(CONFIG_ARG)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Config file to use instead of the default location"),
        );

    for provider in &providers {
        command = command.arg(
            Arg::new(provider.flag_name().to_string())
                .long(provider.flag_name().to_string())
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help(provider.usage()),
        );
    }

    command.group(
        ArgGroup::new(BATCH_GROUP)
            .args(providers.iter().map(|provider| provider.flag_name().to_string()))
            .multiple(false),
    )
}

/// The provider whose batch flag was given, with its targets file.
fn batch_selection(matches: &ArgMatches, registry: &ProviderRegistry) -> Option<(String, PathBuf)> {
    registry.providers().into_iter().find_map(|provider| {
        matches
            .get_one::<PathBuf>(provider.flag_name())
            .map(|file| (provider.name().to_string(), file.clone()))
    })
}

fn batch_plan(provider: String, file: &Path) -> Result<StartupPlan> {
    let targets = read_targets_file(file).context("failed to read targets file")?;
    if targets.is_empty() {
        eprintln!("Warning: no domains found in '{}'", file.display());
        return Ok(StartupPlan::Interactive);
    }
    println!(
        "Attempting to run '{}' on {} domains from '{}'...",
        provider,
        targets.len(),
        file.display()
    );
    info!(provider = %provider, count = targets.len(), file = %file.display(), "starting batch");
    Ok(StartupPlan::Batch { provider, targets })
}
