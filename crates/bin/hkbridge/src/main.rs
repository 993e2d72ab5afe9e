//! # hkbridge: HomeKit bridge planner
//!
//! Composition root that wires the adapters together and runs one command.
//!
//! ## Responsibilities
//! - Parse the command line and load the configuration (file, env vars)
//! - Initialise `tracing` from the configured filter
//! - Construct the filesystem and systemctl adapters
//! - Construct application services, injecting adapters via port traits
//! - Print the command's report and map errors to a non-zero exit
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod config;
mod report;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hkbridge_adapter_storage_fs::{HaStorage, JsonMappingStore};
use hkbridge_adapter_systemctl::SystemctlController;
use hkbridge_app::registry::RegistrySnapshot;
use hkbridge_app::services::apply_service::ApplyService;
use hkbridge_app::services::assignment_service::AssignmentService;
use hkbridge_app::services::inspection_service::InspectionService;
use hkbridge_app::services::planning_service::PlanningService;
use hkbridge_app::settings::BridgeSettings;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, DEFAULT_CONFIG_FILE};

/// Plan, generate and apply HomeKit bridge entity assignments.
#[derive(Parser, Debug)]
#[command(name = "hkbridge")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Path to the configuration file.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Count entities per area and suggest bridge groupings.
    Analyze,
    /// Assign entities to the configured bridges and write the mapping.
    Generate,
    /// Write the mapping into the HomeKit config entries (stops and starts the service).
    Apply {
        /// Preview the changes without touching the service or any file.
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the entity count and filter mode of every existing bridge.
    Validate,
    /// List existing bridges with their entry id and port.
    List,
    /// Write an example configuration file.
    Init,
}

fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Everything a command needs once the configuration file has been read.
struct Runtime {
    config: Config,
    storage: HaStorage,
    settings: BridgeSettings,
}

impl Runtime {
    fn load(config_path: &Path) -> Result<Self> {
        let config = Config::load(config_path)
            .with_context(|| format!("loading configuration from {}", config_path.display()))?;
        init_tracing(&config.logging.filter);
        tracing::debug!(config = %config_path.display(), "configuration loaded");

        let storage = HaStorage::new(&config.homeassistant.config_path);
        let settings = config.settings()?;
        Ok(Self { config, storage, settings })
    }

    fn mappings(&self) -> JsonMappingStore {
        JsonMappingStore::in_dir(&self.config.output.dir)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut out = std::io::stdout().lock();

    match args.command {
        Command::Init => {
            init_tracing(&config::LoggingConfig::default().filter);
            init(&args.config)?;
        }
        Command::Analyze => {
            let rt = Runtime::load(&args.config)?;
            let snapshot = RegistrySnapshot::load(&rt.storage)?;
            let suggestion = PlanningService::new(rt.settings).analyze(&snapshot);
            report::analyze(&mut out, &suggestion)?;
        }
        Command::Generate => {
            let rt = Runtime::load(&args.config)?;
            let snapshot = RegistrySnapshot::load(&rt.storage)?;
            let generated = AssignmentService::new(rt.mappings(), rt.settings).generate(&snapshot)?;
            report::generate(&mut out, &generated)?;
        }
        Command::Apply { dry_run } => {
            let rt = Runtime::load(&args.config)?;
            let controller = SystemctlController::new(
                rt.config.homeassistant.service.clone(),
                rt.config.homeassistant.use_sudo,
            );
            let service = ApplyService::new(
                rt.mappings(),
                rt.storage.config_entries(),
                controller,
                rt.settings,
            );
            let applied = service.apply(dry_run)?;
            report::apply(&mut out, &applied)?;
        }
        Command::Validate => {
            let rt = Runtime::load(&args.config)?;
            let statuses = InspectionService::new(rt.storage.config_entries()).validate()?;
            report::validate(&mut out, &statuses)?;
        }
        Command::List => {
            let rt = Runtime::load(&args.config)?;
            let listings = InspectionService::new(rt.storage.config_entries()).list()?;
            report::list(&mut out, &listings)?;
        }
    }

    Ok(())
}

fn init(path: &Path) -> Result<()> {
    let rendered = Config::example().to_toml()?;
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("refusing to overwrite or unable to create {}", path.display()))?;
    file.write_all(rendered.as_bytes())?;
    tracing::info!(path = %path.display(), "example configuration written");
    println!("Created {}", path.display());
    println!("  Edit this file to configure your bridges and settings");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_apply_with_dry_run() {
        let args = Args::try_parse_from(["hkbridge", "apply", "--dry-run"]).unwrap();

        assert!(matches!(args.command, Command::Apply { dry_run: true }));
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn should_write_example_config_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hkbridge.toml");

        init(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert!(!loaded.bridges.is_empty());

        let err = init(&path).unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
    }
}
