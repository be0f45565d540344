use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::backend::{CommandSink, HttpEmitter, LogEmitter};
use crate::config::Config;
use crate::state::{AppState, Catalog, KvStore, PresetStore};

/// Route log output to a file so it never draws over the TUI.
/// Set RUST_LOG=debug to see every emitted command.
pub fn init_logging() -> Option<PathBuf> {
    let path = dirs::cache_dir()?.join("freyr-panel").join("panel.log");
    fs::create_dir_all(path.parent()?).ok()?;
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Some(path)
}

fn open_store(path: Option<&Path>) -> anyhow::Result<PresetStore> {
    let kv = match path {
        Some(path) => {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
            log::info!("preset store at {}", path.display());
            KvStore::open(path).with_context(|| format!("opening {}", path.display()))?
        }
        None => {
            log::warn!("no data directory, presets will not survive a restart");
            KvStore::open_in_memory()?
        }
    };
    PresetStore::load(kv).context("loading saved presets and themes")
}

/// Catalog, store and hue, ready for the UI
pub fn load_state(config: &Config) -> anyhow::Result<AppState> {
    let catalog = Catalog::load(config.catalog_path.as_deref());
    let store = open_store(config.db_path().as_deref())?;
    Ok(AppState::new(catalog, store)?)
}

/// The command destination: HTTP backend, or the log in dry-run mode
pub fn command_sink(config: &Config) -> anyhow::Result<Box<dyn CommandSink>> {
    if config.dry_run {
        log::info!("dry run, commands are only logged");
        return Ok(Box::new(LogEmitter));
    }
    log::info!("sending commands to {}", config.backend_url);
    let emitter = HttpEmitter::new(&config.backend_url).context("starting command emitter")?;
    Ok(Box::new(emitter))
}
