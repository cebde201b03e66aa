// emu-shell - Main entry point
//
// Loads the persisted configuration, creates the emulation host, and
// runs the shell window. An optional content path can be passed on the
// command line and is launched once the shell is up.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use emu_shell::shell::SHELL_SETTINGS;
use emu_shell::{run_shell, ConfigStore, EmulatorHost};

/// Configuration file next to the executable's working directory.
const CONFIG_FILE: &str = "emu_shell.toml";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store = ConfigStore::load_or_default(CONFIG_FILE, SHELL_SETTINGS);
    let host = EmulatorHost::new();

    let launch_path = std::env::args().nth(1).map(PathBuf::from);
    if let Some(path) = &launch_path {
        tracing::info!("content queued: {}", path.display());
    }

    run_shell(store, host, launch_path)?;

    Ok(())
}
