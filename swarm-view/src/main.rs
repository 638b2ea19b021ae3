//! Application entry point for the swarm board preview.
//!
//! This binary sets up logging and eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;

use log::{info, warn};
use swarm_core::SwarmConfig;
use viewer::Viewer;

/// Environment variable naming an optional JSON config file.
const CONFIG_ENV: &str = "SWARM_CONFIG";

/// Loads the swarm config named by [`CONFIG_ENV`], or the defaults.
///
/// A missing variable means defaults. An unreadable or invalid file is
/// logged and also falls back to defaults.
fn load_config() -> SwarmConfig {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return SwarmConfig::default();
    };

    match SwarmConfig::load(&path) {
        Ok(cfg) => {
            info!("loaded swarm config from {path}");
            cfg
        }
        Err(e) => {
            warn!("ignoring swarm config {path}: {e}");
            SwarmConfig::default()
        }
    }
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop, or
///   if the swarms cannot be started.
fn main() -> eframe::Result<()> {
    // info+ unless RUST_LOG overrides.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    let cfg = load_config();
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Swarm Board",
        options,
        Box::new(move |_cc| Ok(Box::new(Viewer::new(cfg)?))),
    )
}
