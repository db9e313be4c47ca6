//! Headless simulation harness.
//!
//! Loads engine configuration, compiled content and a scripted scenario,
//! replays the scenario frame by frame and prints what the UI layer would
//! have been told.
mod config;
mod runner;

use anyhow::Result;
use config::SimConfig;
use runner::Runner;
use spellcast_content::{ConfigLoader, ContentFactory};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();

    setup_logging(&config.session_id)?;

    let factory = ContentFactory::new(&config.content_dir);
    let engine = ConfigLoader::load(&config.config_path())?;
    let library = factory.load_library()?;
    let scenario = factory.load_scenario(&config.scenario)?;
    let frames = config
        .frames
        .unwrap_or(scenario.last_frame() + SimConfig::DEFAULT_TAIL_FRAMES);

    tracing::info!(
        scenario = %config.scenario,
        frames,
        frame_delta = engine.frame_delta,
        "starting simulation"
    );

    let mut runner = Runner::new(engine, library, scenario)?;
    let stats = runner.run(frames)?;
    runner.print_summary();

    tracing::info!(?stats, "simulation finished");
    Ok(())
}

/// Setup logging to both stderr and a per-session file
fn setup_logging(session_id: &Option<String>) -> Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let log_dir = get_log_directory();

    // Create session ID if not provided
    let session_id = session_id.clone().unwrap_or_else(|| {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        format!("session_{}", timestamp)
    });

    let session_log_dir = log_dir.join(&session_id);
    std::fs::create_dir_all(&session_log_dir)?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "sim.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    // Leak the guard to keep file writer alive
    std::mem::forget(guard);

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}/sim.log", session_log_dir.display());

    Ok(())
}

/// Get the platform-specific log directory
fn get_log_directory() -> std::path::PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut path = std::path::PathBuf::from(home);
            path.push("Library");
            path.push("Caches");
            path.push("spellcast");
            path.push("logs");
            return path;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(xdg_cache) = std::env::var_os("XDG_CACHE_HOME") {
            let mut path = std::path::PathBuf::from(xdg_cache);
            path.push("spellcast");
            path.push("logs");
            return path;
        } else if let Some(home) = std::env::var_os("HOME") {
            let mut path = std::path::PathBuf::from(home);
            path.push(".cache");
            path.push("spellcast");
            path.push("logs");
            return path;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(local_appdata) = std::env::var_os("LOCALAPPDATA") {
            let mut path = std::path::PathBuf::from(local_appdata);
            path.push("spellcast");
            path.push("logs");
            return path;
        }
    }

    // Fallback
    std::env::temp_dir().join("spellcast").join("logs")
}
