//! Harness configuration read from the environment.
use std::env;
use std::path::PathBuf;

/// Where the harness finds its inputs and how long it runs.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Directory holding `buffs.ron`, `spells.ron` and `scenarios/`.
    pub content_dir: PathBuf,
    /// Engine configuration file. Defaults to `config.toml` in the content dir.
    pub config_path: Option<PathBuf>,
    pub scenario: String,
    /// Frames to simulate. Defaults to the scenario's last step plus a tail.
    pub frames: Option<u64>,
    pub session_id: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("../spellcast/content/data"),
            config_path: None,
            scenario: "skirmish".to_owned(),
            frames: None,
            session_id: None,
        }
    }
}

impl SimConfig {
    /// Frames simulated after the last scripted step when no frame count is set.
    pub const DEFAULT_TAIL_FRAMES: u64 = 200;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SPELLCAST_CONTENT` - Content directory (default: the bundled data)
    /// - `SPELLCAST_CONFIG` - Engine config TOML (default: `<content>/config.toml`)
    /// - `SPELLCAST_SCENARIO` - Scenario name under `<content>/scenarios` (default: skirmish)
    /// - `SPELLCAST_FRAMES` - Frames to simulate
    /// - `SPELLCAST_SESSION` - Session identifier for the log directory
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("SPELLCAST_CONTENT") {
            config.content_dir = PathBuf::from(dir);
        }
        config.config_path = env::var("SPELLCAST_CONFIG").ok().map(PathBuf::from);
        if let Ok(scenario) = env::var("SPELLCAST_SCENARIO") {
            config.scenario = scenario;
        }
        config.frames = read_env::<u64>("SPELLCAST_FRAMES");
        config.session_id = env::var("SPELLCAST_SESSION").ok();

        config
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| self.content_dir.join("config.toml"))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
