use config::{Config, ConfigError, Environment, File, FileFormat, Map};
use serde::Deserialize;
use tracing::{error, info};

use tilewalk_movement::{LifecycleEvent, WalkSettings};
use tilewalk_navigation::{GridPoint, LayerNames, PresenceRule, WorldPoint};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Settings for the host binary. Every field has a default, so a config file
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// TOML file holding the tile layers.
    pub map_path: String,
    pub layers: LayerNames,
    pub presence: PresenceRule,
    pub walk: WalkSettings,
    /// Driver ticks per second.
    pub frame_hz: u32,
    /// Capacity of the signal topic.
    pub signal_capacity: usize,
    /// Tile the entity starts on.
    pub spawn: GridPoint,
    pub script: Vec<ScriptStep>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            map_path: "config/map.toml".into(),
            layers: LayerNames::default(),
            presence: PresenceRule::default(),
            walk: WalkSettings::default(),
            frame_hz: 60,
            signal_capacity: 64,
            spawn: GridPoint::default(),
            script: Vec::new(),
        }
    }
}

/// One scripted input. Waits `after_ms`, then fires whatever is set, in the
/// order despawn, event, tap.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScriptStep {
    pub after_ms: u64,
    /// Tap the center of this tile.
    pub tap: Option<GridPoint>,
    /// Tap an exact map-local position.
    pub tap_world: Option<WorldPoint>,
    pub camera_offset: Option<WorldPoint>,
    pub event: Option<LifecycleEvent>,
    /// Remove the entity from the blackboard.
    pub despawn: bool,
}

/// Loads `path`, then applies `TILEWALK_*` environment overrides
/// (`TILEWALK_WALK__MOVE_SPEED=240`, `TILEWALK_FRAME_HZ=30`).
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    load_config_with_env(path, None)
}

/// `TILEWALK_` prefix, `__` between nested keys. `vars` stands in for the
/// process environment when given.
fn environment(vars: Option<Map<String, String>>) -> Environment {
    Environment::with_prefix("TILEWALK")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .source(vars)
}

fn load_config_with_env(path: &str, vars: Option<Map<String, String>>) -> Result<AppConfig, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .add_source(environment(vars))
        .build()
        .and_then(|c| c.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            info!(
                map = %config.map_path,
                frame_hz = config.frame_hz,
                steps = config.script.len(),
                "Successfully loaded configuration"
            );
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

/// Parses config text without touching the filesystem or environment.
#[cfg(test)]
fn parse_config(toml: &str) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()
}
