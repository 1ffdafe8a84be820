use color_eyre::eyre::Context as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "snake-rules";
const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_BOARD_SIZE: i32 = 11;
pub const DEFAULT_GAME_TYPE: &str = "standard";
pub const DEFAULT_MAP: &str = "standard";
pub const DEFAULT_FOOD_SPAWN_CHANCE: i32 = 15;
pub const DEFAULT_MINIMUM_FOOD: i32 = 1;
pub const DEFAULT_HAZARD_DAMAGE_PER_TURN: i32 = 14;
pub const DEFAULT_SHRINK_EVERY_N_TURNS: i32 = 25;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub defaults: PlayDefaults,
}

/// Values `snake play` falls back to when a flag is not given.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayDefaults {
    pub timeout_ms: Option<u64>,
    pub game_type: Option<String>,
    pub map: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub food_spawn_chance: Option<i32>,
    pub minimum_food: Option<i32>,
    pub hazard_damage_per_turn: Option<i32>,
    pub shrink_every_n_turns: Option<i32>,
}

impl PlayDefaults {
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    pub fn game_type(&self) -> &str {
        self.game_type.as_deref().unwrap_or(DEFAULT_GAME_TYPE)
    }

    pub fn map(&self) -> &str {
        self.map.as_deref().unwrap_or(DEFAULT_MAP)
    }

    pub fn width(&self) -> i32 {
        self.width.unwrap_or(DEFAULT_BOARD_SIZE)
    }

    pub fn height(&self) -> i32 {
        self.height.unwrap_or(DEFAULT_BOARD_SIZE)
    }

    pub fn food_spawn_chance(&self) -> i32 {
        self.food_spawn_chance.unwrap_or(DEFAULT_FOOD_SPAWN_CHANCE)
    }

    pub fn minimum_food(&self) -> i32 {
        self.minimum_food.unwrap_or(DEFAULT_MINIMUM_FOOD)
    }

    pub fn hazard_damage_per_turn(&self) -> i32 {
        self.hazard_damage_per_turn
            .unwrap_or(DEFAULT_HAZARD_DAMAGE_PER_TURN)
    }

    pub fn shrink_every_n_turns(&self) -> i32 {
        self.shrink_every_n_turns
            .unwrap_or(DEFAULT_SHRINK_EVERY_N_TURNS)
    }
}

impl CliConfig {
    /// Get the config directory path (~/.config/snake-rules on Linux)
    pub fn config_dir() -> color_eyre::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| color_eyre::eyre::eyre!("Could not find config directory"))?
            .join(CONFIG_DIR);
        Ok(config_dir)
    }

    pub fn config_path() -> color_eyre::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load the user's config, or the built-in defaults if there is none
    pub fn load() -> color_eyre::Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            // No home directory (e.g. a bare container): nothing to load
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> color_eyre::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}
