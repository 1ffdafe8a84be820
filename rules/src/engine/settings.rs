// Game settings for the rules engine

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::error::ConfigurationError;
use super::rng::GameRng;

pub const PARAM_GAME_TYPE: &str = "name";
pub const PARAM_FOOD_SPAWN_CHANCE: &str = "foodSpawnChance";
pub const PARAM_MINIMUM_FOOD: &str = "minimumFood";
pub const PARAM_HAZARD_DAMAGE_PER_TURN: &str = "hazardDamagePerTurn";
pub const PARAM_SHRINK_EVERY_N_TURNS: &str = "shrinkEveryNTurns";
pub const PARAM_ALLOW_BODY_COLLISIONS: &str = "allowBodyCollisions";
pub const PARAM_SHARED_ELIMINATION: &str = "sharedElimination";
pub const PARAM_SHARED_HEALTH: &str = "sharedHealth";
pub const PARAM_SHARED_LENGTH: &str = "sharedLength";

/// Immutable per-game configuration handed to every stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Percentage chance (0-100) of spawning one food each turn.
    pub food_spawn_chance: i32,
    pub minimum_food: i32,
    pub hazard_damage_per_turn: i32,
    /// Turns between royale shrinks. 0 disables shrinking.
    pub shrink_every_n_turns: i32,
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squad: Option<SquadSettings>,
}

impl Settings {
    /// Build settings from the string parameters a game is configured with.
    ///
    /// Missing parameters keep their default; present ones must parse.
    pub fn from_params(
        params: &HashMap<String, String>,
        seed: u64,
    ) -> Result<Self, ConfigurationError> {
        let defaults = Self::default();
        let settings = Self {
            food_spawn_chance: int_param(params, PARAM_FOOD_SPAWN_CHANCE, defaults.food_spawn_chance)?,
            minimum_food: int_param(params, PARAM_MINIMUM_FOOD, defaults.minimum_food)?,
            hazard_damage_per_turn: int_param(
                params,
                PARAM_HAZARD_DAMAGE_PER_TURN,
                defaults.hazard_damage_per_turn,
            )?,
            shrink_every_n_turns: int_param(
                params,
                PARAM_SHRINK_EVERY_N_TURNS,
                defaults.shrink_every_n_turns,
            )?,
            seed,
            squad: None,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(0..=100).contains(&self.food_spawn_chance) {
            return Err(invalid(
                PARAM_FOOD_SPAWN_CHANCE,
                self.food_spawn_chance,
                "must be between 0 and 100",
            ));
        }
        if self.minimum_food < 0 {
            return Err(invalid(PARAM_MINIMUM_FOOD, self.minimum_food, "must not be negative"));
        }
        if self.hazard_damage_per_turn < 0 {
            return Err(invalid(
                PARAM_HAZARD_DAMAGE_PER_TURN,
                self.hazard_damage_per_turn,
                "must not be negative",
            ));
        }
        if self.shrink_every_n_turns < 0 {
            return Err(invalid(
                PARAM_SHRINK_EVERY_N_TURNS,
                self.shrink_every_n_turns,
                "must not be negative",
            ));
        }
        Ok(())
    }

    /// The generator for random draws made while resolving `turn`.
    pub fn rng(&self, turn: i32) -> GameRng {
        GameRng::for_turn(self.seed, turn)
    }

    /// Squad settings, or the all-off defaults when the game has no squads.
    pub fn squad_settings(&self) -> SquadSettings {
        self.squad.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadSettings {
    /// Snake ID -> squad name.
    #[serde(skip)]
    pub squad_map: BTreeMap<String, String>,
    pub allow_body_collisions: bool,
    pub shared_elimination: bool,
    pub shared_health: bool,
    pub shared_length: bool,
}

impl SquadSettings {
    pub fn from_params(
        params: &HashMap<String, String>,
        squad_map: BTreeMap<String, String>,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            squad_map,
            allow_body_collisions: bool_param(params, PARAM_ALLOW_BODY_COLLISIONS)?,
            shared_elimination: bool_param(params, PARAM_SHARED_ELIMINATION)?,
            shared_health: bool_param(params, PARAM_SHARED_HEALTH)?,
            shared_length: bool_param(params, PARAM_SHARED_LENGTH)?,
        })
    }

    pub fn squad_of(&self, snake_id: &str) -> Option<&str> {
        self.squad_map.get(snake_id).map(String::as_str)
    }

    /// A snake is always on its own squad. A snake without an assigned squad
    /// is a squad of one, so two unassigned snakes are never squad mates.
    pub fn same_squad(&self, snake_id: &str, other_id: &str) -> bool {
        if snake_id == other_id {
            return true;
        }
        match (self.squad_of(snake_id), self.squad_of(other_id)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn shares_anything(&self) -> bool {
        self.shared_elimination || self.shared_health || self.shared_length
    }
}

fn invalid(name: &str, value: impl ToString, reason: &str) -> ConfigurationError {
    ConfigurationError::InvalidSetting {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn int_param(
    params: &HashMap<String, String>,
    name: &str,
    default: i32,
) -> Result<i32, ConfigurationError> {
    match params.get(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(name, raw, "expected an integer")),
    }
}

fn bool_param(params: &HashMap<String, String>, name: &str) -> Result<bool, ConfigurationError> {
    match params.get(name).map(|s| s.trim()) {
        None | Some("") => Ok(false),
        Some(raw) => raw
            .parse()
            .map_err(|_| invalid(name, raw, "expected true or false")),
    }
}
