//! JSON types exchanged with snake agents.
//!
//! These mirror the agent API that snakes already implement, so field names
//! follow its camelCase/lowercase conventions rather than Rust's.

use serde::{Deserialize, Serialize};

use crate::engine::{self, BoardState, Point, Settings};

/// Body of every `/start`, `/move` and `/end` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeRequest {
    pub game: Game,
    pub turn: i32,
    pub board: Board,
    pub you: Snake,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub ruleset: Ruleset,
    pub map: String,
    pub timeout: u64,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    pub name: String,
    pub version: String,
    pub settings: RulesetSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesetSettings {
    pub food_spawn_chance: i32,
    pub minimum_food: i32,
    pub hazard_damage_per_turn: i32,
    #[serde(default)]
    pub royale: RoyaleSettings,
    #[serde(default)]
    pub squad: SquadSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaleSettings {
    pub shrink_every_n_turns: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquadSettings {
    pub allow_body_collisions: bool,
    pub shared_elimination: bool,
    pub shared_health: bool,
    pub shared_length: bool,
}

impl From<&Settings> for RulesetSettings {
    fn from(settings: &Settings) -> Self {
        let squad = settings.squad_settings();
        Self {
            food_spawn_chance: settings.food_spawn_chance,
            minimum_food: settings.minimum_food,
            hazard_damage_per_turn: settings.hazard_damage_per_turn,
            royale: RoyaleSettings {
                shrink_every_n_turns: settings.shrink_every_n_turns,
            },
            squad: SquadSettings {
                allow_body_collisions: squad.allow_body_collisions,
                shared_elimination: squad.shared_elimination,
                shared_health: squad.shared_health,
                shared_length: squad.shared_length,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub height: i32,
    pub width: i32,
    pub food: Vec<Coord>,
    pub hazards: Vec<Coord>,
    pub snakes: Vec<Snake>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snake {
    pub id: String,
    pub name: String,
    pub latency: String,
    pub health: i32,
    pub body: Vec<Coord>,
    pub head: Coord,
    pub length: i32,
    pub shout: String,
    #[serde(default)]
    pub squad: String,
    pub customizations: Customizations,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customizations {
    pub color: String,
    pub head: String,
    pub tail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl From<Point> for Coord {
    fn from(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
        }
    }
}

fn coords(points: &[Point]) -> Vec<Coord> {
    points.iter().copied().map(Coord::from).collect()
}

/// What the harness knows about a snake beyond its engine state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnakeProfile {
    pub name: String,
    pub squad: String,
    pub customizations: Customizations,
}

impl Snake {
    pub fn from_engine(snake: &engine::Snake, profile: &SnakeProfile) -> Self {
        Self {
            id: snake.id.clone(),
            name: profile.name.clone(),
            latency: "0".to_string(),
            health: snake.health,
            body: coords(&snake.body),
            head: snake
                .head()
                .map(Coord::from)
                .unwrap_or(Coord { x: 0, y: 0 }),
            length: snake.body.len() as i32,
            shout: String::new(),
            squad: profile.squad.clone(),
            customizations: profile.customizations.clone(),
        }
    }
}

impl Board {
    /// The board as agents see it: eliminated snakes are left out.
    pub fn from_state<'a>(
        state: &BoardState,
        profile_of: impl Fn(&str) -> Option<&'a SnakeProfile>,
    ) -> Self {
        let fallback = SnakeProfile::default();
        Self {
            height: state.height,
            width: state.width,
            food: coords(&state.food),
            hazards: coords(&state.hazards),
            snakes: state
                .alive_snakes()
                .map(|snake| Snake::from_engine(snake, profile_of(&snake.id).unwrap_or(&fallback)))
                .collect(),
        }
    }
}

/// Response to `POST /move`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    #[serde(rename = "move")]
    pub direction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shout: Option<String>,
}

/// Response to `GET /`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeMetadataResponse {
    pub apiversion: String,
    pub author: String,
    pub color: String,
    pub head: String,
    pub tail: String,
    pub version: String,
}
