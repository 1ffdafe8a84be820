use serde::{Deserialize, Serialize};

/// The parts of a game request the mock looks at. Everything else is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRequest {
    pub game: GameInfo,
    pub turn: i32,
    pub board: BoardInfo,
    pub you: SnakeInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameInfo {
    pub id: String,
    pub timeout: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardInfo {
    pub width: i32,
    pub height: i32,
    pub food: Vec<Coord>,
    pub hazards: Vec<Coord>,
    pub snakes: Vec<SnakeInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeInfo {
    pub id: String,
    pub name: String,
    pub health: i32,
    pub body: Vec<Coord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

/// Response for GET /
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataResponse {
    pub apiversion: String,
    pub author: String,
    pub color: String,
    pub head: String,
    pub tail: String,
    pub version: String,
}

/// Response for POST /move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    #[serde(rename = "move")]
    pub direction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shout: Option<String>,
}
