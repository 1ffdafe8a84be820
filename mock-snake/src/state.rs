use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::types::{Coord, GameRequest};

const DIRECTIONS: [(&str, i32, i32); 4] = [("up", 0, 1), ("right", 1, 0), ("down", 0, -1), ("left", -1, 0)];

/// How the mock picks its moves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// First direction that stays on the board and off every body
    #[default]
    Safe,
    Up,
    Down,
    Left,
    Right,
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "safe" => Ok(Strategy::Safe),
            "up" => Ok(Strategy::Up),
            "down" => Ok(Strategy::Down),
            "left" => Ok(Strategy::Left),
            "right" => Ok(Strategy::Right),
            other => Err(format!("Unknown strategy '{other}'")),
        }
    }
}

impl Strategy {
    pub fn choose_move(&self, request: &GameRequest) -> &'static str {
        match self {
            Strategy::Up => "up",
            Strategy::Down => "down",
            Strategy::Left => "left",
            Strategy::Right => "right",
            Strategy::Safe => safe_move(request),
        }
    }
}

fn safe_move(request: &GameRequest) -> &'static str {
    let Some(head) = request.you.body.first() else {
        return "up";
    };
    let board = &request.board;

    // Tails move out of the way this turn
    let blocked = |c: Coord| {
        board.snakes.iter().any(|snake| {
            let end = snake.body.len().saturating_sub(1);
            snake.body[..end].contains(&c)
        })
    };

    DIRECTIONS
        .iter()
        .map(|(name, dx, dy)| (*name, Coord { x: head.x + dx, y: head.y + dy }))
        .find(|(_, c)| c.x >= 0 && c.y >= 0 && c.x < board.width && c.y < board.height && !blocked(*c))
        .map(|(name, _)| name)
        .unwrap_or("up")
}

/// What the mock saw of one game
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameRecord {
    pub started: bool,
    pub ended: bool,
    pub moves: usize,
    pub last_turn: i32,
}

#[derive(Clone, Default)]
pub struct MockSnakeState {
    pub strategy: Strategy,
    /// Sleep this long before answering /move
    pub move_delay: Duration,
    pub color: String,
    /// Maps game ID -> GameRecord
    games: Arc<RwLock<HashMap<String, GameRecord>>>,
}

impl MockSnakeState {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn with_move_delay(mut self, delay: Duration) -> Self {
        self.move_delay = delay;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub async fn record_start(&self, game_id: &str) {
        self.games.write().await.entry(game_id.to_string()).or_default().started = true;
    }

    pub async fn record_move(&self, game_id: &str, turn: i32) {
        let mut games = self.games.write().await;
        let record = games.entry(game_id.to_string()).or_default();
        record.moves += 1;
        record.last_turn = turn;
    }

    pub async fn record_end(&self, game_id: &str) {
        self.games.write().await.entry(game_id.to_string()).or_default().ended = true;
    }

    pub async fn game(&self, game_id: &str) -> Option<GameRecord> {
        self.games.read().await.get(game_id).cloned()
    }

    pub async fn games(&self) -> HashMap<String, GameRecord> {
        self.games.read().await.clone()
    }
}
