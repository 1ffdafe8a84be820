//! JSONL game export.
//!
//! The first line is the game, then one agent request per turn (so each line
//! can be replayed against a snake as-is), then the result.

use color_eyre::eyre::Context as _;
use serde::Serialize;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use crate::client::{Game, SnakeRequest};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub winner_id: String,
    pub winner_name: String,
    pub is_draw: bool,
}

#[derive(Debug, Clone)]
pub struct GameExporter {
    game: Game,
    snake_requests: Vec<SnakeRequest>,
    result: GameResult,
}

impl GameExporter {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            snake_requests: Vec::new(),
            result: GameResult::default(),
        }
    }

    pub fn add_snake_request(&mut self, request: SnakeRequest) {
        self.snake_requests.push(request);
    }

    pub fn set_result(&mut self, result: GameResult) {
        self.result = result;
    }

    pub fn to_json_lines(&self) -> serde_json::Result<Vec<String>> {
        let mut lines = Vec::with_capacity(self.snake_requests.len() + 2);
        lines.push(serde_json::to_string(&self.game)?);
        for request in &self.snake_requests {
            lines.push(serde_json::to_string(request)?);
        }
        lines.push(serde_json::to_string(&self.result)?);
        Ok(lines)
    }

    /// Write the export, replacing whatever was at `path`.
    pub fn flush_to_file(&self, path: &Path) -> color_eyre::Result<()> {
        let lines = self.to_json_lines().wrap_err("Failed to serialize game")?;

        let file = std::fs::File::create(path)
            .wrap_err_with(|| format!("Failed to create export file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for line in &lines {
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), lines = lines.len(), "Exported game");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Board, Coord, Customizations, Ruleset, RulesetSettings, Snake};

    fn game() -> Game {
        Game {
            id: "game-1".to_string(),
            ruleset: Ruleset {
                name: "standard".to_string(),
                version: "cli".to_string(),
                settings: RulesetSettings::default(),
            },
            map: "standard".to_string(),
            timeout: 500,
            source: String::new(),
        }
    }

    fn request(turn: i32) -> SnakeRequest {
        let you = Snake {
            id: "a".to_string(),
            name: "Alpha".to_string(),
            latency: "0".to_string(),
            health: 100,
            body: vec![Coord { x: 1, y: 1 }],
            head: Coord { x: 1, y: 1 },
            length: 1,
            shout: String::new(),
            squad: String::new(),
            customizations: Customizations::default(),
        };
        SnakeRequest {
            game: game(),
            turn,
            board: Board {
                height: 7,
                width: 7,
                food: vec![],
                hazards: vec![],
                snakes: vec![you.clone()],
            },
            you,
        }
    }

    #[test]
    fn test_flush_writes_game_turns_and_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.jsonl");
        std::fs::write(&path, "stale content that must disappear\n".repeat(20)).unwrap();

        let mut exporter = GameExporter::new(game());
        exporter.add_snake_request(request(0));
        exporter.add_snake_request(request(1));
        exporter.set_result(GameResult {
            winner_id: "a".to_string(),
            winner_name: "Alpha".to_string(),
            is_draw: false,
        });
        exporter.flush_to_file(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["id"], "game-1");
        assert_eq!(lines[1]["turn"], 0);
        assert_eq!(lines[2]["turn"], 1);
        assert_eq!(lines[2]["you"]["name"], "Alpha");
        assert_eq!(
            lines[3],
            serde_json::json!({"winnerId": "a", "winnerName": "Alpha", "isDraw": false})
        );
    }
}
