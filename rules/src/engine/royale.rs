//! Royale: a safe zone that shrinks from the edges, leaving hazards behind.

use super::board::{BoardState, Point, SnakeMove};
use super::error::{ConfigurationError, RulesResult};
use super::rng::GameRng;
use super::settings::{PARAM_SHRINK_EVERY_N_TURNS, Settings};
use super::stages::is_initialization;

const SHRINK_CONTEXT: &str = "royale";

pub fn populate_hazards_royale(
    board: &mut BoardState,
    settings: &Settings,
    moves: &[SnakeMove],
) -> RulesResult<bool> {
    if is_initialization(board, settings, moves) {
        return Ok(false);
    }

    board.hazards = royale_hazards(board.width, board.height, board.turn + 1, settings)?;
    Ok(false)
}

/// The hazard set for `turn` of a royale game.
///
/// The shrink sequence is drawn from a stream keyed only by the game seed and
/// replayed from the start, so the zone for a turn never depends on how the
/// game got there and only ever grows.
pub fn royale_hazards(
    width: i32,
    height: i32,
    turn: i32,
    settings: &Settings,
) -> Result<Vec<Point>, ConfigurationError> {
    if settings.shrink_every_n_turns < 1 {
        return Err(ConfigurationError::InvalidSetting {
            name: PARAM_SHRINK_EVERY_N_TURNS.to_string(),
            value: settings.shrink_every_n_turns.to_string(),
            reason: "royale needs a shrink interval of at least 1".to_string(),
        });
    }

    let mut rng = GameRng::for_context(settings.seed, SHRINK_CONTEXT);
    let (mut min_x, mut max_x) = (0, width - 1);
    let (mut min_y, mut max_y) = (0, height - 1);

    for _ in 0..turn.max(0) / settings.shrink_every_n_turns {
        // Draw even when the chosen edge can't move so the sequence stays aligned
        match rng.gen_range(0..4) {
            0 if min_x < max_x => min_x += 1,
            1 if max_x > min_x => max_x -= 1,
            2 if min_y < max_y => min_y += 1,
            3 if max_y > min_y => max_y -= 1,
            _ => {}
        }
    }

    let hazards = (0..height)
        .flat_map(|y| (0..width).map(move |x| Point::new(x, y)))
        .filter(|p| p.x < min_x || p.x > max_x || p.y < min_y || p.y > max_y)
        .collect();

    Ok(hazards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Direction;

    fn royale_settings(shrink_every_n_turns: i32) -> Settings {
        Settings {
            shrink_every_n_turns,
            hazard_damage_per_turn: 14,
            seed: 9001,
            ..Default::default()
        }
    }

    #[test]
    fn test_no_hazards_before_first_shrink() {
        let hazards = royale_hazards(11, 11, 9, &royale_settings(10)).unwrap();
        assert!(hazards.is_empty());
    }

    #[test]
    fn test_first_shrink_covers_one_edge() {
        let hazards = royale_hazards(11, 11, 10, &royale_settings(10)).unwrap();
        assert_eq!(hazards.len(), 11);

        let vertical = hazards.iter().all(|p| p.x == hazards[0].x);
        let horizontal = hazards.iter().all(|p| p.y == hazards[0].y);
        assert!(vertical || horizontal);
    }

    #[test]
    fn test_hazards_only_grow() {
        let settings = royale_settings(1);
        let mut previous = Vec::new();

        for turn in 0..40 {
            let hazards = royale_hazards(7, 7, turn, &settings).unwrap();
            assert!(previous.iter().all(|p| hazards.contains(p)));
            assert!(hazards.len() < 49);
            previous = hazards;
        }
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let err = royale_hazards(11, 11, 5, &royale_settings(0)).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidSetting { .. }));
    }

    #[test]
    fn test_stage_uses_upcoming_turn() {
        let settings = royale_settings(5);
        let mut board = BoardState::new(11, 11);
        board.turn = 4;

        populate_hazards_royale(&mut board, &settings, &[SnakeMove::new("a", Direction::Up)]).unwrap();

        assert_eq!(board.hazards, royale_hazards(11, 11, 5, &settings).unwrap());
        assert!(!board.hazards.is_empty());
    }

    #[test]
    fn test_stage_skips_initialization() {
        let mut board = BoardState::new(11, 11);
        board.turn = 100;

        populate_hazards_royale(&mut board, &royale_settings(1), &[]).unwrap();

        assert!(board.hazards.is_empty());
    }
}
