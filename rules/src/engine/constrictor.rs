//! Constrictor: no food, full health forever, and every snake keeps its trail.

use super::board::{BoardState, SNAKE_MAX_HEALTH, SnakeMove};
use super::error::RulesResult;
use super::settings::Settings;
use super::stages::is_initialization;

pub fn grow_snakes_constrictor(
    board: &mut BoardState,
    settings: &Settings,
    moves: &[SnakeMove],
) -> RulesResult<bool> {
    if is_initialization(board, settings, moves) {
        return Ok(false);
    }

    constrict(board);
    Ok(false)
}

/// Clear the food and top up every living snake.
///
/// A snake only grows once its tail has moved off the previous tail cell, so
/// a freshly stacked snake isn't stretched before its first move.
pub fn constrict(board: &mut BoardState) {
    board.food.clear();

    for snake in board.snakes.iter_mut().filter(|s| !s.is_eliminated()) {
        snake.health = SNAKE_MAX_HEALTH;

        let len = snake.body.len();
        if len >= 2 && snake.body[len - 1] != snake.body[len - 2] {
            snake.grow();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::board::{EliminationCause, Point, Snake};
    use crate::engine::Direction;

    #[test]
    fn test_constrict_grows_moving_snakes() {
        let mut board = BoardState::new(7, 7);
        board.food = vec![Point::new(3, 3)];
        let mut moving = Snake::with_body("a", vec![Point::new(1, 2), Point::new(1, 1)]);
        moving.health = 40;
        board.snakes = vec![moving, Snake::new("b", Point::new(5, 5))];

        grow_snakes_constrictor(&mut board, &Settings::default(), &[SnakeMove::new("a", Direction::Up)])
            .unwrap();

        assert!(board.food.is_empty());
        assert_eq!(board.snakes[0].health, 100);
        assert_eq!(
            board.snakes[0].body,
            vec![Point::new(1, 2), Point::new(1, 1), Point::new(1, 1)]
        );
        assert_eq!(board.snakes[1].body.len(), 3);
    }

    #[test]
    fn test_constrict_leaves_eliminated_snakes_alone() {
        let mut board = BoardState::new(7, 7);
        let mut dead = Snake::with_body("a", vec![Point::new(1, 2), Point::new(1, 1)]);
        dead.health = 0;
        dead.eliminate(EliminationCause::OutOfHealth, "", 3);
        board.snakes = vec![dead.clone()];

        constrict(&mut board);

        assert_eq!(board.snakes[0], dead);
    }
}
