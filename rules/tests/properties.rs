//! Property tests for the rules engine: invariants that must hold for any
//! seed, board size and sequence of moves.

use std::collections::HashSet;

use proptest::prelude::*;
use snake_rules::engine::maps::StandardMap;
use snake_rules::engine::royale::royale_hazards;
use snake_rules::engine::{
    BoardState, Direction, EliminationCause, GameMap, Point, Ruleset, Settings, Snake, SnakeMove,
    SoloRuleset, StandardRuleset,
};

fn settings(seed: u64, minimum_food: i32) -> Settings {
    Settings {
        food_spawn_chance: 15,
        minimum_food,
        hazard_damage_per_turn: 14,
        shrink_every_n_turns: 5,
        seed,
        ..Default::default()
    }
}

/// Play `turns` turns with moves drawn from `moves`, returning every board
/// from the initial one onwards.
fn play_out(
    ruleset: &dyn Ruleset,
    size: i32,
    snake_count: usize,
    moves: &[usize],
    turns: usize,
) -> Vec<BoardState> {
    let ids: Vec<String> = (0..snake_count).map(|i| format!("snake-{i}")).collect();
    let board = StandardMap
        .setup_board(size, size, ruleset.settings(), &ids)
        .unwrap();
    let mut history = vec![ruleset.modify_initial_board_state(board).unwrap()];

    for turn in 0..turns {
        let board = history.last().unwrap();
        if ruleset.is_game_over(board).unwrap() {
            break;
        }
        let turn_moves: Vec<SnakeMove> = board
            .alive_snakes()
            .enumerate()
            .map(|(i, snake)| {
                let pick = moves[(turn * snake_count + i) % moves.len()];
                SnakeMove::new(snake.id.clone(), Direction::ALL[pick % 4])
            })
            .collect();
        let next = ruleset.create_next_board_state(board, &turn_moves).unwrap();
        history.push(next);
    }

    history
}

fn game_inputs() -> impl Strategy<Value = (i32, usize, u64, Vec<usize>)> {
    (
        prop_oneof![Just(7), Just(11), Just(19), 8i32..=15],
        1usize..=4,
        any::<u64>(),
        prop::collection::vec(0usize..4, 1..64),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: a snake's length changes by at most one per turn, and never shrinks
    #[test]
    fn prop_length_grows_by_at_most_one(
        (size, snakes, seed, moves) in game_inputs(),
    ) {
        let ruleset = StandardRuleset::new(settings(seed, 1));
        let history = play_out(&ruleset, size, snakes, &moves, 40);

        for pair in history.windows(2) {
            for before in pair[0].alive_snakes() {
                let after = pair[1].snake(&before.id).unwrap();
                prop_assert!(
                    after.body.len() == before.body.len() || after.body.len() == before.body.len() + 1,
                    "{} went from length {} to {}", before.id, before.body.len(), after.body.len()
                );
            }
        }
    }

    /// Property: health stays in [0, 100] and only living snakes have health left
    #[test]
    fn prop_health_bounds(
        (size, snakes, seed, moves) in game_inputs(),
    ) {
        let ruleset = StandardRuleset::new(settings(seed, 1));
        let history = play_out(&ruleset, size, snakes, &moves, 120);

        for pair in history.windows(2) {
            for before in pair[0].alive_snakes() {
                let after = pair[1].snake(&before.id).unwrap();
                prop_assert!((0..=100).contains(&after.health));
                if after.health <= 0 {
                    prop_assert_eq!(after.eliminated_cause, EliminationCause::OutOfHealth);
                }
            }
        }
    }

    /// Property: the board is topped up to the minimum food whenever there is room
    #[test]
    fn prop_minimum_food(
        (size, snakes, seed, moves) in game_inputs(),
        minimum_food in 1i32..=4,
    ) {
        let ruleset = StandardRuleset::new(settings(seed, minimum_food));
        let history = play_out(&ruleset, size, snakes, &moves, 40);

        for pair in history.windows(2) {
            let board = &pair[1];
            prop_assert!(
                board.food.len() >= minimum_food as usize || board.unoccupied_points().is_empty(),
                "turn {}: {} food", board.turn, board.food.len()
            );
        }
    }

    /// Property: the same seed and moves replay to the same boards
    #[test]
    fn prop_replay_is_deterministic(
        (size, snakes, seed, moves) in game_inputs(),
    ) {
        let first = play_out(&StandardRuleset::new(settings(seed, 1)), size, snakes, &moves, 30);
        let second = play_out(&StandardRuleset::new(settings(seed, 1)), size, snakes, &moves, 30);

        prop_assert_eq!(first, second);
    }

    /// Property: each turn increments the turn counter by exactly one
    #[test]
    fn prop_turn_counter(
        (size, snakes, seed, moves) in game_inputs(),
    ) {
        let ruleset = StandardRuleset::new(settings(seed, 1));
        let history = play_out(&ruleset, size, snakes, &moves, 30);

        for (turn, board) in history.iter().enumerate() {
            prop_assert_eq!(board.turn, turn as i32);
        }
    }

    /// Property: head-to-head eliminates the shorter snake, or both when equal
    #[test]
    fn prop_head_to_head(
        left_length in 2usize..=5,
        right_length in 2usize..=5,
        seed in any::<u64>(),
    ) {
        // Both heads move into (5, 5)
        let left = Snake::with_body("left", (0..left_length).map(|i| Point::new(4 - i as i32, 5)).collect());
        let right = Snake::with_body("right", (0..right_length).map(|i| Point::new(6 + i as i32, 5)).collect());
        let mut board = BoardState::new(11, 11);
        board.snakes = vec![left, right];

        let ruleset = StandardRuleset::new(settings(seed, 0));
        let next = ruleset
            .create_next_board_state(
                &board,
                &[SnakeMove::new("left", Direction::Right), SnakeMove::new("right", Direction::Left)],
            )
            .unwrap();

        let left = next.snake("left").unwrap();
        let right = next.snake("right").unwrap();
        if left_length == right_length {
            prop_assert_eq!(left.eliminated_cause, EliminationCause::HeadToHead);
            prop_assert_eq!(right.eliminated_cause, EliminationCause::HeadToHead);
        } else {
            let (winner, loser) = if left_length > right_length { (left, right) } else { (right, left) };
            prop_assert!(!winner.is_eliminated());
            prop_assert_eq!(loser.eliminated_cause, EliminationCause::HeadToHead);
            prop_assert_eq!(&loser.eliminated_by, &winner.id);
            prop_assert_eq!(loser.eliminated_on_turn, Some(1));
        }
    }

    /// Property: a solo game is over exactly when every snake is eliminated
    #[test]
    fn prop_solo_game_over(eliminated in prop::collection::vec(any::<bool>(), 1..=4)) {
        let mut board = BoardState::new(11, 11);
        for (i, &dead) in eliminated.iter().enumerate() {
            let mut snake = Snake::new(format!("snake-{i}"), Point::new(i as i32, 0));
            if dead {
                snake.eliminate(EliminationCause::OutOfBounds, "", 1);
            }
            board.snakes.push(snake);
        }

        let ruleset = SoloRuleset::new(settings(0, 0));
        prop_assert_eq!(ruleset.is_game_over(&board).unwrap(), eliminated.iter().all(|&d| d));
    }

    /// Property: royale hazards only ever grow and never cover the whole board
    #[test]
    fn prop_royale_hazards_grow(
        width in 3i32..=19,
        height in 3i32..=19,
        shrink in 1i32..=5,
        seed in any::<u64>(),
    ) {
        let settings = Settings { shrink_every_n_turns: shrink, ..settings(seed, 0) };
        let mut previous: HashSet<Point> = HashSet::new();

        for turn in 0..=120 {
            let hazards: HashSet<Point> = royale_hazards(width, height, turn, &settings)
                .unwrap()
                .into_iter()
                .collect();

            prop_assert!(previous.is_subset(&hazards), "hazards shrank at turn {}", turn);
            prop_assert!(hazards.len() < (width * height) as usize);
            previous = hazards;
        }
    }
}
