//! The standard stages every ruleset is built from.
//!
//! Each stage mutates the working board of one turn. Eliminations are stamped
//! with `board.turn + 1`, the turn being resolved; the ruleset advances
//! `board.turn` once the whole pipeline has run.

use std::cmp::Reverse;

use super::board::{BoardState, Direction, EliminationCause, SNAKE_MAX_HEALTH, Snake, SnakeMove};
use super::error::{ConsistencyFault, RulesResult};
use super::rng::GameRng;
use super::settings::Settings;

/// The first call of a game carries no moves; mutating stages skip it.
pub fn is_initialization(_board: &BoardState, _settings: &Settings, moves: &[SnakeMove]) -> bool {
    moves.is_empty()
}

pub(crate) fn zero_length(snake: &Snake) -> ConsistencyFault {
    ConsistencyFault::ZeroLengthSnake {
        snake_id: snake.id.clone(),
    }
}

pub fn move_snakes_standard(
    board: &mut BoardState,
    settings: &Settings,
    moves: &[SnakeMove],
) -> RulesResult<bool> {
    if is_initialization(board, settings, moves) {
        return Ok(false);
    }

    for snake in board.snakes.iter_mut().filter(|s| !s.is_eliminated()) {
        let Some(head) = snake.head() else {
            return Err(zero_length(snake).into());
        };

        let submitted = moves.iter().find(|m| m.id == snake.id);
        let direction = resolve_direction(snake, submitted);

        snake.body.insert(0, head.apply_direction(direction));
        snake.body.pop();
    }

    Ok(false)
}

/// Pick the direction a snake actually moves in.
///
/// Missing or unparseable moves, and moves straight back into the neck,
/// continue in the direction the snake last travelled.
fn resolve_direction(snake: &Snake, submitted: Option<&SnakeMove>) -> Direction {
    let last = snake.last_direction();

    let Some(submitted) = submitted else {
        tracing::debug!(snake_id = %snake.id, fallback = %last, "No move submitted");
        return last;
    };

    match submitted.parsed_direction() {
        Some(direction) if reverses_into_neck(snake, direction) => {
            tracing::debug!(
                snake_id = %snake.id,
                requested = %direction,
                fallback = %last,
                "Move reverses into neck"
            );
            last
        }
        Some(direction) => direction,
        None => {
            tracing::debug!(
                snake_id = %snake.id,
                requested = %submitted.direction,
                fallback = %last,
                "Invalid move submitted"
            );
            last
        }
    }
}

fn reverses_into_neck(snake: &Snake, direction: Direction) -> bool {
    match (snake.body.first(), snake.body.get(1)) {
        (Some(head), Some(neck)) => head != neck && head.apply_direction(direction) == *neck,
        _ => false,
    }
}

pub fn reduce_snake_health_standard(
    board: &mut BoardState,
    settings: &Settings,
    moves: &[SnakeMove],
) -> RulesResult<bool> {
    if is_initialization(board, settings, moves) {
        return Ok(false);
    }

    let turn = board.turn + 1;
    for snake in board.snakes.iter_mut().filter(|s| !s.is_eliminated()) {
        snake.health -= 1;
        if snake.health <= 0 {
            snake.health = 0;
            snake.eliminate(EliminationCause::OutOfHealth, "", turn);
            tracing::debug!(snake_id = %snake.id, turn, "Snake starved");
        }
    }

    Ok(false)
}

pub fn damage_hazards_standard(
    board: &mut BoardState,
    settings: &Settings,
    moves: &[SnakeMove],
) -> RulesResult<bool> {
    if is_initialization(board, settings, moves) || settings.hazard_damage_per_turn == 0 {
        return Ok(false);
    }

    let turn = board.turn + 1;
    for snake in board.snakes.iter_mut().filter(|s| !s.is_eliminated()) {
        let Some(head) = snake.head() else {
            return Err(zero_length(snake).into());
        };

        // Food on a hazard cell is eaten before the hazard bites
        if board.food.contains(&head) {
            continue;
        }

        // Stacked hazards on one cell each deal damage
        let hits = board.hazards.iter().filter(|&&h| h == head).count() as i32;
        if hits == 0 {
            continue;
        }

        let damage = hits.saturating_mul(settings.hazard_damage_per_turn);
        snake.health = snake.health.saturating_sub(damage).max(0);
        if snake.health == 0 {
            snake.eliminate(EliminationCause::OutOfHealth, "", turn);
            tracing::debug!(snake_id = %snake.id, turn, hits, "Snake died in hazard");
        }
    }

    Ok(false)
}

pub fn feed_snakes_standard(
    board: &mut BoardState,
    settings: &Settings,
    moves: &[SnakeMove],
) -> RulesResult<bool> {
    if is_initialization(board, settings, moves) {
        return Ok(false);
    }

    let mut remaining = Vec::with_capacity(board.food.len());
    for food in std::mem::take(&mut board.food) {
        // First snake in board order on the cell gets it
        let eater = board
            .snakes
            .iter_mut()
            .find(|s| !s.is_eliminated() && s.head() == Some(food));

        match eater {
            Some(snake) => {
                snake.health = SNAKE_MAX_HEALTH;
                snake.grow();
                tracing::debug!(snake_id = %snake.id, food = %food, "Snake ate food");
            }
            None => remaining.push(food),
        }
    }
    board.food = remaining;

    Ok(false)
}

pub fn spawn_food_standard(
    board: &mut BoardState,
    settings: &Settings,
    moves: &[SnakeMove],
) -> RulesResult<bool> {
    if is_initialization(board, settings, moves) {
        return Ok(false);
    }

    let mut rng = settings.rng(board.turn + 1);

    if rng.chance(settings.food_spawn_chance) {
        place_food_randomly(&mut rng, board, 1);
    }

    let missing = settings.minimum_food as usize;
    if board.food.len() < missing {
        place_food_randomly(&mut rng, board, missing - board.food.len());
    }

    Ok(false)
}

/// Put up to `count` food on random unoccupied cells. Returns how many fit.
pub fn place_food_randomly(rng: &mut GameRng, board: &mut BoardState, count: usize) -> usize {
    let mut free = board.unoccupied_points();
    let mut placed = 0;

    while placed < count && !free.is_empty() {
        let point = free.swap_remove(rng.gen_index(free.len()));
        board.food.push(point);
        placed += 1;
    }

    if placed > 0 {
        tracing::debug!(placed, requested = count, "Spawned food");
    }
    placed
}

pub fn eliminate_snakes_standard(
    board: &mut BoardState,
    settings: &Settings,
    moves: &[SnakeMove],
) -> RulesResult<bool> {
    if is_initialization(board, settings, moves) {
        return Ok(false);
    }

    // Everything below reads the board as it was on entry; eliminations are
    // applied only once every snake has been judged.
    let living: Vec<usize> = (0..board.snakes.len())
        .filter(|&i| !board.snakes[i].is_eliminated())
        .collect();

    if let Some(&i) = living.iter().find(|&&i| board.snakes[i].body.is_empty()) {
        return Err(zero_length(&board.snakes[i]).into());
    }

    // Longer snakes are credited first when several could claim a kill
    let mut by_length = living.clone();
    by_length.sort_by_key(|&i| Reverse(board.snakes[i].body.len()));

    let mut eliminations: Vec<(usize, EliminationCause, String)> = Vec::new();
    for &i in &living {
        let snake = &board.snakes[i];
        let head = snake.body[0];

        if snake.health <= 0 {
            eliminations.push((i, EliminationCause::OutOfHealth, String::new()));
            continue;
        }

        if !board.is_on_board(head) {
            eliminations.push((i, EliminationCause::OutOfBounds, String::new()));
            continue;
        }

        if snake.body[1..].contains(&head) {
            eliminations.push((i, EliminationCause::SelfCollision, snake.id.clone()));
            continue;
        }

        let body_hit = by_length
            .iter()
            .map(|&o| &board.snakes[o])
            .find(|other| other.id != snake.id && other.body[1..].contains(&head));
        if let Some(other) = body_hit {
            eliminations.push((i, EliminationCause::Collision, other.id.clone()));
            continue;
        }

        // A head loses to any other head on the same cell that is at least
        // as long; the longest such snake takes the credit.
        let head_loss = by_length.iter().map(|&o| &board.snakes[o]).find(|other| {
            other.id != snake.id && other.body[0] == head && other.body.len() >= snake.body.len()
        });
        if let Some(other) = head_loss {
            eliminations.push((i, EliminationCause::HeadToHead, other.id.clone()));
        }
    }

    let turn = board.turn + 1;
    for (i, cause, by) in eliminations {
        let snake = &mut board.snakes[i];
        tracing::debug!(snake_id = %snake.id, cause = %cause, by = %by, turn, "Snake eliminated");
        snake.eliminate(cause, by, turn);
    }

    Ok(false)
}

pub fn game_over_standard(
    board: &mut BoardState,
    _settings: &Settings,
    _moves: &[SnakeMove],
) -> RulesResult<bool> {
    Ok(board.alive_snake_count() <= 1)
}

pub fn game_over_solo(
    board: &mut BoardState,
    _settings: &Settings,
    _moves: &[SnakeMove],
) -> RulesResult<bool> {
    Ok(board.snakes.iter().all(Snake::is_eliminated))
}
