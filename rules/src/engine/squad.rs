//! Squad stages: collision resurrection, attribute sharing and game over.

use super::board::{BoardState, EliminationCause, SnakeMove};
use super::error::{ConsistencyFault, RulesResult};
use super::settings::Settings;
use super::stages::{is_initialization, zero_length};

/// Undo body collisions between squad-mates when `allow_body_collisions` is set.
pub fn resurrect_snakes_squad(
    board: &mut BoardState,
    settings: &Settings,
    moves: &[SnakeMove],
) -> RulesResult<bool> {
    if is_initialization(board, settings, moves) {
        return Ok(false);
    }
    let squad = settings.squad_settings();
    if !squad.allow_body_collisions {
        return Ok(false);
    }

    let turn = board.turn + 1;
    for snake in &mut board.snakes {
        if snake.eliminated_cause != EliminationCause::Collision
            || snake.eliminated_on_turn != Some(turn)
        {
            continue;
        }

        if snake.eliminated_by.is_empty() {
            return Err(ConsistencyFault::MissingCulprit {
                snake_id: snake.id.clone(),
            }
            .into());
        }

        if snake.eliminated_by != snake.id && squad.same_squad(&snake.id, &snake.eliminated_by) {
            tracing::debug!(
                snake_id = %snake.id,
                by = %snake.eliminated_by,
                turn,
                "Resurrected snake after squad collision"
            );
            snake.revive();
        }
    }

    Ok(false)
}

/// Share health, length and elimination between living squad-mates.
pub fn share_attributes_squad(
    board: &mut BoardState,
    settings: &Settings,
    moves: &[SnakeMove],
) -> RulesResult<bool> {
    if is_initialization(board, settings, moves) {
        return Ok(false);
    }
    let squad = settings.squad_settings();
    if !squad.shares_anything() {
        return Ok(false);
    }

    struct Shared {
        health: i32,
        length: usize,
        squad_eliminated: bool,
    }

    // Judge every snake against the board as it stood on entry, then apply
    let mut updates: Vec<(usize, Shared)> = Vec::new();
    for (i, snake) in board.snakes.iter().enumerate() {
        if snake.is_eliminated() {
            continue;
        }

        let mut shared = Shared {
            health: snake.health,
            length: snake.body.len(),
            squad_eliminated: false,
        };

        for other in board.snakes.iter().filter(|o| squad.same_squad(&snake.id, &o.id)) {
            if other.is_eliminated() {
                shared.squad_eliminated = true;
                continue;
            }
            if squad.shared_length {
                if snake.body.is_empty() {
                    return Err(zero_length(snake).into());
                }
                if other.body.is_empty() {
                    return Err(zero_length(other).into());
                }
            }
            shared.health = shared.health.max(other.health);
            shared.length = shared.length.max(other.body.len());
        }

        updates.push((i, shared));
    }

    let turn = board.turn + 1;
    for (i, shared) in updates {
        let snake = &mut board.snakes[i];

        if squad.shared_health {
            snake.health = shared.health;
        }
        if squad.shared_length {
            while snake.body.len() < shared.length {
                snake.grow();
            }
        }
        if squad.shared_elimination && shared.squad_eliminated {
            // Several squad-mates could be the cause, so nobody is credited
            snake.eliminate(EliminationCause::BySquad, "", turn);
            tracing::debug!(snake_id = %snake.id, turn, "Snake eliminated with its squad");
        }
    }

    Ok(false)
}

/// Over once every living snake is on the first living snake's squad.
pub fn game_over_squad(
    board: &mut BoardState,
    settings: &Settings,
    _moves: &[SnakeMove],
) -> RulesResult<bool> {
    let squad = settings.squad_settings();
    let mut living = board.alive_snakes();

    let Some(first) = living.next() else {
        return Ok(true);
    };

    Ok(living.all(|snake| squad.same_squad(&first.id, &snake.id)))
}
