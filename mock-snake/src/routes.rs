use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{state::MockSnakeState, types::*};

const DEFAULT_COLOR: &str = "#888888";

/// GET /
pub async fn metadata(State(state): State<MockSnakeState>) -> impl IntoResponse {
    let color = if state.color.is_empty() {
        DEFAULT_COLOR.to_string()
    } else {
        state.color.clone()
    };

    Json(MetadataResponse {
        apiversion: "1".to_string(),
        author: "mock-snake".to_string(),
        color,
        head: "default".to_string(),
        tail: "default".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /start
pub async fn start(
    State(state): State<MockSnakeState>,
    Json(request): Json<GameRequest>,
) -> impl IntoResponse {
    tracing::info!(game_id = %request.game.id, snake_id = %request.you.id, "Game started");
    state.record_start(&request.game.id).await;
    StatusCode::OK
}

/// POST /move
///
/// Answers according to the configured strategy, after the configured delay.
pub async fn make_move(
    State(state): State<MockSnakeState>,
    Json(request): Json<GameRequest>,
) -> impl IntoResponse {
    if !state.move_delay.is_zero() {
        tokio::time::sleep(state.move_delay).await;
    }

    let direction = state.strategy.choose_move(&request);
    tracing::debug!(
        game_id = %request.game.id,
        turn = request.turn,
        snake_id = %request.you.id,
        direction,
        "Choosing move"
    );
    state.record_move(&request.game.id, request.turn).await;

    Json(MoveResponse {
        direction: direction.to_string(),
        shout: None,
    })
}

/// POST /end
pub async fn end(
    State(state): State<MockSnakeState>,
    Json(request): Json<GameRequest>,
) -> impl IntoResponse {
    tracing::info!(game_id = %request.game.id, turn = request.turn, "Game ended");
    state.record_end(&request.game.id).await;
    StatusCode::OK
}
