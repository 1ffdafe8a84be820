//! HTTP client for talking to snake agents
//!
//! Agents are polled with a per-request deadline. A snake that fails to answer
//! in time, answers with garbage or can't be reached is not an error: it keeps
//! moving in the direction it last chose.

use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::client::{MoveResponse, SnakeMetadataResponse, SnakeRequest};
use crate::engine::{Direction, SnakeMove};

/// Result of a move request including timing info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub snake_id: String,
    pub direction: Direction,
    pub latency_ms: Option<u64>,
    pub timed_out: bool,
    pub shout: Option<String>,
}

impl MoveResult {
    fn fallback(snake_id: &str, last_direction: Direction, latency_ms: Option<u64>, timed_out: bool) -> Self {
        Self {
            snake_id: snake_id.to_string(),
            direction: last_direction,
            latency_ms,
            timed_out,
            shout: None,
        }
    }

    pub fn to_snake_move(&self) -> SnakeMove {
        SnakeMove::new(self.snake_id.clone(), self.direction)
    }
}

/// One agent to poll: where it lives and what to send it.
#[derive(Debug, Clone)]
pub struct MoveTarget {
    pub url: String,
    pub request: SnakeRequest,
}

fn endpoint(url: &str, path: &str) -> String {
    format!("{}/{}", url.trim_end_matches('/'), path)
}

/// Fetch an agent's metadata from `GET /`.
///
/// Returns the HTTP status alongside the parsed body.
pub async fn request_metadata(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> color_eyre::Result<(u16, SnakeMetadataResponse)> {
    let exchange = async {
        let response = client.get(url).send().await?;
        let status = response.status().as_u16();
        let metadata = response.json::<SnakeMetadataResponse>().await?;
        Ok::<_, reqwest::Error>((status, metadata))
    };

    let (status, metadata) = tokio::time::timeout(timeout, exchange)
        .await
        .map_err(|_| color_eyre::eyre::eyre!("Timed out after {}ms", timeout.as_millis()))??;

    Ok((status, metadata))
}

/// Call a snake's /move endpoint
///
/// On timeout or error, falls back to `last_direction`.
pub async fn request_move(
    client: &Client,
    target: &MoveTarget,
    timeout: Duration,
    last_direction: Direction,
) -> MoveResult {
    let snake_id = target.request.you.id.as_str();
    let move_url = endpoint(&target.url, "move");
    log_request_body(&move_url, &target.request);

    let start = Instant::now();
    let exchange = async {
        let response = client.post(&move_url).json(&target.request).send().await?;
        response.error_for_status()?.json::<MoveResponse>().await
    };
    let result = tokio::time::timeout(timeout, exchange).await;
    let elapsed = start.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(move_response)) => match move_response.direction.parse::<Direction>() {
            Ok(direction) => MoveResult {
                snake_id: snake_id.to_string(),
                direction,
                latency_ms: Some(elapsed),
                timed_out: false,
                shout: move_response.shout,
            },
            Err(e) => {
                tracing::warn!(
                    snake_id = %snake_id,
                    error = %e,
                    fallback = %last_direction,
                    "Snake sent an invalid move, using fallback"
                );
                MoveResult::fallback(snake_id, last_direction, Some(elapsed), false)
            }
        },
        Ok(Err(e)) => {
            tracing::warn!(
                snake_id = %snake_id,
                error = %e,
                fallback = %last_direction,
                "Error calling snake, using fallback"
            );
            MoveResult::fallback(snake_id, last_direction, None, e.is_timeout())
        }
        Err(_) => {
            tracing::warn!(
                snake_id = %snake_id,
                timeout_ms = timeout.as_millis() as u64,
                fallback = %last_direction,
                "Snake timed out, using fallback"
            );
            MoveResult::fallback(snake_id, last_direction, None, true)
        }
    }
}

/// Call /start (fire and forget, no response expected)
pub async fn request_start(client: &Client, target: &MoveTarget, timeout: Duration) {
    notify(client, target, "start", timeout).await;
}

/// Call /end (fire and forget, no response expected)
pub async fn request_end(client: &Client, target: &MoveTarget, timeout: Duration) {
    notify(client, target, "end", timeout).await;
}

async fn notify(client: &Client, target: &MoveTarget, path: &str, timeout: Duration) {
    let snake_id = &target.request.you.id;
    let url = endpoint(&target.url, path);
    log_request_body(&url, &target.request);

    match tokio::time::timeout(timeout, client.post(&url).json(&target.request).send()).await {
        Ok(Ok(_)) => {
            tracing::debug!(snake_id = %snake_id, path, "Notified snake");
        }
        Ok(Err(e)) => {
            tracing::warn!(snake_id = %snake_id, path, error = %e, "Failed to notify snake");
        }
        Err(_) => {
            tracing::warn!(snake_id = %snake_id, path, "Timeout notifying snake");
        }
    }
}

fn log_request_body(url: &str, request: &SnakeRequest) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        match serde_json::to_string(request) {
            Ok(body) => tracing::debug!(%url, %body, "POST"),
            Err(e) => tracing::debug!(%url, error = %e, "POST (unserialisable body)"),
        }
    }
}

fn last_direction_of(last_moves: &HashMap<String, Direction>, target: &MoveTarget) -> Direction {
    last_moves
        .get(&target.request.you.id)
        .copied()
        .unwrap_or(Direction::Up)
}

/// Request moves from every target at once, waiting for all of them.
///
/// Results come back in the order of `targets`.
pub async fn request_moves_parallel(
    client: &Client,
    targets: &[MoveTarget],
    timeout: Duration,
    last_moves: &HashMap<String, Direction>,
) -> Vec<MoveResult> {
    let futures: Vec<_> = targets
        .iter()
        .map(|target| request_move(client, target, timeout, last_direction_of(last_moves, target)))
        .collect();

    futures::future::join_all(futures).await
}

/// Request moves one snake at a time.
pub async fn request_moves_sequential(
    client: &Client,
    targets: &[MoveTarget],
    timeout: Duration,
    last_moves: &HashMap<String, Direction>,
) -> Vec<MoveResult> {
    let mut results = Vec::with_capacity(targets.len());
    for target in targets {
        results.push(request_move(client, target, timeout, last_direction_of(last_moves, target)).await);
    }
    results
}

/// Call /start for all snakes in parallel
pub async fn request_start_parallel(client: &Client, targets: &[MoveTarget], timeout: Duration) {
    let futures: Vec<_> = targets
        .iter()
        .map(|target| request_start(client, target, timeout))
        .collect();

    futures::future::join_all(futures).await;
}

/// Call /end for all snakes in parallel
pub async fn request_end_parallel(client: &Client, targets: &[MoveTarget], timeout: Duration) {
    let futures: Vec<_> = targets
        .iter()
        .map(|target| request_end(client, target, timeout))
        .collect();

    futures::future::join_all(futures).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        assert_eq!(endpoint("http://localhost:8000", "move"), "http://localhost:8000/move");
        assert_eq!(endpoint("http://localhost:8000/", "end"), "http://localhost:8000/end");
        assert_eq!(endpoint("http://host/snake/", "start"), "http://host/snake/start");
    }

    #[test]
    fn test_fallback_move_result() {
        let result = MoveResult::fallback("abc", Direction::Left, None, true);
        assert_eq!(result.direction, Direction::Left);
        assert!(result.timed_out);
        assert_eq!(result.to_snake_move(), SnakeMove::new("abc", Direction::Left));
    }
}
