pub mod routes;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;

pub use state::{GameRecord, MockSnakeState, Strategy};

/// Create the mock snake router
pub fn create_router(state: MockSnakeState) -> Router {
    Router::new()
        .route("/", get(routes::metadata))
        .route("/start", post(routes::start))
        .route("/move", post(routes::make_move))
        .route("/end", post(routes::end))
        .with_state(state)
}

/// Run the mock snake on the specified port
pub async fn run_server(port: u16, state: MockSnakeState) -> color_eyre::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Mock snake running on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Serve the mock on a free local port in the background.
///
/// Returns the address it is listening on. The server lives as long as the
/// tokio runtime.
pub async fn spawn(state: MockSnakeState) -> color_eyre::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_router(state);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Mock snake server failed");
        }
    });

    Ok(addr)
}
