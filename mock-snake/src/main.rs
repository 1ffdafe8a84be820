use color_eyre::eyre::{Context, eyre};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mock_snake::{MockSnakeState, Strategy};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_snake=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get port from env or default to 8090
    let port: u16 = std::env::var("MOCK_SNAKE_PORT")
        .unwrap_or_else(|_| "8090".to_string())
        .parse()
        .wrap_err("Invalid MOCK_SNAKE_PORT")?;

    let strategy: Strategy = std::env::var("MOCK_SNAKE_STRATEGY")
        .unwrap_or_else(|_| "safe".to_string())
        .parse()
        .map_err(|e: String| eyre!(e))
        .wrap_err("Invalid MOCK_SNAKE_STRATEGY")?;

    tracing::info!(?strategy, "Starting mock snake on port {}", port);

    mock_snake::run_server(port, MockSnakeState::new(strategy)).await
}
