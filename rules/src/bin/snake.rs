use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use snake_rules::cli::config::DEFAULT_SHRINK_EVERY_N_TURNS;
use snake_rules::cli::output::{OutputFormat, print_outcome};
use snake_rules::cli::play::{PlayArgs, play};
use snake_rules::engine::settings::{PARAM_GAME_TYPE, PARAM_SHRINK_EVERY_N_TURNS};
use snake_rules::engine::{Ruleset, RulesetBuilder, get_map, maps::MAP_IDS, ruleset::GAME_TYPES};

#[derive(Parser)]
#[command(name = "snake")]
#[command(about = "Run Battlesnake games locally", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game against one or more snakes
    Play(PlayArgs),
    /// List the game types and maps that can be played
    List,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let debug_requests = matches!(&cli.command, Commands::Play(args) if args.debug_requests);
    init_tracing(debug_requests)?;

    match cli.command {
        Commands::Play(args) => {
            // Reject a bad --format before playing a whole game
            let format = OutputFormat::from_flag(args.format.as_deref()).map_err(|e| eyre!(e))?;
            let outcome = play(&args).await?;
            print_outcome(&outcome, format)?;
        }
        Commands::List => list(),
    }

    Ok(())
}

// Logs go to stderr so stdout only carries the summary
fn init_tracing(debug_requests: bool) -> color_eyre::Result<()> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snake_rules=info"));
    if debug_requests {
        filter = filter.add_directive("snake_rules::snake_client=debug".parse()?);
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

fn list() {
    println!("Game types:");
    for game_type in GAME_TYPES {
        let stages = RulesetBuilder::new()
            .with_param(PARAM_GAME_TYPE, game_type)
            .with_param(PARAM_SHRINK_EVERY_N_TURNS, DEFAULT_SHRINK_EVERY_N_TURNS.to_string())
            .build()
            .map(|ruleset| ruleset.stages().join(", "))
            .unwrap_or_default();
        println!("  {game_type}: {stages}");
    }

    println!("Maps:");
    for id in MAP_IDS.iter().filter(|id| get_map(id).is_ok()) {
        println!("  {id}");
    }
}
