//! `snake play`: run a whole game locally against snake agents over HTTP.

use clap::Parser;
use color_eyre::eyre::{Context as _, eyre};
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::client::{self, Customizations, SnakeProfile, SnakeRequest};
use crate::engine::settings::*;
use crate::engine::{
    BoardState, Direction, EliminationCause, GAME_TYPE_SOLO, GameMap, Ruleset, RulesetBuilder,
    Snake, get_map,
};
use crate::snake_client::{self, MoveTarget};

use super::config::PlayDefaults;
use super::export::{GameExporter, GameResult};
use super::output::{SnakeStyle, render_board};

const BODY_GLYPHS: [char; 8] = ['■', '⌀', '●', '☻', '◘', '☺', '□', '⍟'];
const DEFAULT_SNAKE_URL: &str = "https://example.com";
const RULESET_VERSION: &str = "cli";

/// Play a game of snake locally.
#[derive(Debug, Clone, Parser)]
#[command(name = "play")]
pub struct PlayArgs {
    /// Width of board
    #[arg(short = 'W', long)]
    pub width: Option<i32>,

    /// Height of board
    #[arg(short = 'H', long)]
    pub height: Option<i32>,

    /// Name of snake (repeatable)
    #[arg(short = 'n', long = "name")]
    pub names: Vec<String>,

    /// URL of snake (repeatable)
    #[arg(short = 'u', long = "url")]
    pub urls: Vec<String>,

    /// Squad of snake (repeatable, paired with snakes in order)
    #[arg(long = "squad")]
    pub squads: Vec<String>,

    /// Request timeout in milliseconds
    #[arg(short = 't', long = "timeout")]
    pub timeout_ms: Option<u64>,

    /// Request moves one snake at a time
    #[arg(short = 's', long)]
    pub sequential: bool,

    /// Type of game rules
    #[arg(short = 'g', long = "gametype")]
    pub game_type: Option<String>,

    /// Game map used to populate the board
    #[arg(short = 'm', long)]
    pub map: Option<String>,

    /// Print the map every turn
    #[arg(short = 'v', long = "viewmap")]
    pub view_map: bool,

    /// Use colour to draw the map
    #[arg(short = 'c', long = "color")]
    pub use_color: bool,

    /// Random seed (random if not given)
    #[arg(short = 'r', long)]
    pub seed: Option<u64>,

    /// Delay between turns in milliseconds
    #[arg(short = 'd', long = "delay", default_value_t = 0)]
    pub turn_delay_ms: u64,

    /// Minimum turn duration in milliseconds
    #[arg(short = 'D', long = "duration", default_value_t = 0)]
    pub turn_duration_ms: u64,

    /// Log the body of every request sent
    #[arg(long)]
    pub debug_requests: bool,

    /// Export the game as JSONL to this file (overwritten)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Summary format: human or json (default: human on a terminal)
    #[arg(long)]
    pub format: Option<String>,

    /// Stop after this many turns even if the game isn't over
    #[arg(long)]
    pub max_turns: Option<i32>,

    /// Percentage chance of spawning a new food every turn
    #[arg(long = "foodSpawnChance")]
    pub food_spawn_chance: Option<i32>,

    /// Minimum food to keep on the board every turn
    #[arg(long = "minimumFood")]
    pub minimum_food: Option<i32>,

    /// Health a snake loses for ending its turn in a hazard
    #[arg(long = "hazardDamagePerTurn")]
    pub hazard_damage_per_turn: Option<i32>,

    /// Turns between royale hazard expansions
    #[arg(long = "shrinkEveryNTurns")]
    pub shrink_every_n_turns: Option<i32>,

    /// Squad: snakes on the same squad may overlap bodies
    #[arg(long = "allowBodyCollisions")]
    pub allow_body_collisions: bool,

    /// Squad: a squad is eliminated together
    #[arg(long = "sharedElimination")]
    pub shared_elimination: bool,

    /// Squad: squad-mates share the highest health
    #[arg(long = "sharedHealth")]
    pub shared_health: bool,

    /// Squad: squad-mates share the greatest length
    #[arg(long = "sharedLength")]
    pub shared_length: bool,
}

impl PlayArgs {
    /// Ruleset parameters, each taken from its flag, else the config file,
    /// else the built-in default.
    fn ruleset_params(&self, defaults: &PlayDefaults) -> HashMap<String, String> {
        let mut params = HashMap::from([
            (
                PARAM_GAME_TYPE.to_string(),
                self.game_type.clone().unwrap_or_else(|| defaults.game_type().to_string()),
            ),
            (
                PARAM_FOOD_SPAWN_CHANCE.to_string(),
                self.food_spawn_chance
                    .unwrap_or(defaults.food_spawn_chance())
                    .to_string(),
            ),
            (
                PARAM_MINIMUM_FOOD.to_string(),
                self.minimum_food.unwrap_or(defaults.minimum_food()).to_string(),
            ),
            (
                PARAM_HAZARD_DAMAGE_PER_TURN.to_string(),
                self.hazard_damage_per_turn
                    .unwrap_or(defaults.hazard_damage_per_turn())
                    .to_string(),
            ),
            (
                PARAM_SHRINK_EVERY_N_TURNS.to_string(),
                self.shrink_every_n_turns
                    .unwrap_or(defaults.shrink_every_n_turns())
                    .to_string(),
            ),
        ]);

        for (name, enabled) in [
            (PARAM_ALLOW_BODY_COLLISIONS, self.allow_body_collisions),
            (PARAM_SHARED_ELIMINATION, self.shared_elimination),
            (PARAM_SHARED_HEALTH, self.shared_health),
            (PARAM_SHARED_LENGTH, self.shared_length),
        ] {
            params.insert(name.to_string(), enabled.to_string());
        }

        params
    }
}

/// Everything the harness tracks about one snake besides its board state.
#[derive(Debug, Clone)]
pub struct SnakeState {
    pub id: String,
    pub name: String,
    pub url: String,
    pub last_move: Direction,
    pub glyph: char,
    pub profile: SnakeProfile,
    pub author: String,
    pub version: String,
    pub status_code: Option<u16>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnakeOutcome {
    pub id: String,
    pub name: String,
    pub length: usize,
    pub health: i32,
    pub eliminated_cause: EliminationCause,
    pub eliminated_by: Option<String>,
    pub eliminated_on_turn: Option<i32>,
}

/// How a finished game ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameOutcome {
    pub game_id: String,
    pub ruleset: String,
    pub map: String,
    pub seed: u64,
    pub turns: i32,
    pub winner_id: Option<String>,
    pub winner_name: Option<String>,
    pub is_draw: bool,
    pub snakes: Vec<SnakeOutcome>,
}

pub struct GameState {
    width: i32,
    height: i32,
    timeout: Duration,
    sequential: bool,
    view_map: bool,
    use_color: bool,
    turn_delay: Duration,
    turn_duration: Duration,
    max_turns: Option<i32>,
    output: Option<PathBuf>,
    /// One snake playing for survival: nobody wins and nobody draws.
    solo: bool,

    game_id: String,
    seed: u64,
    http: Client,
    ruleset: Box<dyn Ruleset + Send + Sync>,
    map: Box<dyn GameMap>,
    /// In the order snakes were given on the command line, which is also
    /// their order on the board.
    snakes: Vec<SnakeState>,
}

impl GameState {
    /// Resolve options, ping every snake and build the ruleset and map.
    pub async fn from_args(args: &PlayArgs, defaults: &PlayDefaults) -> color_eyre::Result<Self> {
        let timeout = Duration::from_millis(match args.timeout_ms.unwrap_or(defaults.timeout_ms()) {
            0 => defaults.timeout_ms(),
            ms => ms,
        });
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .wrap_err("Failed to build HTTP client")?;

        let seed = args.seed.unwrap_or_else(rand::random);
        let map_id = args.map.clone().unwrap_or_else(|| defaults.map().to_string());
        let map = get_map(&map_id).wrap_err_with(|| format!("Failed to load game map '{map_id}'"))?;

        let snakes = build_snakes(args, &http, timeout).await;

        let params = args.ruleset_params(defaults);
        let solo = args.urls.len() < 2
            || params.get(PARAM_GAME_TYPE).map(String::as_str) == Some(GAME_TYPE_SOLO);
        let mut builder = RulesetBuilder::new()
            .with_seed(seed)
            .with_params(params)
            .with_solo(solo);
        for snake in snakes.iter().filter(|s| !s.profile.squad.is_empty()) {
            builder = builder.with_snake_squad(snake.id.clone(), snake.profile.squad.clone());
        }
        let ruleset = builder.build().wrap_err("Invalid game settings")?;

        Ok(Self {
            width: args.width.unwrap_or(defaults.width()),
            height: args.height.unwrap_or(defaults.height()),
            timeout,
            sequential: args.sequential,
            view_map: args.view_map,
            use_color: args.use_color,
            turn_delay: Duration::from_millis(args.turn_delay_ms),
            turn_duration: Duration::from_millis(args.turn_duration_ms),
            max_turns: args.max_turns,
            output: args.output.clone(),
            solo,
            game_id: uuid::Uuid::new_v4().to_string(),
            seed,
            http,
            ruleset,
            map,
            snakes,
        })
    }

    /// Set up the board and play until the ruleset says the game is over.
    pub async fn run(mut self) -> color_eyre::Result<GameOutcome> {
        if self.snakes.is_empty() {
            return Err(eyre!("At least one snake is required (use --name/--url)"));
        }

        let mut board = self.initialize_board()?;
        let mut exporter = self
            .output
            .as_ref()
            .map(|_| GameExporter::new(self.client_game()));

        tracing::info!(
            game_id = %self.game_id,
            ruleset = self.ruleset.name(),
            map = self.map.id(),
            seed = self.seed,
            snakes = self.snakes.len(),
            "Starting game"
        );
        snake_client::request_start_parallel(&self.http, &self.targets(&board, false), self.timeout)
            .await;

        if self.view_map {
            self.print_map(&board);
        }

        loop {
            if self.ruleset.is_game_over(&board).wrap_err("Error checking game over")? {
                break;
            }
            if self.max_turns.is_some_and(|max| board.turn >= max) {
                tracing::info!(turn = board.turn, "Reached max turns, stopping");
                break;
            }

            let turn_started = Instant::now();

            // Recorded before resolving so the export starts at turn 0
            if let Some(exporter) = exporter.as_mut() {
                exporter.add_snake_request(self.snake_request(&board, &self.snakes[0]));
            }

            board = self.next_board_state(&board).await?;

            if self.view_map {
                self.print_map(&board);
            } else {
                tracing::info!(
                    turn = board.turn,
                    alive = board.alive_snake_count(),
                    food = board.food.len(),
                    hazards = board.hazards.len(),
                    "Turn resolved"
                );
            }

            if !self.turn_delay.is_zero() {
                tokio::time::sleep(self.turn_delay).await;
            }
            if let Some(remaining) = self.turn_duration.checked_sub(turn_started.elapsed()) {
                tokio::time::sleep(remaining).await;
            }
        }

        snake_client::request_end_parallel(&self.http, &self.targets(&board, false), self.timeout).await;

        let outcome = self.outcome(&board);
        match (&outcome.winner_name, outcome.is_draw) {
            _ if self.solo => {
                tracing::info!(turns = board.turn, "Game completed");
            }
            (Some(winner), _) => {
                tracing::info!(turns = board.turn, winner = %winner, "Game completed");
            }
            (None, true) => tracing::info!(turns = board.turn, "Game completed in a draw"),
            (None, false) => tracing::info!(
                turns = board.turn,
                alive = board.alive_snake_count(),
                "Game stopped with no winner"
            ),
        }

        if let (Some(mut exporter), Some(path)) = (exporter, self.output.as_ref()) {
            exporter.set_result(self.export_result(&outcome));
            exporter.flush_to_file(path).wrap_err("Unable to export game")?;
        }

        Ok(outcome)
    }

    fn initialize_board(&self) -> color_eyre::Result<BoardState> {
        let ids: Vec<String> = self.snakes.iter().map(|s| s.id.clone()).collect();
        let board = self
            .map
            .setup_board(self.width, self.height, self.ruleset.settings(), &ids)
            .wrap_err("Error initializing board state")?;

        self.ruleset
            .modify_initial_board_state(board)
            .wrap_err("Error initializing board state")
    }

    async fn next_board_state(&mut self, board: &BoardState) -> color_eyre::Result<BoardState> {
        let targets = self.targets(board, true);
        let last_moves: HashMap<String, Direction> = self
            .snakes
            .iter()
            .map(|s| (s.id.clone(), s.last_move))
            .collect();

        let results = if self.sequential {
            snake_client::request_moves_sequential(&self.http, &targets, self.timeout, &last_moves).await
        } else {
            snake_client::request_moves_parallel(&self.http, &targets, self.timeout, &last_moves).await
        };

        for result in &results {
            if let Some(snake) = self.snakes.iter_mut().find(|s| s.id == result.snake_id) {
                snake.last_move = result.direction;
            }
        }
        let moves: Vec<_> = results.iter().map(|r| r.to_snake_move()).collect();

        let mut next = self
            .ruleset
            .create_next_board_state(board, &moves)
            .wrap_err("Error producing next board state")?;

        self.map
            .update_board(&mut next, self.ruleset.settings())
            .wrap_err("Error updating board with game map")?;

        Ok(next)
    }

    /// Requests for the snakes on `board`, in board order.
    fn targets(&self, board: &BoardState, living_only: bool) -> Vec<MoveTarget> {
        board
            .snakes
            .iter()
            .filter(|s| !living_only || !s.is_eliminated())
            .filter_map(|s| self.snakes.iter().find(|state| state.id == s.id))
            .map(|state| MoveTarget {
                url: state.url.clone(),
                request: self.snake_request(board, state),
            })
            .collect()
    }

    fn snake_request(&self, board: &BoardState, state: &SnakeState) -> SnakeRequest {
        let missing = Snake::with_body(state.id.clone(), vec![]);
        let you = client::Snake::from_engine(board.snake(&state.id).unwrap_or(&missing), &state.profile);

        SnakeRequest {
            game: self.client_game(),
            turn: board.turn,
            board: client::Board::from_state(board, |id| {
                self.snakes.iter().find(|s| s.id == id).map(|s| &s.profile)
            }),
            you,
        }
    }

    fn client_game(&self) -> client::Game {
        client::Game {
            id: self.game_id.clone(),
            ruleset: client::Ruleset {
                name: self.ruleset.name().to_string(),
                version: RULESET_VERSION.to_string(),
                settings: self.ruleset.settings().into(),
            },
            map: self.map.id().to_string(),
            timeout: self.timeout.as_millis() as u64,
            source: String::new(),
        }
    }

    fn print_map(&self, board: &BoardState) {
        let styles: Vec<SnakeStyle<'_>> = self
            .snakes
            .iter()
            .map(|s| SnakeStyle {
                id: &s.id,
                name: &s.name,
                glyph: s.glyph,
                color: &s.profile.customizations.color,
            })
            .collect();
        let header = format!(
            "Ruleset: {}, Seed: {}, Turn: {}",
            self.ruleset.name(),
            self.seed,
            board.turn
        );

        eprintln!("{}", render_board(board, &header, &styles, self.use_color));
    }

    fn name_of(&self, id: &str) -> String {
        self.snakes
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn outcome(&self, board: &BoardState) -> GameOutcome {
        let alive: Vec<_> = board.alive_snakes().collect();
        let winner = match alive.as_slice() {
            [winner] if !self.solo => Some(winner.id.clone()),
            _ => None,
        };

        GameOutcome {
            game_id: self.game_id.clone(),
            ruleset: self.ruleset.name().to_string(),
            map: self.map.id().to_string(),
            seed: self.seed,
            turns: board.turn,
            winner_name: winner.as_deref().map(|id| self.name_of(id)),
            winner_id: winner,
            is_draw: !self.solo && alive.is_empty(),
            snakes: board
                .snakes
                .iter()
                .map(|s| SnakeOutcome {
                    id: s.id.clone(),
                    name: self.name_of(&s.id),
                    length: s.body.len(),
                    health: s.health,
                    eliminated_cause: s.eliminated_cause,
                    eliminated_by: (!s.eliminated_by.is_empty()).then(|| self.name_of(&s.eliminated_by)),
                    eliminated_on_turn: s.eliminated_on_turn,
                })
                .collect(),
        }
    }

    fn export_result(&self, outcome: &GameOutcome) -> GameResult {
        // Solo games credit their only snake
        let (winner_id, winner_name) = match (&outcome.winner_id, &outcome.winner_name) {
            (Some(id), Some(name)) => (id.clone(), name.clone()),
            _ if self.solo => {
                (self.snakes[0].id.clone(), self.snakes[0].name.clone())
            }
            _ => (String::new(), String::new()),
        };

        GameResult {
            winner_id,
            winner_name,
            is_draw: outcome.is_draw,
        }
    }
}

/// Pair up names, URLs and squads, then ping each snake for its metadata.
async fn build_snakes(args: &PlayArgs, http: &Client, timeout: Duration) -> Vec<SnakeState> {
    let count = args.names.len().max(args.urls.len());
    if args.names.len() != args.urls.len() {
        tracing::warn!(
            names = args.names.len(),
            urls = args.urls.len(),
            "Number of names and URLs do not match: defaults will be applied to missing values"
        );
    }

    let mut snakes = Vec::with_capacity(count);
    for i in 0..count {
        let id = uuid::Uuid::new_v4().to_string();
        let name = args.names.get(i).cloned().unwrap_or_else(|| {
            tracing::warn!(snake_id = %id, "Snake name is missing: using its ID");
            id.clone()
        });
        let url = match args.urls.get(i) {
            Some(url) if reqwest::Url::parse(url).is_ok() => url.clone(),
            Some(url) => {
                tracing::warn!(%name, %url, "Snake URL is not valid: using a default");
                DEFAULT_SNAKE_URL.to_string()
            }
            None => {
                tracing::warn!(%name, "Snake URL is missing: using a default");
                DEFAULT_SNAKE_URL.to_string()
            }
        };

        let mut snake = SnakeState {
            id,
            name: name.clone(),
            url,
            last_move: Direction::Up,
            glyph: BODY_GLYPHS[i % BODY_GLYPHS.len()],
            profile: SnakeProfile {
                name,
                squad: args.squads.get(i).cloned().unwrap_or_default(),
                customizations: Customizations::default(),
            },
            author: String::new(),
            version: String::new(),
            status_code: None,
            error: None,
        };

        match snake_client::request_metadata(http, &snake.url, timeout).await {
            Ok((status, metadata)) => {
                snake.status_code = Some(status);
                snake.author = metadata.author;
                snake.version = metadata.version;
                snake.profile.customizations = Customizations {
                    color: metadata.color,
                    head: metadata.head,
                    tail: metadata.tail,
                };
            }
            Err(e) => {
                tracing::warn!(snake_id = %snake.id, url = %snake.url, error = %e, "Failed to fetch snake metadata");
                snake.error = Some(e.to_string());
            }
        }

        snakes.push(snake);
    }

    snakes
}

/// Run `snake play` with the user's config file applied.
pub async fn play(args: &PlayArgs) -> color_eyre::Result<GameOutcome> {
    let config = super::config::CliConfig::load()?;
    GameState::from_args(args, &config.defaults).await?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let args = PlayArgs::parse_from([
            "play", "-W", "7", "-H", "9", "-n", "a", "-u", "http://localhost:1", "-n", "b", "-u",
            "http://localhost:2", "-g", "royale", "--shrinkEveryNTurns", "5", "-r", "42", "-s",
        ]);

        assert_eq!(args.width, Some(7));
        assert_eq!(args.height, Some(9));
        assert_eq!(args.names, vec!["a", "b"]);
        assert_eq!(args.urls.len(), 2);
        assert_eq!(args.game_type.as_deref(), Some("royale"));
        assert_eq!(args.shrink_every_n_turns, Some(5));
        assert_eq!(args.seed, Some(42));
        assert!(args.sequential);
        assert_eq!(args.turn_delay_ms, 0);
    }

    #[test]
    fn test_params_prefer_flags_then_config() {
        let args = PlayArgs::parse_from(["play", "--minimumFood", "4", "--sharedHealth"]);
        let defaults = PlayDefaults {
            minimum_food: Some(2),
            food_spawn_chance: Some(30),
            game_type: Some("squad".to_string()),
            ..Default::default()
        };

        let params = args.ruleset_params(&defaults);

        assert_eq!(params[PARAM_MINIMUM_FOOD], "4");
        assert_eq!(params[PARAM_FOOD_SPAWN_CHANCE], "30");
        assert_eq!(params[PARAM_HAZARD_DAMAGE_PER_TURN], "14");
        assert_eq!(params[PARAM_GAME_TYPE], "squad");
        assert_eq!(params[PARAM_SHARED_HEALTH], "true");
        assert_eq!(params[PARAM_SHARED_LENGTH], "false");
    }
}
