// Snake rules engine
// Turns a board plus one move per snake into the next board, one pipeline of
// named stages at a time.

pub mod board;
pub mod constrictor;
pub mod error;
pub mod maps;
pub mod pipeline;
pub mod rng;
pub mod royale;
pub mod ruleset;
pub mod settings;
pub mod squad;
pub mod stages;


pub use board::{
    BoardState, Direction, EliminationCause, Point, SNAKE_MAX_HEALTH, SNAKE_START_SIZE, Snake,
    SnakeMove,
};
pub use error::{ConfigurationError, ConsistencyFault, RulesError, RulesResult};
pub use maps::{GameMap, get_map};
pub use pipeline::{Pipeline, StageFn};
pub use rng::GameRng;
pub use ruleset::{
    ConstrictorRuleset, GAME_TYPE_CONSTRICTOR, GAME_TYPE_ROYALE, GAME_TYPE_SOLO,
    GAME_TYPE_SQUAD, GAME_TYPE_STANDARD, RoyaleRuleset, Ruleset, RulesetBuilder, SoloRuleset,
    SquadRuleset, StandardRuleset,
};
pub use settings::{Settings, SquadSettings};
