// Rulesets: named pipelines plus the settings and game-over check they run with

use std::collections::{BTreeMap, HashMap};

use super::board::{BoardState, SnakeMove};
use super::constrictor;
use super::error::{ConfigurationError, RulesResult};
use super::pipeline::*;
use super::settings::{PARAM_GAME_TYPE, PARAM_SHRINK_EVERY_N_TURNS, Settings, SquadSettings};
use super::{squad, stages};

pub const GAME_TYPE_STANDARD: &str = "standard";
pub const GAME_TYPE_SOLO: &str = "solo";
pub const GAME_TYPE_SQUAD: &str = "squad";
pub const GAME_TYPE_ROYALE: &str = "royale";
pub const GAME_TYPE_CONSTRICTOR: &str = "constrictor";

pub const GAME_TYPES: [&str; 5] = [
    GAME_TYPE_STANDARD,
    GAME_TYPE_SOLO,
    GAME_TYPE_SQUAD,
    GAME_TYPE_ROYALE,
    GAME_TYPE_CONSTRICTOR,
];

/// The standard backbone shared by every variant except constrictor.
const STANDARD_STAGES: [&str; 6] = [
    STAGE_MOVEMENT_STANDARD,
    STAGE_REDUCE_HEALTH_STANDARD,
    STAGE_DAMAGE_HAZARDS_STANDARD,
    STAGE_FEED_SNAKES_STANDARD,
    STAGE_SPAWN_FOOD_STANDARD,
    STAGE_ELIMINATION_STANDARD,
];

// The policy a game runs under.
//
// Variants only describe their stages and game-over check; building the next
// board and asking whether the game is over are shared.
pub trait Ruleset: Send + Sync {
    fn name(&self) -> &'static str;

    fn settings(&self) -> &Settings;

    /// Stage names in execution order.
    fn stages(&self) -> Vec<&'static str>;

    fn game_over_stage(&self) -> StageFn {
        stages::game_over_standard
    }

    fn pipeline(&self) -> Result<Pipeline, ConfigurationError> {
        Pipeline::new(&self.stages())
    }

    fn modify_initial_board_state(&self, board: BoardState) -> RulesResult<BoardState> {
        Ok(board)
    }

    /// Resolve one turn. The input board is left untouched and the returned
    /// board's turn is one higher.
    fn create_next_board_state(
        &self,
        board: &BoardState,
        moves: &[SnakeMove],
    ) -> RulesResult<BoardState> {
        let pipeline = self.pipeline()?;
        let (_, mut next) = pipeline.execute(board, self.settings(), moves)?;
        next.turn += 1;
        Ok(next)
    }

    fn is_game_over(&self, board: &BoardState) -> RulesResult<bool> {
        let mut scratch = board.clone();
        (self.game_over_stage())(&mut scratch, self.settings(), &[])
    }
}

#[derive(Debug, Clone)]
pub struct StandardRuleset {
    settings: Settings,
}

impl StandardRuleset {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl Ruleset for StandardRuleset {
    fn name(&self) -> &'static str {
        GAME_TYPE_STANDARD
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn stages(&self) -> Vec<&'static str> {
        let mut stages = STANDARD_STAGES.to_vec();
        stages.push(STAGE_GAME_OVER_STANDARD);
        stages
    }
}

/// Standard rules for a single snake; the game runs until it dies.
#[derive(Debug, Clone)]
pub struct SoloRuleset {
    settings: Settings,
}

impl SoloRuleset {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl Ruleset for SoloRuleset {
    fn name(&self) -> &'static str {
        GAME_TYPE_SOLO
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn stages(&self) -> Vec<&'static str> {
        let mut stages = STANDARD_STAGES.to_vec();
        stages.push(STAGE_GAME_OVER_SOLO);
        stages
    }

    fn game_over_stage(&self) -> StageFn {
        stages::game_over_solo
    }
}

#[derive(Debug, Clone)]
pub struct SquadRuleset {
    settings: Settings,
}

impl SquadRuleset {
    pub fn new(mut settings: Settings, squad: SquadSettings) -> Self {
        settings.squad = Some(squad);
        Self { settings }
    }
}

impl Ruleset for SquadRuleset {
    fn name(&self) -> &'static str {
        GAME_TYPE_SQUAD
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn stages(&self) -> Vec<&'static str> {
        let mut stages = STANDARD_STAGES.to_vec();
        stages.extend([STAGE_RESURRECT_SQUAD, STAGE_SHARE_SQUAD, STAGE_GAME_OVER_SQUAD]);
        stages
    }

    fn game_over_stage(&self) -> StageFn {
        squad::game_over_squad
    }
}

#[derive(Debug, Clone)]
pub struct RoyaleRuleset {
    settings: Settings,
    solo: bool,
}

impl RoyaleRuleset {
    pub fn new(settings: Settings, solo: bool) -> Result<Self, ConfigurationError> {
        if settings.shrink_every_n_turns < 1 {
            return Err(ConfigurationError::InvalidSetting {
                name: PARAM_SHRINK_EVERY_N_TURNS.to_string(),
                value: settings.shrink_every_n_turns.to_string(),
                reason: "royale needs a shrink interval of at least 1".to_string(),
            });
        }
        Ok(Self { settings, solo })
    }
}

impl Ruleset for RoyaleRuleset {
    fn name(&self) -> &'static str {
        GAME_TYPE_ROYALE
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn stages(&self) -> Vec<&'static str> {
        let mut stages = STANDARD_STAGES.to_vec();
        stages.push(STAGE_SPAWN_HAZARDS_ROYALE);
        stages.push(game_over_name(self.solo));
        stages
    }

    fn game_over_stage(&self) -> StageFn {
        game_over_fn(self.solo)
    }
}

#[derive(Debug, Clone)]
pub struct ConstrictorRuleset {
    settings: Settings,
    solo: bool,
}

impl ConstrictorRuleset {
    pub fn new(settings: Settings, solo: bool) -> Self {
        Self { settings, solo }
    }
}

impl Ruleset for ConstrictorRuleset {
    fn name(&self) -> &'static str {
        GAME_TYPE_CONSTRICTOR
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn stages(&self) -> Vec<&'static str> {
        vec![
            STAGE_MOVEMENT_STANDARD,
            STAGE_REDUCE_HEALTH_STANDARD,
            STAGE_DAMAGE_HAZARDS_STANDARD,
            STAGE_FEED_SNAKES_STANDARD,
            STAGE_ELIMINATION_STANDARD,
            STAGE_CONSTRICTOR,
            game_over_name(self.solo),
        ]
    }

    fn game_over_stage(&self) -> StageFn {
        game_over_fn(self.solo)
    }

    fn modify_initial_board_state(&self, mut board: BoardState) -> RulesResult<BoardState> {
        constrictor::constrict(&mut board);
        Ok(board)
    }
}

fn game_over_name(solo: bool) -> &'static str {
    if solo {
        STAGE_GAME_OVER_SOLO
    } else {
        STAGE_GAME_OVER_STANDARD
    }
}

fn game_over_fn(solo: bool) -> StageFn {
    if solo {
        stages::game_over_solo
    } else {
        stages::game_over_standard
    }
}

/// Assembles a ruleset from the string parameters a game is configured with.
///
/// ```
/// use snake_rules::engine::{Ruleset, RulesetBuilder};
///
/// let ruleset = RulesetBuilder::new()
///     .with_seed(42)
///     .with_param("name", "squad")
///     .with_param("sharedHealth", "true")
///     .with_snake_squad("one", "red")
///     .with_snake_squad("two", "red")
///     .build()
///     .unwrap();
///
/// assert_eq!(ruleset.name(), "squad");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RulesetBuilder {
    seed: u64,
    params: HashMap<String, String>,
    solo: bool,
    squads: BTreeMap<String, String>,
}

impl RulesetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params.extend(params);
        self
    }

    /// Single-snake game: the standard-shaped variants end when the last
    /// snake dies rather than when one is left.
    pub fn with_solo(mut self, solo: bool) -> Self {
        self.solo = solo;
        self
    }

    pub fn with_snake_squad(mut self, snake_id: impl Into<String>, squad: impl Into<String>) -> Self {
        self.squads.insert(snake_id.into(), squad.into());
        self
    }

    pub fn game_type(&self) -> &str {
        self.params
            .get(PARAM_GAME_TYPE)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(GAME_TYPE_STANDARD)
    }

    pub fn build(&self) -> Result<Box<dyn Ruleset + Send + Sync>, ConfigurationError> {
        let settings = Settings::from_params(&self.params, self.seed)?;

        let ruleset: Box<dyn Ruleset + Send + Sync> = match self.game_type() {
            GAME_TYPE_STANDARD if self.solo => Box::new(SoloRuleset::new(settings)),
            GAME_TYPE_STANDARD => Box::new(StandardRuleset::new(settings)),
            GAME_TYPE_SOLO => Box::new(SoloRuleset::new(settings)),
            GAME_TYPE_SQUAD => {
                let squad = SquadSettings::from_params(&self.params, self.squads.clone())?;
                Box::new(SquadRuleset::new(settings, squad))
            }
            GAME_TYPE_ROYALE => Box::new(RoyaleRuleset::new(settings, self.solo)?),
            GAME_TYPE_CONSTRICTOR => Box::new(ConstrictorRuleset::new(settings, self.solo)),
            other => return Err(ConfigurationError::UnknownGameType(other.to_string())),
        };

        // Fail on a broken stage list now rather than on the first turn
        ruleset.pipeline()?;

        tracing::debug!(
            ruleset = ruleset.name(),
            seed = self.seed,
            stages = ?ruleset.stages(),
            "Built ruleset"
        );
        Ok(ruleset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::board::{EliminationCause, Point, Snake};
    use crate::engine::settings::*;
    use crate::engine::Direction;

    #[test]
    fn test_builder_picks_variant() {
        let cases = [
            (GAME_TYPE_STANDARD, false, GAME_TYPE_STANDARD),
            (GAME_TYPE_STANDARD, true, GAME_TYPE_SOLO),
            (GAME_TYPE_SOLO, false, GAME_TYPE_SOLO),
            (GAME_TYPE_SQUAD, false, GAME_TYPE_SQUAD),
            (GAME_TYPE_ROYALE, false, GAME_TYPE_ROYALE),
            (GAME_TYPE_CONSTRICTOR, true, GAME_TYPE_CONSTRICTOR),
        ];

        for (game_type, solo, expected) in cases {
            let ruleset = RulesetBuilder::new()
                .with_param(PARAM_GAME_TYPE, game_type)
                .with_param(PARAM_SHRINK_EVERY_N_TURNS, "25")
                .with_solo(solo)
                .build()
                .unwrap();
            assert_eq!(ruleset.name(), expected);
        }
    }

    #[test]
    fn test_builder_defaults_to_standard() {
        let ruleset = RulesetBuilder::new().build().unwrap();
        assert_eq!(ruleset.name(), GAME_TYPE_STANDARD);
        assert_eq!(*ruleset.settings(), Settings::default());
    }

    #[test]
    fn test_builder_rejects_unknown_game_type() {
        let err = RulesetBuilder::new()
            .with_param(PARAM_GAME_TYPE, "wrapped-spiral")
            .build()
            .err()
            .unwrap();
        assert_eq!(err, ConfigurationError::UnknownGameType("wrapped-spiral".to_string()));
    }

    #[test]
    fn test_builder_rejects_royale_without_shrink() {
        let err = RulesetBuilder::new()
            .with_param(PARAM_GAME_TYPE, GAME_TYPE_ROYALE)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ConfigurationError::InvalidSetting { .. }));
    }

    #[test]
    fn test_squad_settings_reach_the_stages() {
        let ruleset = RulesetBuilder::new()
            .with_param(PARAM_GAME_TYPE, GAME_TYPE_SQUAD)
            .with_param(PARAM_SHARED_HEALTH, "true")
            .with_snake_squad("a", "red")
            .build()
            .unwrap();

        let squad = ruleset.settings().squad.clone().unwrap();
        assert!(squad.shared_health);
        assert_eq!(squad.squad_of("a"), Some("red"));
    }

    #[test]
    fn test_pipelines() {
        let standard = StandardRuleset::new(Settings::default());
        assert_eq!(standard.stages().last(), Some(&STAGE_GAME_OVER_STANDARD));
        assert_eq!(standard.stages().len(), 7);

        let squad = SquadRuleset::new(Settings::default(), SquadSettings::default());
        assert_eq!(
            &squad.stages()[6..],
            &[STAGE_RESURRECT_SQUAD, STAGE_SHARE_SQUAD, STAGE_GAME_OVER_SQUAD]
        );

        let constrictor = ConstrictorRuleset::new(Settings::default(), false);
        assert!(!constrictor.stages().contains(&STAGE_SPAWN_FOOD_STANDARD));
    }

    #[test]
    fn test_create_next_board_state_advances_turn() {
        let ruleset = StandardRuleset::new(Settings::default());
        let mut board = BoardState::new(11, 11);
        board.snakes = vec![
            Snake::new("a", Point::new(1, 1)),
            Snake::new("b", Point::new(9, 9)),
        ];

        let next = ruleset
            .create_next_board_state(
                &board,
                &[SnakeMove::new("a", Direction::Up), SnakeMove::new("b", Direction::Down)],
            )
            .unwrap();

        assert_eq!(board.turn, 0);
        assert_eq!(next.turn, 1);
        assert_eq!(next.snakes[0].head(), Some(Point::new(1, 2)));
        assert_eq!(next.snakes[1].head(), Some(Point::new(9, 8)));
    }

    #[test]
    fn test_is_game_over_leaves_board_alone() {
        let ruleset = SoloRuleset::new(Settings::default());
        let mut board = BoardState::new(7, 7);
        board.snakes = vec![Snake::new("a", Point::new(1, 1))];

        assert!(!ruleset.is_game_over(&board).unwrap());

        board.snakes[0].eliminate(EliminationCause::OutOfHealth, "", 3);
        assert!(ruleset.is_game_over(&board).unwrap());
    }

    #[test]
    fn test_constrictor_initial_board() {
        let ruleset = ConstrictorRuleset::new(Settings::default(), false);
        let mut board = BoardState::new(7, 7);
        board.food = vec![Point::new(3, 3)];
        board.snakes = vec![Snake::new("a", Point::new(1, 1))];

        let board = ruleset.modify_initial_board_state(board).unwrap();

        assert!(board.food.is_empty());
        assert_eq!(board.snakes[0].body.len(), 3);
    }
}
