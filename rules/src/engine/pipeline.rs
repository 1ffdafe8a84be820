//! Stage registry and pipeline execution.
//!
//! A stage is a plain function that mutates the working board for one turn.
//! Stages are looked up by name in a static registry when a pipeline is
//! built, so a misspelt stage fails before the first turn runs.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::board::{BoardState, SnakeMove};
use super::error::{ConfigurationError, RulesResult};
use super::settings::Settings;
use super::{constrictor, royale, squad, stages};

/// A single step of turn resolution.
///
/// Returns `Ok(true)` to stop the pipeline early (game over).
pub type StageFn = fn(&mut BoardState, &Settings, &[SnakeMove]) -> RulesResult<bool>;

pub const STAGE_MOVEMENT_STANDARD: &str = "snake.movement.standard";
pub const STAGE_REDUCE_HEALTH_STANDARD: &str = "health.reduce.standard";
pub const STAGE_DAMAGE_HAZARDS_STANDARD: &str = "hazard.damage.standard";
pub const STAGE_FEED_SNAKES_STANDARD: &str = "snake.eatfood.standard";
pub const STAGE_SPAWN_FOOD_STANDARD: &str = "food.spawn.standard";
pub const STAGE_ELIMINATION_STANDARD: &str = "snake.eliminate.standard";
pub const STAGE_GAME_OVER_STANDARD: &str = "gameover.standard";
pub const STAGE_GAME_OVER_SOLO: &str = "gameover.solo";
pub const STAGE_GAME_OVER_SQUAD: &str = "gameover.squad";
pub const STAGE_RESURRECT_SQUAD: &str = "snake.collision.squad";
pub const STAGE_SHARE_SQUAD: &str = "snake.share.squad";
pub const STAGE_SPAWN_HAZARDS_ROYALE: &str = "hazard.spawn.royale";
pub const STAGE_CONSTRICTOR: &str = "snake.constrictor";

static STAGE_REGISTRY: LazyLock<HashMap<&'static str, StageFn>> = LazyLock::new(|| {
    let entries: [(&'static str, StageFn); 13] = [
        (STAGE_MOVEMENT_STANDARD, stages::move_snakes_standard),
        (STAGE_REDUCE_HEALTH_STANDARD, stages::reduce_snake_health_standard),
        (STAGE_DAMAGE_HAZARDS_STANDARD, stages::damage_hazards_standard),
        (STAGE_FEED_SNAKES_STANDARD, stages::feed_snakes_standard),
        (STAGE_SPAWN_FOOD_STANDARD, stages::spawn_food_standard),
        (STAGE_ELIMINATION_STANDARD, stages::eliminate_snakes_standard),
        (STAGE_GAME_OVER_STANDARD, stages::game_over_standard),
        (STAGE_GAME_OVER_SOLO, stages::game_over_solo),
        (STAGE_GAME_OVER_SQUAD, squad::game_over_squad),
        (STAGE_RESURRECT_SQUAD, squad::resurrect_snakes_squad),
        (STAGE_SHARE_SQUAD, squad::share_attributes_squad),
        (STAGE_SPAWN_HAZARDS_ROYALE, royale::populate_hazards_royale),
        (STAGE_CONSTRICTOR, constrictor::grow_snakes_constrictor),
    ];
    entries.into_iter().collect()
});

/// Look up a registered stage by name.
pub fn stage(name: &str) -> Option<StageFn> {
    STAGE_REGISTRY.get(name).copied()
}

/// Names of every registered stage, sorted.
pub fn registered_stages() -> Vec<&'static str> {
    let mut names: Vec<_> = STAGE_REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

/// An ordered, fully resolved sequence of stages.
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<(&'static str, StageFn)>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl Pipeline {
    /// Resolve every stage name up front.
    pub fn new(names: &[&str]) -> Result<Self, ConfigurationError> {
        if names.is_empty() {
            return Err(ConfigurationError::EmptyPipeline);
        }

        let stages = names
            .iter()
            .map(|name| {
                STAGE_REGISTRY
                    .get_key_value(*name)
                    .map(|(key, stage)| (*key, *stage))
                    .ok_or_else(|| ConfigurationError::UnknownStage(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { stages })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|(name, _)| *name).collect()
    }

    /// Run every stage in order against a copy of `board`.
    ///
    /// Returns whether a stage ended the game together with the new board.
    /// The input board is never modified.
    pub fn execute(
        &self,
        board: &BoardState,
        settings: &Settings,
        moves: &[SnakeMove],
    ) -> RulesResult<(bool, BoardState)> {
        let mut next = board.clone();

        for (name, stage) in &self.stages {
            tracing::trace!(stage = *name, turn = next.turn, "Running stage");
            if stage(&mut next, settings, moves)? {
                tracing::debug!(stage = *name, turn = next.turn, "Stage ended the game");
                return Ok((true, next));
            }
        }

        Ok((false, next))
    }
}
