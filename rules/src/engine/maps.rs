//! Game maps: initial board layout and the per-turn board updater.

use super::board::{BoardState, Point, Snake};
use super::error::{ConfigurationError, RulesResult};
use super::rng::GameRng;
use super::royale::royale_hazards;
use super::settings::Settings;
use super::stages::place_food_randomly;

pub const MAP_STANDARD: &str = "standard";
pub const MAP_EMPTY: &str = "empty";
pub const MAP_ROYALE: &str = "royale";

pub const MAP_IDS: [&str; 3] = [MAP_STANDARD, MAP_EMPTY, MAP_ROYALE];

/// Board sizes with hand-picked start positions.
const FIXED_START_SIZES: [i32; 3] = [7, 11, 19];

pub trait GameMap: Send + Sync {
    fn id(&self) -> &'static str;

    /// Build the turn 0 board for the given snakes.
    fn setup_board(
        &self,
        width: i32,
        height: i32,
        settings: &Settings,
        snake_ids: &[String],
    ) -> RulesResult<BoardState>;

    /// Called once after every turn has been resolved.
    fn update_board(&self, _board: &mut BoardState, _settings: &Settings) -> RulesResult<()> {
        Ok(())
    }
}

pub fn get_map(id: &str) -> Result<Box<dyn GameMap>, ConfigurationError> {
    match id {
        MAP_STANDARD => Ok(Box::new(StandardMap)),
        MAP_EMPTY => Ok(Box::new(EmptyMap)),
        MAP_ROYALE => Ok(Box::new(RoyaleMap)),
        other => Err(ConfigurationError::UnknownMap(other.to_string())),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StandardMap;

impl GameMap for StandardMap {
    fn id(&self) -> &'static str {
        MAP_STANDARD
    }

    fn setup_board(
        &self,
        width: i32,
        height: i32,
        settings: &Settings,
        snake_ids: &[String],
    ) -> RulesResult<BoardState> {
        let mut rng = settings.rng(0);
        let mut board = BoardState::new(width, height);

        place_snakes(&mut rng, &mut board, snake_ids)?;
        place_starting_food(&mut rng, &mut board);

        Ok(board)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EmptyMap;

impl GameMap for EmptyMap {
    fn id(&self) -> &'static str {
        MAP_EMPTY
    }

    fn setup_board(
        &self,
        width: i32,
        height: i32,
        settings: &Settings,
        snake_ids: &[String],
    ) -> RulesResult<BoardState> {
        let mut rng = settings.rng(0);
        let mut board = BoardState::new(width, height);

        place_snakes(&mut rng, &mut board, snake_ids)?;

        Ok(board)
    }
}

/// Standard layout with a shrinking hazard border.
#[derive(Debug, Clone, Copy)]
pub struct RoyaleMap;

impl GameMap for RoyaleMap {
    fn id(&self) -> &'static str {
        MAP_ROYALE
    }

    fn setup_board(
        &self,
        width: i32,
        height: i32,
        settings: &Settings,
        snake_ids: &[String],
    ) -> RulesResult<BoardState> {
        let board = StandardMap.setup_board(width, height, settings, snake_ids)?;
        // Reject a bad shrink interval before the game starts
        royale_hazards(width, height, 0, settings)?;
        Ok(board)
    }

    fn update_board(&self, board: &mut BoardState, settings: &Settings) -> RulesResult<()> {
        board.hazards = royale_hazards(board.width, board.height, board.turn, settings)?;
        Ok(())
    }
}

fn is_fixed_size(board: &BoardState) -> bool {
    board.width == board.height && FIXED_START_SIZES.contains(&board.width)
}

fn place_snakes(
    rng: &mut GameRng,
    board: &mut BoardState,
    snake_ids: &[String],
) -> Result<(), ConfigurationError> {
    let starts = if is_fixed_size(board) {
        fixed_starts(rng, board)
    } else {
        random_starts(rng, board)
    };

    if snake_ids.len() > starts.len() {
        return Err(ConfigurationError::TooManySnakes {
            width: board.width,
            height: board.height,
            max: starts.len(),
            requested: snake_ids.len(),
        });
    }

    board.snakes = snake_ids
        .iter()
        .zip(starts)
        .map(|(id, start)| Snake::new(id.clone(), start))
        .collect();

    Ok(())
}

/// Corners first, then edge midpoints, each group shuffled.
fn fixed_starts(rng: &mut GameRng, board: &BoardState) -> Vec<Point> {
    let (min, mid, max) = (1, (board.width - 1) / 2, board.width - 2);

    let mut corners = vec![
        Point::new(min, min),
        Point::new(min, max),
        Point::new(max, min),
        Point::new(max, max),
    ];
    let mut edges = vec![
        Point::new(min, mid),
        Point::new(mid, min),
        Point::new(mid, max),
        Point::new(max, mid),
    ];
    rng.shuffle(&mut corners);
    rng.shuffle(&mut edges);

    corners.extend(edges);
    corners
}

/// Random cells on even parity, so no two heads can meet on the first move.
fn random_starts(rng: &mut GameRng, board: &BoardState) -> Vec<Point> {
    let mut cells: Vec<Point> = board
        .unoccupied_points()
        .into_iter()
        .filter(|p| (p.x + p.y) % 2 == 0)
        .collect();
    rng.shuffle(&mut cells);
    cells
}

fn place_starting_food(rng: &mut GameRng, board: &mut BoardState) {
    if !is_fixed_size(board) {
        let count = board.snakes.len();
        place_food_randomly(rng, board, count);
        return;
    }

    let center = Point::new((board.width - 1) / 2, (board.height - 1) / 2);
    let last = board.width - 1;
    let is_corner = |p: &Point| (p.x == 0 || p.x == last) && (p.y == 0 || p.y == last);

    let heads: Vec<Point> = board.snakes.iter().filter_map(Snake::head).collect();
    for head in heads {
        let free = board.unoccupied_points();
        let candidates: Vec<Point> = [(-1, -1), (-1, 1), (1, -1), (1, 1)]
            .into_iter()
            .map(|(dx, dy)| Point::new(head.x + dx, head.y + dy))
            .filter(|p| *p != center && !is_corner(p) && free.contains(p))
            .collect();

        if let Some(&food) = rng.choose(&candidates) {
            board.food.push(food);
        }
    }

    if board.unoccupied_points().contains(&center) {
        board.food.push(center);
    }
}
