// Board state representation for the rules engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Health a snake starts with and is restored to when it eats.
pub const SNAKE_MAX_HEALTH: i32 = 100;

/// Body length of a freshly placed snake.
pub const SNAKE_START_SIZE: usize = 3;

// 2D point on the game board. May lie outside the board after a wall collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn apply_direction(&self, direction: Direction) -> Point {
        match direction {
            Direction::Up => Point::new(self.x, self.y + 1),
            Direction::Down => Point::new(self.x, self.y - 1),
            Direction::Left => Point::new(self.x - 1, self.y),
            Direction::Right => Point::new(self.x + 1, self.y),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// Movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(format!("invalid direction '{other}'")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A move submitted for one snake on one turn.
///
/// The direction is kept as the raw string the agent sent; the movement
/// stage decides what to do with anything that is not a valid direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeMove {
    pub id: String,
    #[serde(rename = "move")]
    pub direction: String,
}

impl SnakeMove {
    pub fn new(id: impl Into<String>, direction: Direction) -> Self {
        Self {
            id: id.into(),
            direction: direction.as_str().to_string(),
        }
    }

    pub fn parsed_direction(&self) -> Option<Direction> {
        self.direction.parse().ok()
    }
}

// Reasons a snake can be eliminated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EliminationCause {
    #[default]
    #[serde(rename = "")]
    NotEliminated,
    #[serde(rename = "out-of-health")]
    OutOfHealth,
    #[serde(rename = "wall-collision")]
    OutOfBounds,
    #[serde(rename = "snake-self-collision")]
    SelfCollision,
    #[serde(rename = "snake-collision")]
    Collision,
    #[serde(rename = "head-collision")]
    HeadToHead,
    #[serde(rename = "squad-eliminated")]
    BySquad,
}

impl EliminationCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            EliminationCause::NotEliminated => "",
            EliminationCause::OutOfHealth => "out-of-health",
            EliminationCause::OutOfBounds => "wall-collision",
            EliminationCause::SelfCollision => "snake-self-collision",
            EliminationCause::Collision => "snake-collision",
            EliminationCause::HeadToHead => "head-collision",
            EliminationCause::BySquad => "squad-eliminated",
        }
    }
}

impl fmt::Display for EliminationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Snake representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snake {
    pub id: String,
    pub body: Vec<Point>, // Head is at index 0
    pub health: i32,
    pub eliminated_cause: EliminationCause,
    pub eliminated_by: String,
    pub eliminated_on_turn: Option<i32>,
}

impl Snake {
    /// A full-health snake with `SNAKE_START_SIZE` segments stacked on one point.
    pub fn new(id: impl Into<String>, start: Point) -> Self {
        Self::with_body(id, vec![start; SNAKE_START_SIZE])
    }

    pub fn with_body(id: impl Into<String>, body: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            body,
            health: SNAKE_MAX_HEALTH,
            eliminated_cause: EliminationCause::NotEliminated,
            eliminated_by: String::new(),
            eliminated_on_turn: None,
        }
    }

    pub fn head(&self) -> Option<Point> {
        self.body.first().copied()
    }

    pub fn is_eliminated(&self) -> bool {
        self.eliminated_cause != EliminationCause::NotEliminated
    }

    pub fn eliminate(&mut self, cause: EliminationCause, by: impl Into<String>, turn: i32) {
        self.eliminated_cause = cause;
        self.eliminated_by = by.into();
        self.eliminated_on_turn = Some(turn);
    }

    pub fn revive(&mut self) {
        self.eliminated_cause = EliminationCause::NotEliminated;
        self.eliminated_by.clear();
        self.eliminated_on_turn = None;
    }

    /// Duplicate the tail segment; the snake gets one longer once it moves.
    pub fn grow(&mut self) {
        if let Some(tail) = self.body.last().copied() {
            self.body.push(tail);
        }
    }

    /// The direction the snake last travelled in, read from its head and neck.
    ///
    /// Stacked segments (a snake that has not moved yet) report `Up`.
    pub fn last_direction(&self) -> Direction {
        let (Some(head), Some(neck)) = (self.body.first(), self.body.get(1)) else {
            return Direction::Up;
        };

        Direction::ALL
            .into_iter()
            .find(|&d| neck.apply_direction(d) == *head)
            .unwrap_or(Direction::Up)
    }
}

// Complete board state for one turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub width: i32,
    pub height: i32,
    pub turn: i32,
    pub food: Vec<Point>,
    pub hazards: Vec<Point>,
    pub snakes: Vec<Snake>,
}

impl BoardState {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            turn: 0,
            food: Vec::new(),
            hazards: Vec::new(),
            snakes: Vec::new(),
        }
    }

    pub fn is_on_board(&self, p: Point) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    pub fn snake(&self, id: &str) -> Option<&Snake> {
        self.snakes.iter().find(|s| s.id == id)
    }

    pub fn snake_mut(&mut self, id: &str) -> Option<&mut Snake> {
        self.snakes.iter_mut().find(|s| s.id == id)
    }

    pub fn alive_snakes(&self) -> impl Iterator<Item = &Snake> {
        self.snakes.iter().filter(|s| !s.is_eliminated())
    }

    pub fn alive_snake_count(&self) -> usize {
        self.alive_snakes().count()
    }

    /// Every on-board cell not covered by food, a hazard or a living snake's
    /// segment, in row-major order so random picks over it are reproducible.
    pub fn unoccupied_points(&self) -> Vec<Point> {
        let mut occupied = vec![false; (self.width.max(0) * self.height.max(0)) as usize];
        let mut mark = |p: &Point| {
            if self.is_on_board(*p) {
                occupied[(p.y * self.width + p.x) as usize] = true;
            }
        };

        self.food.iter().for_each(&mut mark);
        self.hazards.iter().for_each(&mut mark);
        self.alive_snakes()
            .flat_map(|s| s.body.iter())
            .for_each(&mut mark);

        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Point::new(x, y)))
            .filter(|p| !occupied[(p.y * self.width + p.x) as usize])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_apply_direction() {
        let p = Point::new(5, 5);

        assert_eq!(p.apply_direction(Direction::Up), Point::new(5, 6));
        assert_eq!(p.apply_direction(Direction::Down), Point::new(5, 4));
        assert_eq!(p.apply_direction(Direction::Left), Point::new(4, 5));
        assert_eq!(p.apply_direction(Direction::Right), Point::new(6, 5));
    }

    #[test]
    fn test_point_can_leave_the_board() {
        let p = Point::new(0, 0);

        assert_eq!(p.apply_direction(Direction::Down), Point::new(0, -1));
        assert_eq!(p.apply_direction(Direction::Left), Point::new(-1, 0));
        assert!(!BoardState::new(11, 11).is_on_board(Point::new(-1, 0)));
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("up".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("DOWN".parse::<Direction>(), Ok(Direction::Down));
        assert_eq!("Left".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!("RIGHT".parse::<Direction>(), Ok(Direction::Right));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_last_direction() {
        let stacked = Snake::new("a", Point::new(3, 3));
        assert_eq!(stacked.last_direction(), Direction::Up);

        let moving_left = Snake::with_body("b", vec![Point::new(2, 3), Point::new(3, 3)]);
        assert_eq!(moving_left.last_direction(), Direction::Left);

        let moving_down = Snake::with_body("c", vec![Point::new(3, 2), Point::new(3, 3)]);
        assert_eq!(moving_down.last_direction(), Direction::Down);
    }

    #[test]
    fn test_grow_duplicates_tail() {
        let mut snake = Snake::with_body("a", vec![Point::new(1, 1), Point::new(1, 0)]);
        snake.grow();
        assert_eq!(
            snake.body,
            vec![Point::new(1, 1), Point::new(1, 0), Point::new(1, 0)]
        );

        let mut empty = Snake::with_body("b", vec![]);
        empty.grow();
        assert!(empty.body.is_empty());
    }

    #[test]
    fn test_eliminate_and_revive() {
        let mut snake = Snake::new("a", Point::new(1, 1));
        snake.eliminate(EliminationCause::Collision, "b", 4);
        assert!(snake.is_eliminated());
        assert_eq!(snake.eliminated_by, "b");
        assert_eq!(snake.eliminated_on_turn, Some(4));

        snake.revive();
        assert!(!snake.is_eliminated());
        assert!(snake.eliminated_by.is_empty());
        assert_eq!(snake.eliminated_on_turn, None);
    }

    #[test]
    fn test_unoccupied_points() {
        let mut board = BoardState::new(3, 3);
        board.food.push(Point::new(0, 0));
        board.hazards.push(Point::new(1, 0));
        board
            .snakes
            .push(Snake::with_body("a", vec![Point::new(2, 0), Point::new(2, 1)]));

        let free = board.unoccupied_points();
        assert_eq!(free.len(), 5);
        assert_eq!(free[0], Point::new(0, 1));
        assert!(!free.contains(&Point::new(2, 1)));
    }

    #[test]
    fn test_unoccupied_points_include_eliminated_bodies() {
        let mut board = BoardState::new(2, 1);
        let mut dead = Snake::with_body("b", vec![Point::new(1, 0)]);
        dead.eliminate(EliminationCause::OutOfHealth, "", 3);
        board.snakes = vec![Snake::with_body("a", vec![Point::new(0, 0)]), dead];

        assert_eq!(board.unoccupied_points(), vec![Point::new(1, 0)]);
    }

    #[test]
    fn test_elimination_cause_serializes_as_wire_string() {
        let json = serde_json::to_string(&EliminationCause::HeadToHead).unwrap();
        assert_eq!(json, "\"head-collision\"");
        assert_eq!(EliminationCause::NotEliminated.as_str(), "");
    }
}
