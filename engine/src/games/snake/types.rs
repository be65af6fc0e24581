use std::fmt;

use serde::{Deserialize, Serialize};

/// Grid cell. Signed so a head that left the field can still be reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (d_row, d_col) = direction.offset();
        Self::new(self.row + d_row, self.col + d_col)
    }

    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

pub const MOVEMENT_DIRECTIONS: [Direction; 4] =
    [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

impl Direction {
    pub fn is_opposite(&self, other: &Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
                | (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
        )
    }

    pub fn is_none(&self) -> bool {
        *self == Direction::None
    }

    /// `(row, col)` delta of one step.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn from_key(key: &str) -> Direction {
        match key {
            "ArrowUp" | "w" | "W" => Direction::Up,
            "ArrowDown" | "s" | "S" => Direction::Down,
            "ArrowLeft" | "a" | "A" => Direction::Left,
            "ArrowRight" | "d" | "D" => Direction::Right,
            _ => Direction::None,
        }
    }

    pub fn key(&self) -> Option<&'static str> {
        match self {
            Direction::None => None,
            Direction::Up => Some("ArrowUp"),
            Direction::Down => Some("ArrowDown"),
            Direction::Left => Some("ArrowLeft"),
            Direction::Right => Some("ArrowRight"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSize {
    pub width: usize,
    pub height: usize,
}

impl FieldSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row >= 0
            && pos.col >= 0
            && (pos.row as usize) < self.height
            && (pos.col as usize) < self.width
    }

    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32).flat_map(move |row| (0..self.width as i32).map(move |col| Position::new(row, col)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Blitz,
    Delivery,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::Blitz => write!(f, "blitz"),
            GameMode::Delivery => write!(f, "delivery"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    PreGame,
    Setup,
    InProgress,
    Paused,
    GameOver,
}

impl GamePhase {
    pub fn is_pre_game_or_game_over(&self) -> bool {
        matches!(self, GamePhase::PreGame | GamePhase::GameOver)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    OutOfBounds,
    SelfCollision,
    TimeExpired,
}

/// Audio/visual cue requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CueEvent {
    CountdownInProgress,
    CountdownEnd,
    PelletConsumed,
    ParcelPickedUp,
    BlazingStarted,
    GameOver,
}
