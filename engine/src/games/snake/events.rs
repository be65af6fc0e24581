use crate::PlayerId;
use super::gameboard::Consumables;
use super::types::{CueEvent, Direction, EndReason, FieldSize, GameMode, GamePhase, Position};

/// Inbound requests from the input collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchCommand {
    Start,
    /// Raw key name as delivered by the keyboard (`"ArrowUp"`, `"w"`, `" "`).
    Key(String),
    TogglePause,
}

/// Outbound effects of one state machine step, in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchEvent {
    State(MatchSnapshot),
    Cue(CueEvent),
    GameOver(GameOverNotification),
    ReturnToMenu(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComboSnapshot {
    pub consecutive_count: u32,
    pub boost_progress: u32,
    pub is_blazing: bool,
}

/// Point-in-time copy of everything a renderer needs.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchSnapshot {
    pub mode: GameMode,
    pub phase: GamePhase,
    pub tick: u64,
    pub score: u32,
    pub high_score: Option<u32>,
    pub time_left: Option<u32>,
    pub message: String,
    pub field_size: FieldSize,
    pub snake: Vec<Position>,
    pub heading: Direction,
    pub consumables: Consumables,
    pub combo: Option<ComboSnapshot>,
    pub end_reason: Option<EndReason>,
}

impl MatchSnapshot {
    pub fn head(&self) -> Option<Position> {
        self.snake.first().copied()
    }

    /// Next cell the player is after: the pellet, the parcel, or the
    /// delivery point once the parcel is carried.
    pub fn target(&self) -> Option<Position> {
        match &self.consumables {
            Consumables::Pellet { pellet } => *pellet,
            Consumables::Delivery { parcel, delivery_point, carrying_parcel } => {
                if *carrying_parcel { *delivery_point } else { *parcel }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameOverNotification {
    pub mode: GameMode,
    pub player: Option<PlayerId>,
    pub score: u32,
    pub previous_best: Option<u32>,
    pub is_new_high_score: bool,
    pub reason: EndReason,
    pub message: String,
    pub ticks: u64,
}
