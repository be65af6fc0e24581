mod clock;
mod combo;
mod direction_queue;
mod events;
mod gameboard;
mod session;
mod settings;
mod snake;
mod state_machine;
mod types;

pub use clock::{Countdown, CountdownStep, MatchTimer};
pub use combo::{ComboTracker, ComboUpdate, BLAZING_THRESHOLD, MAX_BOOST_PROGRESS};
pub use direction_queue::DirectionQueue;
pub use events::{ComboSnapshot, GameOverNotification, MatchCommand, MatchEvent, MatchSnapshot};
pub use gameboard::{Consumables, Gameboard, MoveOutcome};
pub use session::GameSession;
pub use settings::{MatchSettings, ModeConfig};
pub use snake::Snake;
pub use state_machine::GameStateMachine;
pub use types::{CueEvent, Direction, EndReason, FieldSize, GameMode, GamePhase, Position, MOVEMENT_DIRECTIONS};
