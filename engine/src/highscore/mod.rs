mod error;
mod memory_store;
mod table;
mod yaml_store;

pub use error::HighScoreError;
pub use memory_store::InMemoryHighScoreStore;
pub use table::{HighScoreEntry, HighScoreTable};
pub use yaml_store::YamlHighScoreStore;

use crate::PlayerId;
use crate::games::snake::GameMode;

/// Best-score persistence, keyed by player and mode. Calls may block; the
/// session runs them on the blocking pool.
pub trait HighScoreStore {
    fn get_high_score(
        &self,
        player: &PlayerId,
        mode: GameMode,
    ) -> Result<Option<HighScoreEntry>, HighScoreError>;

    /// Stores `score` as the player's best for `mode`, replacing any previous entry.
    fn set_high_score(&self, player: &PlayerId, mode: GameMode, score: u32) -> Result<(), HighScoreError>;
}
