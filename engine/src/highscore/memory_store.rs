use std::sync::{Arc, Mutex};

use crate::PlayerId;
use crate::games::snake::GameMode;
use super::{HighScoreEntry, HighScoreError, HighScoreStore, HighScoreTable};

/// Process-local store; clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHighScoreStore {
    table: Arc<Mutex<HighScoreTable>>,
}

impl InMemoryHighScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> Result<HighScoreTable, HighScoreError> {
        let guard = self.table.lock().map_err(|_| HighScoreError::LockPoisoned)?;
        Ok(guard.clone())
    }
}

impl HighScoreStore for InMemoryHighScoreStore {
    fn get_high_score(
        &self,
        player: &PlayerId,
        mode: GameMode,
    ) -> Result<Option<HighScoreEntry>, HighScoreError> {
        let guard = self.table.lock().map_err(|_| HighScoreError::LockPoisoned)?;
        Ok(guard.find(player, mode).cloned())
    }

    fn set_high_score(&self, player: &PlayerId, mode: GameMode, score: u32) -> Result<(), HighScoreError> {
        let mut guard = self.table.lock().map_err(|_| HighScoreError::LockPoisoned)?;
        guard.upsert(player, mode, score);
        Ok(())
    }
}
