use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::PlayerId;
use crate::games::snake::GameMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub player: String,
    pub mode: GameMode,
    pub score: u32,
    /// RFC 3339, local time.
    pub recorded_at: String,
}

/// On-disk document: one entry per (player, mode).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreTable {
    #[serde(default)]
    pub entries: Vec<HighScoreEntry>,
}

impl HighScoreTable {
    pub fn find(&self, player: &PlayerId, mode: GameMode) -> Option<&HighScoreEntry> {
        self.entries
            .iter()
            .find(|entry| entry.player == player.as_str() && entry.mode == mode)
    }

    pub fn upsert(&mut self, player: &PlayerId, mode: GameMode, score: u32) {
        let recorded_at = Local::now().to_rfc3339();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.player == player.as_str() && entry.mode == mode)
        {
            Some(entry) => {
                entry.score = score;
                entry.recorded_at = recorded_at;
            }
            None => self.entries.push(HighScoreEntry {
                player: player.to_string(),
                mode,
                score,
                recorded_at,
            }),
        }
    }

    /// Entries for `mode`, best first.
    pub fn leaderboard(&self, mode: GameMode) -> Vec<&HighScoreEntry> {
        let mut entries: Vec<&HighScoreEntry> =
            self.entries.iter().filter(|entry| entry.mode == mode).collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.player.cmp(&b.player)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str) -> PlayerId {
        PlayerId::new(name.to_string())
    }

    #[test]
    fn test_upsert_replaces_same_player_and_mode() {
        let mut table = HighScoreTable::default();
        table.upsert(&player("ada"), GameMode::Blitz, 4);
        table.upsert(&player("ada"), GameMode::Blitz, 9);
        table.upsert(&player("ada"), GameMode::Delivery, 2);

        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.find(&player("ada"), GameMode::Blitz).map(|e| e.score), Some(9));
        assert_eq!(table.find(&player("ada"), GameMode::Delivery).map(|e| e.score), Some(2));
        assert!(table.find(&player("bob"), GameMode::Blitz).is_none());
    }

    #[test]
    fn test_leaderboard_orders_by_score() {
        let mut table = HighScoreTable::default();
        table.upsert(&player("ada"), GameMode::Blitz, 4);
        table.upsert(&player("bob"), GameMode::Blitz, 11);
        table.upsert(&player("cy"), GameMode::Delivery, 50);

        let names: Vec<&str> = table
            .leaderboard(GameMode::Blitz)
            .iter()
            .map(|e| e.player.as_str())
            .collect();
        assert_eq!(names, vec!["bob", "ada"]);
    }
}
