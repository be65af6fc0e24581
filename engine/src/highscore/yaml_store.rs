use crate::config::{ConfigSerializer, ContentProvider, FileContentProvider, YamlConfigSerializer};
use crate::{log, PlayerId};
use crate::games::snake::GameMode;
use super::{HighScoreEntry, HighScoreError, HighScoreStore, HighScoreTable};

/// High-score table kept as a YAML document. Every call reads the document
/// fresh so several front ends can share one file.
pub struct YamlHighScoreStore<TProvider: ContentProvider = FileContentProvider> {
    provider: TProvider,
    serializer: YamlConfigSerializer,
}

impl YamlHighScoreStore<FileContentProvider> {
    pub fn from_file(path: &str) -> Self {
        Self::new(FileContentProvider::new(path))
    }
}

impl<TProvider: ContentProvider> YamlHighScoreStore<TProvider> {
    pub fn new(provider: TProvider) -> Self {
        Self {
            provider,
            serializer: YamlConfigSerializer::new(),
        }
    }

    pub fn load_table(&self) -> Result<HighScoreTable, HighScoreError> {
        let Some(content) = self.provider.read_content().map_err(HighScoreError::Io)? else {
            return Ok(HighScoreTable::default());
        };
        if content.trim().is_empty() {
            return Ok(HighScoreTable::default());
        }
        self.serializer.deserialize(&content).map_err(HighScoreError::Parse)
    }

    fn save_table(&self, table: &HighScoreTable) -> Result<(), HighScoreError> {
        let content = self.serializer.serialize(table).map_err(HighScoreError::Encode)?;
        self.provider.write_content(&content).map_err(HighScoreError::Io)
    }
}

impl<TProvider: ContentProvider> HighScoreStore for YamlHighScoreStore<TProvider> {
    fn get_high_score(
        &self,
        player: &PlayerId,
        mode: GameMode,
    ) -> Result<Option<HighScoreEntry>, HighScoreError> {
        Ok(self.load_table()?.find(player, mode).cloned())
    }

    fn set_high_score(&self, player: &PlayerId, mode: GameMode, score: u32) -> Result<(), HighScoreError> {
        let mut table = self.load_table()?;
        table.upsert(player, mode, score);
        self.save_table(&table)?;
        log!("Stored {} high score {} for {}", mode, score, player);
        Ok(())
    }
}
