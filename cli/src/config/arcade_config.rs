use serde::{Deserialize, Serialize};
use snake_arcade_engine::config::{ConfigManager, FileContentProvider, Validate, YamlConfigSerializer};
use snake_arcade_engine::games::snake::{GameMode, ModeConfig};
use snake_arcade_engine::PlayerId;

const CONFIG_FILE_NAME: &str = "snake_arcade.yaml";
const HIGH_SCORE_FILE_NAME: &str = "snake_arcade_high_scores.yaml";

fn get_config_path() -> String {
    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        return exe_dir.join(CONFIG_FILE_NAME).to_string_lossy().into_owned();
    }
    CONFIG_FILE_NAME.to_string()
}

pub fn get_config_manager(
    path: Option<&str>,
) -> ConfigManager<FileContentProvider, ArcadeConfig, YamlConfigSerializer> {
    match path {
        Some(path) => ConfigManager::from_yaml_file(path),
        None => ConfigManager::from_yaml_file(&get_config_path()),
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ArcadeConfig {
    /// Stored player name. Delivery refuses to start without one.
    pub player_name: Option<String>,
    pub high_score_file: String,
    pub blitz: ModeConfig,
    pub delivery: ModeConfig,
}

impl ArcadeConfig {
    pub fn mode_config(&self, mode: GameMode) -> &ModeConfig {
        match mode {
            GameMode::Blitz => &self.blitz,
            GameMode::Delivery => &self.delivery,
        }
    }

    pub fn player(&self) -> Option<PlayerId> {
        self.player_name.as_deref().and_then(PlayerId::parse)
    }
}

impl Validate for ArcadeConfig {
    fn validate(&self) -> Result<(), String> {
        if self.high_score_file.trim().is_empty() {
            return Err("high_score_file must not be empty".to_string());
        }
        self.blitz.validate().map_err(|e| format!("blitz: {}", e))?;
        self.delivery.validate().map_err(|e| format!("delivery: {}", e))?;
        Ok(())
    }
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            player_name: None,
            high_score_file: HIGH_SCORE_FILE_NAME.to_string(),
            blitz: ModeConfig::blitz_defaults(),
            delivery: ModeConfig::delivery_defaults(),
        }
    }
}
