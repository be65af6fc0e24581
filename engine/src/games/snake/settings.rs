use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Validate;
use super::types::{FieldSize, GameMode};

/// Per-mode tuning as stored in the config file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ModeConfig {
    pub field_width: u32,
    pub field_height: u32,
    pub snake_length: u32,
    pub tick_interval_ms: u32,
    pub queue_capacity: u32,
    pub countdown_from: u32,
    pub countdown_step_ms: u32,
    pub time_limit_secs: Option<u32>,
    pub pause_allowed: bool,
    pub combo_enabled: bool,
    pub combo_decay_interval_ms: u32,
}

impl ModeConfig {
    pub fn blitz_defaults() -> Self {
        Self {
            field_width: 20,
            field_height: 20,
            snake_length: 3,
            tick_interval_ms: 80,
            queue_capacity: 2,
            countdown_from: 3,
            countdown_step_ms: 850,
            time_limit_secs: Some(60),
            pause_allowed: false,
            combo_enabled: true,
            combo_decay_interval_ms: 50,
        }
    }

    pub fn delivery_defaults() -> Self {
        Self {
            field_width: 20,
            field_height: 20,
            snake_length: 3,
            tick_interval_ms: 120,
            queue_capacity: 2,
            countdown_from: 3,
            countdown_step_ms: 700,
            time_limit_secs: None,
            pause_allowed: true,
            combo_enabled: false,
            combo_decay_interval_ms: 50,
        }
    }

    pub fn defaults_for(mode: GameMode) -> Self {
        match mode {
            GameMode::Blitz => Self::blitz_defaults(),
            GameMode::Delivery => Self::delivery_defaults(),
        }
    }
}

impl Validate for ModeConfig {
    fn validate(&self) -> Result<(), String> {
        if self.field_width < 5 || self.field_height < 5 {
            return Err("field dimensions must be at least 5x5".to_string());
        }
        if self.field_width > 100 || self.field_height > 100 {
            return Err("field dimensions must not exceed 100x100".to_string());
        }
        if self.snake_length < 1 {
            return Err("snake_length must be at least 1".to_string());
        }
        if self.snake_length > self.field_width / 2 + 1 {
            return Err("snake_length must fit left of the field centre".to_string());
        }
        if self.tick_interval_ms < 20 || self.tick_interval_ms > 10_000 {
            return Err("tick_interval_ms must be between 20 and 10000".to_string());
        }
        if self.queue_capacity < 1 || self.queue_capacity > 8 {
            return Err("queue_capacity must be between 1 and 8".to_string());
        }
        if self.countdown_step_ms > 5000 {
            return Err("countdown_step_ms must not exceed 5000".to_string());
        }
        if self.time_limit_secs == Some(0) {
            return Err("time_limit_secs must be positive when set".to_string());
        }
        if self.combo_enabled && self.combo_decay_interval_ms < 1 {
            return Err("combo_decay_interval_ms must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Runtime form of [`ModeConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSettings {
    pub field_size: FieldSize,
    pub snake_length: usize,
    pub tick_interval: Duration,
    pub queue_capacity: usize,
    pub countdown_from: u32,
    pub countdown_step: Duration,
    pub time_limit_secs: Option<u32>,
    pub pause_allowed: bool,
    pub combo_enabled: bool,
    pub combo_decay_interval: Duration,
}

impl MatchSettings {
    pub fn for_mode(mode: GameMode) -> Self {
        Self::from(&ModeConfig::defaults_for(mode))
    }
}

impl From<&ModeConfig> for MatchSettings {
    fn from(config: &ModeConfig) -> Self {
        Self {
            field_size: FieldSize::new(config.field_width as usize, config.field_height as usize),
            snake_length: config.snake_length.max(1) as usize,
            tick_interval: Duration::from_millis(config.tick_interval_ms.max(1) as u64),
            queue_capacity: config.queue_capacity.max(1) as usize,
            countdown_from: config.countdown_from,
            countdown_step: Duration::from_millis(config.countdown_step_ms as u64),
            time_limit_secs: config.time_limit_secs.filter(|secs| *secs > 0),
            pause_allowed: config.pause_allowed,
            combo_enabled: config.combo_enabled,
            combo_decay_interval: Duration::from_millis(config.combo_decay_interval_ms.max(1) as u64),
        }
    }
}
