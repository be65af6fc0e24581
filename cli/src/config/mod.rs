mod arcade_config;

pub use arcade_config::{get_config_manager, ArcadeConfig};
