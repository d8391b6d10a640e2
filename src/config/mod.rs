pub mod app_config;
pub mod cli;
pub mod model;

pub use app_config::{AppConfig, ConfigError, load_config, setup_resolver};
pub use cli::Cli;
