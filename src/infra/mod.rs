pub mod config;
pub mod logging;
pub mod retry;

pub use config::{Config, ConfigError};
