/// Database connection management and schema creation
pub mod database;

/// Application settings from stockroom.toml and the environment
pub mod settings;

pub use settings::{AppSettings, DatabaseSettings, load_environment};
