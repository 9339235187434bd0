/// Database configuration and connection management
pub mod database;

/// Menu, combo and roster loading from config.toml
pub mod menu;

/// Participant roster entries
pub mod participants;
