//! Menu configuration loading from config.toml
//!
//! The cafeteria's items, the combo rules and the participant roster all live in one
//! TOML file. Loading it is fatal on any error: the bot never runs on a partially
//! loaded menu.

use crate::{
    config::participants::ParticipantConfig,
    core::catalog::{ComboRule, Item, Menu},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_VAR: &str = "BREAKFAST_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Everything the cafeteria sells
    pub items: Vec<Item>,
    /// Combo rules, in the order they are listed
    #[serde(default)]
    pub combos: Vec<ComboRule>,
    /// Regulars seeded into the ledger
    #[serde(default)]
    pub participants: Vec<ParticipantConfig>,
}

impl Config {
    /// Validates the items and combos and builds the menu.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first problem found.
    pub fn menu(&self) -> Result<Menu> {
        Menu::new(self.items.clone(), self.combos.clone())
    }
}

/// Parses a configuration from TOML text.
///
/// # Errors
/// Returns `Error::Config` if the TOML is invalid or a required field is missing.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!(
            "Failed to read config file {}: {e}",
            path.as_ref().display()
        ),
    })?;
    let config = parse_config(&contents)?;
    info!(
        "Loaded {} items, {} combos and {} participants from {}",
        config.items.len(),
        config.combos.len(),
        config.participants.len(),
        path.as_ref().display()
    );
    Ok(config)
}

/// Loads the configuration from `BREAKFAST_CONFIG`, or `./config.toml` when unset.
///
/// # Errors
/// Same as [`load_config`].
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}
