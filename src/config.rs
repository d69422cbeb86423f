//! Mapper configuration, loaded from TOML
//!
//! Every field has a default so a config file only needs the values it
//! changes:
//!
//! ```toml
//! [parser]
//! max_block_lines = 20
//!
//! [grid]
//! current = "@"
//! ```

use crate::error::{MapperError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub parser: ParserConfig,
    pub session: SessionConfig,
    pub grid: GridConfig,
    pub autowalk: AutoWalkConfig,
}

/// Room text recognition settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// How many lines above the exits line may belong to the room block
    pub max_block_lines: usize,
    /// Extra lower-case phrases marking a line as status/combat/NPC text
    pub extra_status_phrases: Vec<String>,
    /// Line that opens a bracketed room block
    pub open_marker: String,
    /// Line prefix that closes a bracketed room block
    pub close_marker: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_block_lines: 15,
            extra_status_phrases: Vec::new(),
            open_marker: "--<".to_string(),
            close_marker: ">--".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of recent lines kept for room parsing
    pub window_size: usize,
    /// Lower-case fragments the game prints when a move goes nowhere
    pub failure_messages: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_size: 64,
            failure_messages: vec![
                "you can't go that way".to_string(),
                "you cannot go that way".to_string(),
                "alas, you cannot go that way".to_string(),
                "there is no exit in that direction".to_string(),
                "you can't go in that direction".to_string(),
            ],
        }
    }
}

/// Map panel size and glyphs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub current: String,
    pub visited: String,
    pub unexplored: String,
    pub up: char,
    pub down: char,
    pub up_down: char,
    pub diagonal: char,
    pub horizontal: char,
    pub vertical: char,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 44,
            height: 15,
            current: "@".to_string(),
            visited: "o".to_string(),
            unexplored: "?".to_string(),
            up: '^',
            down: 'v',
            up_down: '*',
            diagonal: '+',
            horizontal: '-',
            vertical: '|',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoWalkConfig {
    /// Replans allowed after failed moves before the walk is abandoned
    pub max_replans: usize,
}

impl Default for AutoWalkConfig {
    fn default() -> Self {
        Self { max_replans: 5 }
    }
}

impl MapperConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading mapper config from {:?}", path);
        let text = fs::read_to_string(path).map_err(|e| MapperError::io(path, e))?;
        Self::from_toml_str(&text)
    }
}
