//! Win/loss counters kept behind a small key-value port.
//!
//! The front end decides where counters live (memory, a JSON file); game
//! logic only sees [`KeyValueStore`].

use crate::model::side::Side;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const WINS_KEY: &str = "playerWins";
pub const LOSSES_KEY: &str = "playerLosses";
pub const GAMES_PLAYED_KEY: &str = "gamesPlayed";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stats file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stats file {path:?} is not a JSON object of strings: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Flat `{"key": "value"}` JSON object on disk, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|source| StoreError::Json {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }
}

/// Counters from the human player's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameStats {
    pub wins: u32,
    pub losses: u32,
    pub games_played: u32,
}

impl GameStats {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            wins: read_counter(store, WINS_KEY),
            losses: read_counter(store, LOSSES_KEY),
            games_played: read_counter(store, GAMES_PLAYED_KEY),
        }
    }

    pub fn record(store: &mut dyn KeyValueStore, winner: Side) -> Result<Self, StoreError> {
        let mut stats = Self::load(store);
        match winner {
            Side::Human => {
                stats.wins = stats.wins.saturating_add(1);
                store.set(WINS_KEY, stats.wins.to_string())?;
            }
            Side::Computer => {
                stats.losses = stats.losses.saturating_add(1);
                store.set(LOSSES_KEY, stats.losses.to_string())?;
            }
        }
        stats.games_played = stats.games_played.saturating_add(1);
        store.set(GAMES_PLAYED_KEY, stats.games_played.to_string())?;
        Ok(stats)
    }

    /// Whole-number percentage of decided games won.
    pub fn win_rate_percent(&self) -> u32 {
        let decided = self.wins.saturating_add(self.losses);
        if decided == 0 {
            return 0;
        }
        (f64::from(self.wins) / f64::from(decided) * 100.0).round() as u32
    }
}

fn read_counter(store: &dyn KeyValueStore, key: &str) -> u32 {
    store
        .get(key)
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .unwrap_or(0)
}
