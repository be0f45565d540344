use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{params, Connection as SqlConnection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::preset::{Preset, Theme};

pub const KEY_PRESETS: &str = "presets";
pub const KEY_THEMES: &str = "themes";
pub const KEY_HUE: &str = "hue";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("malformed stored data: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// String key-value store backed by SQLite
pub struct KvStore {
    conn: SqlConnection,
}

impl KvStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::init(SqlConnection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(SqlConnection::open_in_memory()?)
    }

    fn init(conn: SqlConnection) -> StoreResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self { conn })
    }

    pub fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Deserialize a stored JSON value. Missing keys yield `None`; malformed
    /// data is an error.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        self.set(key, &serde_json::to_string(value)?)
    }
}

/// Result of a save request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The name exists and overwriting was not confirmed
    NameTaken,
    /// No name was given
    Cancelled,
    /// Nothing to save
    Empty,
}

/// User-defined presets and themes, persisted on every change
pub struct PresetStore {
    kv: KvStore,
    presets: BTreeMap<String, Preset>,
    themes: BTreeMap<String, Theme>,
}

impl PresetStore {
    pub fn load(kv: KvStore) -> StoreResult<Self> {
        let presets = kv.get_json(KEY_PRESETS)?.unwrap_or_default();
        let themes = kv.get_json(KEY_THEMES)?.unwrap_or_default();
        Ok(Self { kv, presets, themes })
    }

    pub fn presets(&self) -> &BTreeMap<String, Preset> {
        &self.presets
    }

    pub fn themes(&self) -> &BTreeMap<String, Theme> {
        &self.themes
    }

    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }

    pub fn save_preset(&mut self, name: &str, preset: Preset, overwrite: bool) -> StoreResult<SaveOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(SaveOutcome::Cancelled);
        }
        if self.presets.contains_key(name) && !overwrite {
            return Ok(SaveOutcome::NameTaken);
        }
        self.presets.insert(name.to_string(), preset);
        self.kv.set_json(KEY_PRESETS, &self.presets)?;
        Ok(SaveOutcome::Saved)
    }

    pub fn save_theme(&mut self, name: &str, theme: Theme, overwrite: bool) -> StoreResult<SaveOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(SaveOutcome::Cancelled);
        }
        if self.themes.contains_key(name) && !overwrite {
            return Ok(SaveOutcome::NameTaken);
        }
        if theme.is_empty() {
            return Ok(SaveOutcome::Empty);
        }
        self.themes.insert(name.to_string(), theme);
        self.kv.set_json(KEY_THEMES, &self.themes)?;
        Ok(SaveOutcome::Saved)
    }

    pub fn delete_preset(&mut self, name: &str) -> StoreResult<bool> {
        if self.presets.remove(name).is_none() {
            return Ok(false);
        }
        store_map(&self.kv, KEY_PRESETS, &self.presets)?;
        Ok(true)
    }

    pub fn delete_theme(&mut self, name: &str) -> StoreResult<bool> {
        if self.themes.remove(name).is_none() {
            return Ok(false);
        }
        store_map(&self.kv, KEY_THEMES, &self.themes)?;
        Ok(true)
    }

    pub fn load_hue(&self) -> StoreResult<Option<f64>> {
        Ok(self.kv.get(KEY_HUE)?.and_then(|raw| raw.trim().parse().ok()))
    }

    pub fn save_hue(&self, hue: f64) -> StoreResult<()> {
        self.kv.set(KEY_HUE, &hue.to_string())
    }
}

/// Write a map back, dropping the key once the map is empty
fn store_map<T: Serialize>(kv: &KvStore, key: &str, map: &BTreeMap<String, T>) -> StoreResult<()> {
    if map.is_empty() {
        kv.remove(key)
    } else {
        kv.set_json(key, map)
    }
}
