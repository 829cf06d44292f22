// Copyright (c) 2026 rezky_nightky

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept as a TOML table, rewritten on every `set`. Keys of
/// other types are carried through untouched.
#[derive(Debug)]
pub struct TomlStore {
    path: PathBuf,
    values: toml::Table,
}

impl TomlStore {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("nexusfolio").join("prefs.toml"))
    }

    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let text = fs::read_to_string(&path)?;
            text.parse::<toml::Table>()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        } else {
            toml::Table::new()
        };
        debug!(path = %path.display(), keys = values.len(), "preferences loaded");
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(&self.values)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}

impl PreferenceStore for TomlStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key)?.as_str().map(str::to_string)
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values
            .insert(key.to_string(), toml::Value::String(value.to_string()));
        self.save()
    }
}
