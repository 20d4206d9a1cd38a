//! Persistent list of pinned session names.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
struct PinFile {
    #[serde(default)]
    pins: Vec<String>,
}

/// Pinned session names, most recently pinned first.
///
/// Names are kept even when no session by that name currently exists, so a
/// pin survives the session being recreated.
#[derive(Debug, Clone, Default)]
pub struct PinStore {
    pins: Vec<String>,
    path: PathBuf,
}

impl PinStore {
    /// Load pins from the config directory
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("muxdeck");
        Self::load_from(config_dir.join("pins.json"))
    }

    /// Load pins from an explicit file, starting empty if it does not exist.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file: PinFile = if path.exists() {
            let content = std::fs::read_to_string(&path).context("Failed to read pins file")?;
            serde_json::from_str(&content).context("Failed to parse pins file")?
        } else {
            PinFile::default()
        };
        Ok(Self {
            pins: file.pins,
            path,
        })
    }

    /// In-memory store that never touches disk (for testing)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn save(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let file = PinFile {
            pins: self.pins.clone(),
        };
        let content = serde_json::to_string_pretty(&file).context("Failed to serialize pins")?;
        std::fs::write(&self.path, content).context("Failed to write pins file")?;
        Ok(())
    }

    pub fn pins(&self) -> &[String] {
        &self.pins
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pins.iter().any(|pin| pin == name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pin `name` at the front, or unpin it if already pinned.
    ///
    /// The in-memory change stands even if saving fails. Returns whether
    /// the name is now pinned.
    pub fn toggle(&mut self, name: &str) -> Result<bool> {
        let pinned = if let Some(index) = self.pins.iter().position(|pin| pin == name) {
            self.pins.remove(index);
            false
        } else {
            self.pins.insert(0, name.to_string());
            true
        };
        self.save()?;
        Ok(pinned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_pins_to_front_and_unpins() {
        let mut store = PinStore::empty();
        assert!(store.toggle("a").unwrap());
        assert!(store.toggle("b").unwrap());
        assert_eq!(store.pins(), &["b", "a"]);

        assert!(!store.toggle("b").unwrap());
        assert_eq!(store.pins(), &["a"]);
        assert!(store.contains("a"));
        assert!(!store.contains("b"));
    }

    #[test]
    fn pins_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pins.json");

        let mut store = PinStore::load_from(&path).unwrap();
        assert!(store.pins().is_empty());
        store.toggle("work").unwrap();
        store.toggle("scratch").unwrap();

        let reloaded = PinStore::load_from(&path).unwrap();
        assert_eq!(reloaded.pins(), &["scratch", "work"]);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pins.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(PinStore::load_from(&path).is_err());
    }
}
