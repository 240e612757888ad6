use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use crate::core::{CanvasSize, FileStorage, LearningStore, ReferenceDatabase};
use crate::recognizer::{Recognizer, DEFAULT_TAP_THRESHOLD};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,
    #[serde(default = "default_canvas_side")]
    pub canvas_width: f64,
    #[serde(default = "default_canvas_side")]
    pub canvas_height: f64,
    /// Pointer travel in pixels below which a press is a tap
    #[serde(default = "default_tap_threshold")]
    pub tap_threshold: f64,
    /// Custom reference database; the built-in hiragana table when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

fn default_canvas_side() -> f64 {
    450.0
}

fn default_tap_threshold() -> f64 {
    DEFAULT_TAP_THRESHOLD
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("kakijun")
        });

        std::fs::create_dir_all(&data_dir)
            .context("Failed to create data directory")?;

        let config_path = data_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config_str = std::fs::read_to_string(&config_path)
                .context("Failed to read config.json")?;

            if config_str.trim().is_empty() {
                warn!("Config file is empty, recreating defaults");
            } else {
                match serde_json::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        config.data_dir = data_dir;
                        return Ok(config);
                    }
                    Err(e) => {
                        // keep the user's file for inspection
                        warn!("Failed to parse {}: {}, using defaults", config_path.display(), e);
                        return Ok(Self::default_config(data_dir));
                    }
                }
            }
        }

        let config = Self::default_config(data_dir);
        config.save()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = self.data_dir.join(CONFIG_FILE);
        let json_str = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(&config_path, json_str)
            .context("Failed to write config.json")?;
        Ok(())
    }

    fn default_config(data_dir: PathBuf) -> Self {
        Config {
            data_dir,
            canvas_width: default_canvas_side(),
            canvas_height: default_canvas_side(),
            tap_threshold: default_tap_threshold(),
            database_path: None,
        }
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.canvas_width, self.canvas_height)
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(self.data_dir.clone())
    }

    pub fn learning_store(&self) -> LearningStore {
        LearningStore::load(Box::new(self.storage()))
    }

    pub fn load_database(&self) -> Result<ReferenceDatabase> {
        match &self.database_path {
            Some(path) => ReferenceDatabase::from_json_file(path)
                .with_context(|| format!("Failed to load reference database {}", path.display())),
            None => Ok(ReferenceDatabase::builtin()),
        }
    }

    /// A recognizer wired to this configuration's canvas, database and storage
    pub fn recognizer(&self) -> Result<Recognizer> {
        if !self.canvas().is_valid() {
            anyhow::bail!(
                "Invalid canvas size {}x{}",
                self.canvas_width,
                self.canvas_height
            );
        }

        Ok(Recognizer::new(self.load_database()?, self.learning_store())
            .with_canvas(self.canvas())
            .with_tap_threshold(self.tap_threshold))
    }
}
