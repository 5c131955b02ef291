//! Host session state
//!
//! Built once by the host and passed by reference into each run.
//! Persisted by the host as JSON; the core only reads it.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Build mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionMode {
    #[default]
    Dev,
    Prod,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Dev => "Dev",
            SessionMode::Prod => "Prod",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Some(SessionMode::Dev),
            "prod" | "production" => Some(SessionMode::Prod),
            _ => None,
        }
    }
}

/// Where presentation assets live for a given mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePaths {
    pub img_path: String,
    pub audio_path: String,
    pub img_suffix: String,
}

impl ResourcePaths {
    pub fn for_mode(mode: SessionMode) -> Self {
        match mode {
            SessionMode::Prod => Self {
                img_path: "asset/img/".into(),
                audio_path: "asset/audio/".into(),
                img_suffix: ".png".into(),
            },
            SessionMode::Dev => Self {
                img_path: "src/img/".into(),
                audio_path: "src/audio/".into(),
                img_suffix: ".png".into(),
            },
        }
    }

    /// Full path of an image asset
    pub fn image(&self, name: &str) -> String {
        format!("{}{}{}", self.img_path, name, self.img_suffix)
    }
}

/// Session-wide state shared by every run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: SessionMode,
    pub resources: ResourcePaths,
    /// Persisted: the player has seen the tutorial
    #[serde(default)]
    pub tutorial_seen: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(SessionMode::default())
    }
}

impl SessionState {
    pub fn new(mode: SessionMode) -> Self {
        Self {
            mode,
            resources: ResourcePaths::for_mode(mode),
            tutorial_seen: false,
        }
    }

    pub fn is_dev_mode(&self) -> bool {
        self.mode == SessionMode::Dev
    }

    pub fn is_prod_mode(&self) -> bool {
        self.mode == SessionMode::Prod
    }

    /// Switch mode and re-derive resource paths
    pub fn set_mode(&mut self, mode: SessionMode) {
        self.mode = mode;
        self.resources = ResourcePaths::for_mode(mode);
    }

    pub fn mark_tutorial_seen(&mut self) {
        self.tutorial_seen = true;
    }

    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string(self)?)
    }
}
