use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sprite_geom::Viewport;
use std::fs;
use std::path::Path;

const STAGE_FILE: &str = "stage.json";

/// Host-tunable stage settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StageConfig {
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Multiplies velocities when moving objects each tick.
    pub speed_multiplier: f32,
    /// Clock speed of costumes built with [`crate::costume::Costume::from_stage_sheet`].
    pub animation_speed: f32,
    /// Display time of one frame cut by [`crate::costume::Costume::from_stage_sheet`].
    pub frame_seconds: f32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800,
            viewport_height: 480,
            speed_multiplier: 100.0,
            animation_speed: 1.0,
            frame_seconds: 0.1,
        }
    }
}

impl StageConfig {
    /// Loads config from `stage.json` in the working directory.
    /// Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(STAGE_FILE)
    }

    /// Returns defaults if the file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read stage config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("invalid stage config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(STAGE_FILE)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    pub fn context(&self) -> StageContext {
        StageContext {
            viewport: self.viewport(),
            speed_multiplier: self.speed_multiplier,
            animation_speed: self.animation_speed,
            frame_seconds: self.frame_seconds,
        }
    }
}

/// Per-stage values every object update needs, passed by reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageContext {
    pub viewport: Viewport,
    pub speed_multiplier: f32,
    pub animation_speed: f32,
    pub frame_seconds: f32,
}

impl Default for StageContext {
    fn default() -> Self {
        StageConfig::default().context()
    }
}
