//! Pipeline configuration
//!
//! Validated once, before the simulation starts.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FPS, DEFAULT_SEED};
use crate::error::ConfigError;

/// Enemy activation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Column,
    Row,
    #[default]
    Random,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [StrategyKind::Column, StrategyKind::Row, StrategyKind::Random];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Column => "column",
            StrategyKind::Row => "row",
            StrategyKind::Random => "random",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "column" | "col" => Ok(StrategyKind::Column),
            "row" => Ok(StrategyKind::Row),
            "random" | "rand" => Ok(StrategyKind::Random),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Animation container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Gif,
    Webp,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Gif => "gif",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Gif => "image/gif",
            OutputFormat::Webp => "image/webp",
        }
    }

    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gif" => Ok(OutputFormat::Gif),
            "webp" => Ok(OutputFormat::Webp),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

/// Options recognized by the frame pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub strategy: StrategyKind,
    /// Playback rate; does not change the simulation
    pub fps: u32,
    /// Frame cap (`None` = until the run ends on its own)
    pub max_frame: Option<usize>,
    pub output_format: OutputFormat,
    /// Seed for the random strategy and cosmetic effects
    pub seed: u64,
    /// Draw the project watermark in the HUD
    pub watermark: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            fps: DEFAULT_FPS,
            max_frame: None,
            output_format: OutputFormat::default(),
            seed: DEFAULT_SEED,
            watermark: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::NonPositiveFps);
        }
        if self.max_frame == Some(0) {
            return Err(ConfigError::NonPositiveMaxFrame);
        }
        Ok(())
    }

    /// Delay between frames in milliseconds
    pub fn frame_duration_ms(&self) -> u32 {
        1000 / self.fps.max(1)
    }
}
