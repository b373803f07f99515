use crate::draw::canvas::MAX_CANVAS_SIZE;
use crate::runes::capture::{CaptureConfig, CaptureMode};
use crate::runes::dispatch::{default_spell_bindings, Spell};
use crate::runes::engine::{NormalizeConfig, RotationPolicy, MAX_SAMPLE_COUNT, MIN_SAMPLE_COUNT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const SETTINGS_FILE: &str = "runecaster.json";
pub const MAX_TEXTURE_SIZE: u32 = MAX_CANVAS_SIZE;
const USER_TEMPLATE_SUBDIR: &str = "runecaster/templates";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RuneSettings {
    /// When enabled the logger is initialised at debug level and honours
    /// `RUST_LOG`.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives the log output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Bundled template directories, loaded in order.
    #[serde(default = "default_template_dirs")]
    pub template_dirs: Vec<PathBuf>,
    /// Where runes recorded in add mode are written. Falls back to the
    /// platform data directory.
    #[serde(default)]
    pub user_template_dir: Option<PathBuf>,
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    #[serde(default)]
    pub rotation: RotationPolicy,
    /// Scores below this are reported as an unknown rune.
    #[serde(default = "default_min_score")]
    pub min_score: f32,
    /// Strokes with fewer points are ignored instead of classified.
    #[serde(default = "default_min_stroke_points")]
    pub min_stroke_points: usize,
    #[serde(default)]
    pub capture_mode: CaptureMode,
    #[serde(default = "default_max_points")]
    pub max_points: usize,
    #[serde(default = "default_min_point_distance")]
    pub min_point_distance: f32,
    /// Classify on a worker thread and pick the result up on the next tick.
    #[serde(default = "default_background_recognition")]
    pub background_recognition: bool,
    #[serde(default = "default_texture_size")]
    pub texture_size: u32,
    #[serde(default = "default_brush_size")]
    pub brush_size: u32,
    #[serde(default = "default_fade_speed")]
    pub fade_speed: f32,
    /// Class name given to runes recorded in add mode.
    #[serde(default = "default_new_template_name")]
    pub new_template_name: String,
    #[serde(default = "default_spell_bindings")]
    pub spell_bindings: HashMap<String, Spell>,
}

fn default_template_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("templates")]
}

fn default_sample_count() -> usize {
    64
}

fn default_min_score() -> f32 {
    0.8
}

fn default_min_stroke_points() -> usize {
    10
}

fn default_max_points() -> usize {
    256
}

fn default_min_point_distance() -> f32 {
    0.1
}

fn default_background_recognition() -> bool {
    true
}

fn default_texture_size() -> u32 {
    512
}

fn default_brush_size() -> u32 {
    4
}

fn default_fade_speed() -> f32 {
    0.3
}

fn default_new_template_name() -> String {
    "NewSpell".to_string()
}

impl Default for RuneSettings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            template_dirs: default_template_dirs(),
            user_template_dir: None,
            sample_count: default_sample_count(),
            rotation: RotationPolicy::None,
            min_score: default_min_score(),
            min_stroke_points: default_min_stroke_points(),
            capture_mode: CaptureMode::SingleStroke,
            max_points: default_max_points(),
            min_point_distance: default_min_point_distance(),
            background_recognition: default_background_recognition(),
            texture_size: default_texture_size(),
            brush_size: default_brush_size(),
            fade_speed: default_fade_speed(),
            new_template_name: default_new_template_name(),
            spell_bindings: default_spell_bindings(),
        }
    }
}

impl RuneSettings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn normalize_config(&self) -> NormalizeConfig {
        let sample_count = self.sample_count.clamp(MIN_SAMPLE_COUNT, MAX_SAMPLE_COUNT);
        if sample_count != self.sample_count {
            tracing::warn!(
                "sample_count {} is out of range; using {}",
                self.sample_count,
                sample_count
            );
        }
        NormalizeConfig {
            sample_count,
            rotation: self.rotation,
        }
    }

    pub fn texture_size(&self) -> u32 {
        let size = self.texture_size.clamp(1, MAX_TEXTURE_SIZE);
        if size != self.texture_size {
            tracing::warn!(
                "texture_size {} is out of range; using {}",
                self.texture_size,
                size
            );
        }
        size
    }

    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            mode: self.capture_mode,
            max_points: self.max_points.max(1),
            min_point_distance: self.min_point_distance.max(0.0),
        }
    }

    pub fn user_template_dir(&self) -> PathBuf {
        if let Some(dir) = &self.user_template_dir {
            return dir.clone();
        }
        dirs_next::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(USER_TEMPLATE_SUBDIR)
    }

    /// Bundled directories followed by the user directory.
    pub fn all_template_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = self.template_dirs.clone();
        let user = self.user_template_dir();
        if !dirs.contains(&user) {
            dirs.push(user);
        }
        dirs
    }
}
