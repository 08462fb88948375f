// Configuration: TOML file (all fields optional) plus the two tuning presets.
// The physics is identical for both device classes; only the constants in
// `Tuning` change.

use crate::error::{Error, Result};
use crate::font;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Canvases at most this wide are treated as a constrained device when
/// `device = "auto"`.
pub const CONSTRAINED_MAX_WIDTH: f32 = 768.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Auto,
    Full,
    Constrained,
}

/// Per-device constants for the particle field and the bitmap sampler.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Pointer repulsion radius R (pixels).
    pub interaction_radius: f32,
    /// Repulsion strength at distance 0.
    pub force: f32,
    /// Spring pull back to the base position, per frame.
    pub spring: f32,
    /// Velocity multiplier applied every frame (< 1).
    pub damping: f32,
    /// Extra shrink applied on top of the 0.95 fit fraction.
    pub scale_multiplier: f32,
    /// Bitmap pixels must have alpha strictly above this to become particles.
    pub image_alpha_threshold: u8,
}

impl Tuning {
    pub fn full() -> Self {
        Self {
            interaction_radius: 60.0,
            force: 2.5,
            spring: 0.15,
            damping: 0.85,
            scale_multiplier: 0.78,
            image_alpha_threshold: 25,
        }
    }

    /// Phones / narrow windows: smaller radius, softer push, stiffer spring.
    pub fn constrained() -> Self {
        Self {
            interaction_radius: 40.0,
            force: 1.5,
            spring: 0.2,
            damping: 0.9,
            scale_multiplier: 0.85,
            image_alpha_threshold: 15,
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::full()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Presets {
    pub full: Tuning,
    pub constrained: Tuning,
}

impl Default for Presets {
    fn default() -> Self {
        Self { full: Tuning::full(), constrained: Tuning::constrained() }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogoConfig {
    /// Bitmap to sample. `None` goes straight to the text fallback.
    pub path: Option<PathBuf>,
    pub fallback_text: String,
    pub decode_timeout_ms: u64,
    /// Narrower canvases skip the bitmap and use the text fallback.
    pub small_screen_width: f32,
    /// Reported when a click lands inside the artwork bounds.
    pub link: Option<String>,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            path: None,
            fallback_text: "GM".to_string(),
            decode_timeout_ms: 2000,
            small_screen_width: 490.0,
            link: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: usize,
    pub height: usize,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        // Wide enough for the bitmap path and the full preset.
        Self { width: 960, height: 480, title: "Logo Particles".to_string() }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub resize_debounce_ms: u64,
    pub orientation_debounce_ms: u64,
    pub zero_size_retry_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self { resize_debounce_ms: 250, orientation_debounce_ms: 500, zero_size_retry_ms: 100 }
    }
}

impl LifecycleConfig {
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn orientation_debounce(&self) -> Duration {
        Duration::from_millis(self.orientation_debounce_ms)
    }

    pub fn zero_size_retry(&self) -> Duration {
        Duration::from_millis(self.zero_size_retry_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device: DeviceClass,
    pub trail: bool,
    pub hud: bool,
    pub logo: LogoConfig,
    pub window: WindowConfig,
    pub lifecycle: LifecycleConfig,
    pub presets: Presets,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DeviceClass::Auto,
            trail: true,
            hud: false,
            logo: LogoConfig::default(),
            window: WindowConfig::default(),
            lifecycle: LifecycleConfig::default(),
            presets: Presets::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Reject settings the effect cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.logo.fallback_text.trim().is_empty() {
            return Err(Error::Config("logo.fallback_text must not be empty".to_string()));
        }
        if let Some(ch) = self.logo.fallback_text.chars().find(|&c| font::glyph5x7(c).is_none()) {
            return Err(Error::Config(format!("logo.fallback_text: no glyph for {ch:?}")));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::Config("window size must be non-zero".to_string()));
        }
        for (name, t) in [("full", &self.presets.full), ("constrained", &self.presets.constrained)] {
            if !(0.0..1.0).contains(&t.damping) {
                return Err(Error::Config(format!("presets.{name}.damping must be in [0, 1)")));
            }
            if t.interaction_radius < 0.0 || t.spring < 0.0 {
                return Err(Error::Config(format!("presets.{name} radius/spring must be >= 0")));
            }
            if !(t.scale_multiplier > 0.0 && t.scale_multiplier <= 1.0) {
                return Err(Error::Config(format!("presets.{name}.scale_multiplier must be in (0, 1]")));
            }
        }
        Ok(())
    }

    pub fn decode_timeout(&self) -> Duration {
        Duration::from_millis(self.logo.decode_timeout_ms)
    }

    /// Resolve `auto` against the initial canvas width.
    pub fn resolve_device(&self, canvas_width: f32) -> DeviceClass {
        match self.device {
            DeviceClass::Auto if canvas_width <= CONSTRAINED_MAX_WIDTH => DeviceClass::Constrained,
            DeviceClass::Auto => DeviceClass::Full,
            other => other,
        }
    }

    /// Tuning preset for the resolved device class.
    pub fn tuning(&self, canvas_width: f32) -> Tuning {
        match self.resolve_device(canvas_width) {
            DeviceClass::Constrained => self.presets.constrained,
            _ => self.presets.full,
        }
    }
}
