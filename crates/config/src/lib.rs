// Bubble field configuration (pure data crate; no Bevy dependency).
// Provides: data structures, layered loading, validation producing warnings (non-fatal), and tests.

use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    /// Automatically close the app after this many seconds. 0.0 (or omitted) = run indefinitely.
    #[serde(rename = "autoClose")]
    pub auto_close: f32,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Bubble Field".into(),
            auto_close: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ColorConfig {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}
impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            r: 0.85,
            g: 0.93,
            b: 1.0,
            a: 0.6,
        }
    }
}

/// Pointer-hover removal: the bubble shrinks toward `end_scale` and fades out over `duration`
/// seconds before it is removed and replaced.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct HoverFadeConfig {
    pub enabled: bool,
    pub duration: f32,
    pub end_scale: f32,
    pub fade_alpha: bool,
    /// Extra pick distance (world units) added to the bubble radius when testing the pointer.
    pub pick_padding: f32,
}
impl Default for HoverFadeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: 0.4,
            end_scale: 0.0,
            fade_alpha: true,
            pick_padding: 2.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct BubbleFieldConfig {
    /// Start the field with `chain_count` chains as soon as the app starts.
    pub autostart: bool,
    pub chain_count: usize,
    /// Upper bound (exclusive, seconds) of each chain's initial delay.
    pub start_delay_max: f32,
    /// Upper bound (exclusive) of a bubble radius.
    pub max_radius: f32,
    /// Rise duration is an integer number of seconds in `[duration_min, duration_min + duration_range)`.
    pub duration_min: u32,
    pub duration_range: u32,
    pub color: ColorConfig,
    pub hover: HoverFadeConfig,
}
impl Default for BubbleFieldConfig {
    fn default() -> Self {
        Self {
            autostart: true,
            chain_count: 10,
            start_delay_max: 10.0,
            max_radius: 10.0,
            duration_min: 10,
            duration_range: 20,
            color: ColorConfig::default(),
            hover: HoverFadeConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub filter: String,
    /// Seconds between periodic stats lines. 0.0 disables them.
    pub stats_interval: f32,
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            filter: "wgpu=error,naga=warn".into(),
            stats_interval: 5.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub field: BubbleFieldConfig,
    pub logging: LoggingConfig,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

/// Values forced from outside the config files (command line). They win over every file layer,
/// including layers re-read by hot reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub chain_count: Option<usize>,
    pub rng_seed: Option<u64>,
    pub auto_close: Option<f32>,
    pub log_level: Option<String>,
}
impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, cfg: &mut AppConfig) {
        if let Some(chains) = self.chain_count {
            cfg.field.chain_count = chains;
        }
        if let Some(seed) = self.rng_seed {
            cfg.rng_seed = Some(seed);
        }
        if let Some(secs) = self.auto_close {
            cfg.window.auto_close = secs;
        }
        if let Some(level) = &self.log_level {
            cfg.logging.level = level.clone();
        }
    }
}

/// Layers the app loads when no `--config` is given; later entries override earlier ones.
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = [
    "assets/config/bubbles.ron",
    "assets/config/bubbles.local.ron",
];

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    /// Load from a single RON file (errors contain human-readable context).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }

    /// Load file; on failure returns default config plus error string.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load multiple layers; later overrides earlier (deep merge).
    /// Skips missing files; returns (config, used_paths, errors).
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();

        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        if let Some((_, ev)) = bm.iter_mut().find(|(ek, _)| **ek == k) {
                            merge_value(ev, v);
                            continue;
                        }
                        bm.insert(k, v);
                    }
                }
                (b, o) => *b = o,
            }
        }

        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }

        let Some(val) = merged else {
            return (Self::default(), used, errors);
        };
        match val.into_rust::<AppConfig>() {
            Ok(cfg) => (cfg, used, errors),
            Err(e) => {
                errors.push(format!(
                    "failed to deserialize merged config; using defaults: {e}"
                ));
                (Self::default(), used, errors)
            }
        }
    }

    /// Non-fatal sanity checks; every entry is a human readable warning.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        if self.window.auto_close < 0.0 {
            w.push(format!(
                "window.autoClose {} negative -> treated as disabled (should be >= 0)",
                self.window.auto_close
            ));
        } else if self.window.auto_close > 0.0 && self.window.auto_close < 0.01 {
            w.push(format!(
                "window.autoClose {} very small; closes almost immediately",
                self.window.auto_close
            ));
        }

        let f = &self.field;
        if f.chain_count == 0 {
            w.push("field.chain_count is 0; nothing will spawn".into());
        }
        if f.chain_count > 10_000 {
            w.push(format!(
                "field.chain_count {} very high; performance may suffer",
                f.chain_count
            ));
        }
        if f.start_delay_max < 0.0 {
            w.push(format!(
                "field.start_delay_max {} negative -> all chains start immediately",
                f.start_delay_max
            ));
        }
        for (label, v) in [
            ("field.max_radius", f.max_radius),
            ("field.start_delay_max", f.start_delay_max),
            ("field.hover.duration", f.hover.duration),
        ] {
            if !v.is_finite() {
                w.push(format!("{label} {v} not finite -> treated as 0"));
            }
        }
        if f.max_radius <= 0.0 {
            w.push("field.max_radius must be > 0 (bubbles would be invisible)".into());
        }
        if f.duration_min == 0 {
            w.push("field.duration_min is 0; bubbles may finish instantly".into());
        }
        if f.duration_range == 0 {
            w.push("field.duration_range is 0 -> treated as 1 (fixed duration)".into());
        }
        for (label, v) in [
            ("r", f.color.r),
            ("g", f.color.g),
            ("b", f.color.b),
            ("a", f.color.a),
        ] {
            if !(0.0..=1.0).contains(&v) {
                w.push(format!("field.color.{label} {v} outside 0..1"));
            }
        }
        if f.hover.enabled {
            if f.hover.duration <= 0.0 {
                w.push("field.hover.duration must be > 0 when enabled".into());
            }
            if !(0.0..=4.0).contains(&f.hover.end_scale) {
                w.push(format!(
                    "field.hover.end_scale {} outside 0..4",
                    f.hover.end_scale
                ));
            }
            if f.hover.pick_padding < 0.0 {
                w.push("field.hover.pick_padding negative -> shrinks pick area".into());
            }
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            w.push(format!(
                "logging.level '{}' unknown (expected one of {})",
                self.logging.level,
                LOG_LEVELS.join("/")
            ));
        }
        if self.logging.stats_interval < 0.0 {
            w.push("logging.stats_interval negative -> stats disabled".into());
        }
        w
    }
}
