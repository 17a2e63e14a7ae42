//! Random draws for a single bubble.

use bf_config::BubbleFieldConfig;
use rand::Rng;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BubbleSample {
    /// `[0, max_radius)`
    pub radius: f32,
    /// `[0, viewport_width]`, rounded to an integer.
    pub right_offset: f32,
    /// `[duration_min, duration_min + duration_range)`
    pub duration_secs: u32,
}

/// Uniform in `[0, max_delay)`; non-positive bounds collapse to an immediate start.
pub fn sample_start_delay<R: Rng + ?Sized>(rng: &mut R, max_delay: f32) -> f32 {
    if max_delay > 0.0 && max_delay.is_finite() {
        rng.gen_range(0.0..max_delay)
    } else {
        0.0
    }
}

pub fn sample_bubble<R: Rng + ?Sized>(
    rng: &mut R,
    cfg: &BubbleFieldConfig,
    viewport_width: f32,
) -> BubbleSample {
    let radius = if cfg.max_radius > 0.0 && cfg.max_radius.is_finite() {
        rng.gen_range(0.0..cfg.max_radius)
    } else {
        0.0
    };
    let width = if viewport_width.is_finite() {
        viewport_width.max(0.0)
    } else {
        0.0
    };
    let right_offset = (rng.gen::<f32>() * width).round().min(width.floor());
    let upper = cfg.duration_min.saturating_add(cfg.duration_range.max(1));
    let duration_secs = if upper > cfg.duration_min {
        rng.gen_range(cfg.duration_min..upper)
    } else {
        cfg.duration_min
    };
    BubbleSample {
        radius,
        right_offset,
        duration_secs,
    }
}
