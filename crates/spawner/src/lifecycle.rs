use bevy::prelude::*;
use bf_core::{
    Bubble, BubbleConfigRes, BubbleOpacity, BubbleRadius, BubbleState, PointerPosition,
    RetireCause, RiseAnimation,
};

use crate::spawn::Spawner;

/// Shrink + fade transition started by pointer hover.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct HoverFade {
    pub elapsed: f32,
    pub duration: f32,
    pub base_radius: f32,
    pub end_scale: f32,
    pub fade_alpha: bool,
}
impl HoverFade {
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

// Ease used for the hover transition (slow start, slow end).
fn swing(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    0.5 - (x * std::f32::consts::PI).cos() * 0.5
}

/// System: start a hover fade on every rising bubble under the pointer.
pub fn detect_hover(
    mut commands: Commands,
    pointer: Res<PointerPosition>,
    cfg: Res<BubbleConfigRes>,
    mut q: Query<(Entity, &Transform, &BubbleRadius, &mut BubbleState), With<Bubble>>,
) {
    let hover = &cfg.0.field.hover;
    if !hover.enabled {
        return;
    }
    let Some(p) = pointer.0 else {
        return;
    };
    for (entity, tf, radius, mut state) in q.iter_mut() {
        if *state != BubbleState::Rising {
            continue;
        }
        let pick = (radius.0 + hover.pick_padding).max(0.0);
        if tf.translation.truncate().distance_squared(p) > pick * pick {
            continue;
        }
        *state = BubbleState::Fading;
        commands.entity(entity).insert(HoverFade {
            elapsed: 0.0,
            duration: if hover.duration.is_finite() {
                hover.duration.max(0.0)
            } else {
                0.0
            },
            base_radius: radius.0,
            end_scale: hover.end_scale.max(0.0),
            fade_alpha: hover.fade_alpha,
        });
    }
}

/// System: rise every active bubble; completion retires it and spawns the replacement.
pub fn advance_rise(
    time: Res<Time>,
    mut q: Query<(
        Entity,
        &Bubble,
        &mut BubbleState,
        &mut RiseAnimation,
        &mut Transform,
    )>,
    mut spawner: Spawner,
) {
    let dt = time.delta_secs();
    for (entity, bubble, mut state, mut anim, mut tf) in q.iter_mut() {
        // Fading bubbles are frozen; only the fade may retire them.
        if *state != BubbleState::Rising {
            continue;
        }
        anim.elapsed += dt;
        tf.translation.y = anim.current_y();
        if anim.finished() {
            spawner.retire_and_replace(entity, bubble, &mut state, RetireCause::AnimationEnd);
        }
    }
}

/// System: run hover fades; the end of a fade retires the bubble and spawns the replacement.
pub fn advance_hover_fade(
    time: Res<Time>,
    mut q: Query<(
        Entity,
        &Bubble,
        &mut BubbleState,
        &mut HoverFade,
        &mut BubbleRadius,
        &mut BubbleOpacity,
    )>,
    mut spawner: Spawner,
) {
    let dt = time.delta_secs();
    for (entity, bubble, mut state, mut fade, mut radius, mut opacity) in q.iter_mut() {
        if *state != BubbleState::Fading {
            continue;
        }
        fade.elapsed += dt;
        let t = swing(fade.progress());
        let scale = 1.0 + (fade.end_scale - 1.0) * t;
        radius.0 = (fade.base_radius * scale).max(0.0);
        if fade.fade_alpha {
            opacity.0 = (1.0 - t).clamp(0.0, 1.0);
        }
        if fade.finished() {
            spawner.retire_and_replace(entity, bubble, &mut state, RetireCause::Hover);
        }
    }
}
