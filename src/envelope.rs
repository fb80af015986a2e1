//! Brightness and size envelopes over an entity's progress.
//!
//! Integer variants work on the 0..=255 state scale and return 0..=255; float
//! variants work on 0.0..=1.0. All of them clamp their input first.

use crate::math::{map_range, triwave8};

/// Linear rise from 0 at state 0 to 255 at `peak`, then linear fall to 0 at state 255.
pub fn triangle_attack_decay(state: i32, peak: i32) -> u8 {
    let s = state.clamp(0, 255);
    let peak = peak.clamp(1, 254);
    let v = if s <= peak {
        s * 255 / peak
    } else {
        (255 - s) * 255 / (255 - peak)
    };
    v.clamp(0, 255) as u8
}

/// Float form of [`triangle_attack_decay`] over `t` and `peak` in `0.0..=1.0`.
pub fn triangle_attack_decay_f(t: f32, peak: f32) -> f32 {
    if t.is_nan() {
        return 0.0;
    }
    let t = t.clamp(0.0, 1.0);
    let peak = if peak.is_nan() { 0.5 } else { peak.clamp(1e-4, 1.0 - 1e-4) };
    let v = if t <= peak {
        t / peak
    } else {
        (1.0 - t) / (1.0 - peak)
    };
    v.clamp(0.0, 1.0)
}

/// `max - state`, floored at 0 and capped at 255.
pub fn linear_falloff(state: i32, max: i32) -> u8 {
    (max as i64 - state as i64).clamp(0, 255) as u8
}

pub fn linear_falloff_f(state: f32, max: f32) -> f32 {
    let v = max - state;
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Ripple brightness over its 1..=254 life: a fast triangle attack over the first
/// 16 steps, then a long linear fade from 255 down to 2. State 0 is dark.
pub fn ripple_amplitude(state: u8) -> u8 {
    match state {
        0 => 0,
        1..=16 => triwave8((state - 1) * 8),
        _ => map_range(state as i32, 17, 255, 255, 2).clamp(0, 255) as u8,
    }
}
