//! 8-bit wave helpers and total numeric mappings.
//!
//! Every function here returns a finite, in-range value for any input; NaN and
//! infinite floats collapse to the low end of the output range.

use std::f32::consts::TAU;

#[inline]
pub fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * scale as u16) >> 8) as u8
}

#[inline]
pub fn qadd8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[inline]
pub fn qsub8(a: u8, b: u8) -> u8 {
    a.saturating_sub(b)
}

/// Sine over one 0..=255 period, mapped to 0..=255.
pub fn sin8(x: u8) -> u8 {
    let s = (x as f32 / 255.0 * TAU).sin();
    ((s + 1.0) * 0.5 * 255.0).round().clamp(0.0, 255.0) as u8
}

pub fn cos8(x: u8) -> u8 {
    let c = (x as f32 / 255.0 * TAU).cos();
    ((c + 1.0) * 0.5 * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Symmetric triangle: 0 -> 0, 127 -> 254, 255 -> 1.
pub fn triwave8(x: u8) -> u8 {
    if x < 128 {
        x * 2
    } else {
        255 - (x - 128) * 2
    }
}

/// Sawtooth advancing 256 steps per beat at `bpm`.
pub fn beat8(bpm: u32, time_ms: u64) -> u8 {
    let steps = (time_ms as u128 * bpm as u128 * 256) / 60_000;
    (steps % 256) as u8
}

/// Sine oscillating between `low` and `high` at `bpm`; `phase` is in 1/256ths of a beat.
pub fn beatsin8(bpm: u32, low: u8, high: u8, time_ms: u64, phase: u8) -> u8 {
    let (lo, hi) = if low <= high { (low, high) } else { (high, low) };
    let beats = time_ms as f64 * bpm as f64 / 60_000.0 + phase as f64 / 256.0;
    let s = ((beats.fract()) * std::f64::consts::TAU).sin();
    let n = (s + 1.0) * 0.5;
    let out = lo as f64 + n * (hi - lo) as f64;
    out.clamp(lo as f64, hi as f64) as u8
}

/// Integer range mapping with rounding. A degenerate input range yields `out_min`.
pub fn map_range(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    let from = in_max as i64 - in_min as i64;
    if from == 0 {
        return out_min;
    }
    let to = out_max as i64 - out_min as i64;
    let scaled = (value as i64 - in_min as i64) as f64 / from as f64;
    let out = out_min as f64 + scaled * to as f64;
    out.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32
}

/// Float range mapping. Degenerate or non-finite inputs yield `out_min`.
pub fn map_rangef(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let from = in_max - in_min;
    if from == 0.0 || !from.is_finite() {
        return out_min;
    }
    let out = out_min + (value - in_min) / from * (out_max - out_min);
    if out.is_finite() { out } else { out_min }
}

/// Avalanching 32-bit integer hash.
#[inline]
pub fn hash32(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

/// Reproducible per-pixel random byte for a given frame salt, independent of
/// iteration order.
#[inline]
pub fn pixel_hash(index: u32, salt: u32) -> u8 {
    (hash32(index ^ hash32(salt.wrapping_add(0x9E37_79B9))) >> 24) as u8
}

fn lattice(xi: i32, yi: i32, seed: u32) -> f32 {
    let mut n = (xi as u32).wrapping_mul(374_761_393)
        ^ (yi as u32).wrapping_mul(668_265_263)
        ^ seed.wrapping_mul(0x9E37_79B9);
    n = (n ^ (n >> 13)).wrapping_mul(1_274_126_177);
    n ^= n >> 16;
    ((n & 0x00FF_FFFF) as f32) / 16_777_215.0
}

/// Smooth 2D value noise in `0.0..=1.0`.
pub fn value_noise(x: f32, y: f32, seed: u32) -> f32 {
    let x = if x.is_finite() { x } else { 0.0 };
    let y = if y.is_finite() { y } else { 0.0 };
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let ux = fx * fx * (3.0 - 2.0 * fx);
    let uy = fy * fy * (3.0 - 2.0 * fy);

    // Saturating casts keep huge coordinates on a valid lattice cell.
    let xi = x0 as i32;
    let yi = y0 as i32;
    let a = lattice(xi, yi, seed);
    let b = lattice(xi.wrapping_add(1), yi, seed);
    let c = lattice(xi, yi.wrapping_add(1), seed);
    let d = lattice(xi.wrapping_add(1), yi.wrapping_add(1), seed);

    let top = a + (b - a) * ux;
    let bot = c + (d - c) * ux;
    (top + (bot - top) * uy).clamp(0.0, 1.0)
}

/// 0..=255 noise sampled at fixed-point coordinates (1/256 cell units).
pub fn noise8(x: u32, y: u32, seed: u32) -> u8 {
    let v = value_noise(x as f32 / 256.0, y as f32 / 256.0, seed);
    (v * 255.0) as u8
}
