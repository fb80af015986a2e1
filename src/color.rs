use crate::error::ConfigError;
use std::str::FromStr;

/// 8-bit RGB triple. Channels are `u8`, so the `0..=255` invariant holds by construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_array(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn is_black(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    pub fn add_saturating(self, other: Self) -> Self {
        Self::new(
            self.r.saturating_add(other.r),
            self.g.saturating_add(other.g),
            self.b.saturating_add(other.b),
        )
    }

    /// Multiplies every channel by `amount / 255`, rounding down.
    pub fn scale(self, amount: u8) -> Self {
        let f = |c: u8| ((c as u16 * amount as u16) / 255) as u8;
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    /// Float brightness scaling; `factor` is clamped to `0.0..=1.0` and NaN reads as black.
    pub fn scale_f(self, factor: f32) -> Self {
        let k = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
        let f = |c: u8| (c as f32 * k) as u8;
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    /// Linear interpolation toward `toward` by `amount / 255`.
    pub fn blend(self, toward: Self, amount: u8) -> Self {
        let a = amount as u16;
        let inv = 255 - a;
        let f = |from: u8, to: u8| ((from as u16 * inv + to as u16 * a) / 255) as u8;
        Self::new(f(self.r, toward.r), f(self.g, toward.g), f(self.b, toward.b))
    }

    pub fn average_light(self) -> u8 {
        ((self.r as u16 + self.g as u16 + self.b as u16) / 3) as u8
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Self::from_array(c)
    }
}

/// Parses `rrggbb`, with or without a leading `#`.
impl FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || ConfigError::InvalidColor(s.to_string());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// HSV to RGB with an 8-bit hue wheel (`0..=255` covers the full circle).
pub fn hsv_to_rgb(h: u8, s: u8, v: u8) -> Rgb {
    let sat = s as f32 / 255.0;
    let val = v as f32 / 255.0;
    if s == 0 {
        let gray = (val * 255.0) as u8;
        return Rgb::new(gray, gray, gray);
    }

    let section = h as f32 / (256.0 / 6.0);
    let i = section as u32;
    let f = section - i as f32;

    let p = val * (1.0 - sat);
    let q = val * (1.0 - sat * f);
    let t = val * (1.0 - sat * (1.0 - f));

    let (r, g, b) = match i % 6 {
        0 => (val, t, p),
        1 => (q, val, p),
        2 => (p, val, t),
        3 => (p, q, val),
        4 => (t, p, val),
        _ => (val, p, q),
    };

    Rgb::new(
        (r.clamp(0.0, 1.0) * 255.0) as u8,
        (g.clamp(0.0, 1.0) * 255.0) as u8,
        (b.clamp(0.0, 1.0) * 255.0) as u8,
    )
}
