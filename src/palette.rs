use crate::color::{hsv_to_rgb, Rgb};
use crate::error::{ConfigError, ConfigResult};

/// An ordered, non-empty list of colors addressed by a 0-255 index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    name: String,
    colors: Vec<Rgb>,
}

impl Palette {
    /// Returns `None` for an empty color list; a palette always has at least one entry.
    pub fn new(name: impl Into<String>, colors: Vec<Rgb>) -> Option<Self> {
        if colors.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            colors,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Nearest-entry lookup: the 0..=255 index range is split evenly across the entries.
    pub fn color_at(&self, index: u8) -> Rgb {
        let n = self.colors.len();
        let i = (index as usize * n) / 256;
        self.colors[i.min(n - 1)]
    }
}

/// Resolves an abstract palette index into a concrete color.
pub trait ColorResolver {
    /// `wrap = true` wraps out-of-range indices modulo 256; `false` clamps them to `0..=255`.
    fn color(&self, index: i32, wrap: bool) -> Rgb;
}

/// Palette lookup that falls back to a full-saturation rainbow when no palette is set.
#[derive(Clone, Debug, Default)]
pub struct PaletteResolver {
    palette: Option<Palette>,
}

impl PaletteResolver {
    pub fn new(palette: Option<Palette>) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn set_palette(&mut self, palette: Option<Palette>) {
        self.palette = palette;
    }
}

impl ColorResolver for PaletteResolver {
    fn color(&self, index: i32, wrap: bool) -> Rgb {
        let idx = if wrap {
            index.rem_euclid(256) as u8
        } else {
            index.clamp(0, 255) as u8
        };
        match &self.palette {
            Some(p) => p.color_at(idx),
            None => hsv_to_rgb(idx, 255, 255),
        }
    }
}

const BUILTIN: &[(&str, &[[u8; 3]])] = &[
    (
        "Default",
        &[
            [255, 0, 0],
            [255, 127, 0],
            [255, 255, 0],
            [0, 255, 0],
            [0, 255, 255],
            [0, 0, 255],
            [127, 0, 255],
            [255, 0, 255],
        ],
    ),
    (
        "Rainbow",
        &[
            [255, 0, 0],
            [255, 127, 0],
            [255, 255, 0],
            [127, 255, 0],
            [0, 255, 0],
            [0, 255, 127],
            [0, 255, 255],
            [0, 127, 255],
            [0, 0, 255],
            [127, 0, 255],
            [255, 0, 255],
            [255, 0, 127],
        ],
    ),
    (
        "Party",
        &[
            [255, 0, 0],
            [255, 0, 255],
            [0, 0, 255],
            [0, 255, 255],
            [0, 255, 0],
            [255, 255, 0],
            [255, 127, 0],
            [255, 0, 0],
        ],
    ),
    (
        "Heat",
        &[
            [0, 0, 0],
            [128, 0, 0],
            [255, 0, 0],
            [255, 96, 0],
            [255, 192, 0],
            [255, 255, 64],
            [255, 255, 255],
        ],
    ),
    (
        "Ocean",
        &[
            [0, 0, 64],
            [0, 0, 160],
            [0, 64, 255],
            [0, 160, 255],
            [0, 255, 255],
            [128, 255, 255],
        ],
    ),
    (
        "Forest",
        &[
            [0, 64, 0],
            [0, 128, 0],
            [34, 139, 34],
            [85, 107, 47],
            [107, 142, 35],
            [154, 205, 50],
        ],
    ),
];

pub fn names() -> Vec<&'static str> {
    BUILTIN.iter().map(|(name, _)| *name).collect()
}

/// Case-insensitive lookup of a built-in palette.
pub fn builtin(name: &str) -> ConfigResult<Palette> {
    let want = name.trim();
    BUILTIN
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(want))
        .and_then(|(n, colors)| {
            Palette::new(*n, colors.iter().copied().map(Rgb::from_array).collect())
        })
        .ok_or_else(|| ConfigError::UnknownPalette(name.to_string()))
}
