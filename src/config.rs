use crate::animation::{DEFAULT_INTENSITY, DEFAULT_SPEED};
use crate::color::Rgb;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "pixelfx", version, about = "Pixel-grid LED effects with a terminal preview")]
pub struct Config {
    /// Effect to start with (name, case-insensitive).
    #[arg(long, default_value = "Ripple")]
    pub effect: String,

    #[arg(long, default_value_t = 32)]
    pub width: usize,

    #[arg(long, default_value_t = 16)]
    pub height: usize,

    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    #[arg(long, default_value_t = DEFAULT_SPEED)]
    pub speed: u8,

    #[arg(long, default_value_t = DEFAULT_INTENSITY)]
    pub intensity: u8,

    /// Named palette; the rainbow fallback is used when omitted.
    #[arg(long)]
    pub palette: Option<String>,

    /// Primary color as hex (`ff8000`), used by effects that honor one.
    #[arg(long)]
    pub color: Option<Rgb>,

    #[arg(long, value_enum, default_value_t = AudioMode::Off)]
    pub audio: AudioMode,

    /// Substring of the input device name to capture from.
    #[arg(long)]
    pub device: Option<String>,

    #[arg(long, default_value_t = false)]
    pub list_effects: bool,

    #[arg(long, default_value_t = false)]
    pub list_devices: bool,

    /// Write tracing output to this file. Nothing is logged otherwise.
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Fixed seed for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Terminal columns per grid pixel.
    #[arg(long, default_value_t = 2)]
    pub cell_width: u16,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AudioMode {
    #[value(alias = "none")]
    Off,
    #[value(alias = "microphone")]
    Mic,
}

pub const MAX_FPS: u32 = 240;

impl Config {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.clamp(1, MAX_FPS) as f64)
    }

    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| fastrand::u64(..))
    }

    pub fn cell_width(&self) -> u16 {
        self.cell_width.clamp(1, 8)
    }
}
