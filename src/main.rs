use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::sync::Mutex;
use tracing::Level;

fn main() -> Result<()> {
    let cfg = pixelfx::config::Config::parse();

    if let Some(path) = &cfg.log {
        let file = File::create(path).with_context(|| format!("create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_max_level(Level::DEBUG)
            .try_init()
            .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))?;
    }

    if cfg.list_devices {
        pixelfx::audio::list_input_devices()?;
        return Ok(());
    }
    if cfg.list_effects {
        let mut out = std::io::stdout();
        writeln!(out, "Effects:")?;
        for name in pixelfx::effects::effect_names() {
            writeln!(out, "  - {name}")?;
        }
        writeln!(out, "Palettes:")?;
        for name in pixelfx::palette::names() {
            writeln!(out, "  - {name}")?;
        }
        return Ok(());
    }

    pixelfx::app::run(cfg)
}
