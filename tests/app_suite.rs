use clap::Parser;
use crossterm::event::{KeyCode, KeyModifiers};
use pixelfx::animation::Lifecycle;
use pixelfx::app::{command_for, Command, Preview};
use pixelfx::audio::{LevelFeed, LevelSample};
use pixelfx::color::Rgb;
use pixelfx::config::{AudioMode, Config};
use pixelfx::palette;
use std::time::Duration;

const FRAME: u64 = 16_000_000;

fn key(c: char) -> Option<Command> {
    command_for(KeyCode::Char(c), KeyModifiers::NONE)
}

// ── key bindings ────────────────────────────────────────────────────────────

#[test]
fn keys_map_to_commands() {
    assert_eq!(key('q'), Some(Command::Quit));
    assert_eq!(command_for(KeyCode::Esc, KeyModifiers::NONE), Some(Command::Quit));
    assert_eq!(
        command_for(KeyCode::Char('c'), KeyModifiers::CONTROL),
        Some(Command::Quit)
    );
    assert_eq!(key('c'), None);
    assert_eq!(key('n'), Some(Command::NextEffect));
    assert_eq!(command_for(KeyCode::Left, KeyModifiers::NONE), Some(Command::PrevEffect));
    assert_eq!(key('+'), Some(Command::Faster));
    assert_eq!(key('='), Some(Command::Faster));
    assert_eq!(command_for(KeyCode::Down, KeyModifiers::NONE), Some(Command::Slower));
    assert_eq!(key('x'), None);
}

// ── preview ─────────────────────────────────────────────────────────────────

#[test]
fn preview_cycles_through_effects() {
    let mut preview = Preview::new("comets", 8, 4, 1, None).unwrap();
    assert_eq!(preview.effect_name(), "Comets");
    assert!(preview.apply(Command::NextEffect).unwrap());
    assert_eq!(preview.effect_name(), "Popcorn");
    assert!(preview.apply(Command::PrevEffect).unwrap());
    assert!(preview.apply(Command::PrevEffect).unwrap());
    assert_eq!(preview.effect_name(), "Blurz");
    assert_eq!(preview.player().lifecycle(), Lifecycle::Ready);
    assert_eq!(preview.player().size(), Some((8, 4)));
    assert!(!preview.apply(Command::Quit).unwrap());
}

#[test]
fn preview_speed_steps_saturate() {
    let mut preview = Preview::new("Ripple", 8, 8, 1, None).unwrap();
    preview.configure(250, 10, None);
    preview.apply(Command::Faster).unwrap();
    assert_eq!(preview.player().effect().speed(), Some(255));
    preview.configure(5, 10, None);
    preview.apply(Command::Slower).unwrap();
    assert_eq!(preview.player().effect().speed(), Some(0));
    assert_eq!(preview.player().effect().intensity(), Some(10));
}

#[test]
fn preview_rejects_bad_setup() {
    assert!(Preview::new("nope", 8, 8, 1, None).is_err());
    assert!(Preview::new("Ripple", 0, 8, 1, None).is_err());
}

#[test]
fn preview_tick_fills_the_buffer() {
    let mut preview = Preview::new("Blurz", 6, 4, 3, None).unwrap();
    assert_eq!(preview.rgba().len(), 6 * 4 * 4);
    for i in 0..40 {
        preview.tick(i * FRAME);
    }
    assert_eq!(preview.player().lifecycle(), Lifecycle::Running);
    assert!(preview.rgba().chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn hud_shows_controls_and_level() {
    let feed = LevelFeed::new();
    let preview = Preview::new("Crazy Bees", 8, 8, 1, Some(feed.clone())).unwrap();
    feed.publish(LevelSample {
        rms: 1.0 / 128.0,
        peak: 0.0,
    });
    let hud = preview.hud(29.97);
    assert!(hud.starts_with("Crazy Bees"), "{hud}");
    assert!(hud.contains("intensity -"), "bees ignore intensity: {hud}");
    assert!(hud.contains("30.0 fps"), "{hud}");
    assert!(hud.contains("level  546"), "{hud}");

    let quiet = Preview::new("Ripple", 8, 8, 1, None).unwrap().hud(0.0);
    assert!(!quiet.contains("level"));
}

#[test]
fn palette_reaches_the_effect() {
    let mut preview = Preview::new("Ripple", 8, 8, 1, None).unwrap();
    preview.configure(128, 128, Some(palette::builtin("ocean").unwrap()));
    let resolver = &preview.player().effect().controls().resolver;
    assert_eq!(resolver.palette().map(|p| p.name()), Some("Ocean"));
}

// ── command line ────────────────────────────────────────────────────────────

#[test]
fn config_defaults() {
    let cfg = Config::try_parse_from(["pixelfx"]).unwrap();
    assert_eq!(cfg.effect, "Ripple");
    assert_eq!((cfg.width, cfg.height), (32, 16));
    assert_eq!(cfg.audio, AudioMode::Off);
    assert!(cfg.sync_updates);
    assert_eq!(cfg.color, None);
    assert_eq!(cfg.cell_width(), 2);
    assert_eq!(cfg.frame_interval(), Duration::from_secs_f64(1.0 / 30.0));
}

#[test]
fn config_flags_and_clamps() {
    let cfg = Config::try_parse_from([
        "pixelfx",
        "--effect",
        "popcorn",
        "--audio",
        "microphone",
        "--fps",
        "0",
        "--cell-width",
        "40",
        "--seed",
        "7",
        "--sync-updates",
        "false",
    ])
    .unwrap();
    assert_eq!(cfg.audio, AudioMode::Mic);
    assert_eq!(cfg.frame_interval(), Duration::from_secs(1));
    assert_eq!(cfg.cell_width(), 8);
    assert_eq!(cfg.resolved_seed(), 7);
    assert!(!cfg.sync_updates);

    assert!(Config::try_parse_from(["pixelfx", "--speed", "300"]).is_err());
    assert!(Config::try_parse_from(["pixelfx", "--color", "red"]).is_err());
    let red = Config::try_parse_from(["pixelfx", "--color", "#ff0000"]).unwrap();
    assert_eq!(red.color, Some(Rgb::RED));
}
