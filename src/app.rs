use crate::animation::Player;
use crate::audio::{AudioSensors, LevelFeed, LevelSubscription, MicLevelSource};
use crate::color::Rgb;
use crate::config::{AudioMode, Config};
use crate::effects::{effect_names, find_effect};
use crate::palette::{self, Palette};
use crate::render::{Frame, HalfBlockRenderer, Renderer};
use crate::terminal::TerminalGuard;
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::BufWriter;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const SPEED_STEP: u8 = 16;

/// What a key press asks the preview to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    NextEffect,
    PrevEffect,
    Faster,
    Slower,
}

pub fn command_for(code: KeyCode, mods: KeyModifiers) -> Option<Command> {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return Some(Command::Quit);
    }
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Command::Quit),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Right => Some(Command::NextEffect),
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Left => Some(Command::PrevEffect),
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Some(Command::Faster),
        KeyCode::Char('-') | KeyCode::Char('_') | KeyCode::Down => Some(Command::Slower),
        _ => None,
    }
}

/// Host state of the preview: the effect player, which effect is selected and
/// the RGBA buffer frames are rendered from.
pub struct Preview {
    player: Player,
    names: Vec<&'static str>,
    index: usize,
    seed: u64,
    rgba: Vec<u8>,
    monitor: Option<LevelSubscription>,
}

impl Preview {
    pub fn new(
        effect: &str,
        width: usize,
        height: usize,
        seed: u64,
        feed: Option<LevelFeed>,
    ) -> anyhow::Result<Self> {
        let names = effect_names();
        let first = find_effect(effect, seed)?;
        let index = names.iter().position(|n| *n == first.name()).unwrap_or(0);

        let mut player = Player::new(first);
        player.set_audio_feed(feed.clone());
        player
            .init(width, height)
            .with_context(|| format!("init {effect} at {width}x{height}"))?;

        Ok(Self {
            player,
            names,
            index,
            seed,
            rgba: vec![0; width * height * 4],
            monitor: feed.map(|f| f.subscribe()),
        })
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn effect_name(&self) -> &'static str {
        self.player.effect().name()
    }

    pub fn configure(&mut self, speed: u8, intensity: u8, palette: Option<Palette>) {
        let effect = self.player.effect_mut();
        effect.set_speed(speed);
        effect.set_intensity(intensity);
        effect.set_palette(palette);
    }

    pub fn set_color(&mut self, color: Option<Rgb>) {
        self.player.effect_mut().set_color(color);
    }

    /// Applies a command. Returns `false` when the preview should stop.
    pub fn apply(&mut self, cmd: Command) -> anyhow::Result<bool> {
        match cmd {
            Command::Quit => return Ok(false),
            Command::NextEffect => self.switch(1)?,
            Command::PrevEffect => self.switch(self.names.len() - 1)?,
            Command::Faster | Command::Slower => {
                let effect = self.player.effect_mut();
                if let Some(speed) = effect.speed() {
                    let next = if cmd == Command::Faster {
                        speed.saturating_add(SPEED_STEP)
                    } else {
                        speed.saturating_sub(SPEED_STEP)
                    };
                    effect.set_speed(next);
                }
            }
        }
        Ok(true)
    }

    fn switch(&mut self, step: usize) -> anyhow::Result<()> {
        self.index = (self.index + step) % self.names.len();
        let next = find_effect(self.names[self.index], self.seed)?;
        info!(effect = next.name(), "switching effect");
        self.player.replace(next)?;
        Ok(())
    }

    /// Advances the effect and refreshes the RGBA buffer.
    pub fn tick(&mut self, now_nanos: u64) {
        self.player.update(now_nanos);
        self.player.write_rgba(&mut self.rgba);
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn hud(&self, fps: f32) -> String {
        let effect = self.player.effect();
        let speed = effect.speed().map_or("-".to_string(), |s| s.to_string());
        let intensity = effect.intensity().map_or("-".to_string(), |s| s.to_string());
        let audio = match &self.monitor {
            Some(m) => format!("  level {:>4}", m.current_loudness()),
            None => String::new(),
        };
        format!(
            "{}  speed {speed}  intensity {intensity}  {fps:>5.1} fps{audio}\n\
             n/p effect  +/- speed  q quit",
            effect.name()
        )
    }
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let seed = cfg.resolved_seed();
    let palette = cfg
        .palette
        .as_deref()
        .map(palette::builtin)
        .transpose()
        .context("resolve --palette")?;

    let (feed, _mic) = match cfg.audio {
        AudioMode::Off => (None, None),
        AudioMode::Mic => {
            let feed = LevelFeed::new();
            let mic = MicLevelSource::start(feed.clone(), cfg.device.as_deref())
                .context("start microphone capture")?;
            (Some(feed), Some(mic))
        }
    };

    let mut preview = Preview::new(&cfg.effect, cfg.width, cfg.height, seed, feed)?;
    preview.configure(cfg.speed, cfg.intensity, palette);
    preview.set_color(cfg.color);
    let mut renderer = HalfBlockRenderer::new();
    debug!(
        seed,
        effect = preview.effect_name(),
        renderer = renderer.name(),
        "preview starting"
    );

    let _term = TerminalGuard::enter()?;
    let (cols, rows) = TerminalGuard::size()?;
    let need_cols = cfg.width * cfg.cell_width() as usize;
    let need_rows = cfg.height.div_ceil(2) + 2;
    if need_cols > cols as usize || need_rows > rows as usize {
        warn!(cols, rows, need_cols, need_rows, "terminal smaller than the preview grid");
    }
    let mut out = BufWriter::new(TerminalGuard::stdout());
    let mut fps = FpsCounter::new();
    let target = cfg.frame_interval();
    let start = Instant::now();

    loop {
        let now = Instant::now();

        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Release {
                    continue;
                }
                if let Some(cmd) = command_for(k.code, k.modifiers) {
                    if !preview.apply(cmd)? {
                        return Ok(());
                    }
                }
            }
        }

        preview.tick(now.duration_since(start).as_nanos() as u64);
        let hud = preview.hud(fps.fps());
        let frame = Frame {
            pixel_width: cfg.width,
            pixel_height: cfg.height,
            pixels_rgba: preview.rgba(),
            cell_width: cfg.cell_width(),
            hud: &hud,
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;
        fps.tick();

        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
