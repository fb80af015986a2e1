use super::REFERENCE_FPS;
use crate::animation::{Animation, Capabilities, Controls};
use crate::audio::{AudioSensors, LevelFeed, LevelSubscription};
use crate::canvas::{BlurKernel, Canvas};
use crate::clock::{speed_to_period, FrameClock, FrameSteps, Ticker};
use crate::color::Rgb;
use crate::error::ConfigResult;
use tracing::debug;

/// Loudness history length used for the spike threshold, one sample per reference frame.
const WINDOW: usize = 40;
const FADE_NANOS: u64 = 100_000_000;
const FADE: u8 = 20;
const BASE_SPOT_NANOS: u64 = 400_000_000;
const BLUR: u8 = 48;
const HUE_STEP: u8 = 15;

/// Soft blotches of color that appear when the room gets louder than usual.
pub struct Blurz {
    controls: Controls,
    rng: fastrand::Rng,
    feed: Option<LevelFeed>,
    subscription: Option<LevelSubscription>,
    history: [u16; WINDOW],
    history_at: usize,
    samples: u64,
    level: u16,
    clock: FrameClock,
    steps: FrameSteps,
    hue: u8,
    fade_ticker: Ticker,
    spot_ticker: Ticker,
    canvas: Option<Canvas>,
}

impl Blurz {
    pub fn new(seed: u64) -> Self {
        Self {
            controls: Controls::with_seed(seed),
            rng: fastrand::Rng::with_seed(seed),
            feed: None,
            subscription: None,
            history: [0; WINDOW],
            history_at: 0,
            samples: 0,
            level: 0,
            clock: FrameClock::new(),
            steps: FrameSteps::new(REFERENCE_FPS as u32),
            hue: 0,
            fade_ticker: Ticker::from_nanos(FADE_NANOS),
            spot_ticker: Ticker::from_nanos(BASE_SPOT_NANOS),
            canvas: None,
        }
    }

    pub fn is_listening(&self) -> bool {
        self.subscription.as_ref().is_some_and(|s| s.is_active())
    }

    /// Loudness seen on the most recent update.
    pub fn sound_level(&self) -> u16 {
        self.level
    }

    /// Loudness samples pushed into the threshold window since `init`.
    pub fn samples_recorded(&self) -> u64 {
        self.samples
    }

    fn record(&mut self, level: u16, frames: u32) {
        for _ in 0..(frames as usize).min(WINDOW) {
            self.history[self.history_at] = level;
            self.history_at = (self.history_at + 1) % WINDOW;
        }
        self.samples += frames as u64;
    }

    fn reset_history(&mut self) {
        self.history = [0; WINDOW];
        self.history_at = 0;
        self.samples = 0;
        self.level = 0;
        self.clock.reset();
        self.steps.reset();
    }

    /// Upper-quartile loudness over the recent window.
    fn threshold(&self) -> u16 {
        let mut sorted = self.history;
        sorted.sort_unstable();
        sorted[(WINDOW * 3 / 4).min(WINDOW - 1)]
    }

    fn spots_per_burst(&self) -> u32 {
        1 + self.controls.intensity as u32 / 32
    }

    fn splash(&mut self, brightness: u8) {
        let spots = self.spots_per_burst();
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        let (w, h) = (canvas.width(), canvas.height());
        for _ in 0..spots {
            let cx = self.rng.usize(..w) as i32;
            let cy = self.rng.usize(..h) as i32;
            let radius = 1 + self.rng.i32(0..2);
            let base = self.controls.palette_color(self.hue);
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    let d = ((dx * dx + dy * dy) as f32).sqrt();
                    if d > radius as f32 {
                        continue;
                    }
                    let falloff = 1.0 - d / radius as f32;
                    let spot = base.scale_f(brightness as f32 / 255.0 * falloff);
                    let (x, y) = (cx + dx, cy + dy);
                    // Spots only ever brighten what is already there.
                    if spot.average_light() > canvas.pixel(x, y).average_light() {
                        canvas.set_pixel(x, y, spot);
                    }
                }
            }
        }
    }
}

impl Animation for Blurz {
    fn name(&self) -> &'static str {
        "Blurz"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            palette: true,
            speed: true,
            intensity: true,
            audio_reactive: true,
            ..Capabilities::default()
        }
    }

    fn controls(&self) -> &Controls {
        &self.controls
    }

    fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }

    fn set_audio_feed(&mut self, feed: Option<LevelFeed>) {
        self.feed = feed;
    }

    fn init(&mut self, width: usize, height: usize) -> ConfigResult<()> {
        self.canvas = Some(Canvas::new(width, height)?);
        self.rng = fastrand::Rng::with_seed(self.controls.seed);
        self.reset_history();
        self.hue = 0;
        self.fade_ticker.reset();
        self.spot_ticker.reset();
        if let Some(mut old) = self.subscription.take() {
            old.cancel();
        }
        self.subscription = self.feed.as_ref().map(|f| f.subscribe());
        debug!(listening = self.is_listening(), "blurz initialized");
        Ok(())
    }

    fn update(&mut self, now_nanos: u64) -> bool {
        if self.canvas.is_none() {
            return true;
        }
        let level = self
            .subscription
            .as_ref()
            .map_or(0, |s| s.current_loudness());
        self.level = level;
        let frames = self.steps.take(self.clock.advance_nanos(now_nanos));
        self.record(level, frames);

        if self.fade_ticker.should_fire(now_nanos) {
            if let Some(canvas) = self.canvas.as_mut() {
                canvas.decay(FADE);
                canvas.blur3x3(BLUR, BlurKernel::CenterWeighted(2));
            }
        }

        self.spot_ticker
            .set_period_nanos(speed_to_period(BASE_SPOT_NANOS, self.controls.speed));
        if self.spot_ticker.should_fire(now_nanos) {
            let threshold = self.threshold();
            if level >= threshold {
                let spike = (level - threshold) as u32;
                let brightness = (spike * 5).clamp(150, 255) as u8;
                self.hue = self.hue.wrapping_add(HUE_STEP);
                self.splash(brightness);
            }
        }
        true
    }

    fn pixel(&self, x: i32, y: i32) -> Rgb {
        self.canvas.as_ref().map_or(Rgb::BLACK, |c| c.pixel(x, y))
    }

    fn cleanup(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            sub.cancel();
        }
        self.reset_history();
        self.canvas = None;
    }
}
