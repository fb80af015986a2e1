mod blurz;
mod comets;
mod crazy_bees;
mod popcorn;
mod ripples;

pub use blurz::Blurz;
pub use comets::Comets;
pub use crazy_bees::CrazyBees;
pub use popcorn::Popcorn;
pub use ripples::Ripples;

use crate::animation::Animation;
use crate::canvas::Canvas;
use crate::clock::{FrameClock, FrameSteps};
use crate::entity::{EntityPool, Overflow};
use crate::error::{ConfigError, ConfigResult};
use crate::physics::Bounds;

/// Frame rate the per-frame tuning constants were chosen at.
pub(crate) const REFERENCE_FPS: f32 = 60.0;

/// Size-dependent state every entity-driven effect carries between `init` and `cleanup`.
pub(crate) struct Scene<T> {
    pub canvas: Canvas,
    pub pool: EntityPool<T>,
    pub clock: FrameClock,
    pub steps: FrameSteps,
    pub bounds: Bounds,
}

impl<T> Scene<T> {
    pub fn new(width: usize, height: usize, capacity: usize, overflow: Overflow) -> ConfigResult<Self> {
        Ok(Self {
            canvas: Canvas::new(width, height)?,
            pool: EntityPool::new(capacity, overflow)?,
            clock: FrameClock::new(),
            steps: FrameSteps::new(REFERENCE_FPS as u32),
            bounds: Bounds::from_size(width, height),
        })
    }

    /// Advances the scene clock. Returns the elapsed seconds and the whole
    /// reference frames now due.
    pub fn tick(&mut self, now_nanos: u64) -> (f32, u32) {
        let elapsed = self.clock.advance_nanos(now_nanos);
        ((elapsed as f64 / 1_000_000_000.0) as f32, self.steps.take(elapsed))
    }

    pub fn width(&self) -> usize {
        self.canvas.width()
    }

    pub fn height(&self) -> usize {
        self.canvas.height()
    }
}

pub fn make_effects(seed: u64) -> Vec<Box<dyn Animation>> {
    vec![
        Box::new(Popcorn::new(seed)),
        Box::new(Ripples::new(seed)),
        Box::new(CrazyBees::new(seed)),
        Box::new(Blurz::new(seed)),
        Box::new(Comets::new(seed)),
    ]
}

pub fn effect_names() -> Vec<&'static str> {
    make_effects(0).iter().map(|e| e.name()).collect()
}

/// Case-insensitive lookup; spaces, dashes and underscores are interchangeable.
pub fn find_effect(name: &str, seed: u64) -> ConfigResult<Box<dyn Animation>> {
    let want = slug(name);
    make_effects(seed)
        .into_iter()
        .find(|e| slug(e.name()) == want)
        .ok_or_else(|| ConfigError::UnknownEffect(name.to_string()))
}

fn slug(s: &str) -> String {
    s.trim()
        .chars()
        .filter_map(|c| match c {
            ' ' | '-' | '_' => None,
            c => Some(c.to_ascii_lowercase()),
        })
        .collect()
}
