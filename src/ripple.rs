use crate::envelope::ripple_amplitude;
use crate::math::{scale8, sin8};

/// Progress values above this end the ripple.
pub const RIPPLE_CEILING: u8 = 254;

/// Phase of one ripple slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RippleState {
    Inactive,
    /// Triggered this frame; origin and color are assigned, drawing starts next step.
    Initializing,
    Expanding { progress: u8 },
}

impl RippleState {
    /// The full transition table. `triggered` only matters while inactive.
    pub fn next(self, triggered: bool, decay_step: u8) -> Self {
        match self {
            Self::Inactive if triggered => Self::Initializing,
            Self::Inactive => Self::Inactive,
            Self::Initializing => Self::Expanding { progress: 1 },
            Self::Expanding { progress } => {
                let p = progress as u16 + decay_step.max(1) as u16;
                if p > RIPPLE_CEILING as u16 {
                    Self::Inactive
                } else {
                    Self::Expanding { progress: p as u8 }
                }
            }
        }
    }

    pub fn progress(self) -> Option<u8> {
        match self {
            Self::Expanding { progress } => Some(progress),
            _ => None,
        }
    }

    pub fn is_active(self) -> bool {
        !matches!(self, Self::Inactive)
    }
}

/// Per-step progress increment: faster speed, faster decay.
pub fn decay_step(speed: u8) -> u8 {
    (speed >> 4) + 1
}

/// Fixed-point propagation (1/256 px) of a ripple at `progress`.
fn propagation(progress: u8, speed: u8) -> i32 {
    let steps = progress as i32 / decay_step(speed) as i32 - 1;
    steps.max(0) * (speed as i32 + 1)
}

/// Ring radius in whole pixels.
pub fn ripple_radius(progress: u8, speed: u8) -> i32 {
    propagation(progress, speed) >> 9
}

/// Ring brightness at `progress`: the amplitude envelope modulated by the
/// sub-pixel phase of the wavefront.
pub fn ripple_magnitude(progress: u8, speed: u8) -> u8 {
    let frac = (propagation(progress, speed) & 0xFF) as u8;
    scale8(sin8(frac >> 2), ripple_amplitude(progress))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ripple {
    pub state: RippleState,
    pub origin: (i32, i32),
    pub color: u8,
}

impl Ripple {
    const IDLE: Self = Self {
        state: RippleState::Inactive,
        origin: (0, 0),
        color: 0,
    };
}

/// Pre-allocated set of ripple slots stepped through the three-phase machine.
#[derive(Clone, Debug)]
pub struct RippleField {
    ripples: Vec<Ripple>,
    width: usize,
    height: usize,
    rng: fastrand::Rng,
}

impl RippleField {
    /// One slot per four pixels, at most 100.
    pub fn slots_for(width: usize, height: usize) -> usize {
        (1 + width.saturating_mul(height) / 4).min(100)
    }

    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        Self::with_slots(width, height, Self::slots_for(width, height), seed)
    }

    pub fn with_slots(width: usize, height: usize, slots: usize, seed: u64) -> Self {
        Self {
            ripples: vec![Ripple::IDLE; slots.max(1)],
            width: width.max(1),
            height: height.max(1),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn ripples(&self) -> &[Ripple] {
        &self.ripples
    }

    pub fn active(&self) -> usize {
        self.ripples.iter().filter(|r| r.state.is_active()).count()
    }

    /// Forces the first idle slot into `Initializing` at a given origin.
    /// Returns `false` when every slot is busy.
    pub fn trigger_at(&mut self, x: i32, y: i32, color: u8) -> bool {
        match self
            .ripples
            .iter_mut()
            .find(|r| r.state == RippleState::Inactive)
        {
            Some(r) => {
                r.state = RippleState::Initializing;
                r.origin = (x, y);
                r.color = color;
                true
            }
            None => false,
        }
    }

    /// Advances every slot once. Expanding ripples are handed to `draw` with their
    /// current progress before they move on. Idle slots trigger with a chance of
    /// roughly `(intensity >> 3) / 10000` per step.
    pub fn step<F>(&mut self, speed: u8, intensity: u8, mut draw: F)
    where
        F: FnMut(&Ripple, u8),
    {
        let decay = decay_step(speed);
        let threshold = (intensity >> 3) as u32;
        let (w, h) = (self.width, self.height);

        for r in &mut self.ripples {
            match r.state {
                RippleState::Inactive => {
                    let triggered = self.rng.u32(..10_000) <= threshold;
                    if triggered {
                        r.origin = (self.rng.usize(..w) as i32, self.rng.usize(..h) as i32);
                        r.color = self.rng.u8(..);
                    }
                    r.state = r.state.next(triggered, decay);
                }
                RippleState::Initializing => {
                    r.state = r.state.next(false, decay);
                }
                RippleState::Expanding { progress } => {
                    draw(r, progress);
                    r.state = r.state.next(false, decay);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.ripples.fill(Ripple::IDLE);
    }
}
