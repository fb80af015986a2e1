use std::time::Duration;
use tracing::debug;

/// Gaps longer than this are treated as a pause rather than elapsed simulation time.
pub const DEFAULT_JUMP_THRESHOLD: Duration = Duration::from_millis(2_000);

/// Turns monotonic nanosecond timestamps into per-frame deltas.
#[derive(Clone, Debug)]
pub struct FrameClock {
    last_nanos: Option<u64>,
    jump_threshold_nanos: u64,
    discontinuities: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_jump_threshold(DEFAULT_JUMP_THRESHOLD)
    }

    pub fn with_jump_threshold(threshold: Duration) -> Self {
        Self {
            last_nanos: None,
            jump_threshold_nanos: threshold.as_nanos().min(u64::MAX as u128) as u64,
            discontinuities: 0,
        }
    }

    /// Seconds since the previous call.
    ///
    /// The first call only latches `now_nanos` and returns `0.0`. A jump larger
    /// than the threshold in either direction (or any backwards step) resyncs
    /// and also returns `0.0`, so simulations never catch up after a stall.
    pub fn advance(&mut self, now_nanos: u64) -> f32 {
        (self.advance_nanos(now_nanos) as f64 / 1_000_000_000.0) as f32
    }

    /// Same as [`advance`](Self::advance) in whole nanoseconds.
    pub fn advance_nanos(&mut self, now_nanos: u64) -> u64 {
        let Some(last) = self.last_nanos else {
            self.last_nanos = Some(now_nanos);
            return 0;
        };

        let diff = now_nanos.abs_diff(last);
        self.last_nanos = Some(now_nanos);
        if diff > self.jump_threshold_nanos || now_nanos < last {
            self.discontinuities += 1;
            debug!(last, now = now_nanos, gap_ns = diff, "frame clock discontinuity");
            return 0;
        }
        diff
    }

    pub fn reset(&mut self) {
        self.last_nanos = None;
    }

    pub fn last_nanos(&self) -> Option<u64> {
        self.last_nanos
    }

    pub fn discontinuities(&self) -> u64 {
        self.discontinuities
    }
}

/// Maps a 0-255 speed control onto a period: higher speed, shorter period.
/// The divisor is `(speed >> 4) + 1`, so the period steps down in 16 even stages.
pub fn speed_to_period(base_nanos: u64, speed: u8) -> u64 {
    base_nanos / ((speed as u64 >> 4) + 1)
}

/// Periodic gate that fires at most once per `period`.
///
/// Missed periods are coalesced: polling late yields one fire, never a backlog.
/// The first poll arms the ticker without firing.
#[derive(Clone, Debug)]
pub struct Ticker {
    period_nanos: u64,
    last_fire_nanos: Option<u64>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self::from_nanos(period.as_nanos().min(u64::MAX as u128) as u64)
    }

    pub fn from_nanos(period_nanos: u64) -> Self {
        Self {
            period_nanos,
            last_fire_nanos: None,
        }
    }

    pub fn from_speed(base: Duration, speed: u8) -> Self {
        let base = base.as_nanos().min(u64::MAX as u128) as u64;
        Self::from_nanos(speed_to_period(base, speed))
    }

    pub fn period_nanos(&self) -> u64 {
        self.period_nanos
    }

    /// Changing the period keeps the last fire time, so the next fire is measured
    /// against the new period.
    pub fn set_period_nanos(&mut self, period_nanos: u64) {
        self.period_nanos = period_nanos;
    }

    pub fn reset(&mut self) {
        self.last_fire_nanos = None;
    }

    pub fn should_fire(&mut self, now_nanos: u64) -> bool {
        match self.last_fire_nanos {
            None => {
                self.last_fire_nanos = Some(now_nanos);
                false
            }
            Some(last) if now_nanos < last => {
                // Clock went backwards: re-arm from here.
                self.last_fire_nanos = Some(now_nanos);
                false
            }
            Some(last) => {
                if now_nanos - last >= self.period_nanos {
                    self.last_fire_nanos = Some(now_nanos);
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Carries fractional event counts between frames, e.g. "0.3 spawns per frame".
#[derive(Clone, Debug, Default)]
pub struct RateAccumulator {
    carry: f32,
}

impl RateAccumulator {
    pub fn new() -> Self {
        Self { carry: 0.0 }
    }

    /// Adds `rate` and returns how many whole events are now due.
    pub fn take(&mut self, rate: f32) -> u32 {
        if !rate.is_finite() || rate <= 0.0 {
            return 0;
        }
        self.carry += rate;
        let whole = self.carry.floor();
        self.carry -= whole;
        whole.min(u32::MAX as f32) as u32
    }

    pub fn reset(&mut self) {
        self.carry = 0.0;
    }
}

/// Splits elapsed time into whole fixed-length frames, carrying the remainder
/// in integer nanoseconds so the total never drifts with the caller's cadence.
#[derive(Clone, Debug)]
pub struct FrameSteps {
    frame_nanos: u64,
    carry_nanos: u64,
}

impl FrameSteps {
    pub fn new(fps: u32) -> Self {
        Self {
            frame_nanos: (1_000_000_000 / fps.max(1) as u64).max(1),
            carry_nanos: 0,
        }
    }

    pub fn frame_nanos(&self) -> u64 {
        self.frame_nanos
    }

    /// Adds `elapsed_nanos` and returns how many whole frames are now due.
    pub fn take(&mut self, elapsed_nanos: u64) -> u32 {
        let total = self.carry_nanos.saturating_add(elapsed_nanos);
        self.carry_nanos = total % self.frame_nanos;
        (total / self.frame_nanos).min(u32::MAX as u64) as u32
    }

    pub fn reset(&mut self) {
        self.carry_nanos = 0;
    }
}
