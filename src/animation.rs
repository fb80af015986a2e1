use crate::audio::LevelFeed;
use crate::canvas::write_rgba_rows;
use crate::color::Rgb;
use crate::error::ConfigResult;
use crate::palette::{ColorResolver, Palette, PaletteResolver};
use tracing::{debug, warn};

pub const DEFAULT_SPEED: u8 = 128;
pub const DEFAULT_INTENSITY: u8 = 128;

/// Which controls an effect honors. The host uses these to decide what to expose;
/// setters for anything not listed are no-ops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub palette: bool,
    pub speed: bool,
    pub intensity: bool,
    pub color: bool,
    pub audio_reactive: bool,
    /// Re-running `init` with new dimensions keeps the effect's state.
    pub resizable: bool,
}

/// User-facing parameters shared by every effect.
#[derive(Clone, Debug)]
pub struct Controls {
    pub speed: u8,
    pub intensity: u8,
    /// Primary color. Effects that honor it use it in place of the rainbow
    /// fallback when no palette is set.
    pub color: Option<Rgb>,
    pub resolver: PaletteResolver,
    pub seed: u64,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            intensity: DEFAULT_INTENSITY,
            color: None,
            resolver: PaletteResolver::default(),
            seed: 0,
        }
    }
}

impl Controls {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Palette color at a 0-255 index (wrapping); rainbow when no palette is set.
    pub fn palette_color(&self, index: u8) -> Rgb {
        self.resolver.color(index as i32, true)
    }
}

/// One pixel-grid effect.
///
/// The host calls `init` once with the grid size, then alternates `update` with
/// any number of `pixel` reads, and finally `cleanup`. `pixel` never mutates:
/// reading the same cell twice between updates yields the same color.
pub trait Animation: Send {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    fn controls(&self) -> &Controls;

    fn controls_mut(&mut self) -> &mut Controls;

    /// Allocates per-size state. Zero dimensions are a configuration error.
    fn init(&mut self, width: usize, height: usize) -> ConfigResult<()>;

    /// Advances the simulation to `now_nanos` (monotonic). Returns `false` only
    /// when the effect has finished and may be replaced.
    fn update(&mut self, now_nanos: u64) -> bool;

    /// Color of one cell; black outside the grid or before `init`.
    fn pixel(&self, x: i32, y: i32) -> Rgb;

    /// Releases size-dependent state and cancels any audio subscription.
    fn cleanup(&mut self);

    /// Hands the effect a level feed to subscribe to on its next `init`.
    fn set_audio_feed(&mut self, _feed: Option<LevelFeed>) {}

    fn set_speed(&mut self, speed: u8) {
        if self.capabilities().speed {
            self.controls_mut().speed = speed;
        }
    }

    fn set_intensity(&mut self, intensity: u8) {
        if self.capabilities().intensity {
            self.controls_mut().intensity = intensity;
        }
    }

    fn set_color(&mut self, color: Option<Rgb>) {
        if self.capabilities().color {
            self.controls_mut().color = color;
        }
    }

    fn set_palette(&mut self, palette: Option<Palette>) {
        if self.capabilities().palette {
            self.controls_mut().resolver.set_palette(palette);
        }
    }

    fn speed(&self) -> Option<u8> {
        self.capabilities().speed.then(|| self.controls().speed)
    }

    fn intensity(&self) -> Option<u8> {
        self.capabilities().intensity.then(|| self.controls().intensity)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Ready,
    Running,
    Disposed,
}

impl Lifecycle {
    pub fn is_live(self) -> bool {
        matches!(self, Self::Ready | Self::Running)
    }
}

/// Host-side driver that enforces the effect lifecycle.
///
/// Calls that make no sense in the current state are logged and ignored rather
/// than forwarded to the effect.
pub struct Player {
    effect: Box<dyn Animation>,
    state: Lifecycle,
    size: Option<(usize, usize)>,
    feed: Option<LevelFeed>,
}

impl Player {
    pub fn new(effect: Box<dyn Animation>) -> Self {
        Self {
            effect,
            state: Lifecycle::Uninitialized,
            size: None,
            feed: None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state
    }

    pub fn effect(&self) -> &dyn Animation {
        self.effect.as_ref()
    }

    pub fn effect_mut(&mut self) -> &mut dyn Animation {
        self.effect.as_mut()
    }

    pub fn size(&self) -> Option<(usize, usize)> {
        self.size
    }

    /// Feed forwarded to the current and every later effect.
    pub fn set_audio_feed(&mut self, feed: Option<LevelFeed>) {
        self.feed = feed.clone();
        self.effect.set_audio_feed(feed);
    }

    /// Initializes the effect. A live effect that cannot resize is torn down first
    /// so it starts from scratch.
    pub fn init(&mut self, width: usize, height: usize) -> ConfigResult<()> {
        if self.state.is_live() && !self.effect.capabilities().resizable {
            self.effect.cleanup();
        }
        match self.effect.init(width, height) {
            Ok(()) => {
                debug!(effect = self.effect.name(), width, height, "effect initialized");
                self.state = Lifecycle::Ready;
                self.size = Some((width, height));
                Ok(())
            }
            Err(err) => {
                warn!(effect = self.effect.name(), %err, "effect init rejected");
                self.state = Lifecycle::Uninitialized;
                self.size = None;
                Err(err)
            }
        }
    }

    pub fn update(&mut self, now_nanos: u64) -> bool {
        if !self.state.is_live() {
            warn!(effect = self.effect.name(), state = ?self.state, "update outside live state");
            return false;
        }
        self.state = Lifecycle::Running;
        self.effect.update(now_nanos)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Rgb {
        if self.state.is_live() {
            self.effect.pixel(x, y)
        } else {
            Rgb::BLACK
        }
    }

    /// Writes the whole grid as RGBA8 rows. Returns `false` (writing nothing)
    /// when the effect is not live or `out` is too short.
    pub fn write_rgba(&self, out: &mut [u8]) -> bool {
        let Some((w, h)) = self.size.filter(|_| self.state.is_live()) else {
            return false;
        };
        write_rgba_rows(w, h, out, |x, y| self.effect.pixel(x as i32, y as i32))
    }

    pub fn cleanup(&mut self) {
        if self.state.is_live() {
            self.effect.cleanup();
            debug!(effect = self.effect.name(), "effect disposed");
        }
        if self.state != Lifecycle::Uninitialized {
            self.state = Lifecycle::Disposed;
        }
    }

    /// Disposes the current effect and initializes `next` at the same size,
    /// carrying the audio feed and user controls over.
    pub fn replace(&mut self, mut next: Box<dyn Animation>) -> ConfigResult<()> {
        self.cleanup();
        let controls = self.effect.controls().clone();
        next.set_speed(controls.speed);
        next.set_intensity(controls.intensity);
        next.set_color(controls.color);
        next.set_palette(controls.resolver.palette().cloned());
        next.set_audio_feed(self.feed.clone());
        self.effect = next;
        self.state = Lifecycle::Uninitialized;
        match self.size {
            Some((w, h)) => self.init(w, h),
            None => Ok(()),
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.cleanup();
    }
}
