use super::REFERENCE_FPS;
use crate::animation::{Animation, Capabilities, Controls};
use crate::canvas::{BlurKernel, Canvas};
use crate::clock::{FrameClock, FrameSteps};
use crate::color::Rgb;
use crate::error::ConfigResult;
use crate::palette::ColorResolver;
use crate::ripple::{ripple_magnitude, ripple_radius, Ripple, RippleField};

/// Fade applied per ripple step when trails are on.
const TRAIL_FADE: u8 = 250;

/// Rings of palette color spreading from random points.
pub struct Ripples {
    controls: Controls,
    /// Keep a fading trail and soften it with a blur of this strength; 0 clears every frame.
    trail_blur: u8,
    clock: FrameClock,
    steps: FrameSteps,
    canvas: Option<Canvas>,
    field: Option<RippleField>,
}

impl Ripples {
    pub fn new(seed: u64) -> Self {
        Self {
            controls: Controls::with_seed(seed),
            trail_blur: 0,
            clock: FrameClock::new(),
            steps: FrameSteps::new(REFERENCE_FPS as u32),
            canvas: None,
            field: None,
        }
    }

    pub fn with_trails(mut self, blur: u8) -> Self {
        self.trail_blur = blur;
        self
    }

    pub fn field(&self) -> Option<&RippleField> {
        self.field.as_ref()
    }

    pub fn field_mut(&mut self) -> Option<&mut RippleField> {
        self.field.as_mut()
    }
}

impl Animation for Ripples {
    fn name(&self) -> &'static str {
        "Ripple"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            palette: true,
            speed: true,
            intensity: true,
            ..Capabilities::default()
        }
    }

    fn controls(&self) -> &Controls {
        &self.controls
    }

    fn controls_mut(&mut self) -> &mut Controls {
        &mut self.controls
    }

    fn init(&mut self, width: usize, height: usize) -> ConfigResult<()> {
        self.canvas = Some(Canvas::new(width, height)?);
        self.field = Some(RippleField::new(width, height, self.controls.seed));
        self.clock.reset();
        self.steps.reset();
        Ok(())
    }

    fn update(&mut self, now_nanos: u64) -> bool {
        let (Some(canvas), Some(field)) = (self.canvas.as_mut(), self.field.as_mut()) else {
            return true;
        };
        let steps = self.steps.take(self.clock.advance_nanos(now_nanos));

        let Controls {
            speed,
            intensity,
            resolver,
            ..
        } = &self.controls;
        let (speed, intensity) = (*speed, *intensity);

        if self.trail_blur > 0 {
            for _ in 0..steps {
                canvas.decay(TRAIL_FADE);
                field.step(speed, intensity, |ripple, progress| {
                    draw_ring(canvas, resolver, ripple, progress, speed);
                });
                canvas.blur3x3(self.trail_blur >> 1, BlurKernel::Uniform);
            }
        } else {
            for _ in 0..steps {
                field.step(speed, intensity, |_, _| {});
            }
            canvas.clear();
            for ripple in field.ripples() {
                if let Some(progress) = ripple.state.progress() {
                    draw_ring(canvas, resolver, ripple, progress, speed);
                }
            }
        }
        true
    }

    fn pixel(&self, x: i32, y: i32) -> Rgb {
        self.canvas.as_ref().map_or(Rgb::BLACK, |c| c.pixel(x, y))
    }

    fn cleanup(&mut self) {
        self.canvas = None;
        self.field = None;
    }
}

fn draw_ring(
    canvas: &mut Canvas,
    resolver: &dyn ColorResolver,
    ripple: &Ripple,
    progress: u8,
    speed: u8,
) {
    let radius = ripple_radius(progress, speed);
    if radius <= 0 {
        return;
    }
    let base = resolver.color(ripple.color as i32, true);
    let ring = Rgb::BLACK.blend(base, ripple_magnitude(progress, speed));
    canvas.fill_circle_add(ripple.origin.0, ripple.origin.1, radius, ring);
}
