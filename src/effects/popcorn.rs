use super::{Scene, REFERENCE_FPS};
use crate::animation::{Animation, Capabilities, Controls};
use crate::clock::RateAccumulator;
use crate::color::Rgb;
use crate::entity::{ColorKey, Entity, Life, Overflow};
use crate::error::ConfigResult;
use crate::physics::{Body, Boundary, Contact};

const MAX_KERNELS: usize = 200;
/// Trail fade per reference frame.
const TRAIL_FADE: u8 = 40;
/// Health lost per reference frame.
const LIFE_DRAIN: f32 = 0.01;
/// Extra health lost on every floor bounce.
const BOUNCE_COST: f32 = 0.3;
const FLOOR: Boundary = Boundary::Bounce { restitution: 0.6 };

/// Kernels pop up from the bottom row, arc under gravity and bounce until spent.
pub struct Popcorn {
    controls: Controls,
    rng: fastrand::Rng,
    pops: RateAccumulator,
    scene: Option<Scene<()>>,
}

impl Popcorn {
    pub fn new(seed: u64) -> Self {
        Self {
            controls: Controls::with_seed(seed),
            rng: fastrand::Rng::with_seed(seed),
            pops: RateAccumulator::new(),
            scene: None,
        }
    }

    /// Live kernel count, or zero before `init`.
    pub fn kernels(&self) -> usize {
        self.scene.as_ref().map_or(0, |s| s.pool.len())
    }

    fn gravity(&self) -> f32 {
        0.05 + self.controls.speed as f32 / 255.0 * 0.05
    }
}

impl Animation for Popcorn {
    fn name(&self) -> &'static str {
        "Popcorn"
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
        self.scene = Some(Scene::new(width, height, MAX_KERNELS, Overflow::Reject)?);
        self.rng = fastrand::Rng::with_seed(self.controls.seed);
        self.pops.reset();
        Ok(())
    }

    fn update(&mut self, now_nanos: u64) -> bool {
        let gravity = self.gravity();
        let Some(scene) = self.scene.as_mut() else {
            return true;
        };
        // Physics constants are per reference frame; dt is expressed in those frames.
        let (dt, fades) = scene.tick(now_nanos);
        let frames = dt * REFERENCE_FPS;
        for _ in 0..fades {
            scene.canvas.decay(TRAIL_FADE);
        }

        let rate = self.controls.intensity as f32 / 255.0 * 0.5;
        let (w, h) = (scene.width() as f32, scene.height() as f32);
        for _ in 0..self.pops.take(rate * frames) {
            let speed = self.rng.f32() * 1.5 + 1.0;
            let drift = (self.rng.f32() - 0.5) * 0.5;
            let body = Body::at(self.rng.f32() * w, h - 1.0)
                .with_velocity(drift, -speed)
                .with_acceleration(0.0, gravity);
            let color = ColorKey::Index(self.rng.u8(..));
            scene.pool.spawn(Entity::new(body, Life::full(), color, ()));
        }

        let Scene {
            canvas,
            pool,
            bounds,
            ..
        } = scene;
        let resolver = &self.controls.resolver;
        pool.for_each_live(|_, kernel| {
            if kernel.integrate(frames, *bounds, FLOOR) == Contact::Bounced {
                kernel.life.tick(BOUNCE_COST);
            }
            kernel.life.tick(LIFE_DRAIN * frames);
            if kernel.life.is_spent() {
                return;
            }

            let base = kernel.color.resolve(resolver);
            // Rising kernels glow hot.
            let hot = if kernel.body.vel.y < 0.0 {
                base.blend(Rgb::WHITE, 128)
            } else {
                base
            };
            let c = hot.scale_f(kernel.life.remaining());
            canvas.set_pixel_f(kernel.body.pos.x, kernel.body.pos.y, c);
        });
        true
    }

    fn pixel(&self, x: i32, y: i32) -> Rgb {
        self.scene
            .as_ref()
            .map_or(Rgb::BLACK, |s| s.canvas.pixel(x, y))
    }

    fn cleanup(&mut self) {
        self.scene = None;
    }
}
