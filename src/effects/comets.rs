use super::Scene;
use crate::animation::{Animation, Capabilities, Controls};
use crate::clock::{speed_to_period, Ticker};
use crate::color::Rgb;
use crate::entity::{ColorKey, Entity, Life, Overflow};
use crate::error::ConfigResult;
use crate::physics::{Body, Boundary};

const MAX_COMETS: usize = 8;
/// A fresh comet launches this often at speed 0, replacing the oldest when full.
const BASE_LAUNCH_NANOS: u64 = 6_000_000_000;

/// Comets streak horizontally around the grid, wrapping at the edges and
/// cycling through the palette as they go. With no palette set, a primary
/// color paints every comet instead of the rainbow.
pub struct Comets {
    controls: Controls,
    rng: fastrand::Rng,
    launcher: Ticker,
    scene: Option<Scene<()>>,
}

impl Comets {
    pub fn new(seed: u64) -> Self {
        Self {
            controls: Controls::with_seed(seed),
            rng: fastrand::Rng::with_seed(seed),
            launcher: Ticker::from_nanos(BASE_LAUNCH_NANOS),
            scene: None,
        }
    }

    pub fn comet_count(&self) -> usize {
        self.scene.as_ref().map_or(0, |s| s.pool.len())
    }

    pub fn evictions(&self) -> u64 {
        self.scene.as_ref().map_or(0, |s| s.pool.evictions())
    }

    /// Fade per reference frame: low intensity leaves long tails.
    fn fade(&self) -> u8 {
        24 + self.controls.intensity / 4
    }
}

fn launch(rng: &mut fastrand::Rng, scene: &mut Scene<()>, speed: u8) {
    let dir = if rng.bool() { 1.0 } else { -1.0 };
    let px_per_sec = (10 + rng.u32(..50)) as f32 * (speed as f32 / 128.0 + 0.1) * dir;
    let body = Body::at(
        rng.f32() * scene.width() as f32,
        rng.usize(..scene.height()) as f32,
    )
    .with_velocity(px_per_sec, 0.0);
    let hue = ColorKey::Index(rng.u8(..));
    scene.pool.spawn(Entity::new(body, Life::full(), hue, ()));
}

impl Animation for Comets {
    fn name(&self) -> &'static str {
        "Comets"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            palette: true,
            speed: true,
            intensity: true,
            color: true,
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
        let mut scene = Scene::new(width, height, MAX_COMETS, Overflow::EvictOldest)?;
        self.rng = fastrand::Rng::with_seed(self.controls.seed);
        let speed = self.controls.speed;
        for _ in 0..3 + speed as usize / 64 {
            launch(&mut self.rng, &mut scene, speed);
        }
        self.scene = Some(scene);
        self.launcher.reset();
        Ok(())
    }

    fn update(&mut self, now_nanos: u64) -> bool {
        let fade = self.fade();
        let speed = self.controls.speed;
        let Some(scene) = self.scene.as_mut() else {
            return true;
        };
        let (dt, frames) = scene.tick(now_nanos);

        self.launcher
            .set_period_nanos(speed_to_period(BASE_LAUNCH_NANOS, speed));
        if self.launcher.should_fire(now_nanos) {
            launch(&mut self.rng, scene, speed);
        }

        let Scene {
            canvas,
            pool,
            bounds,
            ..
        } = scene;
        for _ in 0..frames {
            canvas.decay(fade);
        }
        let resolver = &self.controls.resolver;
        let primary = self.controls.color.filter(|_| resolver.palette().is_none());
        pool.for_each_live(|_, comet| {
            comet.integrate(dt, *bounds, Boundary::Wrap);
            let color = primary.unwrap_or_else(|| comet.color.resolve(resolver));
            canvas.set_pixel_f(comet.body.pos.x, comet.body.pos.y, color);
            if let ColorKey::Index(hue) = comet.color {
                comet.color = ColorKey::Index(hue.wrapping_add(frames as u8));
            }
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
        self.launcher.reset();
    }
}
