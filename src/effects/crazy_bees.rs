use super::Scene;
use crate::animation::{Animation, Capabilities, Controls};
use crate::canvas::BlurKernel;
use crate::clock::{speed_to_period, Ticker};
use crate::color::Rgb;
use crate::entity::{ColorKey, Entity, Life, Overflow};
use crate::error::ConfigResult;
use crate::physics::{self, Body, Boundary};

const MAX_BEES: usize = 5;
/// Step period at speed 0; sixteen speed stages divide it down.
const BASE_STEP_NANOS: u64 = 16_000_000 * 16;
const FADE: u8 = 32;
const BLUR: u8 = 10;
const BEE_BRIGHTNESS: u8 = 200;
const HIVE: Boundary = Boundary::Clamp {
    zero_velocity: true,
};

/// Line-walk state of one bee flying to its flower.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flight {
    pub pos: (i32, i32),
    pub aim: (i32, i32),
    delta: (i32, i32),
    sign: (i32, i32),
    error: i32,
}

impl Flight {
    fn aim_at(&mut self, aim: (i32, i32)) {
        self.aim = aim;
        self.delta = ((aim.0 - self.pos.0).abs(), (aim.1 - self.pos.1).abs());
        self.sign = (
            if self.pos.0 < aim.0 { 1 } else { -1 },
            if self.pos.1 < aim.1 { 1 } else { -1 },
        );
        self.error = self.delta.0 - self.delta.1;
    }

    pub fn arrived(&self) -> bool {
        self.pos == self.aim
    }

    /// One Bresenham step toward the aim.
    fn advance(&mut self) {
        let e2 = self.error * 2;
        if e2 > -self.delta.1 {
            self.error -= self.delta.1;
            self.pos.0 += self.sign.0;
        }
        if e2 < self.delta.0 {
            self.error += self.delta.0;
            self.pos.1 += self.sign.1;
        }
    }
}

/// A few bees zig-zag to random flowers, leaving blurred trails.
pub struct CrazyBees {
    controls: Controls,
    rng: fastrand::Rng,
    ticker: Ticker,
    scene: Option<Scene<Flight>>,
}

impl CrazyBees {
    pub fn new(seed: u64) -> Self {
        Self {
            controls: Controls::with_seed(seed),
            rng: fastrand::Rng::with_seed(seed),
            ticker: Ticker::from_nanos(BASE_STEP_NANOS),
            scene: None,
        }
    }

    pub fn bee_count(width: usize, height: usize) -> usize {
        MAX_BEES.min(width.saturating_mul(height) / 256 + 1)
    }

    pub fn flights(&self) -> Vec<Flight> {
        self.scene
            .as_ref()
            .map(|s| s.pool.iter().map(|e| e.payload).collect())
            .unwrap_or_default()
    }

    pub fn step_period_nanos(&self) -> u64 {
        self.ticker.period_nanos()
    }
}

fn pick(rng: &mut fastrand::Rng, w: usize, h: usize) -> (i32, i32) {
    (rng.usize(..w) as i32, rng.usize(..h) as i32)
}

impl Animation for CrazyBees {
    fn name(&self) -> &'static str {
        "Crazy Bees"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            palette: true,
            speed: true,
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
        let count = Self::bee_count(width, height);
        let mut scene = Scene::new(width, height, count, Overflow::Reject)?;
        self.rng = fastrand::Rng::with_seed(self.controls.seed);
        for _ in 0..count {
            let mut flight = Flight {
                pos: pick(&mut self.rng, width, height),
                ..Flight::default()
            };
            flight.aim_at(pick(&mut self.rng, width, height));
            let body = Body::at(flight.pos.0 as f32, flight.pos.1 as f32);
            let hue = ColorKey::Index(self.rng.u8(..));
            scene
                .pool
                .spawn(Entity::new(body, Life::full(), hue, flight));
        }
        self.scene = Some(scene);
        self.ticker = Ticker::from_nanos(speed_to_period(BASE_STEP_NANOS, self.controls.speed));
        Ok(())
    }

    fn update(&mut self, now_nanos: u64) -> bool {
        self.ticker
            .set_period_nanos(speed_to_period(BASE_STEP_NANOS, self.controls.speed));
        if !self.ticker.should_fire(now_nanos) {
            return true;
        }
        let Some(scene) = self.scene.as_mut() else {
            return true;
        };

        let (w, h) = (scene.width(), scene.height());
        let Scene {
            canvas,
            pool,
            bounds,
            ..
        } = scene;
        canvas.decay(FADE);
        canvas.blur3x3(BLUR, BlurKernel::Uniform);

        let resolver = &self.controls.resolver;
        let rng = &mut self.rng;
        pool.for_each_live(|_, bee| {
            let flower = bee.color.resolve(resolver);
            let (ax, ay) = bee.payload.aim;
            canvas.add_pixel(ax + 1, ay, flower);
            canvas.add_pixel(ax, ay + 1, flower);
            canvas.add_pixel(ax - 1, ay, flower);
            canvas.add_pixel(ax, ay - 1, flower);

            let flight = &mut bee.payload;
            if flight.arrived() {
                flight.aim_at(pick(rng, w, h));
                bee.color = ColorKey::Index(rng.u8(..));
                return;
            }
            canvas.set_pixel(flight.pos.0, flight.pos.1, flower.scale(BEE_BRIGHTNESS));
            flight.advance();

            bee.body.pos.x = flight.pos.0 as f32;
            bee.body.pos.y = flight.pos.1 as f32;
            physics::apply_boundary(&mut bee.body, *bounds, HIVE);
            flight.pos = (bee.body.pos.x as i32, bee.body.pos.y as i32);
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
        self.ticker.reset();
    }
}
