use std::ops::{Add, AddAssign, Mul, Sub};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, k: f32) -> Self {
        Self::new(self.x * k, self.y * k)
    }
}

/// Position, velocity and acceleration of one simulated point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
}

impl Body {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            ..Self::default()
        }
    }

    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.vel = Vec2::new(vx, vy);
        self
    }

    pub fn with_acceleration(mut self, ax: f32, ay: f32) -> Self {
        self.acc = Vec2::new(ax, ay);
        self
    }
}

/// The simulation area `[0, width) x [0, height)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn from_size(width: usize, height: usize) -> Self {
        Self::new(width as f32, height as f32)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x < self.width && p.y >= 0.0 && p.y < self.height
    }
}

/// What happens when a body leaves the bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Boundary {
    /// No edge handling; the body may roam off-canvas.
    Open,
    /// Pin to the nearest edge; optionally zero the offending velocity component.
    Clamp { zero_velocity: bool },
    /// Pin to the edge, then reflect the offending velocity component scaled by `restitution`.
    Bounce { restitution: f32 },
    /// Toroidal wrap into `[0, size)`.
    Wrap,
    /// Report the body as escaped so its owner can retire it.
    Kill,
}

/// Edge interaction reported by [`step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    None,
    Clamped,
    Bounced,
    Wrapped,
    Killed,
}

/// Semi-implicit Euler: velocity is updated before position, then the boundary
/// policy is applied.
pub fn step(body: &mut Body, dt: f32, bounds: Bounds, boundary: Boundary) -> Contact {
    body.vel += body.acc * dt;
    body.pos += body.vel * dt;
    apply_boundary(body, bounds, boundary)
}

pub fn apply_boundary(body: &mut Body, bounds: Bounds, boundary: Boundary) -> Contact {
    match boundary {
        Boundary::Open => Contact::None,
        Boundary::Kill => {
            if bounds.contains(body.pos) {
                Contact::None
            } else {
                Contact::Killed
            }
        }
        Boundary::Wrap => {
            let wx = wrap_axis(body.pos.x, bounds.width);
            let wy = wrap_axis(body.pos.y, bounds.height);
            let moved = wx != body.pos.x || wy != body.pos.y;
            body.pos = Vec2::new(wx, wy);
            if moved { Contact::Wrapped } else { Contact::None }
        }
        Boundary::Clamp { zero_velocity } => {
            let hx = pin_axis(&mut body.pos.x, bounds.width);
            let hy = pin_axis(&mut body.pos.y, bounds.height);
            if zero_velocity {
                if hx != Side::Inside {
                    body.vel.x = 0.0;
                }
                if hy != Side::Inside {
                    body.vel.y = 0.0;
                }
            }
            if hx == Side::Inside && hy == Side::Inside {
                Contact::None
            } else {
                Contact::Clamped
            }
        }
        Boundary::Bounce { restitution } => {
            let r = if restitution.is_finite() {
                restitution.clamp(0.0, 1.0)
            } else {
                1.0
            };
            let hx = pin_axis(&mut body.pos.x, bounds.width);
            let hy = pin_axis(&mut body.pos.y, bounds.height);
            reflect(&mut body.vel.x, hx, r);
            reflect(&mut body.vel.y, hy, r);
            if hx == Side::Inside && hy == Side::Inside {
                Contact::None
            } else {
                Contact::Bounced
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Inside,
    Low,
    High,
}

/// Largest float strictly below `size`, i.e. the last position that still floors into the canvas.
#[inline]
fn upper_edge(size: f32) -> f32 {
    if size <= 0.0 || !size.is_finite() {
        return 0.0;
    }
    f32::from_bits(size.to_bits() - 1)
}

fn pin_axis(v: &mut f32, size: f32) -> Side {
    if v.is_nan() || *v < 0.0 {
        *v = 0.0;
        Side::Low
    } else if *v >= size {
        *v = upper_edge(size);
        Side::High
    } else {
        Side::Inside
    }
}

fn reflect(vel: &mut f32, side: Side, restitution: f32) {
    match side {
        Side::Inside => {}
        // Always point back into the canvas, even if the body was already heading inward.
        Side::Low => *vel = vel.abs() * restitution,
        Side::High => *vel = -vel.abs() * restitution,
    }
}

/// `((p mod size) + size) mod size`, guaranteed to land in `[0, size)` for finite `p`.
pub fn wrap_axis(p: f32, size: f32) -> f32 {
    if !p.is_finite() || size <= 0.0 || !size.is_finite() {
        return 0.0;
    }
    let w = p.rem_euclid(size);
    // rem_euclid can round up to exactly `size` for tiny negative inputs.
    if w >= size || w < 0.0 { 0.0 } else { w }
}
