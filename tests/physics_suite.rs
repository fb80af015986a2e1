use pixelfx::physics::{self, wrap_axis, Body, Boundary, Bounds, Contact, Vec2};

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn big() -> Bounds {
    Bounds::new(1000.0, 1000.0)
}

// ── integration ─────────────────────────────────────────────────────────────

#[test]
fn constant_velocity_moves_linearly() {
    let mut body = Body::at(10.0, 20.0).with_velocity(1.5, -0.5);
    let dt = 0.25;
    for _ in 0..40 {
        physics::step(&mut body, dt, big(), Boundary::Open);
    }
    assert!(approx(body.pos.x, 10.0 + 1.5 * dt * 40.0), "{:?}", body.pos);
    assert!(approx(body.pos.y, 20.0 - 0.5 * dt * 40.0), "{:?}", body.pos);
}

#[test]
fn velocity_updates_before_position() {
    let mut body = Body::at(0.0, 0.0)
        .with_velocity(1.0, 0.0)
        .with_acceleration(0.0, 0.1);
    for _ in 0..3 {
        physics::step(&mut body, 1.0, big(), Boundary::Open);
    }
    assert!(approx(body.pos.x, 3.0));
    assert!(approx(body.vel.y, 0.3));
    // Semi-implicit Euler: 0.1 + 0.2 + 0.3.
    assert!(approx(body.pos.y, 0.6), "{:?}", body.pos);
}

#[test]
fn zero_dt_changes_nothing() {
    let mut body = Body::at(4.0, 4.0)
        .with_velocity(3.0, 3.0)
        .with_acceleration(1.0, 1.0);
    let before = body;
    physics::step(&mut body, 0.0, big(), Boundary::Open);
    assert_eq!(body, before);
}

// ── boundaries ──────────────────────────────────────────────────────────────

#[test]
fn clamp_pins_to_edges() {
    let b = Bounds::new(10.0, 10.0);
    let mut body = Body::at(9.5, 1.0).with_velocity(2.0, -5.0);
    let contact = physics::step(&mut body, 1.0, b, Boundary::Clamp { zero_velocity: true });
    assert_eq!(contact, Contact::Clamped);
    assert!(body.pos.x < 10.0 && body.pos.x > 9.9);
    assert_eq!(body.pos.y, 0.0);
    assert_eq!(body.vel, Vec2::ZERO);
}

#[test]
fn clamp_without_zeroing_keeps_velocity() {
    let b = Bounds::new(10.0, 10.0);
    let mut body = Body::at(5.0, 0.5).with_velocity(0.0, -3.0);
    physics::step(&mut body, 1.0, b, Boundary::Clamp { zero_velocity: false });
    assert_eq!(body.pos.y, 0.0);
    assert_eq!(body.vel.y, -3.0);
}

#[test]
fn bounce_reflects_with_restitution() {
    let b = Bounds::new(10.0, 10.0);
    let mut body = Body::at(5.0, 9.0).with_velocity(0.0, 2.0);
    let contact = physics::step(&mut body, 1.0, b, Boundary::Bounce { restitution: 0.5 });
    assert_eq!(contact, Contact::Bounced);
    assert!(body.pos.y < 10.0);
    assert!(approx(body.vel.y, -1.0), "{:?}", body.vel);
    assert_eq!(body.vel.x, 0.0);
}

#[test]
fn bounce_off_low_edge_points_inward() {
    let b = Bounds::new(10.0, 10.0);
    let mut body = Body::at(0.5, 5.0).with_velocity(-4.0, 0.0);
    physics::step(&mut body, 1.0, b, Boundary::Bounce { restitution: 1.0 });
    assert_eq!(body.pos.x, 0.0);
    assert!(approx(body.vel.x, 4.0));
}

#[test]
fn wrap_lands_inside() {
    let b = Bounds::new(8.0, 4.0);
    let mut body = Body::at(7.5, 3.5).with_velocity(1.0, 1.0);
    let contact = physics::step(&mut body, 1.0, b, Boundary::Wrap);
    assert_eq!(contact, Contact::Wrapped);
    assert!(approx(body.pos.x, 0.5));
    assert!(approx(body.pos.y, 0.5));
}

#[test]
fn wrap_axis_always_in_range() {
    let sizes = [1.0f32, 3.0, 7.5, 64.0];
    let inputs = [
        0.0f32, -0.0, -1e-9, -1e-30, 1e-30, 3.0, -3.0, 7.5, -7.5, 63.999, 64.0, -64.0, 1e9, -1e9,
        f32::MAX, f32::MIN, f32::MIN_POSITIVE, -f32::MIN_POSITIVE,
    ];
    for &size in &sizes {
        for &p in &inputs {
            let w = wrap_axis(p, size);
            assert!((0.0..size).contains(&w), "wrap({p}, {size}) = {w}");
        }
    }
    assert_eq!(wrap_axis(f32::NAN, 5.0), 0.0);
    assert_eq!(wrap_axis(f32::INFINITY, 5.0), 0.0);
}

#[test]
fn kill_reports_escape() {
    let b = Bounds::new(5.0, 5.0);
    let mut inside = Body::at(2.0, 2.0).with_velocity(1.0, 0.0);
    assert_eq!(physics::step(&mut inside, 1.0, b, Boundary::Kill), Contact::None);
    let mut out = Body::at(4.5, 2.0).with_velocity(1.0, 0.0);
    assert_eq!(physics::step(&mut out, 1.0, b, Boundary::Kill), Contact::Killed);
}

#[test]
fn clamp_handles_nan_position() {
    let b = Bounds::new(5.0, 5.0);
    let mut body = Body::at(f32::NAN, 2.0);
    physics::apply_boundary(&mut body, b, Boundary::Clamp { zero_velocity: false });
    assert_eq!(body.pos.x, 0.0);
}
