use pixelfx::clock::{
    speed_to_period, FrameClock, FrameSteps, RateAccumulator, Ticker, DEFAULT_JUMP_THRESHOLD,
};
use std::time::Duration;

const MS: u64 = 1_000_000;

// ── FrameClock ──────────────────────────────────────────────────────────────

#[test]
fn first_advance_latches_and_returns_zero() {
    let mut clock = FrameClock::new();
    assert_eq!(clock.advance(5_000 * MS), 0.0);
    assert_eq!(clock.last_nanos(), Some(5_000 * MS));
    let dt = clock.advance(5_016 * MS);
    assert!((dt - 0.016).abs() < 1e-6, "dt = {dt}");
}

#[test]
fn large_gap_is_a_discontinuity() {
    let mut clock = FrameClock::new();
    clock.advance(0);
    let gap = DEFAULT_JUMP_THRESHOLD.as_nanos() as u64 + MS;
    assert_eq!(clock.advance(gap), 0.0);
    assert_eq!(clock.discontinuities(), 1);
    // Resynced: the next frame measures from the post-gap time.
    let dt = clock.advance(gap + 10 * MS);
    assert!((dt - 0.010).abs() < 1e-6);
}

#[test]
fn backwards_time_resyncs() {
    let mut clock = FrameClock::new();
    clock.advance(100 * MS);
    assert_eq!(clock.advance(90 * MS), 0.0);
    assert_eq!(clock.discontinuities(), 1);
    assert!(clock.advance(95 * MS) > 0.0);
}

#[test]
fn reset_forgets_last_time() {
    let mut clock = FrameClock::with_jump_threshold(Duration::from_millis(50));
    clock.advance(0);
    clock.reset();
    assert_eq!(clock.advance(10_000 * MS), 0.0);
    assert_eq!(clock.discontinuities(), 0);
}

#[test]
fn advance_nanos_is_exact() {
    let mut clock = FrameClock::new();
    assert_eq!(clock.advance_nanos(7), 0);
    assert_eq!(clock.advance_nanos(33_333_340), 33_333_333);
    assert_eq!(clock.advance_nanos(10), 0, "backwards");
    assert_eq!(clock.discontinuities(), 1);
}

// ── FrameSteps ──────────────────────────────────────────────────────────────

#[test]
fn frame_steps_carry_the_remainder() {
    let mut steps = FrameSteps::new(60);
    assert_eq!(steps.frame_nanos(), 16_666_666);
    assert_eq!(steps.take(10 * MS), 0);
    assert_eq!(steps.take(10 * MS), 1);
    assert_eq!(steps.take(40 * MS), 2);
    steps.reset();
    assert_eq!(steps.take(16 * MS), 0);
    assert_eq!(FrameSteps::new(0).frame_nanos(), 1_000_000_000);
}

#[test]
fn frame_steps_total_ignores_how_time_is_sliced() {
    let span = 1_000 * MS;
    for slice in [MS, 7 * MS, 16 * MS, 33 * MS, 250 * MS] {
        let mut steps = FrameSteps::new(60);
        let mut total = 0;
        let mut elapsed = 0;
        while elapsed < span {
            let d = slice.min(span - elapsed);
            total += steps.take(d);
            elapsed += d;
        }
        assert_eq!(total, 60, "slice {slice}");
    }
}

// ── Ticker ──────────────────────────────────────────────────────────────────

/// Counts fires while polling every `step` nanos over `[0, span]`.
fn fires(period: u64, step: u64, span: u64) -> u64 {
    let mut t = Ticker::from_nanos(period);
    let mut n = 0;
    let mut now = 0;
    while now <= span {
        if t.should_fire(now) {
            n += 1;
        }
        now += step;
    }
    n
}

#[test]
fn ticker_fire_count_is_bounded_by_span_over_period() {
    let period = 16 * MS;
    for span in [0, 15 * MS, 16 * MS, 100 * MS, 1_000 * MS, 1_600 * MS] {
        for step in [MS, 3 * MS, 7 * MS, 16 * MS, 40 * MS] {
            let n = fires(period, step, span);
            let bound = span.div_ceil(period);
            assert!(n <= bound, "span={span} step={step}: {n} > {bound}");
        }
    }
}

#[test]
fn ticker_fires_once_per_period_when_polled_often() {
    assert_eq!(fires(10 * MS, MS, 100 * MS), 10);
}

#[test]
fn ticker_coalesces_missed_periods() {
    let mut t = Ticker::from_nanos(10 * MS);
    assert!(!t.should_fire(0));
    assert!(t.should_fire(95 * MS));
    assert!(!t.should_fire(96 * MS));
    assert!(t.should_fire(105 * MS));
}

#[test]
fn ticker_rearms_when_time_goes_backwards() {
    let mut t = Ticker::from_nanos(10 * MS);
    t.should_fire(100 * MS);
    assert!(!t.should_fire(50 * MS));
    assert!(!t.should_fire(55 * MS));
    assert!(t.should_fire(60 * MS));
}

#[test]
fn speed_divides_period_in_sixteen_stages() {
    let base = 256 * MS;
    assert_eq!(speed_to_period(base, 0), base);
    assert_eq!(speed_to_period(base, 15), base);
    assert_eq!(speed_to_period(base, 16), base / 2);
    assert_eq!(speed_to_period(base, 255), base / 16);
    let t = Ticker::from_speed(Duration::from_millis(256), 128);
    assert_eq!(t.period_nanos(), base / 9);
}

// ── RateAccumulator ─────────────────────────────────────────────────────────

#[test]
fn accumulator_carries_fractions() {
    let mut acc = RateAccumulator::new();
    let total: u32 = (0..8).map(|_| acc.take(0.25)).sum();
    assert_eq!(total, 2);
    assert_eq!(acc.take(2.5), 2);
    assert_eq!(acc.take(f32::NAN), 0);
    assert_eq!(acc.take(-1.0), 0);
}
