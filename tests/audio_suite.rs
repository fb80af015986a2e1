use pixelfx::audio::{
    AudioSensors, LatestLevel, LevelFeed, LevelSample, LevelSubscription, QuietSensors,
    StaticSensors, MAX_LOUDNESS,
};
use std::sync::Arc;
use std::thread;

fn sample(rms: f32) -> LevelSample {
    LevelSample { rms, peak: rms }
}

// ── loudness ────────────────────────────────────────────────────────────────

#[test]
fn loudness_scales_and_clamps() {
    assert_eq!(sample(0.0).loudness(), 0);
    assert_eq!(sample(1.0 / 128.0).loudness(), 546);
    assert_eq!(sample(1.0).loudness(), MAX_LOUDNESS);
    assert_eq!(sample(-0.5).loudness(), 0);
    assert_eq!(sample(f32::NAN).loudness(), 0);
    assert_eq!(sample(f32::INFINITY).loudness(), MAX_LOUDNESS);
}

// ── most-recent-value cell ──────────────────────────────────────────────────

#[test]
fn cell_keeps_only_the_latest() {
    let cell = LatestLevel::new();
    assert_eq!(cell.load(), LevelSample::default());
    cell.store(sample(0.1));
    cell.store(sample(0.2));
    assert_eq!(cell.load(), sample(0.2));
    assert_eq!(cell.stores(), 2);
}

#[test]
fn concurrent_reads_never_tear() {
    let cell = Arc::new(LatestLevel::new());
    let writer = {
        let cell = Arc::clone(&cell);
        thread::spawn(move || {
            for i in 0..20_000u32 {
                cell.store(sample(i as f32));
            }
        })
    };
    for _ in 0..20_000 {
        let s = cell.load();
        assert_eq!(s.rms, s.peak, "torn read: {s:?}");
    }
    writer.join().unwrap();
    assert_eq!(cell.load(), sample(19_999.0));
}

// ── feed and subscriptions ──────────────────────────────────────────────────

#[test]
fn subscription_reads_quiet_before_first_sample() {
    let feed = LevelFeed::new();
    let sub = feed.subscribe();
    assert!(sub.is_active());
    assert_eq!(sub.latest(), LevelSample::default());
    assert_eq!(sub.current_loudness(), 0);
}

#[test]
fn every_subscriber_sees_the_latest_sample() {
    let feed = LevelFeed::new();
    let a = feed.subscribe();
    let b = feed.clone().subscribe();
    feed.publish(sample(0.001));
    feed.publish(sample(0.002));
    assert_eq!(a.latest(), sample(0.002));
    assert_eq!(b.latest(), sample(0.002));
    assert_eq!(feed.subscriber_count(), 2);
}

#[test]
fn cancel_stops_delivery_and_clears_value() {
    let feed = LevelFeed::new();
    let mut sub = feed.subscribe();
    feed.publish(sample(1.0 / 128.0));
    assert_eq!(sub.current_loudness(), 546);

    sub.cancel();
    assert!(!sub.is_active());
    assert_eq!(sub.latest(), LevelSample::default());
    assert_eq!(feed.subscriber_count(), 0);

    feed.publish(sample(0.5));
    assert_eq!(sub.current_loudness(), 0);
}

#[test]
fn dropped_subscriptions_are_pruned() {
    let feed = LevelFeed::new();
    let keep = feed.subscribe();
    {
        let _gone = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 2);
    }
    feed.publish(sample(0.3));
    assert_eq!(feed.subscriber_count(), 1);
    assert_eq!(keep.latest(), sample(0.3));
}

#[test]
fn publishing_from_another_thread() {
    let feed = LevelFeed::new();
    let sub = feed.subscribe();
    let producer = {
        let feed = feed.clone();
        thread::spawn(move || {
            for i in 1..=100 {
                feed.publish(sample(i as f32 / 10_000.0));
            }
        })
    };
    producer.join().unwrap();
    assert_eq!(sub.latest(), sample(0.01));
}

// ── sensors ─────────────────────────────────────────────────────────────────

#[test]
fn sensor_implementations() {
    let quiet = QuietSensors;
    assert!(quiet.normalized_bands().is_empty());
    assert_eq!(quiet.current_loudness(), 0);
    assert_eq!(quiet.major_peak_frequency(), 0.0);

    let fixed = StaticSensors {
        bands: vec![0, 128, 255],
        loudness: 5_000,
        peak_hz: 440.0,
    };
    assert_eq!(fixed.normalized_bands(), &[0, 128, 255]);
    assert_eq!(fixed.current_loudness(), MAX_LOUDNESS);
    assert_eq!(fixed.major_peak_frequency(), 440.0);

    let detached = LevelSubscription::detached();
    assert!(!detached.is_active());
    assert_eq!(detached.current_loudness(), 0);
}
