use anyhow::{anyhow, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use ringbuf::HeapRb;
use std::io::{self, Write};
use std::sync::atomic::{fence, AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Loudness is reported on a 0..=1024 scale.
pub const MAX_LOUDNESS: u16 = 1024;

/// RMS-to-loudness gain; typical program material peaks around 0.015 RMS.
const LOUDNESS_GAIN: f32 = 70_000.0;

/// One raw level reading from the sample pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LevelSample {
    pub rms: f32,
    pub peak: f32,
}

impl LevelSample {
    pub fn loudness(&self) -> u16 {
        let v = self.rms * LOUDNESS_GAIN;
        if v.is_nan() {
            return 0;
        }
        v.clamp(0.0, MAX_LOUDNESS as f32) as u16
    }
}

/// Single-slot most-recent-value cell. Writers never wait for readers; readers
/// retry only while a store is in flight.
pub struct LatestLevel {
    seq: AtomicU64,
    rms: AtomicU32,
    peak: AtomicU32,
    stores: AtomicU64,
}

impl Default for LatestLevel {
    fn default() -> Self {
        Self::new()
    }
}

impl LatestLevel {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            rms: AtomicU32::new(0),
            peak: AtomicU32::new(0),
            stores: AtomicU64::new(0),
        }
    }

    pub fn store(&self, s: LevelSample) {
        self.seq.fetch_add(1, Ordering::Relaxed); // odd => write in progress
        fence(Ordering::Release);
        self.rms.store(s.rms.to_bits(), Ordering::Relaxed);
        self.peak.store(s.peak.to_bits(), Ordering::Relaxed);
        self.stores.fetch_add(1, Ordering::Relaxed);
        self.seq.fetch_add(1, Ordering::Release); // even => stable
    }

    pub fn load(&self) -> LevelSample {
        loop {
            let v1 = self.seq.load(Ordering::Acquire);
            if v1 & 1 == 1 {
                std::hint::spin_loop();
                continue;
            }
            let rms = f32::from_bits(self.rms.load(Ordering::Relaxed));
            let peak = f32::from_bits(self.peak.load(Ordering::Relaxed));
            fence(Ordering::Acquire);
            let v2 = self.seq.load(Ordering::Relaxed);
            if v1 == v2 {
                return LevelSample { rms, peak };
            }
        }
    }

    pub fn stores(&self) -> u64 {
        self.stores.load(Ordering::Relaxed)
    }
}

/// Push-based fan-out of level samples to any number of subscriptions.
///
/// Cloning shares the same subscriber list. Publishing never blocks on a
/// subscriber; each one only keeps the latest value.
#[derive(Clone, Default)]
pub struct LevelFeed {
    subscribers: Arc<Mutex<Vec<Weak<LatestLevel>>>>,
}

impl LevelFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> LevelSubscription {
        let cell = Arc::new(LatestLevel::new());
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(Arc::downgrade(&cell));
        }
        LevelSubscription { cell: Some(cell) }
    }

    pub fn publish(&self, sample: LevelSample) {
        let Ok(mut subs) = self.subscribers.lock() else {
            return;
        };
        subs.retain(|w| match w.upgrade() {
            Some(cell) => {
                cell.store(sample);
                true
            }
            None => false,
        });
    }

    /// Live subscriptions. Cancelled ones are pruned on the next publish or here.
    pub fn subscriber_count(&self) -> usize {
        let Ok(mut subs) = self.subscribers.lock() else {
            return 0;
        };
        subs.retain(|w| w.strong_count() > 0);
        subs.len()
    }
}

/// Receiving end owned by one effect instance.
pub struct LevelSubscription {
    cell: Option<Arc<LatestLevel>>,
}

impl LevelSubscription {
    /// A subscription that never receives anything.
    pub fn detached() -> Self {
        Self { cell: None }
    }

    /// Most recent sample, or the quiet default before the first one (or after cancel).
    pub fn latest(&self) -> LevelSample {
        self.cell.as_ref().map_or_else(LevelSample::default, |c| c.load())
    }

    pub fn is_active(&self) -> bool {
        self.cell.is_some()
    }

    /// Drops the cell so the feed stops delivering to it.
    pub fn cancel(&mut self) {
        if self.cell.take().is_some() {
            debug!("level subscription cancelled");
        }
    }
}

impl Drop for LevelSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Read-only audio sensors, sampled at most once per frame.
pub trait AudioSensors {
    /// Per-band energy, each 0..=255. May be empty when no analyzer is attached.
    fn normalized_bands(&self) -> &[u8];
    /// 0..=1024.
    fn current_loudness(&self) -> u16;
    fn major_peak_frequency(&self) -> f32;
}

/// Sensors that always read silence.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuietSensors;

impl AudioSensors for QuietSensors {
    fn normalized_bands(&self) -> &[u8] {
        &[]
    }

    fn current_loudness(&self) -> u16 {
        0
    }

    fn major_peak_frequency(&self) -> f32 {
        0.0
    }
}

/// Fixed readings, for hosts that run their own analysis and for tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticSensors {
    pub bands: Vec<u8>,
    pub loudness: u16,
    pub peak_hz: f32,
}

impl AudioSensors for StaticSensors {
    fn normalized_bands(&self) -> &[u8] {
        &self.bands
    }

    fn current_loudness(&self) -> u16 {
        self.loudness.min(MAX_LOUDNESS)
    }

    fn major_peak_frequency(&self) -> f32 {
        self.peak_hz
    }
}

impl AudioSensors for LevelSubscription {
    fn normalized_bands(&self) -> &[u8] {
        &[]
    }

    fn current_loudness(&self) -> u16 {
        self.latest().loudness()
    }

    fn major_peak_frequency(&self) -> f32 {
        0.0
    }
}

pub fn list_input_devices() -> anyhow::Result<()> {
    let host = cpal::default_host();
    let devices = host.input_devices().context("enumerate input devices")?;

    let mut out = io::stdout();
    writeln!(out, "Input devices:")?;
    for dev in devices {
        let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
        writeln!(out, "  - {}", name)?;
    }
    Ok(())
}

/// Microphone capture publishing windowed RMS levels into a [`LevelFeed`].
pub struct MicLevelSource {
    _stream: cpal::Stream,
    stop: Arc<AtomicBool>,
    analyzer_handle: Option<thread::JoinHandle<()>>,
    pub sample_rate_hz: u32,
}

impl MicLevelSource {
    pub fn start(feed: LevelFeed, device_query: Option<&str>) -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = select_input_device(&host, device_query)?;
        let supported = device
            .default_input_config()
            .context("get default input config")?;
        let sample_rate_hz = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let config: cpal::StreamConfig = supported.clone().into();

        let rb_capacity = (sample_rate_hz as usize).saturating_mul(2);
        let rb = HeapRb::<f32>::new(rb_capacity.max(1024));
        let (mut prod, mut cons) = rb.split();

        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = Arc::clone(&stop);

        let err_fn = |err| warn!("audio stream error: {err}");

        let stream = match supported.sample_format() {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            fmt => return Err(anyhow!("unsupported sample format: {fmt:?}")),
        };

        stream.play().context("start input stream")?;
        debug!(sample_rate_hz, channels, "microphone level source started");

        // ~20 ms windows keep the level responsive at frame rate.
        let window = (sample_rate_hz as usize / 50).max(64);
        let analyzer_handle =
            thread::spawn(move || level_loop(&mut cons, window, &stop_for_thread, &feed));

        Ok(Self {
            _stream: stream,
            stop,
            analyzer_handle: Some(analyzer_handle),
            sample_rate_hz,
        })
    }
}

impl Drop for MicLevelSource {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.analyzer_handle.take() {
            let _ = h.join();
        }
    }
}

fn select_input_device(
    host: &cpal::Host,
    device_query: Option<&str>,
) -> anyhow::Result<cpal::Device> {
    if let Some(want) = device_query.map(|s| s.to_lowercase()) {
        let devices = host
            .input_devices()
            .context("enumerate input devices")?
            .collect::<Vec<_>>();
        return devices
            .into_iter()
            .find(|d| {
                d.name()
                    .map(|n| n.to_lowercase().contains(&want))
                    .unwrap_or(false)
            })
            .ok_or_else(|| anyhow!("no input device matching: {want}"));
    }

    host.default_input_device()
        .ok_or_else(|| anyhow!("no default input device found"))
}

fn push_interleaved<T: Sample<Float = f32> + Copy>(
    data: &[T],
    channels: usize,
    prod: &mut ringbuf::HeapProd<f32>,
) {
    let channels = channels.max(1);
    for frame in data.chunks(channels) {
        let mut acc = 0.0f32;
        for s in frame {
            acc += (*s).to_float_sample();
        }
        let mono = acc / channels as f32;
        // A full ring just drops samples; the analyzer only cares about recent audio.
        let _ = prod.try_push(mono);
    }
}

fn level_loop(
    cons: &mut ringbuf::HeapCons<f32>,
    window: usize,
    stop: &AtomicBool,
    feed: &LevelFeed,
) {
    let mut sum_sq = 0.0f32;
    let mut peak = 0.0f32;
    let mut n = 0usize;

    while !stop.load(Ordering::Relaxed) {
        let mut got_any = false;
        while let Some(s) = cons.try_pop() {
            got_any = true;
            sum_sq += s * s;
            peak = peak.max(s.abs());
            n += 1;
            if n >= window {
                let rms = (sum_sq / n as f32).sqrt();
                feed.publish(LevelSample { rms, peak });
                sum_sq = 0.0;
                peak = 0.0;
                n = 0;
            }
        }
        if !got_any {
            thread::sleep(Duration::from_millis(2));
        }
    }
}
