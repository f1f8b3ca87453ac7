//! Sensor array: the public entry point
//!
//! Owns the stream decoder, the four per-sensor states and the slip
//! detector threads, and publishes results on bounded crossbeam channels.
//!
//! # Thread Model
//!
//! ```text
//!   feed(bytes) ──▶ [decoder mutex] ──▶ Packet ──▶ [sensor N mutex] ──▶ FrameEvent ─▶ frames
//!                                                        ▲
//!   slip-N thread ── every interval ── poll_slip ────────┘ ─────────▶ SlipEvent ──▶ slips
//! ```
//!
//! The decoder lock is held through dispatch, so frames of one stream are
//! processed and published in wire order even with several feeders. A
//! sensor lock is held only for one packet or one slip poll.
//!
//! Publishing never blocks: when a channel is full the event is dropped and
//! counted in `DispatchStats`.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::{FrameEvent, SlipEvent};
use crate::processing::{DecodedFrame, SensorState};
use crate::protocol::constants::SENSOR_COUNT;
use crate::protocol::{DecoderStats, FrameDecoder, Packet};
use crate::slip::{SlipTaskContext, slip_loop};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Receiving ends of the array's notification channels
pub struct EventReceivers {
    pub frames: Receiver<FrameEvent>,
    pub slips: Receiver<SlipEvent>,
}

/// Snapshot of the dispatch counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Frames produced by the sensor processors
    pub frames: u64,
    /// Valid packets rejected for an out-of-range sensor id
    pub invalid_sensor_ids: u64,
    /// Frame events lost to a full channel
    pub frames_dropped: u64,
    /// Slip events published
    pub slip_events: u64,
    /// Slip events lost to a full channel
    pub slip_dropped: u64,
}

#[derive(Default)]
struct Counters {
    frames: AtomicU64,
    invalid_sensor_ids: AtomicU64,
    frames_dropped: AtomicU64,
    slip_events: Arc<AtomicU64>,
    slip_dropped: Arc<AtomicU64>,
}

/// Running detector thread for one sensor
struct SlipHandle {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Four-sensor tactile array fed from one byte stream
pub struct SensorArray {
    config: Config,
    decoder: Mutex<FrameDecoder>,
    sensors: [Arc<Mutex<SensorState>>; SENSOR_COUNT],
    detectors: Mutex<[Option<SlipHandle>; SENSOR_COUNT]>,
    frame_tx: Sender<FrameEvent>,
    slip_tx: Sender<SlipEvent>,
    counters: Counters,
}

impl SensorArray {
    /// Build the array from a validated configuration
    ///
    /// Returns the array together with the receivers for its notifications.
    pub fn new(config: Config) -> Result<(Self, EventReceivers)> {
        config.validate()?;

        let (frame_tx, frame_rx) = bounded(config.channels.frame_capacity);
        let (slip_tx, slip_rx) = bounded(config.channels.slip_capacity);

        let sensors = std::array::from_fn(|id| {
            Arc::new(Mutex::new(SensorState::new(
                id as u8,
                &config.processing,
                &config.slip,
            )))
        });

        log::info!(
            "Sensor array ready ({} sensors, {} byte decode buffer)",
            SENSOR_COUNT,
            config.decoder.buffer_capacity
        );

        let array = Self {
            decoder: Mutex::new(FrameDecoder::new(config.decoder.buffer_capacity)),
            sensors,
            detectors: Mutex::new(std::array::from_fn(|_| None)),
            frame_tx,
            slip_tx,
            counters: Counters::default(),
            config,
        };

        Ok((
            array,
            EventReceivers {
                frames: frame_rx,
                slips: slip_rx,
            },
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decode `bytes` and dispatch every completed packet
    ///
    /// Returns the number of frames produced. Packets carrying an unknown
    /// sensor id are logged and counted, never fatal.
    pub fn feed(&self, bytes: &[u8]) -> usize {
        let mut decoder = self.decoder.lock();
        let packets = decoder.feed(bytes);

        let mut produced = 0;
        for packet in &packets {
            match self.dispatch(packet) {
                Ok(_) => produced += 1,
                Err(e) => {
                    self.counters
                        .invalid_sensor_ids
                        .fetch_add(1, Ordering::Relaxed);
                    log::warn!("Dropping packet (frame {}): {}", packet.frame_id(), e);
                }
            }
        }
        produced
    }

    /// Route one validated packet to its sensor and publish the frame
    ///
    /// An out-of-range sensor id is rejected before any state is touched.
    pub fn dispatch(&self, packet: &Packet) -> Result<DecodedFrame> {
        let id = packet.sensor_id();
        let sensor = self.sensor(id)?;

        let frame = sensor.lock().process(packet);
        self.counters.frames.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "Sensor {} frame {}: t={} total={:.2}",
            id,
            frame.frame_id,
            frame.timestamp,
            frame.total_pressure
        );

        let event = FrameEvent {
            sensor_id: id,
            frame: frame.clone(),
        };
        match self.frame_tx.try_send(event) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => {
                self.counters.frames_dropped.fetch_add(1, Ordering::Relaxed);
            }
        }

        Ok(frame)
    }

    /// Clear the baselines of one sensor; the next packet recaptures them
    pub fn reset_baseline(&self, sensor_id: u8) -> Result<()> {
        self.sensor(sensor_id)?.lock().reset_baseline();
        log::info!("Baseline reset for sensor {}", sensor_id);
        Ok(())
    }

    pub fn reset_baseline_all(&self) {
        for sensor in &self.sensors {
            sensor.lock().reset_baseline();
        }
        log::info!("Baseline reset for all sensors");
    }

    /// Start the slip detector thread for one sensor
    pub fn start_slip_detection(&self, sensor_id: u8) -> Result<()> {
        let sensor = Arc::clone(self.sensor(sensor_id)?);
        let mut detectors = self.detectors.lock();
        let slot = &mut detectors[sensor_id as usize];

        if slot.as_ref().is_some_and(|d| !d.handle.is_finished()) {
            return Err(Error::AlreadyRunning(sensor_id));
        }
        // A detector that exited on its own (receiver dropped) is reaped here
        if let Some(old) = slot.take() {
            old.handle.join().map_err(|_| Error::ThreadPanic)?;
        }

        let stop = Arc::new(AtomicBool::new(false));
        let ctx = SlipTaskContext {
            sensor_id,
            sensor,
            stop: Arc::clone(&stop),
            interval: Duration::from_millis(self.config.slip.interval_ms),
            threshold: self.config.slip.threshold,
            events: self.slip_tx.clone(),
            emitted: Arc::clone(&self.counters.slip_events),
            dropped: Arc::clone(&self.counters.slip_dropped),
        };

        let handle = thread::Builder::new()
            .name(format!("slip-{}", sensor_id))
            .spawn(move || slip_loop(ctx))
            .map_err(|e| Error::Other(format!("Failed to spawn slip thread: {}", e)))?;

        *slot = Some(SlipHandle { stop, handle });
        log::info!("Slip detection started for sensor {}", sensor_id);
        Ok(())
    }

    /// Stop the slip detector for one sensor and wait for its thread
    ///
    /// Stopping a sensor with no running detector is a no-op.
    pub fn stop_slip_detection(&self, sensor_id: u8) -> Result<()> {
        self.sensor(sensor_id)?;
        let detector = self.detectors.lock()[sensor_id as usize].take();

        if let Some(detector) = detector {
            detector.stop.store(true, Ordering::Relaxed);
            detector.handle.join().map_err(|_| Error::ThreadPanic)?;
            log::info!("Slip detection stopped for sensor {}", sensor_id);
        }
        Ok(())
    }

    pub fn is_slip_detection_running(&self, sensor_id: u8) -> bool {
        self.detectors
            .lock()
            .get(sensor_id as usize)
            .and_then(Option::as_ref)
            .is_some_and(|d| !d.handle.is_finished())
    }

    /// Most recent frame of one sensor
    pub fn latest_frame(&self, sensor_id: u8) -> Result<Option<DecodedFrame>> {
        Ok(self.sensor(sensor_id)?.lock().latest_frame().cloned())
    }

    /// Recent frames of one sensor, oldest first
    pub fn recent_frames(&self, sensor_id: u8) -> Result<Vec<DecodedFrame>> {
        Ok(self
            .sensor(sensor_id)?
            .lock()
            .recent_frames()
            .cloned()
            .collect())
    }

    /// Packet rate of one sensor; `None` until two distinct stamps arrived
    pub fn frame_rate_hz(&self, sensor_id: u8) -> Result<Option<f64>> {
        Ok(self.sensor(sensor_id)?.lock().frame_rate_hz())
    }

    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.lock().stats()
    }

    pub fn dispatch_stats(&self) -> DispatchStats {
        let c = &self.counters;
        DispatchStats {
            frames: c.frames.load(Ordering::Relaxed),
            invalid_sensor_ids: c.invalid_sensor_ids.load(Ordering::Relaxed),
            frames_dropped: c.frames_dropped.load(Ordering::Relaxed),
            slip_events: c.slip_events.load(Ordering::Relaxed),
            slip_dropped: c.slip_dropped.load(Ordering::Relaxed),
        }
    }

    /// Stop every slip detector
    ///
    /// All threads are signalled before any is joined.
    pub fn shutdown(&self) -> Result<()> {
        let detectors: Vec<SlipHandle> = self
            .detectors
            .lock()
            .iter_mut()
            .filter_map(Option::take)
            .collect();
        if detectors.is_empty() {
            return Ok(());
        }

        log::info!("Stopping {} slip detector(s)", detectors.len());
        for d in &detectors {
            d.stop.store(true, Ordering::Relaxed);
        }

        let mut result = Ok(());
        for d in detectors {
            if d.handle.join().is_err() {
                result = Err(Error::ThreadPanic);
            }
        }
        result
    }

    fn sensor(&self, sensor_id: u8) -> Result<&Arc<Mutex<SensorState>>> {
        self.sensors
            .get(sensor_id as usize)
            .ok_or(Error::InvalidSensorId(sensor_id))
    }
}

impl Drop for SensorArray {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("Error during sensor array shutdown: {}", e);
        }
    }
}
