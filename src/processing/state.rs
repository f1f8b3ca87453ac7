//! Per-sensor processing state
//!
//! One `SensorState` exists per sensor id and lives for the whole session.
//! Packet processing and slip polling both go through it, always under the
//! sensor's mutex, so a frame is never observed half-built.

use super::calibration::{Baseline, PressureFilter};
use super::frame::DecodedFrame;
use super::layout::estimate_contact;
use super::timing::TimestampTracker;
use crate::config::{ProcessingConfig, SlipConfig};
use crate::protocol::Packet;
use crate::protocol::constants::{ACCEL_CHANNELS, PRESSURE_CHANNELS};
use crate::slip::AccelWindow;
use std::collections::VecDeque;

/// Calibration, filter, clock and history for one sensor
#[derive(Debug, Clone)]
pub struct SensorState {
    sensor_id: u8,
    baseline: Baseline,
    filter: PressureFilter,
    clock: TimestampTracker,
    accel_history: AccelWindow,
    recent_frames: VecDeque<DecodedFrame>,
    recent_capacity: usize,
    noise_floor: f64,
    accel_divisor: f64,
    tick_us: u64,
}

impl SensorState {
    pub fn new(sensor_id: u8, processing: &ProcessingConfig, slip: &SlipConfig) -> Self {
        let recent_capacity = processing.recent_frames_capacity.max(1);
        Self {
            sensor_id,
            baseline: Baseline::new(),
            filter: PressureFilter::new(processing),
            clock: TimestampTracker::new(processing.delta_history_capacity),
            accel_history: AccelWindow::new(slip.window),
            recent_frames: VecDeque::with_capacity(recent_capacity),
            recent_capacity,
            noise_floor: processing.noise_floor,
            accel_divisor: processing.accel_divisor,
            tick_us: processing.timestamp_tick_us,
        }
    }

    pub fn sensor_id(&self) -> u8 {
        self.sensor_id
    }

    /// Turn one packet into a frame and fold it into the state
    ///
    /// The caller has already matched `packet.sensor_id()` to this sensor.
    pub fn process(&mut self, packet: &Packet) -> DecodedFrame {
        let tick = self.clock.observe(packet.timestamp());

        let mut calibrated = [0i32; PRESSURE_CHANNELS];
        let mut pressure = [0.0f64; PRESSURE_CHANNELS];
        for ch in 0..PRESSURE_CHANNELS {
            calibrated[ch] = self.baseline.calibrate(ch, packet.channel(ch));
            pressure[ch] = self.filter.update(ch, calibrated[ch]);
        }

        // Acceleration is signed and never baseline-corrected
        let accel: [f64; ACCEL_CHANNELS] = std::array::from_fn(|axis| {
            packet.channel(PRESSURE_CHANNELS + axis) as i16 as f64 / self.accel_divisor
        });

        let (contact, total_pressure) = estimate_contact(&pressure, self.noise_floor);

        let frame = DecodedFrame {
            sensor_id: self.sensor_id,
            frame_id: packet.frame_id(),
            timestamp: tick.normalized,
            elapsed: tick.elapsed,
            calibrated,
            pressure,
            accel,
            contact,
            total_pressure,
        };

        if self.recent_frames.len() == self.recent_capacity {
            self.recent_frames.pop_front();
        }
        self.recent_frames.push_back(frame.clone());

        frame
    }

    /// Re-arm baseline capture on all pressure channels
    pub fn reset_baseline(&mut self) {
        self.baseline.reset();
    }

    /// One slip poll against the latest frame
    ///
    /// Returns the window variance when it exceeds `threshold`. Does nothing
    /// until the first frame has been produced.
    pub fn poll_slip(&mut self, threshold: f64) -> Option<f64> {
        let magnitude = self.recent_frames.back()?.accel_magnitude();
        self.accel_history.push(magnitude);
        let variance = self.accel_history.variance();
        (variance > threshold).then_some(variance)
    }

    pub fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    pub fn filtered(&self) -> &[f64; PRESSURE_CHANNELS] {
        self.filter.values()
    }

    pub fn clock(&self) -> &TimestampTracker {
        &self.clock
    }

    pub fn latest_frame(&self) -> Option<&DecodedFrame> {
        self.recent_frames.back()
    }

    /// Recent frames, oldest first
    pub fn recent_frames(&self) -> impl Iterator<Item = &DecodedFrame> + '_ {
        self.recent_frames.iter()
    }

    pub fn recent_len(&self) -> usize {
        self.recent_frames.len()
    }

    pub fn accel_history(&self) -> &AccelWindow {
        &self.accel_history
    }

    /// Packet rate derived from the recent inter-frame deltas
    pub fn frame_rate_hz(&self) -> Option<f64> {
        let mean_ticks = self.clock.mean_delta()?;
        Some(1_000_000.0 / (mean_ticks * self.tick_us as f64))
    }
}
