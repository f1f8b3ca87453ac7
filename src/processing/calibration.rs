//! Baseline capture and pressure smoothing

use crate::config::ProcessingConfig;
use crate::protocol::constants::PRESSURE_CHANNELS;

/// Per-channel zero reference
///
/// Each channel captures its first raw reading after construction or
/// `reset`. A captured value of zero is a real baseline, not "unset".
#[derive(Debug, Clone, Default)]
pub struct Baseline {
    offsets: [Option<u16>; PRESSURE_CHANNELS],
}

impl Baseline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `raw` if the channel has no baseline yet, then subtract
    #[inline]
    pub fn calibrate(&mut self, channel: usize, raw: u16) -> i32 {
        let base = *self.offsets[channel].get_or_insert(raw);
        raw as i32 - base as i32
    }

    /// Re-arm capture on every channel
    pub fn reset(&mut self) {
        self.offsets = [None; PRESSURE_CHANNELS];
    }

    pub fn get(&self, channel: usize) -> Option<u16> {
        self.offsets[channel]
    }

    pub fn is_captured(&self) -> bool {
        self.offsets.iter().all(Option::is_some)
    }
}

/// Exponential moving average over the 12 pressure channels
///
/// `filtered = scaled / k + filtered * (1 - 1/k)`; results below the snap
/// threshold become 0 and the rest are rounded to 2 decimals. The rounded
/// value is what the next update decays from.
#[derive(Debug, Clone)]
pub struct PressureFilter {
    values: [f64; PRESSURE_CHANNELS],
    k: f64,
    snap_threshold: f64,
    raw_per_full_scale: f64,
    full_scale: f64,
}

impl PressureFilter {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            values: [0.0; PRESSURE_CHANNELS],
            k: config.smoothing_factor,
            snap_threshold: config.snap_threshold,
            raw_per_full_scale: config.pressure_full_scale_raw,
            full_scale: config.pressure_full_scale,
        }
    }

    /// Calibrated counts to physical units
    #[inline]
    pub fn scale(&self, calibrated: i32) -> f64 {
        calibrated as f64 / self.raw_per_full_scale * self.full_scale
    }

    /// Fold one calibrated reading into channel `channel`, returning the new value
    pub fn update(&mut self, channel: usize, calibrated: i32) -> f64 {
        let scaled = self.scale(calibrated);
        let blended = scaled / self.k + self.values[channel] * (1.0 - 1.0 / self.k);
        let value = if blended < self.snap_threshold {
            0.0
        } else {
            round2(blended)
        };
        self.values[channel] = value;
        value
    }

    pub fn values(&self) -> &[f64; PRESSURE_CHANNELS] {
        &self.values
    }
}

#[inline]
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
