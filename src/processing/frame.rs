//! Decoded frame produced for every accepted packet

use super::layout::ContactPoint;
use crate::protocol::constants::{ACCEL_CHANNELS, PRESSURE_CHANNELS};
use serde::Serialize;

/// Calibrated, filtered reading of one sensor at one instant
///
/// Immutable once built; consumers receive their own copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedFrame {
    pub sensor_id: u8,
    pub frame_id: u8,
    /// Device stamp relative to the sensor's first packet (16-bit, wraps)
    pub timestamp: u16,
    /// Ticks since the sensor's first packet, corrected across wraps
    pub elapsed: u64,
    /// Raw minus baseline, per pressure channel
    pub calibrated: [i32; PRESSURE_CHANNELS],
    /// Smoothed pressure per channel (physical units, ≥ 0)
    pub pressure: [f64; PRESSURE_CHANNELS],
    /// Acceleration per axis in units of the sensor's full range
    pub accel: [f64; ACCEL_CHANNELS],
    pub contact: ContactPoint,
    pub total_pressure: f64,
}

impl DecodedFrame {
    /// Euclidean norm of the acceleration vector
    #[inline]
    pub fn accel_magnitude(&self) -> f64 {
        let [x, y, z] = self.accel;
        (x * x + y * y + z * z).sqrt()
    }
}
