//! Slip detection
//!
//! Each sensor gets its own polling thread while detection is enabled. A
//! poll takes the acceleration magnitude of the sensor's latest frame,
//! appends it to a short window and compares the window's population
//! variance with the threshold.
//!
//! # Signalling
//!
//! Level-triggered: a `SlipEvent` goes out on every poll whose variance is
//! above the threshold, not only on the rising edge. Consumers that want a
//! single notification per slip debounce on their side.
//!
//! # Cadence
//!
//! The thread sleeps a fixed interval between polls and checks its stop flag
//! before each one, so a stop request takes effect within one interval.

use crate::events::SlipEvent;
use crate::processing::SensorState;
use crossbeam_channel::{Sender, TrySendError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// Bounded window of acceleration magnitudes, oldest evicted first
#[derive(Debug, Clone)]
pub struct AccelWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl AccelWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, magnitude: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(magnitude);
    }

    /// Population variance of the samples currently held (0 when empty)
    pub fn variance(&self) -> f64 {
        let n = self.samples.len();
        if n == 0 {
            return 0.0;
        }
        let mean = self.samples.iter().sum::<f64>() / n as f64;
        self.samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Everything a detector thread needs, moved into it at spawn
pub(crate) struct SlipTaskContext {
    pub sensor_id: u8,
    pub sensor: Arc<Mutex<SensorState>>,
    pub stop: Arc<AtomicBool>,
    pub interval: Duration,
    pub threshold: f64,
    pub events: Sender<SlipEvent>,
    pub emitted: Arc<AtomicU64>,
    pub dropped: Arc<AtomicU64>,
}

/// Detector loop - polls the sensor until `stop` is set
pub(crate) fn slip_loop(ctx: SlipTaskContext) {
    log::debug!(
        "Slip detector started for sensor {} ({:?} interval, threshold {})",
        ctx.sensor_id,
        ctx.interval,
        ctx.threshold
    );

    while !ctx.stop.load(Ordering::Relaxed) {
        // Lock held only for one window update
        let variance = ctx.sensor.lock().poll_slip(ctx.threshold);

        if let Some(variance) = variance {
            let event = SlipEvent {
                sensor_id: ctx.sensor_id,
                variance,
            };
            match ctx.events.try_send(event) {
                Ok(()) => {
                    ctx.emitted.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Full(_)) => {
                    ctx.dropped.fetch_add(1, Ordering::Relaxed);
                }
                Err(TrySendError::Disconnected(_)) => {
                    log::debug!(
                        "Slip receiver gone, stopping detector for sensor {}",
                        ctx.sensor_id
                    );
                    break;
                }
            }
        }

        thread::sleep(ctx.interval);
    }

    log::debug!("Slip detector for sensor {} exiting", ctx.sensor_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_magnitude_has_zero_variance() {
        let mut window = AccelWindow::new(5);
        for _ in 0..5 {
            window.push(1.0);
        }
        assert_relative_eq!(window.variance(), 0.0);
    }

    #[test]
    fn test_population_variance() {
        let mut window = AccelWindow::new(5);
        for m in [0.0, 2.0, 0.0, 2.0] {
            window.push(m);
        }
        // mean 1, squared deviations all 1
        assert_relative_eq!(window.variance(), 1.0);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut window = AccelWindow::new(5);
        for m in [10.0, 1.0, 1.0, 1.0, 1.0] {
            window.push(m);
        }
        assert!(window.variance() > 0.2);

        window.push(1.0);
        assert_eq!(window.len(), 5);
        assert_relative_eq!(window.variance(), 0.0);
    }

    #[test]
    fn test_empty_window() {
        let window = AccelWindow::new(5);
        assert!(window.is_empty());
        assert_eq!(window.variance(), 0.0);
    }
}
