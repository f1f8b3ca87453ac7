//! Device timestamp normalization and wraparound correction
//!
//! The sensor stamps each packet with a 16-bit rolling tick counter. The
//! first packet seen fixes the zero point; later stamps are taken relative
//! to it and a drop below the previous stamp is read as one counter wrap.

use crate::protocol::constants::TIMESTAMP_PERIOD;
use std::collections::VecDeque;

/// Delta between two normalized stamps, correcting a single counter wrap
///
/// When `now` is below `last` the previous stamp is moved back one period
/// before subtracting, so the result is never negative.
#[inline]
pub fn wrap_corrected_delta(last: i64, now: i64) -> i64 {
    let last = if now < last {
        last - TIMESTAMP_PERIOD
    } else {
        last
    };
    now - last
}

/// Per-sensor clock state
#[derive(Debug, Clone)]
pub struct TimestampTracker {
    time_offset: Option<u16>,
    last_timestamp: i64,
    elapsed: u64,
    deltas: VecDeque<i64>,
    capacity: usize,
}

/// Result of feeding one raw stamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSample {
    /// Stamp relative to the first packet (16-bit, wraps)
    pub normalized: u16,
    /// Ticks since the previous packet, wrap-corrected
    pub delta: i64,
    /// Total ticks since the first packet; never decreases
    pub elapsed: u64,
}

impl TimestampTracker {
    pub fn new(delta_capacity: usize) -> Self {
        Self {
            time_offset: None,
            last_timestamp: 0,
            elapsed: 0,
            deltas: VecDeque::with_capacity(delta_capacity),
            capacity: delta_capacity.max(1),
        }
    }

    /// Normalize `raw`, record the inter-frame delta and advance the clock
    pub fn observe(&mut self, raw: u16) -> TickSample {
        let offset = *self.time_offset.get_or_insert(raw);
        let normalized = raw.wrapping_sub(offset);
        let now = normalized as i64;

        let delta = wrap_corrected_delta(self.last_timestamp, now);
        if self.deltas.len() == self.capacity {
            self.deltas.pop_front();
        }
        self.deltas.push_back(delta);

        self.last_timestamp = now;
        self.elapsed += delta as u64;

        TickSample {
            normalized,
            delta,
            elapsed: self.elapsed,
        }
    }

    /// Raw stamp of the first packet, once one has arrived
    pub fn time_offset(&self) -> Option<u16> {
        self.time_offset
    }

    pub fn last_timestamp(&self) -> i64 {
        self.last_timestamp
    }

    /// Recent inter-frame deltas, oldest first
    pub fn deltas(&self) -> impl Iterator<Item = i64> + '_ {
        self.deltas.iter().copied()
    }

    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Mean inter-frame delta in ticks, `None` until a non-zero mean exists
    pub fn mean_delta(&self) -> Option<f64> {
        if self.deltas.is_empty() {
            return None;
        }
        let sum: i64 = self.deltas.iter().sum();
        let mean = sum as f64 / self.deltas.len() as f64;
        (mean > 0.0).then_some(mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_corrected_delta() {
        assert_eq!(wrap_corrected_delta(65530, 4), 10);
        assert_eq!(wrap_corrected_delta(10, 25), 15);
        assert_eq!(wrap_corrected_delta(7, 7), 0);
    }

    #[test]
    fn test_first_packet_sets_offset() {
        let mut clock = TimestampTracker::new(50);
        let first = clock.observe(10);
        assert_eq!(clock.time_offset(), Some(10));
        assert_eq!(first.normalized, 0);
        assert_eq!(first.delta, 0);

        let second = clock.observe(30);
        assert_eq!(second.normalized, 20);
        assert_eq!(second.delta, 20);
        assert_eq!(second.elapsed, 20);
    }

    #[test]
    fn test_elapsed_monotonic_across_wraps() {
        let mut clock = TimestampTracker::new(50);
        let mut raw: u16 = 40000;
        let mut previous = 0;
        for _ in 0..20_000 {
            let sample = clock.observe(raw);
            assert!(sample.elapsed >= previous);
            assert!(sample.delta >= 0);
            previous = sample.elapsed;
            raw = raw.wrapping_add(7);
        }
        // 19_999 steps of 7 ticks, spanning two counter wraps
        assert_eq!(previous, 19_999 * 7);
    }

    #[test]
    fn test_wrap_of_normalized_stamp() {
        let mut clock = TimestampTracker::new(50);
        clock.observe(0);
        clock.observe(65530);
        let sample = clock.observe(4);
        assert_eq!(sample.delta, 10);
        assert_eq!(sample.normalized, 4);
    }

    #[test]
    fn test_delta_history_bounded() {
        let mut clock = TimestampTracker::new(50);
        for i in 0..200u16 {
            clock.observe(i * 2);
        }
        assert_eq!(clock.delta_count(), 50);
        assert!(clock.deltas().all(|d| d == 2));
        assert_eq!(clock.mean_delta(), Some(2.0));
    }

    #[test]
    fn test_mean_delta_none_for_single_packet() {
        let mut clock = TimestampTracker::new(50);
        assert_eq!(clock.mean_delta(), None);
        clock.observe(500);
        assert_eq!(clock.mean_delta(), None);
    }
}
