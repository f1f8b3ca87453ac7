//! Per-sensor signal processing
//!
//! Turns validated packets into `DecodedFrame`s:
//! - `Baseline`: first-observation zero reference per pressure channel
//! - `PressureFilter`: scaled EMA with snap-to-zero
//! - `TimestampTracker`: 16-bit stamp normalization across wraps
//! - `estimate_contact`: pressure-weighted centroid over the element layout
//! - `SensorState`: all of the above for one sensor

mod calibration;
mod frame;
mod layout;
mod state;
mod timing;

pub use calibration::{Baseline, PressureFilter};
pub use frame::DecodedFrame;
pub use layout::{ContactPoint, ELEMENT_POSITIONS, estimate_contact};
pub use state::SensorState;
pub use timing::{TickSample, TimestampTracker, wrap_corrected_delta};
