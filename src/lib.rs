//! tactile-io - Frame decoder and signal pipeline for a four-sensor tactile array
//!
//! Bytes from the sensor link are split into 38-byte packets, routed by
//! sensor id and turned into calibrated, smoothed frames with a contact
//! estimate. Optional per-sensor threads watch acceleration variance for
//! slip. Results are published on bounded crossbeam channels.
//!
//! ```no_run
//! use tactile_io::{Config, SensorArray};
//!
//! let (array, events) = SensorArray::new(Config::default())?;
//! array.start_slip_detection(0)?;
//! array.feed(&[0xFF, 0xFF /* ... */]);
//! for event in events.frames.try_iter() {
//!     println!("sensor {} total {:.2}", event.sensor_id, event.frame.total_pressure);
//! }
//! # Ok::<(), tactile_io::Error>(())
//! ```

pub mod array;
pub mod config;
pub mod error;
pub mod events;
pub mod processing;
pub mod protocol;
pub mod reader;
pub mod slip;
pub mod transport;

// Re-export commonly used types
pub use array::{DispatchStats, EventReceivers, SensorArray};
pub use config::Config;
pub use error::{Error, Result};
pub use events::{FrameEvent, SlipEvent};
pub use processing::{ContactPoint, DecodedFrame};
pub use protocol::{DecoderStats, Packet, PacketBuilder};
pub use reader::spawn_reader;
