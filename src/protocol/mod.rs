//! Tactile sensor wire protocol
//!
//! This module provides:
//! - `FrameDecoder`: ring-buffer based stream parser with O(1) advance
//! - `Packet`: validated 38-byte frame with field accessors
//! - `PacketBuilder`: constructs wire frames for replay and tests

pub mod constants;
mod decoder;
mod packet;
mod ring_buffer;

pub use decoder::{DecoderStats, FrameDecoder};
pub use packet::{Packet, PacketBuilder, checksum};
pub use ring_buffer::{DEFAULT_CAPACITY as DEFAULT_BUFFER_CAPACITY, RingBuffer};
