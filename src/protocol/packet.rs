//! Tactile sensor packet: parsed view and builder
//!
//! Wire layout (38 bytes, multi-byte fields big-endian):
//!
//! ```text
//! ┌──────┬──────┬─────┬────┬─────────┬───────┬──────────────────────┬─────┐
//! │ 0xFF │ 0xFF │ CHK │ ID │ TS (2)  │ FRAME │ 15 × u16 channels    │ RSV │
//! └──────┴──────┴─────┴────┴─────────┴───────┴──────────────────────┴─────┘
//!   0      1      2     3    4..6      6       7..37                  37
//! ```
//!
//! `CHK` is the 8-bit truncated sum of the channel block (bytes 7..=36).

use super::constants::*;

/// Compute the 8-bit additive checksum over the channel block
#[inline]
pub fn checksum(frame: &[u8]) -> u8 {
    frame[CHECKSUM_START..CHECKSUM_END]
        .iter()
        .fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// A checksum-valid packet as it came off the wire
///
/// Fixed-size and `Copy`; no heap allocation per packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    bytes: [u8; PACKET_SIZE],
}

impl Packet {
    /// Wrap raw bytes, returning `None` unless the marker and checksum match
    pub fn parse(bytes: [u8; PACKET_SIZE]) -> Option<Self> {
        if bytes[0] != SYNC_BYTE_1 || bytes[1] != SYNC_BYTE_2 {
            return None;
        }
        if checksum(&bytes) != bytes[OFFSET_CHECKSUM] {
            return None;
        }
        Some(Self { bytes })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; PACKET_SIZE] {
        &self.bytes
    }

    /// Embedded sensor id (unvalidated; dispatch checks the range)
    #[inline]
    pub fn sensor_id(&self) -> u8 {
        self.bytes[OFFSET_SENSOR_ID]
    }

    /// Raw 16-bit device timestamp
    #[inline]
    pub fn timestamp(&self) -> u16 {
        u16::from_be_bytes([
            self.bytes[OFFSET_TIMESTAMP],
            self.bytes[OFFSET_TIMESTAMP + 1],
        ])
    }

    #[inline]
    pub fn frame_id(&self) -> u8 {
        self.bytes[OFFSET_FRAME_ID]
    }

    /// Raw channel reading, `index` in 0..15
    #[inline]
    pub fn channel(&self, index: usize) -> u16 {
        let offset = OFFSET_CHANNELS + 2 * index;
        u16::from_be_bytes([self.bytes[offset], self.bytes[offset + 1]])
    }

    /// All 15 raw channel readings
    pub fn channels(&self) -> [u16; CHANNEL_COUNT] {
        std::array::from_fn(|i| self.channel(i))
    }
}

/// Builder for outgoing/synthetic packets
///
/// The sensor firmware is the only real producer; this exists for replay
/// tooling and tests.
///
/// ```
/// use tactile_io::protocol::PacketBuilder;
///
/// let bytes = PacketBuilder::new(1)
///     .timestamp(10)
///     .frame_id(3)
///     .pressure(0, 2600)
///     .build();
/// assert_eq!(bytes.len(), 38);
/// ```
#[derive(Debug, Clone)]
pub struct PacketBuilder {
    data: [u8; PACKET_SIZE],
}

impl PacketBuilder {
    /// Start a packet for `sensor_id` with all channels zero
    pub fn new(sensor_id: u8) -> Self {
        let mut data = [0u8; PACKET_SIZE];
        data[0] = SYNC_BYTE_1;
        data[1] = SYNC_BYTE_2;
        data[OFFSET_SENSOR_ID] = sensor_id;
        Self { data }
    }

    pub fn timestamp(mut self, ts: u16) -> Self {
        self.data[OFFSET_TIMESTAMP..OFFSET_TIMESTAMP + 2].copy_from_slice(&ts.to_be_bytes());
        self
    }

    pub fn frame_id(mut self, id: u8) -> Self {
        self.data[OFFSET_FRAME_ID] = id;
        self
    }

    /// Set raw channel `index` (0..15)
    pub fn channel(mut self, index: usize, raw: u16) -> Self {
        let offset = OFFSET_CHANNELS + 2 * index;
        self.data[offset..offset + 2].copy_from_slice(&raw.to_be_bytes());
        self
    }

    /// Set pressure channel `index` (0..12)
    pub fn pressure(self, index: usize, raw: u16) -> Self {
        self.channel(index, raw)
    }

    /// Set all 12 pressure channels
    pub fn pressures(mut self, raw: &[u16; PRESSURE_CHANNELS]) -> Self {
        for (i, &v) in raw.iter().enumerate() {
            self = self.channel(i, v);
        }
        self
    }

    /// Set acceleration axes as signed raw counts
    pub fn accel(self, x: i16, y: i16, z: i16) -> Self {
        self.channel(PRESSURE_CHANNELS, x as u16)
            .channel(PRESSURE_CHANNELS + 1, y as u16)
            .channel(PRESSURE_CHANNELS + 2, z as u16)
    }

    /// Finalize checksum and return wire bytes
    pub fn build(mut self) -> [u8; PACKET_SIZE] {
        self.data[OFFSET_CHECKSUM] = checksum(&self.data);
        self.data
    }
}
