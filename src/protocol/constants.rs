//! Wire constants for the tactile sensor frame

// Sync bytes
pub const SYNC_BYTE_1: u8 = 0xFF;
pub const SYNC_BYTE_2: u8 = 0xFF;

// Packet layout
pub const PACKET_SIZE: usize = 38;
pub const OFFSET_CHECKSUM: usize = 2;
pub const OFFSET_SENSOR_ID: usize = 3;
pub const OFFSET_TIMESTAMP: usize = 4; // u16 big-endian
pub const OFFSET_FRAME_ID: usize = 6;
pub const OFFSET_CHANNELS: usize = 7; // 15 × u16 big-endian
pub const OFFSET_TRAILER: usize = 37; // Reserved, not covered by checksum

// Checksum covers the channel block (bytes 7..=36)
pub const CHECKSUM_START: usize = OFFSET_CHANNELS;
pub const CHECKSUM_END: usize = OFFSET_TRAILER; // exclusive

// Channel counts
pub const PRESSURE_CHANNELS: usize = 12;
pub const ACCEL_CHANNELS: usize = 3;
pub const CHANNEL_COUNT: usize = PRESSURE_CHANNELS + ACCEL_CHANNELS;

// Sensor array
pub const SENSOR_COUNT: usize = 4;

// Timestamp counter period (16-bit rolling)
pub const TIMESTAMP_PERIOD: i64 = 65536;
