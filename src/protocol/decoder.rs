//! Frame decoder: byte stream in, checksum-valid packets out
//!
//! Scans forward for the `0xFF 0xFF` marker and validates the 38-byte
//! candidate behind it. Bytes that cannot start a valid packet are dropped
//! from the ring as soon as they are scanned, so no byte is examined twice
//! across calls and the cost per byte stays constant.
//!
//! # Accept/reject rules
//!
//! - Marker with fewer than 38 bytes behind it: wait for more data
//! - Checksum mismatch: the marker was a false positive, step one byte
//! - Checksum match: consume through the end of the packet and keep scanning
//!   from the byte that follows it (overlapping candidates are never tried)

use super::constants::{OFFSET_CHECKSUM, PACKET_SIZE, SYNC_BYTE_1, SYNC_BYTE_2};
use super::packet::{Packet, checksum};
use super::ring_buffer::RingBuffer;

/// Counters exposed for link-quality diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Valid packets emitted
    pub packets: u64,
    /// Markers whose checksum did not match
    pub checksum_errors: u64,
    /// Bytes discarded while hunting for a marker
    pub skipped_bytes: u64,
}

/// Incremental decoder for a single byte stream
///
/// Not `Sync` by itself; callers sharing one stream across threads wrap it
/// in a mutex so decode passes are serialized.
pub struct FrameDecoder {
    buffer: RingBuffer,
    stats: DecoderStats,
}

impl FrameDecoder {
    /// Create a decoder with a ring of `capacity` bytes
    ///
    /// Capacity below two packets is raised so a full frame always fits
    /// behind a pending partial one.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: RingBuffer::with_capacity(capacity.max(2 * PACKET_SIZE)),
            stats: DecoderStats::default(),
        }
    }

    /// Append `bytes` and return every packet completed by them
    ///
    /// Chunk size does not affect the result: feeding a stream one byte at
    /// a time yields the same packets as feeding it in one call.
    pub fn feed(&mut self, mut bytes: &[u8]) -> Vec<Packet> {
        let mut packets = Vec::new();
        // After each parse pass fewer than PACKET_SIZE bytes remain, so every
        // iteration stores at least one new byte.
        while !bytes.is_empty() {
            let stored = self.buffer.extend(bytes);
            bytes = &bytes[stored..];
            self.parse_into(&mut packets);
        }
        packets
    }

    /// Bytes currently buffered (partial frame or trailing marker byte)
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Drop buffered bytes (stats are kept)
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    fn parse_into(&mut self, out: &mut Vec<Packet>) {
        loop {
            if self.buffer.len() < PACKET_SIZE {
                return;
            }

            let Some(sync_idx) = self.buffer.find_pattern_2(SYNC_BYTE_1, SYNC_BYTE_2) else {
                // Keep the last byte: it may be the first half of a marker
                let skip = self.buffer.len() - 1;
                self.skip(skip);
                return;
            };

            if sync_idx > 0 {
                self.skip(sync_idx);
            }

            // Partial frame behind the marker
            if self.buffer.len() < PACKET_SIZE {
                return;
            }

            let mut frame = [0u8; PACKET_SIZE];
            if !self.buffer.copy_to(0, &mut frame) {
                return;
            }

            match Packet::parse(frame) {
                Some(packet) => {
                    self.buffer.advance(PACKET_SIZE);
                    self.stats.packets += 1;
                    out.push(packet);
                }
                None => {
                    log::trace!(
                        "Checksum mismatch: received=0x{:02X}, calculated=0x{:02X}",
                        frame[OFFSET_CHECKSUM],
                        checksum(&frame)
                    );
                    self.stats.checksum_errors += 1;
                    // Don't trust anything behind a false marker; step one byte
                    self.skip(1);
                }
            }
        }
    }

    #[inline]
    fn skip(&mut self, n: usize) {
        self.buffer.advance(n);
        self.stats.skipped_bytes += n as u64;
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(super::ring_buffer::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PacketBuilder;
    use crate::protocol::constants::{CHANNEL_COUNT, CHECKSUM_END, CHECKSUM_START};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sample(sensor: u8, frame: u8) -> [u8; PACKET_SIZE] {
        PacketBuilder::new(sensor)
            .timestamp(100 + frame as u16)
            .frame_id(frame)
            .pressure(0, 2600 + frame as u16)
            .pressure(11, 0x1234)
            .accel(100, -200, 16383)
            .build()
    }

    fn stream() -> Vec<u8> {
        let mut bytes = vec![0x00, 0x13, 0xFF];
        bytes.extend_from_slice(&sample(0, 1));
        bytes.extend_from_slice(&[0xFF, 0xFF, 0x42]); // false marker
        bytes.extend_from_slice(&sample(1, 2));
        bytes.extend_from_slice(&sample(2, 3));
        let mut corrupt = sample(3, 4);
        corrupt[20] ^= 0x5A;
        bytes.extend_from_slice(&corrupt);
        bytes.extend_from_slice(&sample(3, 5));
        bytes.extend_from_slice(&sample(0, 6)[..20]); // trailing partial
        bytes
    }

    fn frame_ids(packets: &[Packet]) -> Vec<u8> {
        packets.iter().map(|p| p.frame_id()).collect()
    }

    #[test]
    fn test_single_packet() {
        let mut decoder = FrameDecoder::default();
        let packets = decoder.feed(&sample(2, 7));
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].sensor_id(), 2);
        assert_eq!(packets[0].frame_id(), 7);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_short_buffer_left_untouched() {
        let mut decoder = FrameDecoder::default();
        let bytes = sample(0, 1);
        assert!(decoder.feed(&bytes[..PACKET_SIZE - 1]).is_empty());
        assert_eq!(decoder.pending(), PACKET_SIZE - 1);
        assert_eq!(decoder.stats().skipped_bytes, 0);

        let packets = decoder.feed(&bytes[PACKET_SIZE - 1..]);
        assert_eq!(frame_ids(&packets), vec![1]);
    }

    #[test]
    fn test_mixed_stream() {
        let mut decoder = FrameDecoder::default();
        let packets = decoder.feed(&stream());
        assert_eq!(frame_ids(&packets), vec![1, 2, 3, 5]);

        let stats = decoder.stats();
        assert_eq!(stats.packets, 4);
        // Stray 0xFF before the first packet, the false marker, the corrupt packet
        assert_eq!(stats.checksum_errors, 3);
        assert_eq!(stats.skipped_bytes, 44);
        assert_eq!(decoder.pending(), 20);
    }

    #[test]
    fn test_chunk_size_independence() {
        let bytes = stream();
        let mut whole = FrameDecoder::default();
        let expected = whole.feed(&bytes);

        for chunk in [1, 2, 3, 7, 37, 38, 39, 100] {
            let mut decoder = FrameDecoder::default();
            let mut got = Vec::new();
            for piece in bytes.chunks(chunk) {
                got.extend(decoder.feed(piece));
            }
            assert_eq!(got, expected, "chunk size {}", chunk);
        }
    }

    #[test]
    fn test_chunk_larger_than_ring() {
        let mut bytes = Vec::new();
        for i in 0..100u8 {
            bytes.extend_from_slice(&sample(i % 4, i));
        }
        let mut decoder = FrameDecoder::new(2 * PACKET_SIZE);
        let packets = decoder.feed(&bytes);
        assert_eq!(packets.len(), 100);
        assert_eq!(frame_ids(&packets), (0..100).collect::<Vec<u8>>());
    }

    #[test]
    fn test_trailing_marker_byte_waits() {
        let mut decoder = FrameDecoder::default();
        let mut bytes = vec![0x01; PACKET_SIZE];
        bytes.push(0xFF);
        assert!(decoder.feed(&bytes).is_empty());
        assert_eq!(decoder.pending(), 1);

        // The kept 0xFF completes a marker with the next byte
        let packet = sample(1, 9);
        let packets = decoder.feed(&packet[1..]);
        assert_eq!(frame_ids(&packets), vec![9]);
    }

    /// Restart-from-zero decoder over a plain `Vec`
    ///
    /// Rescans the whole buffer from index 0 after every accepted packet and
    /// keeps rejected bytes around.
    fn reference_decode(buf: &mut Vec<u8>, out: &mut Vec<[u8; PACKET_SIZE]>) {
        loop {
            let mut accepted = None;
            let mut i = 0;
            while i + 1 < buf.len() {
                if buf[i] == SYNC_BYTE_1 && buf[i + 1] == SYNC_BYTE_2 {
                    if i + PACKET_SIZE > buf.len() {
                        break;
                    }
                    let mut frame = [0u8; PACKET_SIZE];
                    frame.copy_from_slice(&buf[i..i + PACKET_SIZE]);
                    if checksum(&frame) == frame[OFFSET_CHECKSUM] {
                        accepted = Some((i, frame));
                        break;
                    }
                }
                i += 1;
            }
            let Some((start, frame)) = accepted else {
                return;
            };
            out.push(frame);
            buf.drain(..start + PACKET_SIZE);
        }
    }

    fn random_packet(rng: &mut StdRng) -> [u8; PACKET_SIZE] {
        let mut builder = PacketBuilder::new(rng.random_range(0..4))
            .timestamp(rng.random())
            .frame_id(rng.random());
        for ch in 0..CHANNEL_COUNT {
            builder = builder.channel(ch, rng.random());
        }
        builder.build()
    }

    /// Valid, corrupt and truncated packets mixed with noise and 0xFF runs
    fn random_stream(rng: &mut StdRng) -> Vec<u8> {
        let mut bytes = Vec::new();
        for _ in 0..rng.random_range(1..30) {
            match rng.random_range(0..6) {
                0 | 1 => bytes.extend_from_slice(&random_packet(rng)),
                2 => {
                    let mut packet = random_packet(rng);
                    let at = rng.random_range(CHECKSUM_START..CHECKSUM_END);
                    packet[at] ^= rng.random_range(1..=255u8);
                    bytes.extend_from_slice(&packet);
                }
                3 => {
                    let packet = random_packet(rng);
                    let keep = rng.random_range(1..PACKET_SIZE);
                    bytes.extend_from_slice(&packet[..keep]);
                }
                4 => {
                    let run = rng.random_range(1..8);
                    bytes.extend(std::iter::repeat_n(0xFF, run));
                }
                _ => {
                    for _ in 0..rng.random_range(1..24) {
                        bytes.push(rng.random());
                    }
                }
            }
        }
        bytes
    }

    #[test]
    fn test_matches_restart_from_zero_decoder() {
        let mut rng = StdRng::seed_from_u64(0x7AC7_11E5);

        for round in 0..1500 {
            let bytes = random_stream(&mut rng);
            let capacity = if round % 2 == 0 { 2 * PACKET_SIZE } else { 1024 };
            let mut decoder = FrameDecoder::new(capacity);
            let mut reference_buf = Vec::new();
            let mut expected = Vec::new();
            let mut got = Vec::new();

            let mut rest = &bytes[..];
            while !rest.is_empty() {
                let n = rng.random_range(1..=200usize).min(rest.len());
                let (chunk, tail) = rest.split_at(n);
                rest = tail;

                got.extend(decoder.feed(chunk).iter().map(|p| *p.as_bytes()));
                reference_buf.extend_from_slice(chunk);
                reference_decode(&mut reference_buf, &mut expected);
            }

            assert_eq!(got, expected, "round {}", round);
            assert_eq!(decoder.stats().packets, expected.len() as u64);
        }
    }

    #[test]
    fn test_back_to_back_packets() {
        let first = sample(0, 1);
        let second = sample(1, 2);
        let mut bytes = first.to_vec();
        bytes.extend_from_slice(&second);

        let mut decoder = FrameDecoder::default();
        let packets = decoder.feed(&bytes);
        assert_eq!(frame_ids(&packets), vec![1, 2]);
        assert_eq!(decoder.stats().checksum_errors, 0);
    }
}
