//! Fixed-capacity byte ring for the frame decoder
//!
//! Consuming bytes is O(1): the read position advances instead of the
//! remaining bytes being shifted down as `Vec::drain()` would.

/// Default capacity in bytes
pub const DEFAULT_CAPACITY: usize = 1024;

/// Fixed-capacity ring buffer with O(1) advance
///
/// Capacity is chosen at construction and never grows.
pub struct RingBuffer {
    data: Box<[u8]>,
    head: usize, // Write position (next empty slot)
    tail: usize, // Read position (first valid byte)
    len: usize,  // Number of bytes available
}

impl RingBuffer {
    /// Create a new empty ring buffer with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new empty ring buffer holding at most `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity.max(1)].into_boxed_slice(),
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Append bytes to the buffer, returning how many were stored
    ///
    /// Stops at capacity; callers drain the buffer and push the rest.
    #[inline]
    pub fn extend(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.free());
        for &b in &bytes[..n] {
            self.data[self.head] = b;
            self.head = (self.head + 1) % self.capacity();
        }
        self.len += n;
        n
    }

    /// Consume n bytes from the front
    #[inline]
    pub fn advance(&mut self, n: usize) {
        let n = n.min(self.len);
        self.tail = (self.tail + n) % self.capacity();
        self.len -= n;
    }

    /// Number of bytes available to read
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total capacity in bytes
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Free space left before `extend` starts refusing bytes
    #[inline]
    pub fn free(&self) -> usize {
        self.capacity() - self.len
    }

    /// Read byte at logical index (handles wraparound)
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        if index < self.len {
            Some(self.data[(self.tail + index) % self.capacity()])
        } else {
            None
        }
    }

    /// Find 2-byte sync pattern, returns offset from tail
    ///
    /// Only positions with a following byte are considered, so a lone
    /// `b1` at the very end is never matched.
    pub fn find_pattern_2(&self, b1: u8, b2: u8) -> Option<usize> {
        if self.len < 2 {
            return None;
        }
        let cap = self.capacity();
        (0..self.len - 1).find(|&i| {
            self.data[(self.tail + i) % cap] == b1 && self.data[(self.tail + i + 1) % cap] == b2
        })
    }

    /// Copy `out.len()` bytes starting at logical `start` into `out`
    ///
    /// Returns false (leaving `out` untouched) if not enough bytes are buffered.
    pub fn copy_to(&self, start: usize, out: &mut [u8]) -> bool {
        if start + out.len() > self.len {
            return false;
        }
        let real_start = (self.tail + start) % self.capacity();
        if real_start + out.len() <= self.capacity() {
            out.copy_from_slice(&self.data[real_start..real_start + out.len()]);
        } else {
            let first = self.capacity() - real_start;
            out[..first].copy_from_slice(&self.data[real_start..]);
            let rest = out.len() - first;
            out[first..].copy_from_slice(&self.data[..rest]);
        }
        true
    }

    /// Drop everything buffered
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut rb = RingBuffer::with_capacity(16);
        assert!(rb.is_empty());

        assert_eq!(rb.extend(&[1, 2, 3, 4, 5]), 5);
        assert_eq!(rb.len(), 5);
        assert_eq!(rb.free(), 11);
        assert_eq!(rb.get(0), Some(1));
        assert_eq!(rb.get(4), Some(5));
        assert_eq!(rb.get(5), None);
    }

    #[test]
    fn test_extend_stops_at_capacity() {
        let mut rb = RingBuffer::with_capacity(4);
        assert_eq!(rb.extend(&[1, 2, 3, 4, 5, 6]), 4);
        assert_eq!(rb.len(), 4);
        assert_eq!(rb.extend(&[7]), 0);
        assert_eq!(rb.get(3), Some(4));
    }

    #[test]
    fn test_wraparound() {
        let mut rb = RingBuffer::with_capacity(8);

        rb.extend(&[1, 2, 3, 4, 5]);
        rb.advance(3);
        assert_eq!(rb.len(), 2);
        assert_eq!(rb.get(0), Some(4));

        // Head wraps past the end of storage
        rb.extend(&[6, 7, 8, 9]);
        assert_eq!(rb.len(), 6);
        assert_eq!(rb.get(0), Some(4));
        assert_eq!(rb.get(2), Some(6));
        assert_eq!(rb.get(5), Some(9));
    }

    #[test]
    fn test_find_pattern_2() {
        let mut rb = RingBuffer::with_capacity(32);
        rb.extend(&[0x00, 0x12, 0xFF, 0xFF, 0x03, 0x06]);

        assert_eq!(rb.find_pattern_2(0xFF, 0xFF), Some(2));
        assert_eq!(rb.find_pattern_2(0x00, 0x12), Some(0));
        assert_eq!(rb.find_pattern_2(0xAA, 0xBB), None);
    }

    #[test]
    fn test_find_pattern_ignores_trailing_half_marker() {
        let mut rb = RingBuffer::with_capacity(8);
        rb.extend(&[0x01, 0x02, 0xFF]);
        assert_eq!(rb.find_pattern_2(0xFF, 0xFF), None);

        rb.extend(&[0xFF]);
        assert_eq!(rb.find_pattern_2(0xFF, 0xFF), Some(2));
    }

    #[test]
    fn test_copy_to_wrapped() {
        let mut rb = RingBuffer::with_capacity(8);

        rb.extend(&[1, 2, 3, 4, 5, 6]);
        rb.advance(5); // tail=5, len=1
        rb.extend(&[7, 8, 9]); // head wraps to 1

        let mut out = [0u8; 4];
        assert!(rb.copy_to(0, &mut out));
        assert_eq!(out, [6, 7, 8, 9]);

        let mut too_long = [0u8; 5];
        assert!(!rb.copy_to(0, &mut too_long));
    }
}
