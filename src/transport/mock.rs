//! Mock transport for testing

use super::Transport;
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

/// Scripted byte source; clones share the same queue
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Default)]
struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    /// Largest read handed out per call (0 = unlimited)
    max_chunk: usize,
    /// Raised once the queued bytes are drained
    failure: Option<io::ErrorKind>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        self.inner.lock().read_buffer.extend(data);
    }

    /// Limit how many bytes a single read returns
    pub fn set_max_chunk(&self, max_chunk: usize) {
        self.inner.lock().max_chunk = max_chunk;
    }

    /// Fail with `kind` after the queued bytes have been read
    pub fn fail_with(&self, kind: io::ErrorKind) {
        self.inner.lock().failure = Some(kind);
    }

    pub fn is_drained(&self) -> bool {
        self.inner.lock().read_buffer.is_empty()
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock();
        if inner.read_buffer.is_empty() {
            if let Some(kind) = inner.failure {
                return Err(io::Error::new(kind, "mock transport failure").into());
            }
            return Ok(0);
        }

        let mut limit = inner.read_buffer.len().min(buffer.len());
        if inner.max_chunk > 0 {
            limit = limit.min(inner.max_chunk);
        }
        for (slot, byte) in buffer.iter_mut().zip(inner.read_buffer.drain(..limit)) {
            *slot = byte;
        }
        Ok(limit)
    }
}
