//! Transport layer for I/O abstraction
//!
//! The array itself never opens a device; a `Transport` is handed to the
//! reader thread by the caller.

use crate::error::Result;
use std::io::{ErrorKind, Read};

mod mock;
pub use mock::MockTransport;

/// Byte source the reader thread pulls from
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read
    ///
    /// `Ok(0)` means "nothing right now", not end of stream.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;
}

/// Adapter for any blocking `std::io::Read` (serial port, TCP stream, file)
pub struct IoTransport<R> {
    inner: R,
}

impl<R: Read + Send> IoTransport<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Send> Transport for IoTransport<R> {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        match self.inner.read(buffer) {
            Ok(n) => Ok(n),
            // Read timeouts on ports and sockets are not failures
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) =>
            {
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }
}
