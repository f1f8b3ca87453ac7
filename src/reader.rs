//! Reader thread: pulls bytes from a transport into the array
//!
//! Runs until the shutdown flag is set or the transport fails. Empty reads
//! (timeouts, would-block) back off briefly; any other error ends the thread
//! and comes back to the caller through the join handle. The reader never
//! reopens or retries the transport.

use crate::array::SensorArray;
use crate::error::{Error, Result};
use crate::transport::Transport;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Read chunk size
const READ_BUFFER_SIZE: usize = 512;

/// Backoff after a read that returned nothing
const IDLE_SLEEP: Duration = Duration::from_millis(2);

/// Spawn the `tactile-reader` thread
pub fn spawn_reader<T>(
    transport: T,
    array: Arc<SensorArray>,
    shutdown: Arc<AtomicBool>,
) -> Result<JoinHandle<Result<()>>>
where
    T: Transport + 'static,
{
    thread::Builder::new()
        .name("tactile-reader".to_string())
        .spawn(move || reader_loop(transport, &array, &shutdown))
        .map_err(|e| Error::Other(format!("Failed to spawn reader thread: {}", e)))
}

fn reader_loop<T: Transport>(
    mut transport: T,
    array: &SensorArray,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    let mut total_bytes = 0u64;

    log::info!("Reader started");

    while !shutdown.load(Ordering::Relaxed) {
        match transport.read(&mut buffer) {
            Ok(0) => thread::sleep(IDLE_SLEEP),
            Ok(n) => {
                total_bytes += n as u64;
                let frames = array.feed(&buffer[..n]);
                log::trace!("Read {} bytes, {} frame(s)", n, frames);
            }
            Err(e) => {
                log::error!("Transport read failed after {} bytes: {}", total_bytes, e);
                return Err(e);
            }
        }
    }

    log::info!("Reader stopped ({} bytes read)", total_bytes);
    Ok(())
}
