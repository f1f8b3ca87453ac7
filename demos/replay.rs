//! Replay a captured tactile byte stream (or read a live port)
//!
//! Usage:
//! - `replay <capture.bin> [--config <path>]`
//! - `replay --serial /dev/ttyUSB0 [--baud 115200] [--config <path>]`
//!
//! Frames are logged at `debug`, slip events at `info`, and a per-sensor
//! summary is printed on exit. Slip detection runs on all four sensors.
//!
//! Run with: `cargo run --example replay -- capture.bin`

use crossbeam_channel::select;
use std::env;
use std::fs::File;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tactile_io::protocol::constants::SENSOR_COUNT;
use tactile_io::transport::IoTransport;
use tactile_io::{Config, Error, Result, SensorArray, spawn_reader};

/// A file replay ends once no frame has arrived for this long
const IDLE_TIMEOUT: Duration = Duration::from_millis(500);

struct Args {
    input: Option<String>,
    serial: Option<String>,
    baud: u32,
    config: Option<String>,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut parsed = Args {
        input: None,
        serial: None,
        baud: 115_200,
        config: None,
    };

    let mut i = 0;
    while i < args.len() {
        let value = args.get(i + 1).cloned();
        match args[i].as_str() {
            "--config" | "-c" => {
                parsed.config = value;
                i += 1;
            }
            "--serial" | "-s" => {
                parsed.serial = value;
                i += 1;
            }
            "--baud" | "-b" => {
                if let Some(baud) = value.and_then(|v| v.parse().ok()) {
                    parsed.baud = baud;
                }
                i += 1;
            }
            other if !other.starts_with('-') => parsed.input = Some(other.to_string()),
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }
    parsed
}

fn main() -> Result<()> {
    let args = parse_args();
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    let (array, events) = SensorArray::new(config)?;
    let array = Arc::new(array);
    for id in 0..SENSOR_COUNT as u8 {
        array.start_slip_detection(id)?;
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let s = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        s.store(true, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let live = args.serial.is_some();
    let reader = if let Some(path) = &args.serial {
        let port = serialport::new(path, args.baud)
            .timeout(Duration::from_millis(10))
            .open()
            .map_err(|e| Error::Other(format!("Failed to open {}: {}", path, e)))?;
        log::info!("Reading live from {} at {} baud", path, args.baud);
        spawn_reader(IoTransport::new(port), Arc::clone(&array), Arc::clone(&shutdown))?
    } else {
        let Some(path) = &args.input else {
            eprintln!("usage: replay <capture.bin> | --serial <port> [--config <path>]");
            return Err(Error::InvalidParameter("no input given".to_string()));
        };
        log::info!("Replaying {}", path);
        spawn_reader(
            IoTransport::new(File::open(path)?),
            Arc::clone(&array),
            Arc::clone(&shutdown),
        )?
    };

    let mut frames = [0u64; SENSOR_COUNT];
    let mut slips = [0u64; SENSOR_COUNT];
    let mut last_frame = Instant::now();

    while !shutdown.load(Ordering::Relaxed) && !reader.is_finished() {
        select! {
            recv(events.frames) -> msg => {
                let Ok(event) = msg else { break };
                last_frame = Instant::now();
                frames[event.sensor_id as usize] += 1;
                let f = &event.frame;
                log::debug!(
                    "sensor {} frame {:3} t={:5} total={:6.2} contact=({:.2}, {:.2}) |a|={:.3}",
                    event.sensor_id,
                    f.frame_id,
                    f.timestamp,
                    f.total_pressure,
                    f.contact.x,
                    f.contact.y,
                    f.accel_magnitude()
                );
            }
            recv(events.slips) -> msg => {
                let Ok(event) = msg else { break };
                slips[event.sensor_id as usize] += 1;
                log::info!("Slip on sensor {} (variance {:.3})", event.sensor_id, event.variance);
            }
            default(Duration::from_millis(50)) => {
                if !live && last_frame.elapsed() > IDLE_TIMEOUT {
                    break;
                }
            }
        }
    }

    shutdown.store(true, Ordering::Relaxed);
    let read_result = reader.join().map_err(|_| Error::ThreadPanic)?;
    array.shutdown()?;

    // Anything published between the last select and the join
    for event in events.frames.try_iter() {
        frames[event.sensor_id as usize] += 1;
    }
    for event in events.slips.try_iter() {
        slips[event.sensor_id as usize] += 1;
    }

    let decoder = array.decoder_stats();
    let dispatch = array.dispatch_stats();
    println!(
        "packets {}  checksum errors {}  skipped bytes {}",
        decoder.packets, decoder.checksum_errors, decoder.skipped_bytes
    );
    println!(
        "invalid ids {}  frames dropped {}  slips dropped {}",
        dispatch.invalid_sensor_ids, dispatch.frames_dropped, dispatch.slip_dropped
    );
    for id in 0..SENSOR_COUNT {
        let rate = array
            .frame_rate_hz(id as u8)?
            .map(|hz| format!("{:.1} Hz", hz))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "sensor {}: {} frames, {} slip events, {}",
            id, frames[id], slips[id], rate
        );
    }

    read_result
}
