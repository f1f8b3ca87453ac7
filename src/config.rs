//! Configuration for tactile-io
//!
//! Every tunable of the decode pipeline lives here with its field default
//! matching the sensor firmware's fixed constants. Loaded from TOML; any
//! section or field left out falls back to its default.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub decoder: DecoderConfig,
    pub processing: ProcessingConfig,
    pub slip: SlipConfig,
    pub channels: ChannelConfig,
    pub logging: LoggingConfig,
}

/// Byte-stream framing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Ring buffer capacity in bytes (raised to two packets if smaller)
    pub buffer_capacity: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 1024,
        }
    }
}

/// Per-sensor calibration, filtering and history
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Frames kept per sensor in the recent-frame ring
    pub recent_frames_capacity: usize,
    /// Inter-frame deltas kept per sensor
    pub delta_history_capacity: usize,
    /// EMA smoothing constant k (new sample weight is 1/k)
    pub smoothing_factor: f64,
    /// Filtered values below this snap to zero
    pub snap_threshold: f64,
    /// Total pressure below this reports contact position (0, 0)
    pub noise_floor: f64,
    /// Calibrated raw count corresponding to `pressure_full_scale`
    pub pressure_full_scale_raw: f64,
    /// Physical pressure at `pressure_full_scale_raw`
    pub pressure_full_scale: f64,
    /// Raw acceleration counts per unit
    pub accel_divisor: f64,
    /// Duration of one device timestamp tick in microseconds
    pub timestamp_tick_us: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            recent_frames_capacity: 256,
            delta_history_capacity: 50,
            smoothing_factor: 5.0,
            snap_threshold: 0.1,
            noise_floor: 3.0,
            pressure_full_scale_raw: 2600.0,
            pressure_full_scale: 40.0,
            accel_divisor: 16383.0,
            timestamp_tick_us: 1000,
        }
    }
}

/// Slip detector cadence and thresholds
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SlipConfig {
    /// Poll interval in milliseconds
    pub interval_ms: u64,
    /// Acceleration magnitudes in the variance window
    pub window: usize,
    /// Variance above this signals slip
    pub threshold: f64,
}

impl Default for SlipConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5,
            window: 5,
            threshold: 0.2,
        }
    }
}

/// Notification channel capacities
///
/// Producers never block: when a channel is full the event is dropped and
/// counted in `DispatchStats`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub frame_capacity: usize,
    pub slip_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            frame_capacity: 512,
            slip_capacity: 256,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    ///
    /// # Example
    /// ```no_run
    /// use tactile_io::Config;
    ///
    /// let config = Config::from_file("tactile.toml")?;
    /// # Ok::<(), tactile_io::Error>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let p = &self.processing;
        if p.recent_frames_capacity == 0 {
            return Err(Error::Config(
                "processing.recent_frames_capacity must be > 0".to_string(),
            ));
        }
        if p.delta_history_capacity == 0 {
            return Err(Error::Config(
                "processing.delta_history_capacity must be > 0".to_string(),
            ));
        }
        if p.smoothing_factor.is_nan() || p.smoothing_factor < 1.0 {
            return Err(Error::Config(format!(
                "processing.smoothing_factor must be >= 1, got {}",
                p.smoothing_factor
            )));
        }
        if p.pressure_full_scale_raw <= 0.0 || p.accel_divisor <= 0.0 {
            return Err(Error::Config(
                "processing scale divisors must be positive".to_string(),
            ));
        }
        if p.timestamp_tick_us == 0 {
            return Err(Error::Config(
                "processing.timestamp_tick_us must be > 0".to_string(),
            ));
        }
        if self.slip.interval_ms == 0 {
            return Err(Error::Config("slip.interval_ms must be > 0".to_string()));
        }
        if self.slip.window == 0 {
            return Err(Error::Config("slip.window must be > 0".to_string()));
        }
        if self.channels.frame_capacity == 0 || self.channels.slip_capacity == 0 {
            return Err(Error::Config(
                "channel capacities must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.processing.smoothing_factor, 5.0);
        assert_eq!(config.processing.noise_floor, 3.0);
        assert_eq!(config.processing.delta_history_capacity, 50);
        assert_eq!(config.slip.interval_ms, 5);
        assert_eq!(config.slip.window, 5);
        assert_eq!(config.slip.threshold, 0.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_serialization() {
        let toml_string = toml::to_string_pretty(&Config::default()).unwrap();

        assert!(toml_string.contains("[decoder]"));
        assert!(toml_string.contains("[processing]"));
        assert!(toml_string.contains("[slip]"));
        assert!(toml_string.contains("[channels]"));
        assert!(toml_string.contains("[logging]"));
        assert!(toml_string.contains("accel_divisor = 16383.0"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_content = r#"
[slip]
threshold = 0.5

[processing]
recent_frames_capacity = 16

[logging]
level = "debug"
"#;

        let config = Config::from_toml(toml_content).unwrap();
        assert_eq!(config.slip.threshold, 0.5);
        assert_eq!(config.slip.interval_ms, 5);
        assert_eq!(config.processing.recent_frames_capacity, 16);
        assert_eq!(config.processing.smoothing_factor, 5.0);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let err = Config::from_toml("[processing]\nrecent_frames_capacity = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let mut config = Config::default();
        config.processing.smoothing_factor = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_toml("[slip\nthreshold = ").unwrap_err();
        assert!(matches!(err, Error::TomlDe(_)));
    }
}
