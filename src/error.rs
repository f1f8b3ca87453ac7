//! Error types for tactile-io

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// tactile-io error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (transport read failure)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Packet carries a sensor id outside the configured array
    #[error("Invalid sensor id: {0}")]
    InvalidSensorId(u8),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Slip detection already running for this sensor
    #[error("Slip detection already running for sensor {0}")]
    AlreadyRunning(u8),

    /// Worker thread panicked
    #[error("Thread panicked")]
    ThreadPanic,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
