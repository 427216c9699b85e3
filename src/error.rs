//! Error handling for the light link controller.

/// A specialized `Result` type for light link operations.
pub type Result<T> = std::result::Result<T, LinkError>;

/// The main error type for light link operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Inbound payload could not be turned into a reading
    #[error("Failed to parse sensor payload: {0}")]
    Parse(String),

    /// Network operation failed
    #[error("Network error: {0}")]
    Network(String),

    /// GPIO operation failed (only available with gpio feature)
    #[cfg(feature = "gpio")]
    #[error("GPIO error: {0}")]
    Gpio(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic system error
    #[error("System error: {0}")]
    System(String),
}

impl LinkError {
    /// Create a new parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new network error
    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new GPIO error
    #[cfg(feature = "gpio")]
    pub fn gpio_error(msg: impl Into<String>) -> Self {
        Self::Gpio(msg.into())
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new generic system error
    pub fn system_error(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }
}

/// Why an inbound datagram did not yield a reading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadingError {
    /// Payload held no tokens at all
    #[error("payload is empty")]
    Empty,

    /// Payload was not valid UTF-8
    #[error("payload is not valid UTF-8")]
    NotUtf8,

    /// Last token is not a non-negative base-10 integer
    #[error("last token {0:?} is not a non-negative integer")]
    NotANumber(String),
}

impl From<ReadingError> for LinkError {
    fn from(err: ReadingError) -> Self {
        LinkError::parse_error(err.to_string())
    }
}
