/// Errors that can occur when using chatpipe.
///
/// Errors are organized by category:
/// - Configuration errors: detected at `build()` or request-build time
/// - Spawn errors: failed to start the transport process
/// - IO errors: communication failures with the subprocess
/// - Runtime errors: failures during streaming
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // -------------------------------------------------------------------------
    // Configuration errors
    // -------------------------------------------------------------------------
    /// The API key environment variable named by the config is unset or empty.
    ///
    /// Raised before any transport process is spawned.
    #[error("API key environment variable {var} is not set or empty")]
    MissingCredential { var: String },

    /// Invalid configuration provided to the builder.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -------------------------------------------------------------------------
    // Spawn errors
    // -------------------------------------------------------------------------
    /// Transport binary not found in PATH.
    #[error("transport program not found: {program}")]
    TransportNotFound { program: String },

    /// Failed to spawn the transport subprocess.
    #[error("failed to spawn transport process: {0}")]
    ProcessSpawn(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // IO errors
    // -------------------------------------------------------------------------
    /// IO error communicating with the transport subprocess.
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // Runtime errors
    // -------------------------------------------------------------------------
    /// The transport wrote to stderr; fatal for the current invocation.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The run was cancelled by the host.
    #[error("request cancelled")]
    Cancelled,
}

/// A specialized Result type for chatpipe operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an IO error.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io(source)
    }

    /// Check if this error is a configuration problem the host must fix,
    /// as opposed to a failure of one particular invocation.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::MissingCredential { .. } | Error::InvalidConfig(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
