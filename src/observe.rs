//! Observer and debug-sink traits for stream diagnostics.

/// Observer for informational stream events.
///
/// The SSE parser calls these methods for events that carry no text
/// fragment: `message_start` and `message_delta` payloads, and provider
/// `error` events. This is for observation only; observers cannot alter
/// or fail the stream.
///
/// # Implementation Notes
///
/// - Implementations must be lightweight; blocking delays stream processing.
/// - Methods have default empty implementations for selective observation.
/// - Observers are called synchronously from the stream driver task, not
///   from the host execution context.
pub trait StreamObserver: Send + Sync {
    /// Called for informational events (`message_start`, `message_delta`).
    ///
    /// # Arguments
    ///
    /// * `event` - The SSE event type name
    /// * `raw` - The raw JSON payload of the `data:` line
    fn on_event(&self, event: &str, raw: &str) {
        let _ = (event, raw);
    }

    /// Called when the provider reports an `error` event in the stream.
    ///
    /// The stream itself continues; transport-level failures surface
    /// through the exit callback instead.
    fn on_stream_error(&self, raw: &str) {
        let _ = raw;
    }
}

/// Append-only sink for human-readable debug output.
///
/// Used only when the client is configured with `debug(true)`: the request
/// builder writes a dump of each outgoing request before the transport is
/// spawned. Writes must not alter the request that is sent.
pub trait DebugSink: Send + Sync {
    /// Append a block of text to the sink.
    fn write(&self, text: &str);
}

/// Stock observer that logs stream events using tracing.
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver;

impl LoggingObserver {
    /// Create a new logging observer.
    pub fn new() -> Self {
        Self
    }
}

impl StreamObserver for LoggingObserver {
    fn on_event(&self, event: &str, raw: &str) {
        tracing::debug!(event = %event, payload = %raw, "stream event");
    }

    fn on_stream_error(&self, raw: &str) {
        tracing::warn!(payload = %raw, "provider error event in stream");
    }
}

/// Stock debug sink that writes request dumps through tracing.
#[derive(Debug, Clone, Default)]
pub struct LoggingSink;

impl LoggingSink {
    /// Create a new logging sink.
    pub fn new() -> Self {
        Self
    }
}

impl DebugSink for LoggingSink {
    fn write(&self, text: &str) {
        tracing::debug!("{}", text);
    }
}
