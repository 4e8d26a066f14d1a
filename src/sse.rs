//! Line-oriented SSE event parser.
//!
//! The transport subprocess writes a server-sent-event stream to stdout:
//! alternating `event: <type>` and `data: <json>` lines, blank-line
//! separated. [`SseParser`] reconstructs the logical event stream from
//! those raw lines and emits only the text fragments carried by
//! `content_block_delta` events.
//!
//! # State
//!
//! The parser's only state is the most recently seen event type. Per the
//! SSE framing rules it applies to every following `data:` line until the
//! next `event:` line, which is how multi-line data blocks are supported
//! even though this provider sends one data line per event. One parser
//! instance serves exactly one stream; concurrent invocations each get
//! their own.

use std::sync::Arc;

use serde::Deserialize;

use crate::observe::StreamObserver;

const EVENT_PREFIX: &str = "event: ";
const DATA_PREFIX: &str = "data: ";

const EVENT_CONTENT_BLOCK_DELTA: &str = "content_block_delta";
const EVENT_MESSAGE_START: &str = "message_start";
const EVENT_MESSAGE_DELTA: &str = "message_delta";
const EVENT_ERROR: &str = "error";

/// Envelope of a `content_block_delta` data payload.
///
/// Only the `delta.text` path matters here; everything else in the payload
/// (indexes, delta subtypes) is irrelevant to fragment extraction.
#[derive(Debug, Deserialize)]
struct DeltaEnvelope {
    #[serde(default)]
    delta: Option<Delta>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    text: Option<String>,
}

/// Stateful decoder for one SSE stream.
///
/// Feed it one line at a time with [`feed_line`](Self::feed_line); it
/// returns the decoded text fragments (zero or one per data line).
/// Malformed payloads and unknown event types never fail the stream.
pub struct SseParser {
    /// Event type from the most recent `event:` line.
    current_event: Option<String>,
    observer: Option<Arc<dyn StreamObserver>>,
}

impl SseParser {
    /// Create a parser with no observer attached.
    pub fn new() -> Self {
        Self {
            current_event: None,
            observer: None,
        }
    }

    /// Create a parser that forwards informational events to an observer.
    pub fn with_observer(observer: Arc<dyn StreamObserver>) -> Self {
        Self {
            current_event: None,
            observer: Some(observer),
        }
    }

    /// Get the event type currently in effect, if any.
    pub fn current_event(&self) -> Option<&str> {
        self.current_event.as_deref()
    }

    /// Feed one raw line from the transport and collect any text fragments.
    ///
    /// - Blank lines are event-block separators and produce nothing.
    /// - `event:` lines update the current event type.
    /// - `data:` lines are interpreted according to the current event type.
    /// - Anything else is ignored.
    pub fn feed_line(&mut self, line: &str) -> Vec<String> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return Vec::new();
        }

        if let Some(event) = line.strip_prefix(EVENT_PREFIX) {
            self.current_event = Some(event.to_string());
            return Vec::new();
        }

        if let Some(data) = line.strip_prefix(DATA_PREFIX) {
            return self.handle_data(data);
        }

        tracing::trace!(line = %line, "ignoring unrecognized line");
        Vec::new()
    }

    fn handle_data(&mut self, data: &str) -> Vec<String> {
        let Some(event) = self.current_event.as_deref() else {
            // Data with no preceding event line carries no meaning here.
            tracing::trace!("dropping data line with no current event type");
            return Vec::new();
        };

        match event {
            EVENT_CONTENT_BLOCK_DELTA => match serde_json::from_str::<DeltaEnvelope>(data) {
                Ok(envelope) => envelope
                    .delta
                    .and_then(|d| d.text)
                    .map(|text| vec![text])
                    .unwrap_or_default(),
                Err(err) => {
                    // Dropped, not propagated: one bad payload must not
                    // kill the stream.
                    tracing::debug!(error = %err, "malformed content_block_delta payload");
                    Vec::new()
                }
            },
            EVENT_MESSAGE_START | EVENT_MESSAGE_DELTA => {
                if let Some(ref observer) = self.observer {
                    observer.on_event(event, data);
                }
                tracing::debug!(event = %event, "informational event");
                Vec::new()
            }
            EVENT_ERROR => {
                if let Some(ref observer) = self.observer {
                    observer.on_stream_error(data);
                }
                tracing::warn!(payload = %data, "error event in stream");
                Vec::new()
            }
            other => {
                // message_stop, content_block_start/stop, ping and anything
                // the provider adds later: no fragment, no failure.
                tracing::trace!(event = %other, "skipping event type");
                Vec::new()
            }
        }
    }
}

impl Default for SseParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn feed_all(parser: &mut SseParser, lines: &[&str]) -> Vec<String> {
        lines
            .iter()
            .flat_map(|line| parser.feed_line(line))
            .collect()
    }

    #[test]
    fn parser_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<SseParser>();
    }

    #[test]
    fn delta_text_is_emitted_unmodified() {
        let mut parser = SseParser::new();
        let fragments = feed_all(
            &mut parser,
            &[
                "event: content_block_delta",
                r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello, \"world\"!\n"}}"#,
            ],
        );
        assert_eq!(fragments, vec!["Hello, \"world\"!\n".to_string()]);
    }

    #[test]
    fn blank_lines_are_noops() {
        let mut parser = SseParser::new();
        assert!(parser.feed_line("").is_empty());
        assert!(parser.feed_line("\r").is_empty());
        assert!(parser.current_event().is_none());
    }

    #[test]
    fn event_line_updates_state_and_emits_nothing() {
        let mut parser = SseParser::new();
        assert!(parser.feed_line("event: message_start").is_empty());
        assert_eq!(parser.current_event(), Some("message_start"));
    }

    #[test]
    fn data_without_event_is_dropped() {
        let mut parser = SseParser::new();
        let fragments = parser.feed_line(r#"data: {"delta":{"text":"orphan"}}"#);
        assert!(fragments.is_empty());
    }

    #[test]
    fn message_start_data_emits_no_fragment() {
        let mut parser = SseParser::new();
        let fragments = feed_all(
            &mut parser,
            &[
                "event: message_start",
                r#"data: {"type":"message_start","message":{"id":"msg_1"}}"#,
                "event: content_block_delta",
                r#"data: {"delta":{"text":"hi"}}"#,
            ],
        );
        assert_eq!(fragments, vec!["hi".to_string()]);
    }

    #[test]
    fn malformed_json_yields_nothing_and_does_not_panic() {
        let mut parser = SseParser::new();
        parser.feed_line("event: content_block_delta");
        assert!(parser.feed_line("data: {not json").is_empty());
        // Parser keeps working afterwards.
        let fragments = parser.feed_line(r#"data: {"delta":{"text":"ok"}}"#);
        assert_eq!(fragments, vec!["ok".to_string()]);
    }

    #[test]
    fn delta_without_text_field_yields_nothing() {
        let mut parser = SseParser::new();
        parser.feed_line("event: content_block_delta");
        let fragments =
            parser.feed_line(r#"data: {"delta":{"type":"input_json_delta","partial_json":"{"}}"#);
        assert!(fragments.is_empty());
    }

    #[test]
    fn event_type_persists_across_consecutive_data_lines() {
        let mut parser = SseParser::new();
        let fragments = feed_all(
            &mut parser,
            &[
                "event: content_block_delta",
                r#"data: {"delta":{"text":"one"}}"#,
                r#"data: {"delta":{"text":"two"}}"#,
            ],
        );
        assert_eq!(fragments, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn unknown_event_types_are_silent() {
        let mut parser = SseParser::new();
        let fragments = feed_all(
            &mut parser,
            &[
                "event: ping",
                r#"data: {"type":"ping"}"#,
                "event: message_stop",
                r#"data: {"type":"message_stop"}"#,
                "event: content_block_start",
                r#"data: {"type":"content_block_start","index":0}"#,
            ],
        );
        assert!(fragments.is_empty());
    }

    #[test]
    fn unrecognized_line_shapes_are_ignored() {
        let mut parser = SseParser::new();
        assert!(parser.feed_line(": keepalive comment").is_empty());
        assert!(parser.feed_line("retry: 3000").is_empty());
        assert!(parser.feed_line("garbage").is_empty());
    }

    #[test]
    fn full_message_sequence() {
        let mut parser = SseParser::new();
        let fragments = feed_all(
            &mut parser,
            &[
                "event: message_start",
                r#"data: {"type":"message_start","message":{"id":"msg_1","usage":{"input_tokens":10}}}"#,
                "",
                "event: content_block_start",
                r#"data: {"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}"#,
                "",
                "event: content_block_delta",
                r#"data: {"delta":{"type":"text_delta","text":"Hel"}}"#,
                "",
                "event: content_block_delta",
                r#"data: {"delta":{"type":"text_delta","text":"lo"}}"#,
                "",
                "event: content_block_delta",
                r#"data: {"delta":{"type":"text_delta","text":" world"}}"#,
                "",
                "event: content_block_stop",
                r#"data: {"type":"content_block_stop","index":0}"#,
                "",
                "event: message_delta",
                r#"data: {"type":"message_delta","usage":{"output_tokens":3}}"#,
                "",
                "event: message_stop",
                r#"data: {"type":"message_stop"}"#,
                "",
            ],
        );
        assert_eq!(fragments.concat(), "Hello world");
        assert_eq!(fragments.len(), 3);
    }

    struct RecordingObserver {
        events: Mutex<Vec<(String, String)>>,
        errors: AtomicUsize,
    }

    impl StreamObserver for RecordingObserver {
        fn on_event(&self, event: &str, raw: &str) {
            self.events
                .lock()
                .unwrap()
                .push((event.to_string(), raw.to_string()));
        }

        fn on_stream_error(&self, _raw: &str) {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn observer_receives_informational_events() {
        let observer = Arc::new(RecordingObserver {
            events: Mutex::new(Vec::new()),
            errors: AtomicUsize::new(0),
        });
        let mut parser = SseParser::with_observer(observer.clone());

        feed_all(
            &mut parser,
            &[
                "event: message_start",
                r#"data: {"type":"message_start"}"#,
                "event: message_delta",
                r#"data: {"type":"message_delta"}"#,
                "event: error",
                r#"data: {"type":"overloaded_error","message":"busy"}"#,
            ],
        );

        let events = observer.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, "message_start");
        assert_eq!(events[1].0, "message_delta");
        assert_eq!(observer.errors.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn error_event_does_not_emit_fragment() {
        let mut parser = SseParser::new();
        let fragments = feed_all(
            &mut parser,
            &["event: error", r#"data: {"type":"api_error","message":"boom"}"#],
        );
        assert!(fragments.is_empty());
    }

    #[test]
    fn crlf_lines_are_tolerated() {
        let mut parser = SseParser::new();
        parser.feed_line("event: content_block_delta\r");
        let fragments = parser.feed_line("data: {\"delta\":{\"text\":\"hi\"}}\r");
        assert_eq!(fragments, vec!["hi".to_string()]);
    }
}
