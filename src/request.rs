//! Request construction for the streaming chat endpoint.
//!
//! [`build_request`] turns a rendered [`Prompt`] and a
//! [`ClientConfig`](crate::config::ClientConfig) into the JSON payload and
//! the argument list for the transport subprocess. It is the only place
//! credentials are read, and it runs before any process is spawned.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::observe::DebugSink;
use crate::{Error, Result};

/// Provider API version header value, fixed per protocol revision.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message authored by the end user.
    User,
    /// Message authored by the model.
    Assistant,
}

/// One message in the conversation sent with the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who authored the message.
    pub role: Role,
    /// Plain text content.
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Rendered prompt text ready to be sent.
///
/// Template rendering happens outside the core (see
/// [`template`](crate::template)); by the time a `Prompt` exists it is
/// plain strings.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    /// System prompt text.
    pub system: String,
    /// Conversation messages, oldest first.
    pub messages: Vec<Message>,
}

impl Prompt {
    /// Create a prompt with a system prompt and a single user message.
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            messages: vec![Message::user(user)],
        }
    }
}

/// The JSON body sent to the chat completions endpoint.
///
/// Constructed fresh per invocation and discarded when the transport
/// process exits. `stream` is always true.
#[derive(Debug, Clone, Serialize)]
pub struct RequestPayload {
    pub model: String,
    pub system: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub stream: bool,
}

/// How to invoke the transport subprocess.
///
/// Derived deterministically from the payload plus credentials; the target
/// URL is always the final argument.
#[derive(Debug, Clone)]
pub struct TransportInvocation {
    /// Program to execute (a curl-compatible HTTP client).
    pub program: String,
    /// Full argument list.
    pub args: Vec<String>,
}

/// Build the request payload and transport invocation for one call.
///
/// Reads the API key from the environment variable named by the config and
/// fails with [`Error::MissingCredential`] if it is absent or empty. In
/// debug mode a human-readable dump of the request is written to
/// `debug_sink` before returning; the dump never alters what is sent.
pub fn build_request(
    prompt: &Prompt,
    config: &ClientConfig,
    debug_sink: Option<&dyn DebugSink>,
) -> Result<(RequestPayload, TransportInvocation)> {
    let api_key = read_api_key(config.api_key_env())?;

    let payload = RequestPayload {
        model: config.model().name.clone(),
        system: prompt.system.clone(),
        messages: prompt.messages.clone(),
        max_tokens: config.model().max_output_tokens,
        temperature: config.temperature(),
        stream: true,
    };

    if config.debug() {
        if let Some(sink) = debug_sink {
            sink.write(&dump_request(&payload));
        }
    }

    let body = serde_json::to_string(&payload)
        .map_err(|e| Error::InvalidConfig(format!("failed to serialize request body: {}", e)))?;

    let args = vec![
        "--silent".to_string(),
        "--show-error".to_string(),
        "--fail-with-body".to_string(),
        "--no-buffer".to_string(),
        "-X".to_string(),
        "POST".to_string(),
        "-H".to_string(),
        "Content-Type: application/json".to_string(),
        "-H".to_string(),
        format!("x-api-key: {}", api_key),
        "-H".to_string(),
        format!("anthropic-version: {}", ANTHROPIC_VERSION),
        "-d".to_string(),
        body,
        config.url().to_string(),
    ];

    Ok((
        payload,
        TransportInvocation {
            program: config.transport_program().to_string(),
            args,
        },
    ))
}

/// Read the API key from the named environment variable.
fn read_api_key(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(Error::MissingCredential {
            var: var.to_string(),
        }),
    }
}

/// Render a human-readable dump of the outgoing request for the debug sink.
fn dump_request(payload: &RequestPayload) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- request ---");
    let _ = writeln!(out, "model: {}", payload.model);
    let _ = writeln!(out, "max_tokens: {}", payload.max_tokens);
    let _ = writeln!(out, "temperature: {}", payload.temperature);
    let _ = writeln!(out, "system: {}", payload.system);
    for message in &payload.messages {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        let _ = writeln!(out, "[{}] {}", role, message.content);
    }
    out
}
