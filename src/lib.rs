//! # chatpipe
//!
//! Streaming chat completions over a subprocess transport.
//!
//! This crate drives an external HTTP program (`curl` by default) against
//! the Anthropic Messages API with streaming enabled, parses the
//! server-sent events arriving on the subprocess's stdout line by line,
//! and delivers the decoded text fragments to the host application as
//! they arrive. It is built for embedding in hosts that own their own
//! execution context (an editor, a REPL, a UI event loop): every
//! callback is marshaled through a pluggable [`HostExecutor`] so the
//! host decides where its code runs.
//!
//! ## Quick Start
//!
//! ```ignore
//! use chatpipe::{ChatClient, Prompt, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ChatClient::builder().build()?;
//!     let text = client
//!         .send_and_collect(&Prompt::new(
//!             "You are a concise assistant.",
//!             "Explain server-sent events in one sentence.",
//!         ))
//!         .await?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```
//!
//! ## Callback Streaming
//!
//! Hosts that cannot poll a stream use [`ChatClient::invoke`] instead:
//!
//! ```ignore
//! use std::sync::Arc;
//! use chatpipe::{ChatClient, InlineExecutor, Prompt};
//!
//! let client = ChatClient::builder()
//!     .executor(Arc::new(InlineExecutor::new()))
//!     .build()?;
//!
//! let handle = client.invoke(
//!     &Prompt::new("", "Hello"),
//!     |chunk| print!("{}", chunk),
//!     |failure| match failure {
//!         None => println!(),
//!         Some(err) => eprintln!("stream failed: {}", err),
//!     },
//! )?;
//! // handle.cancel() aborts the run at any point.
//! # Ok::<(), chatpipe::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   build_request   ┌─────────────────┐
//! │ ChatClient │ ────────────────▶ │  StreamRunner   │
//! └────────────┘                   └────────┬────────┘
//!                                           │ spawn
//!                                  ┌────────▼────────┐
//!                                  │ TransportProcess│ (curl)
//!                                  └────────┬────────┘
//!                                           │ stdout lines
//!                                  ┌────────▼────────┐
//!                                  │    SseParser    │
//!                                  └────────┬────────┘
//!                                           │ text fragments
//!                                  ┌────────▼────────┐
//!                                  │  HostExecutor   │ ──▶ on_chunk / on_exit
//!                                  └─────────────────┘
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod observe;
pub mod process;
pub mod request;
pub mod sse;
pub mod template;

pub use client::{ChatClient, ChatClientBuilder, FragmentStream};
pub use config::{ClientConfig, ClientConfigBuilder, ModelSpec};
pub use error::{Error, Result};
pub use executor::{HostExecutor, InlineExecutor, Job, JobQueue, QueueExecutor};
pub use observe::{DebugSink, LoggingObserver, LoggingSink, StreamObserver};
pub use process::{RunHandle, StreamRunner, TransportProcess};
pub use request::{build_request, Message, Prompt, Role, TransportInvocation};
pub use sse::SseParser;
pub use template::{TemplateRenderer, VarSubstRenderer};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn public_types_are_send_sync() {
        assert_send_sync::<ChatClient>();
        assert_send_sync::<ClientConfig>();
        assert_send_sync::<Error>();
        assert_send_sync::<RunHandle>();
        assert_send_sync::<StreamRunner>();
        assert_send_sync::<Prompt>();
        assert_send_sync::<ModelSpec>();
    }
}
