//! Transport process management and stream driving.
//!
//! Each invocation spawns a fresh transport subprocess (curl by default)
//! that performs the HTTP request and writes the SSE response to stdout.
//!
//! # Architecture
//!
//! ```text
//! chatpipe                            transport (curl)
//! ┌──────────────┐                    ┌─────────────┐
//! │ StreamRunner │───args (request)──▶│             │
//! │              │◀──stdout (SSE)─────│             │
//! │              │◀──stderr (errors)──│             │
//! └──────┬───────┘                    └─────────────┘
//!        │ fragments / exit
//!        ▼
//!   HostExecutor ──▶ host callbacks
//! ```
//!
//! # Output protocol
//!
//! stdout carries `event:`/`data:` SSE lines which are fed to
//! [`SseParser`](crate::sse::SseParser) strictly in arrival order. Any
//! non-empty stderr line is treated as fatal for the invocation.

mod runner;
mod spawn;

pub use runner::{RunHandle, StreamRunner};
pub use spawn::TransportProcess;
