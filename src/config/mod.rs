//! Configuration for the streaming chat client.
//!
//! This module provides:
//!
//! - [`ClientConfig`] and [`ClientConfigBuilder`] for configuring the client
//! - [`ModelSpec`] and the built-in model catalog
//!
//! # Example
//!
//! ```ignore
//! use chatpipe::config::{ClientConfig, ModelSpec};
//!
//! let config = ClientConfig::builder()
//!     .model_index(0)
//!     .temperature(0.7)
//!     .api_key_env("ANTHROPIC_API_KEY")
//!     .build()?;
//! ```

pub mod builder;
pub mod model;

// Re-export commonly used types
pub use builder::{
    ClientConfig, ClientConfigBuilder, DEFAULT_API_KEY_ENV, DEFAULT_TEMPERATURE,
    DEFAULT_TRANSPORT, DEFAULT_URL,
};
pub use model::ModelSpec;
