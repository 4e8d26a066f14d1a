//! Client configuration and builder.
//!
//! # Example
//!
//! ```ignore
//! use chatpipe::config::{ClientConfig, ModelSpec};
//!
//! let config = ClientConfig::builder()
//!     .model(ModelSpec::by_index(1).unwrap())
//!     .temperature(0.2)
//!     .debug(true)
//!     .build()?;
//! ```

use super::model::ModelSpec;
use crate::{Error, Result};

/// Default provider endpoint for chat completions.
pub const DEFAULT_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default environment variable holding the API key.
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Default transport program used to perform the HTTP request.
pub const DEFAULT_TRANSPORT: &str = "curl";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Configuration for the streaming chat client.
///
/// Use [`ClientConfig::builder()`] to create a new configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // Provider
    pub(crate) url: String,
    pub(crate) api_key_env: String,
    pub(crate) model: ModelSpec,
    pub(crate) temperature: f64,

    // Transport
    pub(crate) transport_program: String,

    // Diagnostics
    pub(crate) debug: bool,
}

impl ClientConfig {
    /// Create a new builder for ClientConfig.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Get the target URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the name of the environment variable holding the API key.
    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    /// Get the selected model.
    pub fn model(&self) -> &ModelSpec {
        &self.model
    }

    /// Get the sampling temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Get the transport program name.
    pub fn transport_program(&self) -> &str {
        &self.transport_program
    }

    /// Whether debug request dumps are enabled.
    pub fn debug(&self) -> bool {
        self.debug
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::builder()
            .build()
            .expect("default config is valid")
    }
}

/// Builder for [`ClientConfig`].
///
/// Validation happens when [`build()`](ClientConfigBuilder::build) is called.
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    url: String,
    api_key_env: String,
    model: ModelSpec,
    temperature: f64,
    transport_program: String,
    debug: bool,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            model: ModelSpec::default(),
            temperature: DEFAULT_TEMPERATURE,
            transport_program: DEFAULT_TRANSPORT.to_string(),
            debug: false,
        }
    }
}

impl ClientConfigBuilder {
    // -------------------------------------------------------------------------
    // Provider
    // -------------------------------------------------------------------------

    /// Set the target URL for chat completions.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the environment variable name the API key is read from.
    pub fn api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = var.into();
        self
    }

    /// Set the model to use.
    pub fn model(mut self, model: ModelSpec) -> Self {
        self.model = model;
        self
    }

    /// Select a model from the built-in catalog by index.
    ///
    /// Out-of-range indexes are rejected at [`build()`](Self::build) time.
    pub fn model_index(mut self, index: usize) -> Self {
        if let Some(model) = ModelSpec::by_index(index) {
            self.model = model;
        } else {
            // Poison the model name so build() reports the bad index.
            self.model = ModelSpec::new(format!("<invalid catalog index {}>", index), 0);
        }
        self
    }

    /// Set the sampling temperature (default 0.7).
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    // -------------------------------------------------------------------------
    // Transport
    // -------------------------------------------------------------------------

    /// Set the transport program (default: `curl` from PATH).
    pub fn transport_program(mut self, program: impl Into<String>) -> Self {
        self.transport_program = program.into();
        self
    }

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------

    /// Enable human-readable request dumps to the debug sink.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    // -------------------------------------------------------------------------
    // Build
    // -------------------------------------------------------------------------

    /// Build the configuration.
    ///
    /// This validates:
    /// - The URL and credential variable name are non-empty
    /// - The temperature is within the provider's accepted range
    /// - A catalog index passed to [`model_index`](Self::model_index) was valid
    pub fn build(self) -> Result<ClientConfig> {
        if self.url.is_empty() {
            return Err(Error::InvalidConfig("url must not be empty".into()));
        }

        if self.api_key_env.is_empty() {
            return Err(Error::InvalidConfig(
                "api_key_env must not be empty".into(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::InvalidConfig(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }

        if self.model.max_output_tokens == 0 {
            return Err(Error::InvalidConfig(format!(
                "invalid model selection: {}",
                self.model.name
            )));
        }

        Ok(ClientConfig {
            url: self.url,
            api_key_env: self.api_key_env,
            model: self.model,
            temperature: self.temperature,
            transport_program: self.transport_program,
            debug: self.debug,
        })
    }
}
