//! High-level client for streaming chat completions.
//!
//! This module provides [`ChatClient`], the main entry point. It wires the
//! request builder, the transport runner, and the SSE parser together and
//! exposes two consumption styles:
//!
//! - [`invoke`](ChatClient::invoke): callback style, marshaled onto the
//!   host executor (the editor-integration contract)
//! - [`send`](ChatClient::send): an async stream of text fragments
//!
//! # Example
//!
//! ```ignore
//! use chatpipe::{ChatClient, Prompt, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = ChatClient::builder().model_index(0).build()?;
//!     let text = client
//!         .send_and_collect(&Prompt::new("Be brief.", "What is SSE?"))
//!         .await?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::config::{ClientConfig, ClientConfigBuilder, ModelSpec};
use crate::executor::{HostExecutor, InlineExecutor};
use crate::observe::{DebugSink, LoggingSink, StreamObserver};
use crate::process::{RunHandle, StreamRunner};
use crate::request::{build_request, Prompt};
use crate::template::TemplateRenderer;
use crate::{Error, Result};

/// A client for streaming chat completions through a transport subprocess.
///
/// # Thread Safety
///
/// `ChatClient` is `Send + Sync` and can be shared across tasks. Each
/// invocation spawns its own subprocess and parser, so concurrent
/// invocations are fully independent.
#[derive(Clone)]
pub struct ChatClient {
    config: Arc<ClientConfig>,
    executor: Arc<dyn HostExecutor>,
    observer: Option<Arc<dyn StreamObserver>>,
    debug_sink: Option<Arc<dyn DebugSink>>,
}

impl ChatClient {
    /// Create a client with default configuration and inline callback
    /// delivery.
    pub fn new() -> Result<Self> {
        ChatClient::builder().build()
    }

    /// Create a builder for configuring a new client.
    pub fn builder() -> ChatClientBuilder {
        ChatClientBuilder::new()
    }

    /// Get a reference to the client's configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start a streaming invocation with callback delivery.
    ///
    /// Builds the request (failing with
    /// [`Error::MissingCredential`] before any subprocess is spawned if
    /// the API key is absent), spawns the transport, and relays decoded
    /// fragments to `on_chunk` via the configured executor. `on_done`
    /// fires exactly once when the run ends, carrying the failure if any.
    ///
    /// The returned [`RunHandle`] cancels the run on
    /// [`cancel`](RunHandle::cancel); dropping it leaves the run going.
    pub fn invoke<C, E>(&self, prompt: &Prompt, on_chunk: C, on_done: E) -> Result<RunHandle>
    where
        C: Fn(String) + Send + Sync + 'static,
        E: FnOnce(Option<Error>) + Send + 'static,
    {
        let (_, invocation) = build_request(
            prompt,
            &self.config,
            self.debug_sink.as_deref(),
        )?;

        let mut runner = StreamRunner::new(Arc::clone(&self.executor));
        if let Some(ref observer) = self.observer {
            runner = runner.with_observer(Arc::clone(observer));
        }
        runner.run(&invocation, on_chunk, on_done)
    }

    /// Start a streaming invocation consumed as an async stream.
    ///
    /// The stream yields text fragments in order, then ends; a transport
    /// or configuration failure arrives as the final `Err` item. Dropping
    /// the stream cancels the run and kills the subprocess.
    ///
    /// Fragments are delivered through the stream itself rather than the
    /// host executor; poll it from whichever task should receive them.
    pub fn send(&self, prompt: &Prompt) -> Result<FragmentStream> {
        let (_, invocation) = build_request(
            prompt,
            &self.config,
            self.debug_sink.as_deref(),
        )?;

        let (tx, rx) = mpsc::unbounded_channel::<Result<String>>();
        let chunk_tx = tx.clone();

        let mut runner = StreamRunner::new(Arc::new(InlineExecutor::new()));
        if let Some(ref observer) = self.observer {
            runner = runner.with_observer(Arc::clone(observer));
        }

        let handle = runner.run(
            &invocation,
            move |text| {
                let _ = chunk_tx.send(Ok(text));
            },
            move |failure| {
                if let Some(err) = failure {
                    let _ = tx.send(Err(err));
                }
                // Dropping tx closes the stream.
            },
        )?;

        Ok(FragmentStream {
            rx,
            handle: Some(handle),
        })
    }

    /// Send a prompt and collect the full text response.
    pub async fn send_and_collect(&self, prompt: &Prompt) -> Result<String> {
        self.send(prompt)?.collect_text().await
    }

    /// Render a system and user template into a [`Prompt`].
    ///
    /// Convenience wrapper over the host's [`TemplateRenderer`].
    pub fn render_prompt(
        &self,
        renderer: &dyn TemplateRenderer,
        system_template: &str,
        user_template: &str,
        vars: &HashMap<String, String>,
    ) -> Result<Prompt> {
        Ok(Prompt::new(
            renderer.render(system_template, vars)?,
            renderer.render(user_template, vars)?,
        ))
    }
}

/// A stream of decoded text fragments from one invocation.
///
/// Created by [`ChatClient::send`]. Dropping it cancels the run.
pub struct FragmentStream {
    rx: mpsc::UnboundedReceiver<Result<String>>,
    handle: Option<RunHandle>,
}

impl FragmentStream {
    /// Handle for cancelling the underlying run.
    pub fn handle(&self) -> Option<&RunHandle> {
        self.handle.as_ref()
    }

    /// Collect all fragments into one string.
    ///
    /// Returns the first error encountered instead, discarding any text
    /// streamed before it.
    pub async fn collect_text(mut self) -> Result<String> {
        use futures::StreamExt;

        let mut text = String::new();
        while let Some(item) = self.next().await {
            text.push_str(&item?);
        }
        Ok(text)
    }
}

impl Stream for FragmentStream {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl Drop for FragmentStream {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
    }
}

/// Builder for [`ChatClient`].
///
/// Wraps [`ClientConfigBuilder`] and adds the host-integration pieces:
/// executor, observer, and debug sink.
#[derive(Clone)]
pub struct ChatClientBuilder {
    inner: ClientConfigBuilder,
    executor: Option<Arc<dyn HostExecutor>>,
    observer: Option<Arc<dyn StreamObserver>>,
    debug_sink: Option<Arc<dyn DebugSink>>,
}

impl ChatClientBuilder {
    /// Create a new client builder with default settings.
    pub fn new() -> Self {
        Self {
            inner: ClientConfigBuilder::default(),
            executor: None,
            observer: None,
            debug_sink: None,
        }
    }

    /// Build the client.
    ///
    /// Without an explicit executor, callbacks run inline on the stream
    /// driver task. With `debug(true)` and no explicit sink, request
    /// dumps go to a [`LoggingSink`] so they are never silently lost.
    pub fn build(self) -> Result<ChatClient> {
        let config = self.inner.build()?;
        let debug_sink = match self.debug_sink {
            Some(sink) => Some(sink),
            None if config.debug() => Some(Arc::new(LoggingSink::new()) as Arc<dyn DebugSink>),
            None => None,
        };
        Ok(ChatClient {
            config: Arc::new(config),
            executor: self
                .executor
                .unwrap_or_else(|| Arc::new(InlineExecutor::new())),
            observer: self.observer,
            debug_sink,
        })
    }

    // -------------------------------------------------------------------------
    // Provider options (delegated to ClientConfigBuilder)
    // -------------------------------------------------------------------------

    /// Set the target URL for chat completions.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.inner = self.inner.url(url);
        self
    }

    /// Set the environment variable name the API key is read from.
    pub fn api_key_env(mut self, var: impl Into<String>) -> Self {
        self.inner = self.inner.api_key_env(var);
        self
    }

    /// Set the model to use.
    pub fn model(mut self, model: ModelSpec) -> Self {
        self.inner = self.inner.model(model);
        self
    }

    /// Select a model from the built-in catalog by index.
    pub fn model_index(mut self, index: usize) -> Self {
        self.inner = self.inner.model_index(index);
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.inner = self.inner.temperature(temperature);
        self
    }

    /// Set the transport program.
    pub fn transport_program(mut self, program: impl Into<String>) -> Self {
        self.inner = self.inner.transport_program(program);
        self
    }

    /// Enable debug request dumps.
    pub fn debug(mut self, debug: bool) -> Self {
        self.inner = self.inner.debug(debug);
        self
    }

    // -------------------------------------------------------------------------
    // Host integration
    // -------------------------------------------------------------------------

    /// Set the executor callbacks are marshaled through.
    pub fn executor(mut self, executor: Arc<dyn HostExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Set an observer for informational stream events.
    pub fn observer(mut self, observer: Arc<dyn StreamObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Set the sink debug request dumps are written to.
    pub fn debug_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.debug_sink = Some(sink);
        self
    }
}

impl Default for ChatClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
