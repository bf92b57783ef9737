//! Builds a ready-to-run [`Driver`] from a validated [`BatchConfig`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::config::BatchConfig;
use crate::core::{
    AppResult, BoundedDispatcher, Driver, EventSink, ItemProcessor, Spawn, TokenBucket,
};
use crate::emote::EmoteProcessor;
use crate::infra::{FsStore, OpenAiVisionClient};

/// The production pipeline: OpenAI vision client, filesystem store.
pub type EmoteDriver<S> = Driver<EmoteProcessor<OpenAiVisionClient, FsStore>, S>;

/// Assembles limiter, dispatcher and processor for one named pipeline.
#[derive(Clone)]
pub struct PipelineBuilder {
    name: String,
    config: BatchConfig,
    events: Option<Arc<dyn EventSink>>,
}

impl PipelineBuilder {
    /// Create a builder for `name` from `config`.
    pub fn new(name: impl Into<String>, config: BatchConfig) -> Self {
        Self {
            name: name.into(),
            config,
            events: None,
        }
    }

    /// Name used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configuration the pipeline is built from.
    #[must_use]
    pub const fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Record pipeline events into `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    /// Build a driver around any processor.
    ///
    /// Must be called inside a tokio runtime: the limiter starts its refill
    /// task immediately.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate.
    pub fn build_driver<P, S>(&self, processor: P, spawner: S) -> AppResult<Driver<P, S>>
    where
        P: ItemProcessor,
        S: Spawn + Clone + Send + Sync + 'static,
    {
        self.config
            .validate()
            .with_context(|| format!("pipeline `{}` config invalid", self.name))?;

        let limiter = TokenBucket::per_minute(self.config.rate_per_minute)?;
        let dispatcher = BoundedDispatcher::new(self.config.max_concurrent)?;
        tracing::debug!(
            pipeline = %self.name,
            rate_per_minute = self.config.rate_per_minute,
            max_concurrent = self.config.max_concurrent,
            "pipeline built"
        );

        let driver = Driver::new(Arc::new(limiter), dispatcher, processor, spawner);
        Ok(match &self.events {
            Some(events) => driver.with_events(Arc::clone(events)),
            None => driver,
        })
    }

    /// Build the emote tagging pipeline, writing artifacts to the current
    /// directory.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate or the HTTP client
    /// cannot be created.
    pub fn build_emote_driver<S>(&self, spawner: S) -> AppResult<EmoteDriver<S>>
    where
        S: Spawn + Clone + Send + Sync + 'static,
    {
        let vision = OpenAiVisionClient::new(
            self.config.api_key.clone(),
            self.config.model.clone(),
            self.config.request_timeout(),
        )
        .context("creating vision client")?
        .with_api_base(self.config.api_base.clone());

        let processor = EmoteProcessor::new(
            vision,
            FsStore::new(PathBuf::new()),
            self.config.prompt_text.clone(),
            self.config.emote_name_prefix.clone(),
        );
        self.build_driver(processor, spawner)
    }
}
