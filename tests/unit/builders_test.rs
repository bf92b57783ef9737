//! Tests for builder modules

use std::sync::Arc;

use async_trait::async_trait;
use emote_batch::builders::PipelineBuilder;
use emote_batch::config::BatchConfig;
use emote_batch::core::{EventKind, InMemoryEventSink, ItemProcessor, ItemResult, WorkItem};
use emote_batch::runtime::TokioSpawner;

struct Echo;

#[async_trait]
impl ItemProcessor for Echo {
    type Payload = usize;

    async fn process(&self, item: &WorkItem) -> ItemResult<usize> {
        ItemResult::succeeded(item, item.index)
    }
}

#[test]
fn test_pipeline_builder_accessors() {
    let config = BatchConfig {
        rate_per_minute: 30,
        max_concurrent: 2,
        ..BatchConfig::default()
    };

    let builder = PipelineBuilder::new("emotes", config);
    assert_eq!(builder.name(), "emotes");
    assert_eq!(builder.config().rate_per_minute, 30);
    assert_eq!(builder.config().max_concurrent, 2);
}

#[tokio::test]
async fn test_build_driver_uses_config_bounds() {
    let config = BatchConfig {
        rate_per_minute: 30,
        max_concurrent: 4,
        ..BatchConfig::default()
    };

    let driver = PipelineBuilder::new("emotes", config)
        .build_driver(Echo, TokioSpawner::current())
        .unwrap();

    assert_eq!(driver.limiter().capacity(), 30);
    assert_eq!(driver.limiter().interval().as_secs(), 2);
    assert_eq!(driver.dispatcher().max_concurrent(), 4);
}

#[tokio::test]
async fn test_build_driver_rejects_invalid_config() {
    let config = BatchConfig {
        max_concurrent: 0,
        ..BatchConfig::default()
    };

    let err = PipelineBuilder::new("emotes", config)
        .build_driver(Echo, TokioSpawner::current())
        .err()
        .unwrap();
    assert!(err.to_string().contains("pipeline `emotes` config invalid"));
}

#[tokio::test]
async fn test_built_driver_records_events() {
    let events = InMemoryEventSink::new(64);
    let driver = PipelineBuilder::new("emotes", BatchConfig::default())
        .with_events(Arc::new(events.clone()))
        .build_driver(Echo, TokioSpawner::current())
        .unwrap();

    let results = driver
        .run(WorkItem::from_paths(["a.png", "b.png"]))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(events.times_of(EventKind::Finished).len(), 2);
}

#[tokio::test]
async fn test_build_emote_driver() {
    let config = BatchConfig {
        api_key: "sk-test".to_string(),
        api_base: "http://127.0.0.1:9/v1".to_string(),
        ..BatchConfig::default()
    };

    let driver = PipelineBuilder::new("emotes", config)
        .build_emote_driver(TokioSpawner::current())
        .unwrap();
    assert_eq!(driver.dispatcher().max_concurrent(), 1);
    assert_eq!(driver.limiter().capacity(), 60);
}
