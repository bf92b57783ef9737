//! Tests for tokio spawner and output records

use emote_batch::core::{ItemError, ItemResult, Spawn, WorkItem};
use emote_batch::emote::EmoteDescription;
use emote_batch::runtime::output::{OutputFormat, OutputRecord, RecordWriter};
use emote_batch::runtime::tokio_spawner::TokioSpawner;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_emote_record_flattens_description() {
    let item = WorkItem::new(0, "stonks.png");
    let description = EmoteDescription {
        twitch_emote_name: "abcStonks".to_string(),
        filename: "abcStonks".to_string(),
        nsfw: false,
        emote_suitability_28px: "good".to_string(),
        ..Default::default()
    };
    let mut result = ItemResult::succeeded(&item, description);
    result.push_artifact("abcStonks.original.png");
    result.push_artifact("abcStonks.28x28.png");
    result.push_artifact("abcStonks.json");

    let value = serde_json::to_value(OutputRecord::from(result)).unwrap();

    assert_eq!(value["twitchEmoteName"], "abcStonks");
    assert_eq!(value["emoteSuitability28px"], "good");
    assert_eq!(value["nsfw"], false);
    assert_eq!(value["source"], "stonks.png");
    assert_eq!(value["destination"].as_array().unwrap().len(), 3);
    assert!(value.get("error").is_none());
}

#[test]
fn test_failed_emote_record() {
    let item = WorkItem::new(1, "broken.gif");
    let result: ItemResult<EmoteDescription> =
        ItemResult::failed(&item, ItemError::Decode("gif has no frames".to_string()));

    let mut writer = RecordWriter::new(Vec::new(), OutputFormat::Pretty);
    writer.write_result(result).unwrap();
    let text = String::from_utf8(writer.into_inner()).unwrap();

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["source"], "broken.gif");
    assert_eq!(value["error"], "decode error: gif has no frames");
    assert!(value.get("twitchEmoteName").is_none());
}
