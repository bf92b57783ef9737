//! Tests for the outstanding-work registry and result channel

use std::time::Duration;

use emote_batch::core::{result_channel, ItemResult, WorkItem, WorkTracker};

#[tokio::test(start_paused = true)]
async fn test_wait_idle_waits_for_every_guard() {
    let tracker = WorkTracker::new();
    let guards: Vec<_> = (0..3).map(|_| tracker.register()).collect();
    assert_eq!(tracker.outstanding(), 3);

    let waiter = {
        let tracker = tracker.clone();
        tokio::spawn(async move { tracker.wait_idle().await })
    };

    for guard in guards {
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());
        drop(guard);
    }

    waiter.await.unwrap();
    assert_eq!(tracker.outstanding(), 0);
    assert_eq!(tracker.registered(), 3);
}

#[tokio::test]
async fn test_channel_closes_after_last_sink() {
    let (sink, mut collector) = result_channel::<u8>(4);
    let second = sink.clone();
    let item = WorkItem::new(0, "a.png");

    sink.deliver(ItemResult::succeeded(&item, 1)).await;
    drop(sink);
    second.deliver(ItemResult::succeeded(&item, 2)).await;
    drop(second);

    assert_eq!(collector.next().await.unwrap().payload, Some(1));
    assert_eq!(collector.next().await.unwrap().payload, Some(2));
    assert!(collector.next().await.is_none());
    assert_eq!(collector.delivered(), 2);
}
