//! Tests for the token bucket and dispatcher bounds

use std::time::Duration;

use emote_batch::core::{BoundedDispatcher, DispatchError, TokenBucket};

#[tokio::test(start_paused = true)]
async fn test_per_minute_burst_then_pace() {
    let bucket = TokenBucket::per_minute(3).unwrap();
    assert_eq!(bucket.interval(), Duration::from_secs(20));

    let start = tokio::time::Instant::now();
    for _ in 0..3 {
        bucket.acquire().await;
    }
    assert_eq!(start.elapsed(), Duration::ZERO);

    bucket.acquire().await;
    assert!(start.elapsed() >= Duration::from_secs(20));
}

#[tokio::test(start_paused = true)]
async fn test_idle_bucket_does_not_bank_tokens() {
    let bucket = TokenBucket::with_interval(2, Duration::from_secs(1)).unwrap();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(bucket.available(), 2);

    bucket.acquire().await;
    bucket.acquire().await;
    assert_eq!(bucket.available(), 0);
}

#[tokio::test]
async fn test_zero_bounds_rejected() {
    assert!(matches!(
        TokenBucket::per_minute(0),
        Err(DispatchError::InvalidBound(_))
    ));
    assert!(matches!(
        TokenBucket::with_interval(1, Duration::ZERO),
        Err(DispatchError::InvalidBound(_))
    ));
    assert!(matches!(
        BoundedDispatcher::new(0),
        Err(DispatchError::InvalidBound(_))
    ));
}

#[tokio::test]
async fn test_stop_ends_refill() {
    let bucket = TokenBucket::with_interval(1, Duration::from_millis(5)).unwrap();
    assert!(bucket.is_refilling());
    bucket.stop().await;
    assert!(!bucket.is_refilling());
}

#[tokio::test]
async fn test_dispatcher_slots_are_shared_between_clones() {
    let dispatcher = BoundedDispatcher::new(2).unwrap();
    let clone = dispatcher.clone();

    let slot = clone.acquire_slot().await;
    assert_eq!(dispatcher.available(), 1);
    assert_eq!(dispatcher.stats().active, 1);

    drop(slot);
    assert_eq!(dispatcher.available(), 2);
    assert_eq!(dispatcher.stats().released, 1);
}
