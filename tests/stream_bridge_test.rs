//! Push-to-pull bridge tests with a simulated transport.

use std::time::Duration;

use evolab::remote::stream::channel;
use evolab::remote::RecordMap;
use evolab::ErrorKind;
use futures_util::StreamExt;
use serde_json::json;

fn record(generation: u64) -> RecordMap {
    json!({"experimentId": "exp-1", "generation": generation})
        .as_object()
        .cloned()
        .unwrap()
}

fn generation_of(record: &RecordMap) -> u64 {
    record["generation"].as_u64().unwrap()
}

#[tokio::test]
async fn test_slow_consumer_sees_every_record_in_order() {
    let (sink, mut stream) = channel();

    let producer = tokio::spawn(async move {
        for g in 0..3 {
            assert!(sink.push(record(g)));
        }
        sink.close();
    });

    let mut seen = Vec::new();
    while let Some(item) = stream.next_record().await {
        tokio::time::sleep(Duration::from_millis(20)).await;
        seen.push(generation_of(&item.unwrap()));
    }
    producer.await.unwrap();

    assert_eq!(seen, vec![0, 1, 2]);
    assert!(stream.is_finished());
}

#[tokio::test]
async fn test_slow_producer_consumer_waits() {
    let (sink, stream) = channel();

    tokio::spawn(async move {
        for g in 0..3 {
            tokio::time::sleep(Duration::from_millis(15)).await;
            sink.push(record(g));
        }
    });

    let seen: Vec<u64> = stream
        .map(|item| generation_of(&item.unwrap()))
        .collect()
        .await;
    assert_eq!(seen, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_pull_suspends_until_push() {
    let (sink, mut stream) = channel();

    // Nothing queued and the sink is open: the pull must pend.
    let pending = tokio::time::timeout(Duration::from_millis(30), stream.next_record()).await;
    assert!(pending.is_err());
    assert!(!stream.is_finished());

    sink.push(record(9));
    let item = tokio::time::timeout(Duration::from_secs(1), stream.next_record())
        .await
        .expect("record should arrive")
        .unwrap()
        .unwrap();
    assert_eq!(generation_of(&item), 9);
}

#[tokio::test]
async fn test_close_wakes_waiting_consumer() {
    let (sink, mut stream) = channel();

    let consumer = tokio::spawn(async move { stream.next_record().await.is_none() });
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(sink);

    let ended = tokio::time::timeout(Duration::from_secs(1), consumer)
        .await
        .expect("consumer should wake")
        .unwrap();
    assert!(ended);
}

#[tokio::test]
async fn test_abnormal_end_after_queued_records() {
    let (sink, mut stream) = channel();
    for g in 0..3 {
        sink.push(record(g));
    }
    sink.fail("connection reset by peer");

    for g in 0..3 {
        assert_eq!(generation_of(&stream.next_record().await.unwrap().unwrap()), g);
    }
    let err = stream.next_record().await.unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StreamClosed);
    assert!(err.to_string().contains("connection reset by peer"));
    assert!(stream.next_record().await.is_none());
}

#[tokio::test]
async fn test_large_backlog_is_not_dropped() {
    let (sink, stream) = channel();
    for g in 0..10_000 {
        sink.push(record(g));
    }
    drop(sink);

    let seen: Vec<u64> = stream
        .map(|item| generation_of(&item.unwrap()))
        .collect()
        .await;
    assert_eq!(seen, (0..10_000).collect::<Vec<_>>());
}
