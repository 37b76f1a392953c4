use std::io::{self, Cursor};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, SystemTime};
use tokio::io::{AsyncRead, ReadBuf};
use atomic_bomb_report::{encode_record, Collector, CollectorConfig, DecodeError, Record};

fn record(source: u64, seq: u64) -> Record {
    Record {
        code: 200,
        // interleave sources in time so sorting has work to do
        timestamp: SystemTime::UNIX_EPOCH + Duration::from_millis(seq * 10 + source),
        latency: Duration::from_millis(seq + 1),
        bytes_out: source,
        bytes_in: seq,
        error: String::new(),
    }
}

fn stream(source: u64, count: u64) -> Vec<u8> {
    (0..count)
        .flat_map(|seq| encode_record(&record(source, seq)).unwrap())
        .collect()
}

/// Source failing every read without ever ending.
struct Broken;

impl AsyncRead for Broken {
    fn poll_read(self: Pin<&mut Self>, _: &mut Context<'_>, _: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer")))
    }
}

#[tokio::test]
async fn merges_every_record_from_every_source() {
    let counts = [0u64, 1, 7, 250];
    let sources: Vec<Cursor<Vec<u8>>> = counts
        .iter()
        .enumerate()
        .map(|(i, n)| Cursor::new(stream(i as u64, *n)))
        .collect();

    let drained = Collector::new(CollectorConfig::default())
        .collect(sources)
        .drain()
        .await
        .unwrap();

    assert_eq!(drained.results.len() as u64, counts.iter().sum::<u64>());
    assert!(drained.errors.is_empty());
    assert_eq!(drained.summary.records(), 258);
    assert_eq!(drained.summary.sources.len(), counts.len());
    for (stats, n) in drained.summary.sources.iter().zip(counts) {
        assert_eq!(stats.records, n);
        assert!(!stats.aborted);
    }
    assert!(drained
        .results
        .windows(2)
        .all(|w| w[0].timestamp <= w[1].timestamp));
}

#[tokio::test]
async fn corrupt_record_does_not_stop_its_source() {
    let mut damaged = encode_record(&record(0, 0)).unwrap();
    damaged.extend_from_slice(&[0x09, 0xff, 0x00]);
    damaged.extend(encode_record(&record(0, 1)).unwrap());
    damaged.extend(encode_record(&record(0, 2)).unwrap());

    let sources = vec![Cursor::new(damaged), Cursor::new(stream(1, 3))];
    let drained = Collector::new(CollectorConfig::default())
        .collect(sources)
        .drain()
        .await
        .unwrap();

    assert_eq!(drained.results.len(), 6);
    assert_eq!(drained.errors.len(), 1);
    assert_eq!(drained.errors[0].index, 0);
    assert!(matches!(drained.errors[0].error, DecodeError::Malformed(_)));
    assert_eq!(drained.summary.sources[0].records, 3);
    assert_eq!(drained.summary.sources[0].errors, 1);
}

#[tokio::test]
async fn failing_source_is_abandoned_after_limit() {
    let config = CollectorConfig {
        max_consecutive_errors: Some(5),
        ..CollectorConfig::default()
    };
    let collection = Collector::new(config).collect(vec![
        Box::new(Broken) as Box<dyn AsyncRead + Send + Unpin>,
        Box::new(Cursor::new(stream(1, 4))),
    ]);
    let drained = tokio::time::timeout(Duration::from_secs(5), collection.drain())
        .await
        .expect("merge finished")
        .unwrap();

    assert_eq!(drained.results.len(), 4);
    // five read failures, then the abort notice
    assert_eq!(drained.errors.len(), 6);
    assert!(drained.errors.iter().all(|e| e.index == 0));
    assert!(matches!(
        drained.errors.last().unwrap().error,
        DecodeError::Aborted { consecutive: 5 }
    ));
    assert!(drained.summary.sources[0].aborted);
}

#[tokio::test]
async fn channels_close_only_after_slowest_source_ends() {
    let (mut writer, reader) = tokio::io::duplex(64);
    let mut collection = Collector::new(CollectorConfig::default())
        .collect(vec![reader]);

    let first = encode_record(&record(0, 0)).unwrap();
    tokio::io::AsyncWriteExt::write_all(&mut writer, &first).await.unwrap();
    assert_eq!(collection.records.recv().await, Some(record(0, 0)));

    // source still open: nothing more, but not closed either
    let pending = tokio::time::timeout(Duration::from_millis(50), collection.records.recv()).await;
    assert!(pending.is_err());

    drop(writer);
    assert_eq!(collection.records.recv().await, None);
    assert!(collection.errors.recv().await.is_none());
    let summary = collection.done.await.unwrap();
    assert_eq!(summary.records(), 1);
}

#[tokio::test]
async fn records_keep_per_source_order() {
    let collection = Collector::new(CollectorConfig {
        record_buffer: 1,
        ..CollectorConfig::default()
    })
    .collect(vec![Cursor::new(stream(0, 50)), Cursor::new(stream(1, 50))]);

    let mut records = collection.records;
    let mut seen: [Vec<u64>; 2] = [Vec::new(), Vec::new()];
    while let Some(r) = records.recv().await {
        seen[r.bytes_out as usize].push(r.bytes_in);
    }
    for per_source in &seen {
        assert_eq!(*per_source, (0..50).collect::<Vec<u64>>());
    }
}
