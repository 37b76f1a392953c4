use futures::future::join_all;
use tokio::io::AsyncRead;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;
use crate::core::codec::RecordReader;
use crate::models::errors::{DecodeError, SourceError};
use crate::models::record::{Record, Results};

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Capacity of the record channel
    pub record_buffer: usize,
    /// Capacity of the error channel
    pub error_buffer: usize,
    /// Give up on a source after this many failures in a row. `None` keeps
    /// retrying until the source ends.
    pub max_consecutive_errors: Option<usize>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig {
            record_buffer: 1024,
            error_buffer: 64,
            max_consecutive_errors: Some(100),
        }
    }
}

/// What happened to one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub index: usize,
    pub records: u64,
    pub errors: u64,
    pub aborted: bool,
    /// Worker panicked or was cancelled before finishing
    pub crashed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectSummary {
    pub sources: Vec<SourceStats>,
}

impl CollectSummary {
    pub fn records(&self) -> u64 {
        self.sources.iter().map(|s| s.records).sum()
    }

    pub fn errors(&self) -> u64 {
        self.sources.iter().map(|s| s.errors).sum()
    }
}

/// Both channels of a running merge plus its join point.
///
/// The channels close once every source worker has returned, so draining
/// both to `None` means the merge is complete.
pub struct Collection {
    pub records: Receiver<Record>,
    pub errors: Receiver<SourceError>,
    pub done: JoinHandle<CollectSummary>,
}

/// Everything a merge produced, records sorted by timestamp.
#[derive(Debug)]
pub struct Drained {
    pub results: Results,
    pub errors: Vec<SourceError>,
    pub summary: CollectSummary,
}

impl Collection {
    /// Drain both channels until they close, then sort the records.
    pub async fn drain(mut self) -> anyhow::Result<Drained> {
        let mut results = Results::new();
        let mut errors = Vec::new();
        let mut records_open = true;
        let mut errors_open = true;

        while records_open || errors_open {
            tokio::select! {
                record = self.records.recv(), if records_open => match record {
                    Some(record) => results.push(record),
                    None => records_open = false,
                },
                error = self.errors.recv(), if errors_open => match error {
                    Some(error) => {
                        tracing::warn!(source = error.index, "{}", error.error);
                        errors.push(error);
                    }
                    None => errors_open = false,
                },
            }
        }

        let summary = self.done.await?;
        results.sort();
        tracing::debug!(
            records = results.len(),
            errors = errors.len(),
            sources = summary.sources.len(),
            "merge finished"
        );
        Ok(Drained { results, errors, summary })
    }
}

pub struct Collector {
    config: CollectorConfig,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        Collector { config }
    }

    /// Spawn one decoding task per source and merge their output.
    ///
    /// Must be called within a tokio runtime. Records from different sources
    /// interleave in arrival order; within a source decode order is kept.
    pub fn collect<I, R>(&self, sources: I) -> Collection
    where
        I: IntoIterator<Item = R>,
        R: AsyncRead + Send + Unpin + 'static,
    {
        let (record_tx, record_rx) = mpsc::channel(self.config.record_buffer.max(1));
        let (error_tx, error_rx) = mpsc::channel(self.config.error_buffer.max(1));

        let mut handles = Vec::new();
        for (index, source) in sources.into_iter().enumerate() {
            let worker = SourceWorker {
                index,
                reader: RecordReader::new(source),
                records: record_tx.clone(),
                errors: error_tx.clone(),
                max_consecutive_errors: self.config.max_consecutive_errors,
            };
            handles.push(tokio::spawn(worker.run()));
        }
        // workers hold the only senders left
        drop(record_tx);
        drop(error_tx);

        let done = tokio::spawn(async move {
            let mut summary = CollectSummary::default();
            for (index, joined) in join_all(handles).await.into_iter().enumerate() {
                match joined {
                    Ok(stats) => summary.sources.push(stats),
                    Err(e) => {
                        tracing::error!(source = index, "source worker failed: {}", e);
                        summary.sources.push(SourceStats {
                            index,
                            crashed: true,
                            ..SourceStats::default()
                        });
                    }
                }
            }
            summary
        });

        Collection {
            records: record_rx,
            errors: error_rx,
            done,
        }
    }
}

struct SourceWorker<R> {
    index: usize,
    reader: RecordReader<R>,
    records: Sender<Record>,
    errors: Sender<SourceError>,
    max_consecutive_errors: Option<usize>,
}

impl<R: AsyncRead + Unpin> SourceWorker<R> {
    async fn run(mut self) -> SourceStats {
        let mut stats = SourceStats {
            index: self.index,
            ..SourceStats::default()
        };
        let mut consecutive = 0usize;
        tracing::debug!(source = self.index, "decoding source");

        loop {
            match self.reader.next().await {
                Ok(Some(record)) => {
                    consecutive = 0;
                    if self.records.send(record).await.is_err() {
                        tracing::debug!(source = self.index, "record receiver dropped");
                        break;
                    }
                    stats.records += 1;
                }
                Ok(None) => {
                    tracing::debug!(source = self.index, records = stats.records, "source exhausted");
                    break;
                }
                Err(error) => {
                    consecutive += 1;
                    stats.errors += 1;
                    if !self.publish(error).await {
                        break;
                    }
                    if let Some(limit) = self.max_consecutive_errors {
                        if consecutive >= limit {
                            stats.aborted = true;
                            self.publish(DecodeError::Aborted { consecutive }).await;
                            break;
                        }
                    }
                }
            }
        }
        stats
    }

    async fn publish(&mut self, error: DecodeError) -> bool {
        let sent = self
            .errors
            .send(SourceError { index: self.index, error })
            .await;
        if sent.is_err() {
            tracing::debug!(source = self.index, "error receiver dropped");
        }
        sent.is_ok()
    }
}
