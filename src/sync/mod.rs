//! Sync loop
//!
//! Drives request, response, extraction and pagination for every partition
//! of a stream.
//!
//! # Overview
//!
//! - Partitions run strictly one after another, in catalog order
//! - Each partition gets a fresh paginator (one per date window for the
//!   windowed partition)
//! - Records are produced lazily: the next page is only requested once every
//!   record of the current page has been consumed, so a consumer that stops
//!   early triggers no further requests
//! - Every request goes through [`HttpClient::execute_json`]

mod request;
mod types;

pub use request::{continuation_request, first_request};
pub use types::{RecordStream, StreamStats, SyncStats};

use crate::auth::TokenProvider;
use crate::config::{StateSelections, TapConfig};
use crate::error::{Error, Result};
use crate::extract::RecordExtractor;
use crate::http::{HttpClient, HttpClientConfig};
use crate::metrics::RequestCounter;
use crate::pagination::Paginator;
use crate::partition::{plan_windows, select_partitions, DateWindow, PartitionContext};
use crate::streams::StreamDefinition;
use crate::types::Record;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Generic partitioned sync loop shared by every stream
#[derive(Debug, Clone)]
pub struct SyncLoop {
    client: Arc<HttpClient>,
    base_url: String,
    page_size: u32,
    start_date: Option<DateTime<Utc>>,
    selections: StateSelections,
    requests: Arc<AtomicU64>,
}

impl SyncLoop {
    /// Create a sync loop over an existing client
    pub fn new(client: Arc<HttpClient>, config: &TapConfig) -> Result<Self> {
        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            page_size: config.page_size,
            start_date: config.start_datetime()?,
            selections: config.shipment_state_selections.clone(),
            requests: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Create a sync loop authenticated through the shared token provider
    pub fn from_config(config: &TapConfig) -> Result<Self> {
        let provider = TokenProvider::shared(config);
        let client = HttpClient::with_auth(HttpClientConfig::from_tap_config(config), provider)?;
        Self::new(Arc::new(client), config)
    }

    /// Override the start date
    #[must_use]
    pub fn with_start_date(mut self, start_date: Option<DateTime<Utc>>) -> Self {
        self.start_date = start_date;
        self
    }

    /// The transport
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Record requests issued so far, across clones
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Partitions of a stream after state selections
    pub fn partitions(&self, stream: &StreamDefinition) -> Vec<PartitionContext> {
        select_partitions((stream.partitions)(), &self.selections)
    }

    /// Records of every partition of a stream, partition by partition
    ///
    /// A failing partition yields its error and the stream moves on to the
    /// next partition; the consumer decides whether to keep polling.
    pub fn stream_records(&self, stream: &StreamDefinition) -> RecordStream {
        let this = self.clone();
        let definition = stream.clone();
        let partitions = self.partitions(stream);
        info!(
            stream = definition.name,
            partitions = partitions.len(),
            "Starting stream"
        );

        stream::iter(partitions)
            .map(move |partition| this.partition_records(&definition, partition))
            .flatten()
            .boxed()
    }

    /// Records of one partition, in date windows when it needs them
    pub fn partition_records(
        &self,
        stream: &StreamDefinition,
        partition: PartitionContext,
    ) -> RecordStream {
        if partition.needs_date_windows() {
            if let Some(windows) = plan_windows(self.start_date, Utc::now()) {
                debug!(
                    stream = stream.name,
                    partition = %partition,
                    windows = windows.len(),
                    "Syncing partition in date windows"
                );
                let this = self.clone();
                let definition = stream.clone();
                return stream::iter(windows)
                    .map(move |window| this.run_records(&definition, partition.clone(), Some(window)))
                    .flatten()
                    .boxed();
            }
        }
        self.run_records(stream, partition, None)
    }

    /// One pagination run: a partition, optionally restricted to a window
    pub fn run_records(
        &self,
        stream: &StreamDefinition,
        partition: PartitionContext,
        window: Option<DateWindow>,
    ) -> RecordStream {
        let extractor = match stream.extractor() {
            Ok(extractor) => extractor,
            Err(e) => return stream::once(async move { Err::<Record, _>(e) }).boxed(),
        };

        let run = PageRun {
            sync: self.clone(),
            counter: Some(RequestCounter::new(
                stream.name,
                stream.path,
                partition.to_json(),
            )),
            paginator: Paginator::new(stream.pagination.clone()),
            stream: stream.clone(),
            partition,
            window,
            extractor,
            pending: VecDeque::new(),
            last_page: None,
            emitted: 0,
        };

        stream::try_unfold(run, |mut run| async move {
            match run.next_record().await {
                Ok(Some(record)) => Ok(Some((record, run))),
                Ok(None) => Ok(None),
                Err(e) => {
                    error!(
                        stream = run.stream.name,
                        partition = %run.partition,
                        error = %e,
                        "Partition failed"
                    );
                    Err(e)
                }
            }
        })
        .boxed()
    }
}

/// State of one pagination run
struct PageRun {
    sync: SyncLoop,
    stream: StreamDefinition,
    partition: PartitionContext,
    window: Option<DateWindow>,
    extractor: RecordExtractor,
    paginator: Paginator,
    counter: Option<RequestCounter>,
    pending: VecDeque<Record>,
    last_page: Option<Value>,
    emitted: u64,
}

impl PageRun {
    /// Next post-processed record, fetching pages as needed
    async fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(raw) = self.pending.pop_front() {
                match (self.stream.post_process)(raw, &self.partition)? {
                    Some(record) => {
                        self.emitted += 1;
                        return Ok(Some(record));
                    }
                    None => continue,
                }
            }

            // The page is drained; only now decide whether another follows
            if let Some(page) = self.last_page.take() {
                self.paginator.advance(&page)?;
            }

            if self.paginator.is_finished() {
                let requests = self.counter.take().map_or(0, RequestCounter::finish);
                info!(
                    stream = self.stream.name,
                    partition = %self.partition,
                    records = self.emitted,
                    requests,
                    "Partition complete"
                );
                return Ok(None);
            }

            self.fetch_page().await?;
        }
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let sync = &self.sync;
        let request = if self.paginator.pages() == 0 {
            info!(
                stream = self.stream.name,
                partition = %self.partition,
                window = ?self.window.map(|w| w.to_string()),
                "Syncing partition"
            );
            first_request(
                &self.stream,
                &self.partition,
                &sync.base_url,
                sync.page_size,
                self.window.as_ref(),
            )?
        } else {
            // An active paginator past its first page always holds a cursor
            let cursor = self
                .paginator
                .current_cursor()
                .ok_or_else(|| Error::Other("paginator is active without a cursor".to_string()))?;
            continuation_request(&sync.base_url, cursor)
        };

        debug!(request = %request, "Fetching page");
        let body = sync.client.execute_json(&request).await?;
        sync.requests.fetch_add(1, Ordering::Relaxed);
        if let Some(counter) = self.counter.as_mut() {
            counter.increment();
        }

        let records = self.extractor.extract(&body, &request.url)?;
        debug!(records = records.len(), "Page received");
        self.pending.extend(records);
        self.last_page = Some(body);
        Ok(())
    }
}
