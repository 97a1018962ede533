//! CLI runner - executes commands

use crate::auth::TokenProvider;
use crate::cli::commands::{Cli, Commands};
use crate::config::{config_schema, TapConfig};
use crate::error::{Error, Result};
use crate::output::Emitter;
use crate::streams::{self, StreamDefinition};
use crate::sync::{SyncLoop, SyncStats};
use futures::StreamExt;
use serde_json::{json, Value};
use std::io::Write;
use std::time::Instant;
use tracing::{error, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, writing data messages to stdout
    pub async fn run(&self) -> Result<()> {
        let stdout = std::io::stdout();
        self.run_with(stdout.lock()).await
    }

    /// Run the CLI command, writing data messages to `out`
    pub async fn run_with<W: Write>(&self, mut out: W) -> Result<()> {
        match &self.cli.command {
            Commands::About => print_json(&mut out, &config_schema()),
            Commands::Check => self.check().await,
            Commands::Discover => {
                self.load_config()?;
                print_json(&mut out, &catalog()?)
            }
            Commands::Sync {
                streams,
                max_records,
            } => self.sync(streams.as_deref(), *max_records, out).await,
        }
    }

    /// Load configuration; inline JSON takes precedence over the file
    fn load_config(&self) -> Result<TapConfig> {
        if let Some(json) = &self.cli.config_json {
            return TapConfig::from_json(json);
        }
        match &self.cli.config {
            Some(path) => TapConfig::from_file(path),
            None => Err(Error::config(
                "No configuration given (use --config or --config-json)",
            )),
        }
    }

    /// Check the credentials with one token exchange
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let provider = TokenProvider::shared(&config);
        let token = provider.get_token().await?;
        info!(
            client_id = provider.client_id(),
            expires_at = ?token.expires_at,
            "Connection check succeeded"
        );
        Ok(())
    }

    async fn sync<W: Write>(
        &self,
        selection: Option<&str>,
        max_records: Option<usize>,
        out: W,
    ) -> Result<()> {
        let config = self.load_config()?;
        let selected = streams::select(selection)?;
        let sync = SyncLoop::from_config(&config)?;

        let mut emitter = Emitter::new(out);
        let stats = sync_streams(&sync, &selected, max_records, &mut emitter).await?;

        if stats.total_errors() > 0 {
            return Err(Error::Other(format!(
                "{} partition(s) failed; see log for details",
                stats.total_errors()
            )));
        }
        Ok(())
    }
}

/// Stream catalog with schemas and primary keys
pub fn catalog() -> Result<Value> {
    let entries = streams::all()
        .iter()
        .map(|stream| {
            Ok(json!({
                "stream": stream.name,
                "tap_stream_id": stream.name,
                "schema": stream.schema()?,
                "key_properties": stream.primary_keys,
            }))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(json!({ "streams": entries }))
}

/// Sync streams one after another into the emitter
///
/// Fatal errors abort the sync. Any other error ends only the partition it
/// came from; it is logged and counted in the returned stats.
pub async fn sync_streams<W: Write>(
    sync: &SyncLoop,
    selected: &[StreamDefinition],
    max_records: Option<usize>,
    emitter: &mut Emitter<W>,
) -> Result<SyncStats> {
    let started = Instant::now();
    let requests_before = sync.requests();
    let mut stats = SyncStats::new();

    for stream in selected {
        emitter.write_schema(stream)?;

        let mut written = 0usize;
        let mut records = sync.stream_records(stream);
        while let Some(item) = records.next().await {
            match item {
                Ok(record) => {
                    emitter.write_record(stream.name, record)?;
                    stats.add_record(stream.name);
                    written += 1;
                    if max_records.is_some_and(|max| written >= max) {
                        warn!(stream = stream.name, max = written, "Record limit reached");
                        break;
                    }
                }
                Err(e) if e.is_fatal() => {
                    error!(stream = stream.name, error = %e, "Sync aborted");
                    return Err(e);
                }
                Err(e) => {
                    error!(stream = stream.name, error = %e, "Continuing with next partition");
                    stats.add_error(stream.name);
                }
            }
        }
        emitter.flush()?;
    }

    stats.requests = sync.requests() - requests_before;
    stats.set_duration(started.elapsed().as_millis() as u64);
    info!(
        records = stats.total_records(),
        failed_partitions = stats.total_errors(),
        requests = stats.requests,
        duration_ms = stats.duration_ms,
        "Sync finished"
    );
    for (name, stream_stats) in &stats.streams {
        info!(
            stream = name.as_str(),
            records = stream_stats.records,
            failed_partitions = stream_stats.errors,
            "Stream summary"
        );
    }
    Ok(stats)
}

fn print_json<W: Write>(out: &mut W, value: &Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
