//! Batched fetch-and-summarize pipeline.
//!
//! Jobs are pulled from the listing one at a time and buffered. When the
//! buffer reaches the batch size, the whole batch goes through stdout fetch,
//! summarization and the sink before the listing is resumed. Only one batch
//! of stdout requests is ever in flight.

use std::mem;

use aap_client::{AapClient, JobRange, JobRecord};
use tracing::info;

use crate::error::{ReportError, Result};
use crate::report::ReportSink;
use crate::summary::{summarize, ReportRow};

/// Transient buffer that hands out fixed-size batches of jobs.
#[derive(Debug)]
pub struct Batcher {
    size: usize,
    buffer: Vec<JobRecord>,
}

impl Batcher {
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(ReportError::InvalidBatchSize);
        }
        Ok(Self {
            size,
            buffer: Vec::with_capacity(size),
        })
    }

    /// Buffer a job; returns the batch once it is full.
    pub fn push(&mut self, job: JobRecord) -> Option<Vec<JobRecord>> {
        self.buffer.push(job);
        if self.buffer.len() >= self.size {
            Some(mem::replace(&mut self.buffer, Vec::with_capacity(self.size)))
        } else {
            None
        }
    }

    /// Trailing partial batch, if any jobs are left.
    pub fn finish(&mut self) -> Option<Vec<JobRecord>> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(mem::take(&mut self.buffer))
        }
    }
}

/// Totals for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub jobs: usize,
    pub batches: usize,
    /// Jobs whose stdout could not be retrieved
    pub missing_logs: usize,
}

/// Run the whole report: list, batch, fetch, summarize, append.
///
/// Any listing, summarization or sink error aborts the run. Per-job stdout
/// failures do not; they show up as `ansible_failed` rows.
pub async fn run<S: ReportSink>(
    client: &AapClient,
    range: JobRange,
    batch_size: usize,
    sink: &mut S,
) -> Result<RunStats> {
    let mut batcher = Batcher::new(batch_size)?;
    let mut stats = RunStats::default();
    let mut jobs = client.iter_jobs(range)?;

    info!(
        start_id = ?range.start_id,
        end_id = ?range.end_id,
        batch_size,
        "Starting job report"
    );

    while let Some(job) = jobs.next().await? {
        if let Some(batch) = batcher.push(job) {
            flush(client, batch, sink, &mut stats).await?;
        }
    }
    if let Some(batch) = batcher.finish() {
        flush(client, batch, sink, &mut stats).await?;
    }

    info!(
        jobs = stats.jobs,
        batches = stats.batches,
        missing_logs = stats.missing_logs,
        pages = jobs.pages_fetched(),
        "Job report complete"
    );

    Ok(stats)
}

async fn flush<S: ReportSink>(
    client: &AapClient,
    batch: Vec<JobRecord>,
    sink: &mut S,
    stats: &mut RunStats,
) -> Result<()> {
    let ids: Vec<i64> = batch.iter().map(|job| job.id).collect();
    let logs = client.fetch_stdout_bulk(&ids).await;

    let rows = batch
        .iter()
        .map(|job| summarize(job, logs.get(&job.id).map(String::as_str).unwrap_or_default()))
        .collect::<Result<Vec<ReportRow>>>()?;
    sink.append(&rows)?;

    let missing = rows.iter().filter(|row| row.ansible_failed).count();
    stats.jobs += rows.len();
    stats.batches += 1;
    stats.missing_logs += missing;

    info!(
        batch = stats.batches,
        first_id = ?ids.first(),
        last_id = ?ids.last(),
        jobs = rows.len(),
        missing_logs = missing,
        "Batch written"
    );

    Ok(())
}
