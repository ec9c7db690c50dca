//! AAP job report generation.
//!
//! Lists jobs from an AAP controller, downloads the tail of each job's stdout
//! in concurrent batches, parses the play recap into per-host outcome counts
//! and appends one CSV row per job.
//!
//! ```rust,ignore
//! use aap_client::{AapClient, JobRange};
//! use job_report::{config, pipeline, ReportWriter};
//!
//! let client = AapClient::new(config::load(&config::expand_home("~/.config.yml"))?)?;
//! let mut writer = ReportWriter::create("report.csv")?;
//! let stats = pipeline::run(&client, JobRange::new(Some(100), None), 20, &mut writer).await?;
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod summary;

pub use error::{ReportError, Result};
pub use pipeline::{Batcher, RunStats};
pub use report::{ReportSink, ReportWriter, COLUMNS};
pub use summary::{parse_recap, summarize, HostOutcomeCounts, ReportRow};
