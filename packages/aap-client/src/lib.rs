//! Pure Ansible Automation Platform (AAP) REST API client.
//!
//! A minimal client for the AAP controller API. Lists jobs page by page and
//! downloads the tail of job stdout concurrently.
//!
//! # Example
//!
//! ```rust,ignore
//! use aap_client::{AapClient, AapConfig, JobRange};
//!
//! let client = AapClient::new(AapConfig::new("https://aap.example.com", token))?;
//!
//! let mut jobs = client.iter_jobs(JobRange::new(Some(100), Some(200)))?;
//! while let Some(job) = jobs.next().await? {
//!     println!("{} {}", job.id, job.name);
//! }
//!
//! let logs = client.fetch_stdout_bulk(&[100, 101, 102]).await;
//! ```

pub mod config;
pub mod error;
pub mod jobs;
pub mod types;

pub use config::AapConfig;
pub use error::{AapError, Result};
pub use jobs::{JobLister, JobRange};
pub use types::{JobPage, JobRecord, NamedRef, SummaryFields, UserRef};

use std::collections::HashMap;

use futures::future::join_all;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use tracing::{debug, warn};
use url::Url;

const JOB_PAGE: &str = "/api/v2/jobs/";

/// Number of trailing stdout lines requested per job; enough for the play recap.
const STDOUT_TAIL_LINES: u32 = 100;

const DEFAULT_PAGE_SIZE: u32 = 100;

/// Lists jobs synchronously page by page; downloads stdout concurrently.
#[derive(Clone)]
pub struct AapClient {
    http_client: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl AapClient {
    /// Build a client with bearer auth and gzip accepted on every request.
    pub fn new(config: AapConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(AapError::Config("base URL is empty".into()));
        }
        Url::parse(&config.base_url)?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.expose_secret()))
            .map_err(|_| AapError::Config("token is not a valid header value".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        // gzip(true) sends `Accept-Encoding: gzip` and decodes transparently
        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .gzip(true)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Set the listing page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Iterate every job inside `range`, letting the server do the id filtering.
    ///
    /// Nothing is requested until the first call to [`JobLister::next`].
    pub fn iter_jobs(&self, range: JobRange) -> Result<JobLister<'_>> {
        Ok(JobLister::new(self, self.jobs_url(range)?))
    }

    /// First listing page URL: `page_size`, then `id__gte` / `id__lte` only for given bounds.
    pub fn jobs_url(&self, range: JobRange) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, JOB_PAGE))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page_size", &self.page_size.to_string());
            if let Some(start_id) = range.start_id {
                query.append_pair("id__gte", &start_id.to_string());
            }
            if let Some(end_id) = range.end_id {
                query.append_pair("id__lte", &end_id.to_string());
            }
        }
        Ok(url)
    }

    /// Tail-only plain-text stdout URL for one job.
    pub fn stdout_url(&self, job_id: i64) -> String {
        format!(
            "{}/api/v2/jobs/{}/stdout/?format=txt&start_line=-{}",
            self.base_url, job_id, STDOUT_TAIL_LINES
        )
    }

    /// Resolve a `next` link. The controller sends server-relative paths;
    /// absolute URLs are used verbatim.
    pub(crate) fn resolve_link(&self, link: &str) -> Result<Url> {
        if link.starts_with("http://") || link.starts_with("https://") {
            Ok(Url::parse(link)?)
        } else {
            Ok(Url::parse(&format!("{}{}", self.base_url, link))?)
        }
    }

    /// Fetch one listing page. Any non-2xx status is an error.
    pub async fn get_job_page(&self, url: Url) -> Result<JobPage> {
        let resp = self.http_client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AapError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }

    /// Fetch the stdout tail of one job.
    ///
    /// Anything other than a 200 with a readable body yields an empty string.
    pub async fn fetch_stdout(&self, job_id: i64) -> String {
        let resp = match self.http_client.get(self.stdout_url(job_id)).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(job_id, error = %e, "Stdout request failed");
                return String::new();
            }
        };

        let status = resp.status();
        if status != StatusCode::OK {
            warn!(job_id, status = %status, "Stdout unavailable");
            return String::new();
        }

        match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(job_id, error = %e, "Failed to read stdout body");
                String::new()
            }
        }
    }

    /// Fetch stdout for every id at once and wait for all of them.
    ///
    /// Returns exactly one entry per distinct id; a failed fetch maps to an
    /// empty string and never affects the other requests.
    pub async fn fetch_stdout_bulk(&self, job_ids: &[i64]) -> HashMap<i64, String> {
        let start = std::time::Instant::now();

        let futures: Vec<_> = job_ids
            .iter()
            .map(|&job_id| async move { (job_id, self.fetch_stdout(job_id).await) })
            .collect();
        let logs: HashMap<i64, String> = join_all(futures).await.into_iter().collect();

        debug!(
            requested = job_ids.len(),
            empty = logs.values().filter(|log| log.is_empty()).count(),
            duration_ms = start.elapsed().as_millis(),
            "Fetched stdout batch"
        );

        logs
    }
}
