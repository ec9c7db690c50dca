//! Forward-only cursor over the paginated job listing.

use std::collections::VecDeque;

use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::types::JobRecord;
use crate::AapClient;

/// Inclusive job id bounds. An omitted bound leaves that side unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobRange {
    pub start_id: Option<i64>,
    pub end_id: Option<i64>,
}

impl JobRange {
    pub fn new(start_id: Option<i64>, end_id: Option<i64>) -> Self {
        Self { start_id, end_id }
    }
}

/// Pull-based iterator over jobs, one page request in flight at a time.
///
/// Holds only the current page buffer and the link to the next page. Every
/// record of a page is handed out before the next page is requested, and no
/// page is ever requested twice.
pub struct JobLister<'a> {
    client: &'a AapClient,
    buffer: VecDeque<JobRecord>,
    next_url: Option<Url>,
    pages: usize,
}

impl<'a> JobLister<'a> {
    pub(crate) fn new(client: &'a AapClient, first_page: Url) -> Self {
        Self {
            client,
            buffer: VecDeque::new(),
            next_url: Some(first_page),
            pages: 0,
        }
    }

    /// Next job, or `None` once the last page is exhausted.
    ///
    /// A failed page request is returned as an error and ends the listing.
    pub async fn next(&mut self) -> Result<Option<JobRecord>> {
        loop {
            if let Some(job) = self.buffer.pop_front() {
                return Ok(Some(job));
            }

            let Some(url) = self.next_url.take() else {
                return Ok(None);
            };

            let client = self.client;
            let page = client.get_job_page(url).await?;
            self.pages += 1;
            debug!(
                page = self.pages,
                count = page.results.len(),
                has_next = page.next.is_some(),
                "Fetched job page"
            );

            self.next_url = page
                .next
                .as_deref()
                .map(|next| client.resolve_link(next))
                .transpose()?;
            self.buffer.extend(page.results);
        }
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }
}
