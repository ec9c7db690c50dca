//! Job summarization: play recap parsing and report row construction.

use aap_client::JobRecord;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::{ReportError, Result};

lazy_static! {
    // host : ok=N changed=N unreachable=N failed=N skipped=N rescued=N ignored=N
    static ref RECAP_LINE: Regex = Regex::new(
        r"^(\S+)\s*:.*ok=(\d+)\s+changed=\d+\s+unreachable=(\d+)\s+failed=(\d+)\s+skipped=(\d+)\s+rescued=(\d+)\s+ignored=(\d+)"
    ).unwrap();
}

/// User shown when the job records neither a launcher nor a user.
const UNKNOWN_USER: &str = "N/A";

/// Per-job aggregate of host outcomes from the play recap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostOutcomeCounts {
    pub total_hosts: u32,
    pub success: u32,
    pub unreachable: u32,
    pub failed: u32,
    pub skipped: u32,
    pub rescued: u32,
    pub ignored: u32,
}

impl HostOutcomeCounts {
    /// Account for one recap line.
    ///
    /// Each host lands in at most one of unreachable, failed, success (in that
    /// priority). Skipped only counts hosts that did nothing but skip.
    fn record(&mut self, ok: u64, unreachable: u64, failed: u64, skipped: u64, rescued: u64, ignored: u64) {
        self.total_hosts += 1;

        if unreachable > 0 {
            self.unreachable += 1;
        } else if failed > 0 {
            self.failed += 1;
        } else if ok > 0 {
            self.success += 1;
        }

        if skipped > 0 && ok == 0 && unreachable == 0 && failed == 0 {
            self.skipped += 1;
        }
        if rescued > 0 {
            self.rescued += 1;
        }
        if ignored > 0 {
            self.ignored += 1;
        }
    }
}

/// Count host outcomes from the recap lines of a stdout tail.
///
/// Lines that are not recap lines are ignored.
pub fn parse_recap(stdout: &str) -> HostOutcomeCounts {
    let mut counts = HostOutcomeCounts::default();

    for line in stdout.lines() {
        let Some(caps) = RECAP_LINE.captures(line) else {
            continue;
        };

        // digits only, so a failed parse means overflow; saturate
        let field = |i: usize| caps[i].parse::<u64>().unwrap_or(u64::MAX);

        counts.record(field(2), field(3), field(4), field(5), field(6), field(7));
    }

    counts
}

/// One CSV row. Field order is the column order of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub id: i64,
    pub name: String,
    pub playbook: String,
    pub description: String,
    pub inventory: Option<String>,
    pub project: Option<String>,
    pub date: String,
    pub time: String,
    pub organization: Option<String>,
    pub exe_user: String,
    pub total_hosts: u32,
    pub success: u32,
    pub unreachable: u32,
    pub failed: u32,
    pub skipped: u32,
    pub rescued: u32,
    pub ignored: u32,
    pub canceled: bool,
    pub inventory_failed: bool,
    pub project_failed: bool,
    pub ansible_failed: bool,
}

/// Build the report row for one job from its metadata and stdout tail.
///
/// An empty `stdout` means the log could not be retrieved and marks the row
/// as `ansible_failed`.
pub fn summarize(job: &JobRecord, stdout: &str) -> Result<ReportRow> {
    let meta = &job.summary_fields;
    let (date, time) = split_timestamp(job)?;
    let counts = parse_recap(stdout);

    Ok(ReportRow {
        id: job.id,
        name: job.name.clone(),
        playbook: job.playbook.clone(),
        description: job.description.clone(),
        inventory: meta.inventory.as_ref().and_then(|r| r.name.clone()),
        project: meta.project.as_ref().and_then(|r| r.name.clone()),
        date,
        time,
        organization: meta.organization.as_ref().and_then(|r| r.name.clone()),
        exe_user: executing_user(job),
        total_hosts: counts.total_hosts,
        success: counts.success,
        unreachable: counts.unreachable,
        failed: counts.failed,
        skipped: counts.skipped,
        rescued: counts.rescued,
        ignored: counts.ignored,
        canceled: job.status == "canceled",
        inventory_failed: job.job_explanation.contains("inventory_update"),
        project_failed: job.job_explanation.contains("project_update"),
        ansible_failed: stdout.is_empty(),
    })
}

/// `finished`, else `started`, split into `YYYY-MM-DD` and `HH:MM:SS`.
fn split_timestamp(job: &JobRecord) -> Result<(String, String)> {
    let value = [job.finished.as_deref(), job.started.as_deref()]
        .into_iter()
        .flatten()
        .find(|ts| !ts.is_empty())
        .ok_or_else(|| ReportError::MalformedTimestamp {
            job_id: job.id,
            value: String::new(),
        })?;

    let (date, time) = value
        .split_once('T')
        .ok_or_else(|| ReportError::MalformedTimestamp {
            job_id: job.id,
            value: value.to_string(),
        })?;

    // drop fractional seconds and zone suffix
    Ok((date.to_string(), time.chars().take(8).collect()))
}

fn executing_user(job: &JobRecord) -> String {
    job.launched_by
        .as_ref()
        .and_then(|l| l.name.as_deref())
        .filter(|name| !name.is_empty())
        .or_else(|| {
            job.summary_fields
                .user
                .as_ref()
                .and_then(|u| u.username.as_deref())
                .filter(|name| !name.is_empty())
        })
        .unwrap_or(UNKNOWN_USER)
        .to_string()
}
