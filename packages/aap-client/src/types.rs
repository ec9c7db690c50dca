use serde::{Deserialize, Deserializer};

/// One page of the `/api/v2/jobs/` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct JobPage {
    pub results: Vec<JobRecord>,
    /// Link to the following page, `None` on the last page.
    pub next: Option<String>,
}

/// A job as returned by the listing endpoint.
///
/// Only the fields the report needs are kept. Text fields the controller
/// may send as `null` deserialize to empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub playbook: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(default)]
    pub started: Option<String>,
    #[serde(default)]
    pub finished: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub job_explanation: String,
    #[serde(default)]
    pub launched_by: Option<NamedRef>,
    #[serde(default)]
    pub summary_fields: SummaryFields,
}

/// Nested related-object summaries attached to each job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryFields {
    #[serde(default)]
    pub inventory: Option<NamedRef>,
    #[serde(default)]
    pub project: Option<NamedRef>,
    #[serde(default)]
    pub organization: Option<NamedRef>,
    #[serde(default)]
    pub user: Option<UserRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRef {
    #[serde(default)]
    pub username: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
