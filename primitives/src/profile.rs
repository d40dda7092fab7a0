//! Endpoint profiles describe how one family of remote endpoints expects its
//! requests to be shaped and how its responses should be interpreted.
//!
//! The Search Ad API uses different body keys (`item` vs `reportTp`),
//! different status vocabularies (`REGIST`/`RUNNING`/`BUILT`/`NONE`/`ERROR`
//! vs `QUEUED`/`COMPLETE`/`FAILED`) and different signature conventions for
//! different endpoint families, so all of these are configuration and a
//! single orchestrator serves every family.
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    period::DATE_FORMAT,
    report::{JobId, JobStatus, RemoteStatus},
    Period, ReportKind,
};

/// Which part of the request line is covered by the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureScope {
    /// Only the path, e.g. `/stats`
    Path,
    /// The path and the query string exactly as transmitted, e.g. `/stats?ids=1`
    PathAndQuery,
}

impl Default for SignatureScope {
    fn default() -> Self {
        Self::Path
    }
}

/// Profile of an asynchronous report job resource,
/// e.g. `/master-reports` or `/stat-reports`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportProfile {
    /// `POST {jobs_path}` creates a job and `GET {jobs_path}/{id}` polls it.
    pub jobs_path: String,
    /// Template of the creation body, every value can contain the
    /// `{kind}`, `{since}` and `{until}` placeholders.
    pub body: BTreeMap<String, String>,
    /// Format of the `{since}` and `{until}` placeholders.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Overrides the value sent for a [`ReportKind`], keyed by the kind's name.
    #[serde(default)]
    pub kinds: BTreeMap<String, String>,
    /// The remote status vocabulary mapped to [`JobStatus`].
    pub statuses: HashMap<String, JobStatus>,
    /// Candidate field names holding the job id, checked in order.
    #[serde(default = "default_id_fields")]
    pub id_fields: Vec<String>,
    #[serde(default = "default_status_field")]
    pub status_field: String,
    #[serde(default = "default_download_field")]
    pub download_field: String,
    #[serde(default)]
    pub signature: SignatureScope,
}

fn default_date_format() -> String {
    DATE_FORMAT.to_string()
}

fn default_id_fields() -> Vec<String> {
    vec!["id".to_string(), "reportJobId".to_string()]
}

fn default_status_field() -> String {
    "status".to_string()
}

fn default_download_field() -> String {
    "downloadUrl".to_string()
}

impl ReportProfile {
    /// The value sent to the remote for the given [`ReportKind`].
    pub fn kind_value(&self, kind: ReportKind) -> String {
        let name = kind.to_string();

        self.kinds.get(&name).cloned().unwrap_or(name)
    }

    /// Renders the job creation body from the template.
    pub fn render_body(&self, kind: ReportKind, period: &Period) -> Value {
        let kind_value = self.kind_value(kind);
        let since = period.since.format(&self.date_format).to_string();
        let until = period.until.format(&self.date_format).to_string();

        let body = self
            .body
            .iter()
            .map(|(key, template)| {
                let value = template
                    .replace("{kind}", &kind_value)
                    .replace("{since}", &since)
                    .replace("{until}", &until);

                (key.clone(), Value::String(value))
            })
            .collect::<Map<_, _>>();

        Value::Object(body)
    }

    /// The path of a single job resource, i.e. `{jobs_path}/{id}`
    pub fn job_path(&self, id: &JobId) -> String {
        format!("{}/{}", self.jobs_path.trim_end_matches('/'), id)
    }

    /// Finds the job id in a job resource, the first of the `id_fields` which
    /// holds a non-empty string or a number wins.
    pub fn job_id(&self, job: &Value) -> Option<JobId> {
        self.id_fields
            .iter()
            .find_map(|field| match job.get(field) {
                Some(Value::String(id)) if !id.is_empty() => Some(JobId::new(id.as_str())),
                Some(Value::Number(id)) => Some(JobId::new(id.to_string())),
                _ => None,
            })
    }

    /// The raw status string of a job resource.
    pub fn raw_status<'a>(&self, job: &'a Value) -> Option<&'a str> {
        job.get(&self.status_field).and_then(Value::as_str)
    }

    /// Maps a raw status to a [`JobStatus`], `None` if it's not part of the vocabulary.
    pub fn map_status(&self, raw: &str) -> Option<JobStatus> {
        self.statuses.get(raw).copied()
    }

    /// Reads and maps the status of a job resource.
    pub fn remote_status(&self, job: &Value) -> Option<RemoteStatus> {
        let raw = self.raw_status(job)?;

        self.map_status(raw).map(|status| RemoteStatus {
            raw: raw.to_string(),
            status,
        })
    }

    pub fn download_url(&self, job: &Value) -> Option<String> {
        job.get(&self.download_field)
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(ToString::to_string)
    }
}

/// Which nesting of the stats response is authoritative for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatsShape {
    /// `{ "data": [ {..}, {..} ] }` one row per requested id
    Data,
    /// `{ "summaryStat": { "data": [ {..} ] } }`
    SummaryStat,
    /// `{ "dailyStat": { "summary": {..} } }`
    DailyStatSummary,
}

/// Profile of the synchronous stats endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsProfile {
    #[serde(default = "default_stats_path")]
    pub path: String,
    #[serde(default = "default_stats_fields")]
    pub fields: Vec<String>,
    pub shape: StatsShape,
    #[serde(default)]
    pub signature: SignatureScope,
}

fn default_stats_path() -> String {
    "/stats".to_string()
}

fn default_stats_fields() -> Vec<String> {
    ["impCnt", "clkCnt", "salesAmt", "ctr", "cpc", "ccnt"]
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

/// Profile of the campaign listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignsProfile {
    #[serde(default = "default_campaigns_path")]
    pub path: String,
    #[serde(default)]
    pub signature: SignatureScope,
}

impl Default for CampaignsProfile {
    fn default() -> Self {
        Self {
            path: default_campaigns_path(),
            signature: SignatureScope::default(),
        }
    }
}

fn default_campaigns_path() -> String {
    "/ncc/campaigns".to_string()
}
