//! Asynchronous report jobs of the Search Ad API.
//!
//! A report job is created on the remote system with a single `POST` and then
//! observed through polling until it reaches a terminal [`JobStatus`].
//! Nothing about a job is persisted locally, a [`ReportJob`] lives only as long
//! as the poll loop that observes it.
use std::fmt;

use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

use crate::Period;

/// The kind of report that should be built by the remote system.
///
/// The value sent to the API is the variant name, unless the endpoint profile
/// overrides it (see [`ReportProfile::kinds`](crate::profile::ReportProfile::kinds)).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, FromStr,
)]
pub enum ReportKind {
    Campaign,
    Adgroup,
    Keyword,
    Ad,
    CampaignPerformance,
    AdgroupPerformance,
    KeywordPerformance,
}

/// The status of a job, as mapped from the remote's own vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, FromStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[display(style = "SNAKE_CASE")]
pub enum JobStatus {
    /// Queued or running, the job should be polled again.
    Pending,
    /// Terminal: the report is built and can be downloaded.
    Succeeded,
    /// Terminal: the remote failed to build the report.
    Failed,
    /// Terminal: the job completed, but there is no data for the period.
    Empty,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// A status observed on the remote, both in its raw form and mapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteStatus {
    pub raw: String,
    pub status: JobStatus,
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.raw, self.status)
    }
}

/// The opaque identifier assigned by the remote system to a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A job which was successfully submitted to the remote system.
///
/// It is intentionally not `Clone`: polling consumes it, so the same job
/// can not be observed by two different poll loops.
#[derive(Debug, PartialEq, Eq)]
pub struct ReportJob {
    pub id: JobId,
    pub kind: ReportKind,
    pub period: Period,
    /// The status returned with the submission response, if any was recognized.
    pub status: Option<RemoteStatus>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn job_status_vocabulary() {
        assert_eq!("PENDING", JobStatus::Pending.to_string());
        assert_eq!("SUCCEEDED", JobStatus::Succeeded.to_string());
        assert_eq!(Ok(JobStatus::Empty), "EMPTY".parse::<JobStatus>());

        let from_json: JobStatus =
            serde_json::from_value(serde_json::json!("FAILED")).expect("Should deserialize");
        assert_eq!(JobStatus::Failed, from_json);

        assert!(!JobStatus::Pending.is_terminal());
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Empty.is_terminal());
    }

    #[test]
    fn report_kind_names() {
        assert_eq!("CampaignPerformance", ReportKind::CampaignPerformance.to_string());
        assert_eq!(Ok(ReportKind::Campaign), "Campaign".parse::<ReportKind>());
        assert!("campaign".parse::<ReportKind>().is_err());
    }
}
