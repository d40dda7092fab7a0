//! Submits report jobs and polls them until they reach a terminal status.
//!
//! Each poll attempt waits for the poll interval first, then issues a freshly
//! signed `GET` for the job. Transient failures consume an attempt, everything
//! else either terminates the loop with a [`JobResult`] or aborts it with an [`Error`].
use std::time::Duration;

use primitives::{
    config::ReportJobConfig, profile::ReportProfile, JobId, JobStatus, Period, RemoteStatus,
    ReportJob, ReportKind,
};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use slog::{debug, error, info, warn, Logger};
use thiserror::Error;

use crate::searchad_interface::{Error as ApiError, SearchAdApi};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("the remote rejected the job with {status}: {body}")]
    Rejected { status: StatusCode, body: Value },
    #[error("no job id in the response: {body}")]
    MissingJobId { body: Value },
    #[error("unparsable response: {body}")]
    Unparsable { body: Value },
    #[error(transparent)]
    Api(ApiError),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration: {0}")]
    Configuration(#[from] adapter::Error),
    /// Submissions are never retried, no job exists on the remote.
    #[error("Submitting report job: {0}")]
    Submission(#[source] SubmissionError),
    #[error("Polling report job {job_id} was rejected with {status}: {body}")]
    PollRejected {
        job_id: JobId,
        status: StatusCode,
        body: Value,
    },
    #[error("Polling report job: {0}")]
    Api(#[source] ApiError),
    #[error("Report job {job_id} did not finish after {attempts} attempts, last status: {}", last_status_display(.last_status))]
    Timeout {
        job_id: JobId,
        last_status: Option<RemoteStatus>,
        attempts: u32,
    },
    #[error("Report job {job_id} failed: {detail}")]
    RemoteFailed { job_id: JobId, detail: Value },
}

fn last_status_display(last_status: &Option<RemoteStatus>) -> String {
    last_status
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

/// The terminal outcome of polling a [`ReportJob`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum JobResult {
    #[serde(rename_all = "camelCase")]
    Success {
        job_id: JobId,
        download_url: String,
        status: RemoteStatus,
    },
    /// The job completed, but there is no data for the requested period.
    #[serde(rename_all = "camelCase")]
    Empty { job_id: JobId, status: RemoteStatus },
    /// `detail` holds the raw job resource, or a description of the unrecognized status.
    #[serde(rename_all = "camelCase")]
    Failed { job_id: JobId, detail: Value },
    /// The attempts were exhausted while the job was still not terminal.
    #[serde(rename_all = "camelCase")]
    TimedOut {
        job_id: JobId,
        last_status: Option<RemoteStatus>,
        attempts: u32,
    },
}

impl JobResult {
    pub fn job_id(&self) -> &JobId {
        match self {
            JobResult::Success { job_id, .. }
            | JobResult::Empty { job_id, .. }
            | JobResult::Failed { job_id, .. }
            | JobResult::TimedOut { job_id, .. } => job_id,
        }
    }

    /// - `Ok(Some(url))` when the report was built
    /// - `Ok(None)` when there is no data
    /// - [`Error::RemoteFailed`] or [`Error::Timeout`] otherwise
    pub fn into_download_url(self) -> Result<Option<String>, Error> {
        match self {
            JobResult::Success { download_url, .. } => Ok(Some(download_url)),
            JobResult::Empty { .. } => Ok(None),
            JobResult::Failed { job_id, detail } => Err(Error::RemoteFailed { job_id, detail }),
            JobResult::TimedOut {
                job_id,
                last_status,
                attempts,
            } => Err(Error::Timeout {
                job_id,
                last_status,
                attempts,
            }),
        }
    }
}

/// Report jobs of a single endpoint profile.
#[derive(Debug, Clone)]
pub struct ReportJobs {
    api: SearchAdApi,
    profile: ReportProfile,
    max_attempts: u32,
    poll_interval: Duration,
}

impl ReportJobs {
    pub fn new(api: SearchAdApi, profile: ReportProfile, policy: &ReportJobConfig) -> Self {
        Self {
            api,
            profile,
            max_attempts: policy.max_attempts,
            poll_interval: policy.poll_interval,
        }
    }

    fn logger(&self) -> &Logger {
        &self.api.logger
    }

    pub fn profile(&self) -> &ReportProfile {
        &self.profile
    }

    /// Creates the job on the remote with a single signed `POST`.
    pub async fn submit(&self, kind: ReportKind, period: Period) -> Result<ReportJob, Error> {
        let body = self.profile.render_body(kind, &period);

        let response = match self.api.create_report_job(&self.profile, &body).await {
            Ok(response) => response,
            Err(ApiError::Signing(err)) => return Err(Error::Configuration(err)),
            Err(ApiError::Status { status, body }) => {
                error!(self.logger(), "Report job submission was rejected"; "status" => status.as_u16(), "body" => %body);

                return Err(Error::Submission(SubmissionError::Rejected { status, body }));
            }
            Err(ApiError::Decode { source, body }) => {
                error!(self.logger(), "Report job submission response is unparsable"; "error" => %source, "body" => %body);

                return Err(Error::Submission(SubmissionError::Unparsable { body }));
            }
            Err(err) => return Err(Error::Submission(SubmissionError::Api(err))),
        };

        let id = match self.profile.job_id(&response) {
            Some(id) => id,
            None => {
                return Err(Error::Submission(SubmissionError::MissingJobId {
                    body: response,
                }))
            }
        };
        let status = self.profile.remote_status(&response);

        info!(self.logger(), "Submitted report job"; "job" => %id, "kind" => %kind, "period" => %period);

        Ok(ReportJob {
            id,
            kind,
            period,
            status,
        })
    }

    /// Polls the job at most `max_attempts` times, waiting `interval` before every attempt.
    pub async fn poll_until_terminal(
        &self,
        job: ReportJob,
        max_attempts: u32,
        interval: Duration,
    ) -> Result<JobResult, Error> {
        let ReportJob {
            id: job_id,
            status: mut last_status,
            ..
        } = job;

        for attempt in 1..=max_attempts {
            tokio::time::sleep(interval).await;

            let resource = match self.api.get_report_job(&self.profile, &job_id).await {
                Ok(resource) => resource,
                Err(ApiError::Signing(err)) => return Err(Error::Configuration(err)),
                Err(err) if err.is_transient() => {
                    warn!(self.logger(), "Polling report job failed, retrying"; "job" => %job_id, "attempt" => attempt, "error" => %err);
                    continue;
                }
                Err(ApiError::Status { status, body }) => {
                    error!(self.logger(), "Polling report job was rejected"; "job" => %job_id, "status" => status.as_u16());

                    return Err(Error::PollRejected {
                        job_id,
                        status,
                        body,
                    });
                }
                Err(err) => return Err(Error::Api(err)),
            };

            let raw = match self.profile.raw_status(&resource) {
                Some(raw) => raw.to_string(),
                None => {
                    warn!(self.logger(), "Report job without a status"; "job" => %job_id, "attempt" => attempt);
                    continue;
                }
            };

            let status = match self.profile.map_status(&raw) {
                Some(status) => RemoteStatus { raw, status },
                None => {
                    error!(self.logger(), "Unrecognized report job status"; "job" => %job_id, "status" => &raw);

                    return Ok(JobResult::Failed {
                        job_id,
                        detail: json!({
                            "error": format!("Unrecognized report job status: {raw}"),
                            "job": resource,
                        }),
                    });
                }
            };

            debug!(self.logger(), "Polled report job"; "job" => %job_id, "attempt" => attempt, "status" => %status);

            match status.status {
                JobStatus::Pending => last_status = Some(status),
                JobStatus::Succeeded => {
                    let result = match self.profile.download_url(&resource) {
                        Some(download_url) => JobResult::Success {
                            job_id,
                            download_url,
                            status,
                        },
                        None => JobResult::Failed {
                            job_id,
                            detail: json!({
                                "error": "Report job succeeded without a download url",
                                "job": resource,
                            }),
                        },
                    };

                    return Ok(result);
                }
                JobStatus::Empty => return Ok(JobResult::Empty { job_id, status }),
                JobStatus::Failed => {
                    return Ok(JobResult::Failed {
                        job_id,
                        detail: resource,
                    })
                }
            }
        }

        warn!(self.logger(), "Report job did not finish in time"; "job" => %job_id, "attempts" => max_attempts);

        Ok(JobResult::TimedOut {
            job_id,
            last_status,
            attempts: max_attempts,
        })
    }

    /// Submits the job and polls it with the configured policy.
    ///
    /// The job is always polled, even when the submission response already carries a status.
    pub async fn run(&self, kind: ReportKind, period: Period) -> Result<JobResult, Error> {
        let job = self.submit(kind, period).await?;

        self.poll_until_terminal(job, self.max_attempts, self.poll_interval)
            .await
    }
}
