//! Testing utilities shared by the crates of the workspace.
use std::{collections::HashMap, time::Duration};

use once_cell::sync::Lazy;
use slog::{o, Discard, Logger};

use crate::{
    config::{Config, PRODUCTION_CONFIG},
    profile::{ReportProfile, SignatureScope},
    report::JobStatus,
    util::ApiUrl,
};

pub const DUMMY_API_KEY: &str = "0100000000d1c7a0c59ff3fd3b8f7a8e0e15b0b3";
pub const DUMMY_CUSTOMER_ID: &str = "1234567";
pub const DUMMY_SECRET_KEY: &str = "AQAAAADRx6DFn/P9O496jg4VsLPz8vj+Ls8ZV2FZIUK+1U0ozg==";

/// A report profile with the status vocabulary used by the examples of the API documentation:
/// `QUEUED`/`REGIST`/`RUNNING` are pending, `BUILT` succeeded, `NONE` empty and `ERROR` failed.
pub static DUMMY_REPORT_PROFILE: Lazy<ReportProfile> = Lazy::new(|| {
    let statuses = [
        ("QUEUED", JobStatus::Pending),
        ("REGIST", JobStatus::Pending),
        ("RUNNING", JobStatus::Pending),
        ("BUILT", JobStatus::Succeeded),
        ("NONE", JobStatus::Empty),
        ("ERROR", JobStatus::Failed),
    ]
    .into_iter()
    .map(|(raw, status)| (raw.to_string(), status))
    .collect::<HashMap<_, _>>();

    ReportProfile {
        jobs_path: "/report-jobs".to_string(),
        body: [
            ("reportTp".to_string(), "{kind}".to_string()),
            ("since".to_string(), "{since}".to_string()),
            ("until".to_string(), "{until}".to_string()),
        ]
        .into_iter()
        .collect(),
        date_format: "%Y-%m-%d".to_string(),
        kinds: Default::default(),
        statuses,
        id_fields: vec!["id".to_string(), "reportJobId".to_string()],
        status_field: "status".to_string(),
        download_field: "downloadUrl".to_string(),
        signature: SignatureScope::Path,
    }
});

/// A [`Logger`] that discards all the records
pub fn discard_logger() -> Logger {
    Logger::root(Discard, o!())
}

/// The production [`Config`] pointed at the given (mock) server,
/// with short timeouts & intervals suitable for tests.
pub fn test_config(base_url: &str) -> Config {
    let mut config = PRODUCTION_CONFIG.clone();

    config.base_url = base_url.parse::<ApiUrl>().expect("Should be a valid ApiUrl");
    config.fetch_timeout = Duration::from_secs(2);
    config.request_delay = Duration::from_millis(1);
    config.report_job.max_attempts = 5;
    config.report_job.poll_interval = Duration::from_millis(5);

    config
}
