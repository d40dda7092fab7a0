use primitives::{config::ConfigError, period::PeriodError};
use thiserror::Error;

use crate::{report_job, searchad_interface};

/// Every failure of the worker, as reported by its callers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config: {0}")]
    Config(#[from] ConfigError),
    #[error("Credentials: {0}")]
    Credentials(#[from] adapter::Error),
    #[error("Period: {0}")]
    Period(#[from] PeriodError),
    #[error("SearchAdApi: {0}")]
    SearchAdApi(#[from] searchad_interface::Error),
    #[error("ReportJob: {0}")]
    ReportJob(#[from] report_job::Error),
}
