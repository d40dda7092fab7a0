#![deny(rust_2018_idioms)]
#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use self::{
    campaign::Campaign,
    config::Config,
    period::Period,
    report::{JobId, JobStatus, RemoteStatus, ReportJob, ReportKind},
    stats::{StatRow, StatTotals},
};

pub mod campaign;
pub mod config;
pub mod period;
pub mod profile;
pub mod report;
pub mod stats;

pub mod util {
    pub use api::ApiUrl;

    pub mod api;

    pub mod logging;
}

#[cfg(any(test, feature = "test-util"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub mod test_util;
