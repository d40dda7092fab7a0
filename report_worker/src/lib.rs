#![deny(rust_2018_idioms)]
#![deny(clippy::all)]
//! Report jobs & stats of the Search Ad API.
//!
//! - [`SearchAdApi`] - the signed HTTP client
//! - [`ReportJobs`] - submission & polling of asynchronous report jobs
//! - [`stats`] - campaign stats per period and period comparisons

pub use self::{
    error::Error,
    report_job::{JobResult, ReportJobs},
    searchad_interface::SearchAdApi,
};

pub mod error;
pub mod report_job;
pub mod searchad_interface;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_util;
