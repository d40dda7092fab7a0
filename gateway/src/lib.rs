#![deny(clippy::all)]
#![deny(rust_2018_idioms)]
//! The HTTP endpoints in front of the report worker.
//!
//! Every request carries the credentials of the Search Ad account it is made for,
//! nothing is kept between requests.

use std::sync::Arc;

use adapter::Credentials;
use axum::{handler::Handler, middleware::from_fn, routing::post, Extension, Router};
use primitives::Config;
use report_worker::SearchAdApi;
use slog::Logger;

use crate::{
    middleware::cors::cors,
    response::ResponseError,
    routes::{
        report::get_campaigns,
        stats::{compare_monthly_stats, get_campaign_stats},
    },
};

pub mod application;
pub mod middleware;
pub mod request;
pub mod response;

pub mod routes {
    pub mod report;
    pub mod stats;
}

#[cfg(test)]
pub(crate) mod test_util;

#[derive(Debug, Clone)]
pub struct Application {
    pub config: Config,
    pub logger: Logger,
}

impl Application {
    pub fn new(config: Config, logger: Logger) -> Self {
        Self { config, logger }
    }

    /// A client of the Search Ad API for the account of the request.
    pub fn api(&self, credentials: Credentials) -> Result<SearchAdApi, ResponseError> {
        Ok(SearchAdApi::from_config(
            &self.config,
            credentials,
            self.logger.clone(),
        )?)
    }
}

async fn not_found() -> ResponseError {
    ResponseError::NotFound
}

/// All the gateway routes, `OPTIONS` requests to any path are answered by the [`cors`] middleware.
pub fn router(app: Arc<Application>) -> Router {
    Router::new()
        .route("/api/get-campaigns", post(get_campaigns))
        .route("/api/get-campaign-stats", post(get_campaign_stats))
        .route("/api/compare-monthly-stats", post(compare_monthly_stats))
        .fallback(not_found.into_service())
        .layer(from_fn(cors))
        .layer(Extension(app))
}
