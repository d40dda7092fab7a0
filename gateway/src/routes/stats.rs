//! `POST /api/get-campaign-stats` and `POST /api/compare-monthly-stats`
use std::sync::Arc;

use axum::{body::Bytes, response::Response, Extension};
use primitives::{Period, StatTotals};
use report_worker::stats::{campaign_stats, compare_periods, CampaignStats};
use serde::Serialize;
use serde_json::{json, Value};
use slog::info;

use crate::{
    request::{RequestBody, MONTHLY_COMPARISON, MONTHLY_STATS},
    response::{success_response, ResponseError},
    Application,
};

/// The period as shown to the caller of the gateway.
fn period_json(period: &Period) -> Value {
    json!({
        "year": period.year(),
        "month": period.month_number(),
        "startDate": period.since,
        "endDate": period.until,
        "dateRange": period.to_string(),
    })
}

/// A flat row per campaign.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CampaignRow {
    campaign_id: String,
    campaign_name: String,
    #[serde(flatten)]
    stats: StatTotals,
}

impl From<CampaignStats> for CampaignRow {
    fn from(campaign: CampaignStats) -> Self {
        Self {
            campaign_id: campaign.campaign_id,
            campaign_name: campaign.campaign_name,
            stats: campaign.stats,
        }
    }
}

pub async fn get_campaign_stats(
    Extension(app): Extension<Arc<Application>>,
    body: Bytes,
) -> Result<Response, ResponseError> {
    let request = RequestBody::parse(&body)?;
    request.require(MONTHLY_STATS)?;
    let period = request.required_month("year", "month")?;

    let api = app.api(request.credentials()?)?;
    info!(&app.logger, "Campaign stats"; "customer" => api.customer_id(), "period" => %period);

    let report = campaign_stats(&api, &app.config, period).await?;
    let campaigns = report
        .campaigns
        .into_iter()
        .map(CampaignRow::from)
        .collect::<Vec<_>>();

    Ok(success_response(json!({
        "success": true,
        "period": period_json(&report.period),
        "campaigns": campaigns,
        "totalCost": report.totals.cost,
        "totalClicks": report.totals.clicks,
        "totalImpressions": report.totals.impressions,
    })))
}

pub async fn compare_monthly_stats(
    Extension(app): Extension<Arc<Application>>,
    body: Bytes,
) -> Result<Response, ResponseError> {
    let request = RequestBody::parse(&body)?;
    request.require(MONTHLY_COMPARISON)?;
    let before = request.required_month("year1", "month1")?;
    let after = request.required_month("year2", "month2")?;

    let api = app.api(request.credentials()?)?;
    info!(&app.logger, "Comparing monthly stats"; "customer" => api.customer_id(), "before" => %before, "after" => %after);

    let comparison = compare_periods(&api, &app.config, before, after).await?;

    Ok(success_response(json!({
        "success": true,
        "period1": period_json(&comparison.before_period),
        "period2": period_json(&comparison.after_period),
        "campaigns": comparison.campaigns,
        "totals1": comparison.totals_before,
        "totals2": comparison.totals_after,
        "changes": comparison.changes,
    })))
}

#[cfg(test)]
mod test {
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;
    use primitives::test_util::{DUMMY_API_KEY, DUMMY_CUSTOMER_ID, DUMMY_SECRET_KEY};
    use tower::ServiceExt;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::test_util::{body_to_json, json_request, setup_router};

    async fn mount_campaigns(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/ncc/campaigns"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"nccCampaignId": "cmp-1", "name": "Brand"}
            ])))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_summary(server: &MockServer, since: &str, summary: Value) {
        Mock::given(method("GET"))
            .and(path("/stats"))
            .and(query_param("ids", "cmp-1"))
            .and(query_param(
                "timeRange",
                json!({"since": since, "until": "2024-01-31"}).to_string(),
            ))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"summaryStat": {"data": [summary]}})),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn monthly_campaign_stats() {
        let server = MockServer::start().await;
        mount_campaigns(&server).await;
        mount_summary(
            &server,
            "2024-01-01",
            json!({"impCnt": 2000, "clkCnt": 40, "salesAmt": 20000}),
        )
        .await;

        let request = json_request(
            "/api/get-campaign-stats",
            &json!({
                "customerId": DUMMY_CUSTOMER_ID,
                "apiKey": DUMMY_API_KEY,
                "secretKey": DUMMY_SECRET_KEY,
                "year": "2024",
                "month": "1",
            }),
        );
        let response = setup_router(&server)
            .oneshot(request)
            .await
            .expect("Infallible");

        assert_eq!(StatusCode::OK, response.status());
        let body = body_to_json(response).await;
        assert_eq!(json!(true), body["success"]);
        assert_eq!(
            json!({
                "year": 2024,
                "month": 1,
                "startDate": "2024-01-01",
                "endDate": "2024-01-31",
                "dateRange": "2024-01-01 ~ 2024-01-31"
            }),
            body["period"]
        );
        assert_eq!(json!("Brand"), body["campaigns"][0]["campaignName"]);
        assert_eq!(json!(500), body["campaigns"][0]["cpc"]);
        assert_eq!(json!(20000), body["totalCost"]);
        assert_eq!(json!(40), body["totalClicks"]);
        assert_eq!(json!(2000), body["totalImpressions"]);
    }

    #[tokio::test]
    async fn compares_two_months() {
        let server = MockServer::start().await;
        mount_campaigns(&server).await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .and(query_param(
                "timeRange",
                r#"{"since":"2023-12-01","until":"2023-12-31"}"#,
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summaryStat": {"data": [{"impCnt": 1000, "clkCnt": 10, "salesAmt": 5000}]}
            })))
            .expect(1)
            .mount(&server)
            .await;
        mount_summary(
            &server,
            "2024-01-01",
            json!({"impCnt": 1500, "clkCnt": 20, "salesAmt": 5000}),
        )
        .await;

        let request = json_request(
            "/api/compare-monthly-stats",
            &json!({
                "customerId": DUMMY_CUSTOMER_ID,
                "apiKey": DUMMY_API_KEY,
                "secretKey": DUMMY_SECRET_KEY,
                "year1": 2023,
                "month1": 12,
                "year2": 2024,
                "month2": 1,
            }),
        );
        let response = setup_router(&server)
            .oneshot(request)
            .await
            .expect("Infallible");

        assert_eq!(StatusCode::OK, response.status());
        let body = body_to_json(response).await;
        assert_eq!(json!("2023-12-01 ~ 2023-12-31"), body["period1"]["dateRange"]);
        assert_eq!(json!(1000), body["totals1"]["impressions"]);
        assert_eq!(json!(1500), body["totals2"]["impressions"]);
        assert_eq!(json!(50.0), body["changes"]["impressions"]);
        assert_eq!(json!(100.0), body["changes"]["clicks"]);
        assert_eq!(json!(0.0), body["changes"]["cost"]);
        assert_eq!(json!(-50.0), body["campaigns"][0]["changes"]["cpc"]);
    }

    #[tokio::test]
    async fn missing_period() {
        let server = MockServer::start().await;

        let request = json_request(
            "/api/compare-monthly-stats",
            &json!({
                "customerId": DUMMY_CUSTOMER_ID,
                "apiKey": DUMMY_API_KEY,
                "secretKey": DUMMY_SECRET_KEY,
                "year1": 2023,
                "month1": 12,
            }),
        );
        let response = setup_router(&server)
            .oneshot(request)
            .await
            .expect("Infallible");

        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        assert_eq!(
            json!(["customerId", "apiKey", "secretKey", "year1", "month1", "year2", "month2"]),
            body_to_json(response).await["required"]
        );
    }

    #[tokio::test]
    async fn failing_remote_is_a_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ncc/campaigns"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let request = json_request(
            "/api/get-campaign-stats",
            &json!({
                "customerId": DUMMY_CUSTOMER_ID,
                "apiKey": DUMMY_API_KEY,
                "secretKey": DUMMY_SECRET_KEY,
                "year": 2024,
                "month": 1,
            }),
        );
        let response = setup_router(&server)
            .oneshot(request)
            .await
            .expect("Infallible");

        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        assert_eq!(json!(false), body_to_json(response).await["success"]);
    }
}
