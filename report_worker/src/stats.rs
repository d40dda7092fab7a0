//! Campaign stats for a period and period-over-period comparisons.
//!
//! The stats endpoint is called once per campaign and period, sequentially,
//! with the configured `request_delay` between the calls.
use std::time::Duration;

use primitives::{stats::Changes, Campaign, Config, Period, StatTotals};
use serde::Serialize;
use slog::{debug, warn};

use crate::searchad_interface::{Error, SearchAdApi};

/// Spaces out consecutive calls to the API, the first call is never delayed.
#[derive(Debug)]
struct Pacer {
    delay: Duration,
    started: bool,
}

impl Pacer {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: false,
        }
    }

    async fn wait(&mut self) {
        if self.started {
            tokio::time::sleep(self.delay).await;
        }
        self.started = true;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStats {
    pub campaign_id: String,
    pub campaign_name: String,
    pub stats: StatTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStatsReport {
    pub period: Period,
    pub campaigns: Vec<CampaignStats>,
    pub totals: StatTotals,
}

/// The stats of every campaign of the account for the `period`, with the sums over all campaigns.
pub async fn campaign_stats(
    api: &SearchAdApi,
    config: &Config,
    period: Period,
) -> Result<CampaignStatsReport, Error> {
    let campaigns = api.campaigns(&config.campaigns).await?;
    let mut pacer = Pacer::new(config.request_delay);
    // listing the campaigns counts as a call too
    pacer.wait().await;

    let mut results = Vec::with_capacity(campaigns.len());
    for Campaign {
        ncc_campaign_id,
        name,
        ..
    } in campaigns
    {
        pacer.wait().await;

        let rows = api
            .stats(&[ncc_campaign_id.as_str()], &period, &config.stats)
            .await?;
        debug!(&api.logger, "Campaign stats"; "campaign" => &ncc_campaign_id, "rows" => rows.len());

        results.push(CampaignStats {
            campaign_id: ncc_campaign_id,
            campaign_name: name,
            stats: rows.iter().collect(),
        });
    }

    let totals = results.iter().map(|campaign| &campaign.stats).collect();

    Ok(CampaignStatsReport {
        period,
        campaigns: results,
        totals,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignComparison {
    pub campaign_id: String,
    pub campaign_name: String,
    pub before: Option<StatTotals>,
    pub after: Option<StatTotals>,
    pub changes: Option<Changes>,
    /// Set when fetching the stats of the campaign failed,
    /// the remaining campaigns are still compared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodComparison {
    pub before_period: Period,
    pub after_period: Period,
    pub campaigns: Vec<CampaignComparison>,
    pub totals_before: StatTotals,
    pub totals_after: StatTotals,
    pub changes: Changes,
}

/// Compares the stats of every campaign between the two periods.
///
/// Failing to list the campaigns fails the comparison, a failure for a single
/// campaign is recorded on it and excluded from the totals.
pub async fn compare_periods(
    api: &SearchAdApi,
    config: &Config,
    before: Period,
    after: Period,
) -> Result<PeriodComparison, Error> {
    let campaigns = api.campaigns(&config.campaigns).await?;
    let mut pacer = Pacer::new(config.request_delay);
    pacer.wait().await;

    let mut comparisons = Vec::with_capacity(campaigns.len());
    for campaign in campaigns {
        let compared = compare_campaign(api, config, &mut pacer, &campaign, before, after).await;

        let comparison = match compared {
            Ok((stats_before, stats_after)) => CampaignComparison {
                changes: Some(Changes::between(&stats_before, &stats_after)),
                before: Some(stats_before),
                after: Some(stats_after),
                error: None,
                campaign_id: campaign.ncc_campaign_id,
                campaign_name: campaign.name,
            },
            Err(err) => {
                warn!(&api.logger, "Comparing campaign failed"; "campaign" => &campaign.ncc_campaign_id, "error" => %err);

                CampaignComparison {
                    campaign_id: campaign.ncc_campaign_id,
                    campaign_name: campaign.name,
                    before: None,
                    after: None,
                    changes: None,
                    error: Some(err.to_string()),
                }
            }
        };
        comparisons.push(comparison);
    }

    let totals_before: StatTotals = comparisons
        .iter()
        .filter_map(|comparison| comparison.before.as_ref())
        .collect();
    let totals_after: StatTotals = comparisons
        .iter()
        .filter_map(|comparison| comparison.after.as_ref())
        .collect();

    Ok(PeriodComparison {
        before_period: before,
        after_period: after,
        changes: Changes::between(&totals_before, &totals_after),
        campaigns: comparisons,
        totals_before,
        totals_after,
    })
}

async fn compare_campaign(
    api: &SearchAdApi,
    config: &Config,
    pacer: &mut Pacer,
    campaign: &Campaign,
    before: Period,
    after: Period,
) -> Result<(StatTotals, StatTotals), Error> {
    let ids = [campaign.ncc_campaign_id.as_str()];

    pacer.wait().await;
    let rows_before = api.stats(&ids, &before, &config.stats).await?;
    pacer.wait().await;
    let rows_after = api.stats(&ids, &after, &config.stats).await?;

    Ok((rows_before.iter().collect(), rows_after.iter().collect()))
}

#[cfg(test)]
mod test {
    use std::time::Instant;

    use pretty_assertions::assert_eq;
    use primitives::{profile::SignatureScope, test_util::test_config};
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::test_util::{setup_api, signature_is_valid};

    const JANUARY: &str = r#"{"since":"2024-01-01","until":"2024-01-31"}"#;
    const FEBRUARY: &str = r#"{"since":"2024-02-01","until":"2024-02-29"}"#;

    async fn mount_campaigns(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/ncc/campaigns"))
            .and(signature_is_valid(SignatureScope::Path))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"nccCampaignId": "cmp-1", "name": "Brand", "campaignTp": "WEB_SITE"},
                {"nccCampaignId": "cmp-2", "name": "Generic"}
            ])))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_summary(
        server: &MockServer,
        campaign: &str,
        time_range: &str,
        summary: serde_json::Value,
    ) {
        Mock::given(method("GET"))
            .and(path("/stats"))
            .and(query_param("ids", campaign))
            .and(query_param("timeRange", time_range))
            .and(signature_is_valid(SignatureScope::PathAndQuery))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"summaryStat": {"data": [summary]}})),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn sums_the_stats_of_all_campaigns() {
        let server = MockServer::start().await;
        mount_campaigns(&server).await;
        mount_summary(
            &server,
            "cmp-1",
            JANUARY,
            json!({"impCnt": 1000, "clkCnt": 50, "salesAmt": 25000, "ccnt": 2}),
        )
        .await;
        mount_summary(
            &server,
            "cmp-2",
            JANUARY,
            json!({"impCnt": 3000, "clkCnt": 30, "salesAmt": 15000, "ccnt": 1}),
        )
        .await;

        let config = test_config(&server.uri());
        let api = setup_api(&server);
        let report = campaign_stats(&api, &config, Period::month(2024, 1).expect("Valid month"))
            .await
            .expect("Should get the stats");

        assert_eq!(2, report.campaigns.len());
        assert_eq!("Brand", report.campaigns[0].campaign_name);
        assert_eq!(50, report.campaigns[0].stats.clicks);
        assert_eq!(500, report.campaigns[0].stats.cpc);

        assert_eq!(4000, report.totals.impressions);
        assert_eq!(80, report.totals.clicks);
        assert_eq!(40000, report.totals.cost);
        assert_eq!(3, report.totals.conversions);
        assert_eq!(2.0, report.totals.ctr);
        assert_eq!(500, report.totals.cpc);
    }

    #[tokio::test]
    async fn compares_two_periods() {
        let server = MockServer::start().await;
        mount_campaigns(&server).await;
        mount_summary(
            &server,
            "cmp-1",
            JANUARY,
            json!({"impCnt": 1000, "clkCnt": 50, "salesAmt": 25000}),
        )
        .await;
        mount_summary(
            &server,
            "cmp-1",
            FEBRUARY,
            json!({"impCnt": 1500, "clkCnt": 40, "salesAmt": 20000}),
        )
        .await;
        // the second campaign had no impressions in january
        mount_summary(&server, "cmp-2", JANUARY, json!({})).await;
        mount_summary(
            &server,
            "cmp-2",
            FEBRUARY,
            json!({"impCnt": 500, "clkCnt": 10, "salesAmt": 5000}),
        )
        .await;

        let config = test_config(&server.uri());
        let api = setup_api(&server);
        let comparison = compare_periods(
            &api,
            &config,
            Period::month(2024, 1).expect("Valid month"),
            Period::month(2024, 2).expect("Valid month"),
        )
        .await
        .expect("Should compare");

        let brand = &comparison.campaigns[0];
        let changes = brand.changes.as_ref().expect("Should have changes");
        assert_eq!(Some(50.0), changes.impressions);
        assert_eq!(Some(-20.0), changes.clicks);
        assert_eq!(Some(-20.0), changes.cost);

        let generic = &comparison.campaigns[1];
        let changes = generic.changes.as_ref().expect("Should have changes");
        assert_eq!(None, changes.impressions);

        assert_eq!(1000, comparison.totals_before.impressions);
        assert_eq!(2000, comparison.totals_after.impressions);
        assert_eq!(Some(100.0), comparison.changes.impressions);
    }

    #[tokio::test]
    async fn records_per_campaign_failures() {
        let server = MockServer::start().await;
        mount_campaigns(&server).await;
        mount_summary(&server, "cmp-1", JANUARY, json!({"impCnt": 10})).await;
        mount_summary(&server, "cmp-1", FEBRUARY, json!({"impCnt": 20})).await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .and(query_param("ids", "cmp-2"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"title": "Invalid id"})))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let api = setup_api(&server);
        let comparison = compare_periods(
            &api,
            &config,
            Period::month(2024, 1).expect("Valid month"),
            Period::month(2024, 2).expect("Valid month"),
        )
        .await
        .expect("A single campaign should not fail the comparison");

        assert!(comparison.campaigns[0].error.is_none());
        let failed = &comparison.campaigns[1];
        assert!(failed.error.as_deref().unwrap_or_default().contains("400"));
        assert_eq!(None, failed.before);

        assert_eq!(10, comparison.totals_before.impressions);
        assert_eq!(20, comparison.totals_after.impressions);
    }

    #[tokio::test]
    async fn failing_to_list_campaigns_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ncc/campaigns"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(path("/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let api = setup_api(&server);
        let error = campaign_stats(&api, &config, Period::month(2024, 1).expect("Valid month"))
            .await
            .expect_err("Should fail");

        assert!(matches!(error, Error::Status { .. }));
    }

    #[tokio::test]
    async fn spaces_out_the_calls() {
        let server = MockServer::start().await;
        mount_campaigns(&server).await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(4)
            .mount(&server)
            .await;

        let mut config = test_config(&server.uri());
        config.request_delay = Duration::from_millis(40);
        let api = setup_api(&server);

        let started = Instant::now();
        compare_periods(
            &api,
            &config,
            Period::month(2024, 1).expect("Valid month"),
            Period::month(2024, 2).expect("Valid month"),
        )
        .await
        .expect("Should compare");

        // a delay after the campaigns listing and between each of the 4 stats calls
        assert!(started.elapsed() >= Duration::from_millis(4 * 40));
    }
}
