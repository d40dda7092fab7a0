use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::profile::StatsShape;

/// Performance stats of a single entity (or of the whole account)
/// for a requested period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub impressions: u64,
    pub clicks: u64,
    pub cost: u64,
    pub conversions: u64,
    /// The ratios as reported by the remote for this row, kept for diagnostics only.
    /// [`StatTotals`] always recomputes them from the sums.
    pub ctr: f64,
    pub cpc: u64,
}

impl StatRow {
    /// Reads a raw stats object of the API.
    ///
    /// The API returns numbers both as JSON numbers and as numeric strings,
    /// missing or unparsable values are read as `0`.
    pub fn from_raw(raw: &Value) -> Self {
        Self {
            id: raw.get("id").and_then(|id| match id {
                Value::String(id) => Some(id.clone()),
                Value::Number(id) => Some(id.to_string()),
                _ => None,
            }),
            impressions: lenient_integer(raw.get("impCnt")),
            clicks: lenient_integer(raw.get("clkCnt")),
            cost: lenient_integer(raw.get("salesAmt")),
            conversions: lenient_integer(raw.get("ccnt")),
            ctr: lenient_float(raw.get("ctr")),
            cpc: lenient_integer(raw.get("cpc")),
        }
    }
}

fn lenient_float(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(string)) => string.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed.filter(|float| float.is_finite()).unwrap_or_default()
}

fn lenient_integer(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64))
            .unwrap_or_default(),
        // "12.7" is read as 12
        Some(Value::String(_)) => {
            let float = lenient_float(value);

            if float >= 0.0 {
                float.trunc() as u64
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Extracts the stat rows from a stats response according to its [`StatsShape`].
///
/// The summary shapes always return a single row (or none if the summary is missing).
pub fn extract_rows(shape: StatsShape, response: &Value) -> Vec<StatRow> {
    match shape {
        StatsShape::Data => response
            .get("data")
            .and_then(Value::as_array)
            .map(|rows| rows.iter().map(StatRow::from_raw).collect())
            .unwrap_or_default(),
        StatsShape::SummaryStat => response
            .pointer("/summaryStat/data/0")
            .map(StatRow::from_raw)
            .into_iter()
            .collect(),
        StatsShape::DailyStatSummary => response
            .pointer("/dailyStat/summary")
            .filter(|summary| summary.is_object())
            .map(StatRow::from_raw)
            .into_iter()
            .collect(),
    }
}

/// Sums of [`StatRow`]s, with the ratios recomputed from the sums.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatTotals {
    pub impressions: u64,
    pub clicks: u64,
    pub cost: u64,
    pub conversions: u64,
    /// In percents, rounded to 2 decimals
    pub ctr: f64,
    pub cpc: u64,
}

impl StatTotals {
    fn add(mut self, impressions: u64, clicks: u64, cost: u64, conversions: u64) -> Self {
        self.impressions += impressions;
        self.clicks += clicks;
        self.cost += cost;
        self.conversions += conversions;
        self
    }

    fn with_ratios(mut self) -> Self {
        self.ctr = if self.impressions > 0 {
            round_2(self.clicks as f64 / self.impressions as f64 * 100.0)
        } else {
            0.0
        };
        self.cpc = self.cost.checked_div(self.clicks).unwrap_or_default();

        self
    }
}

impl<'a> FromIterator<&'a StatRow> for StatTotals {
    fn from_iter<I: IntoIterator<Item = &'a StatRow>>(rows: I) -> Self {
        rows.into_iter()
            .fold(StatTotals::default(), |acc, row| {
                acc.add(row.impressions, row.clicks, row.cost, row.conversions)
            })
            .with_ratios()
    }
}

/// Sums of sums, e.g. the totals over all campaigns.
impl<'a> FromIterator<&'a StatTotals> for StatTotals {
    fn from_iter<I: IntoIterator<Item = &'a StatTotals>>(totals: I) -> Self {
        totals
            .into_iter()
            .fold(StatTotals::default(), |acc, totals| {
                acc.add(
                    totals.impressions,
                    totals.clicks,
                    totals.cost,
                    totals.conversions,
                )
            })
            .with_ratios()
    }
}

/// Change in percents from `before` to `after`, rounded to 2 decimals.
///
/// Returns `None` when `before` is `0`, as there is no meaningful rate.
pub fn change_rate(before: f64, after: f64) -> Option<f64> {
    if before == 0.0 {
        return None;
    }

    Some(round_2((after - before) / before * 100.0))
}

fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The percent changes between two [`StatTotals`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Changes {
    pub impressions: Option<f64>,
    pub clicks: Option<f64>,
    pub cost: Option<f64>,
    pub conversions: Option<f64>,
    pub ctr: Option<f64>,
    pub cpc: Option<f64>,
}

impl Changes {
    pub fn between(before: &StatTotals, after: &StatTotals) -> Self {
        Self {
            impressions: change_rate(before.impressions as f64, after.impressions as f64),
            clicks: change_rate(before.clicks as f64, after.clicks as f64),
            cost: change_rate(before.cost as f64, after.cost as f64),
            conversions: change_rate(before.conversions as f64, after.conversions as f64),
            ctr: change_rate(before.ctr, after.ctr),
            cpc: change_rate(before.cpc as f64, after.cpc as f64),
        }
    }
}
