use claims_simulation::YearMonth;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzer::MonthlyTally;
use crate::metrics::{percent, MetricValue};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTrend {
    /// `<year>-<month>` with an unpadded month
    pub month: String,
    pub denial_rate: MetricValue,
    pub total_claims: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyTrend {
    /// `<year>-Q<n>`
    pub quarter: String,
    pub denial_rate: MetricValue,
    pub total_claims: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DenialTrends {
    pub monthly_data: Vec<MonthlyTrend>,
    pub quarterly_data: Vec<QuarterlyTrend>,
}

impl DenialTrends {
    /// Lowest and highest defined monthly denial rate
    pub fn monthly_rate_range(&self) -> Option<(f64, f64)> {
        self.monthly_data
            .iter()
            .filter_map(|m| m.denial_rate.value())
            .fold(None, |range, rate| match range {
                None => Some((rate, rate)),
                Some((lo, hi)) => Some((lo.min(rate), hi.max(rate))),
            })
    }
}

struct QuarterAccumulator {
    key: String,
    total: usize,
    denied: usize,
}

impl QuarterAccumulator {
    fn flush(self) -> QuarterlyTrend {
        QuarterlyTrend {
            quarter: self.key,
            denial_rate: percent(self.denied, self.total),
            total_claims: self.total,
        }
    }
}

/// Monthly denial rates, and quarterly rates accumulated in month order with
/// a flush whenever the quarter key changes.
pub fn analyze_denial_trends(monthly: &BTreeMap<YearMonth, MonthlyTally>) -> DenialTrends {
    let mut monthly_data = Vec::with_capacity(monthly.len());
    let mut quarterly_data = Vec::new();
    let mut current: Option<QuarterAccumulator> = None;

    for (month, tally) in monthly {
        monthly_data.push(MonthlyTrend {
            month: month.to_string(),
            denial_rate: percent(tally.denied, tally.total),
            total_claims: tally.total,
        });

        let key = month.quarter_key();
        match current.as_mut() {
            Some(acc) if acc.key == key => {
                acc.total += tally.total;
                acc.denied += tally.denied;
            }
            _ => {
                if let Some(done) = current.take() {
                    quarterly_data.push(done.flush());
                }
                current = Some(QuarterAccumulator {
                    key,
                    total: tally.total,
                    denied: tally.denied,
                });
            }
        }
    }

    if let Some(acc) = current {
        quarterly_data.push(acc.flush());
    }

    DenialTrends {
        monthly_data,
        quarterly_data,
    }
}
