use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::analyzer::DatasetAnalysis;
use crate::config::{AutomationConfig, WorkflowConfig};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::metrics::round1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowPerformance {
    pub name: String,
    pub target_rule: u32,
    pub claims_processed: u64,
    /// Percent
    pub success_rate: f64,
    /// Percent
    pub time_reduction: f64,
    pub labor_saved: Decimal,
    pub revenue_saved: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialImpact {
    pub average_time_per_claim: f64,
    pub labor_rate_per_hour: Decimal,
    pub total_labor_saved: Decimal,
    pub total_revenue_saved: Decimal,
    pub total_impact: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationAnalysis {
    pub workflow_performance: Vec<WorkflowPerformance>,
    pub financial_impact: FinancialImpact,
}

fn to_decimal(name: &str, value: f64) -> AnalyticsResult<Decimal> {
    Decimal::from_f64(value)
        .ok_or_else(|| AnalyticsError::Financial(format!("{} ({}) is not representable", name, value)))
}

fn checked(name: &str, value: Option<Decimal>) -> AnalyticsResult<Decimal> {
    value.ok_or_else(|| AnalyticsError::Financial(format!("{} overflowed", name)))
}

/// `floor(violations * coverage)`
pub fn claims_processed(violations: usize, coverage_fraction: f64) -> u64 {
    let processed = (violations as f64 * coverage_fraction).floor();
    if processed.is_finite() && processed > 0.0 {
        processed as u64
    } else {
        0
    }
}

fn price_workflow(
    workflow: &WorkflowConfig,
    analysis: &DatasetAnalysis,
    config: &AutomationConfig,
) -> AnalyticsResult<WorkflowPerformance> {
    let processed = claims_processed(
        analysis.violations_for(workflow.target_rule),
        workflow.coverage_fraction,
    );
    let claims = Decimal::from(processed);
    let hours_per_claim = checked(
        "hours per claim",
        to_decimal("averageMinutesPerClaim", config.average_minutes_per_claim)?
            .checked_div(Decimal::from(60)),
    )?;
    let time_reduction = to_decimal("timeReduction", workflow.time_reduction)?;
    let success_rate = to_decimal("successRate", workflow.success_rate)?;
    let at_risk = to_decimal("atRiskFraction", config.at_risk_fraction)?;

    let labor_saved = checked(
        "labor saved",
        claims
            .checked_mul(hours_per_claim)
            .and_then(|v| v.checked_mul(time_reduction))
            .and_then(|v| v.checked_mul(config.labor_rate_per_hour)),
    )?;
    let revenue_saved = checked(
        "revenue saved",
        claims
            .checked_mul(success_rate)
            .and_then(|v| v.checked_mul(config.average_claim_value))
            .and_then(|v| v.checked_mul(at_risk)),
    )?;

    Ok(WorkflowPerformance {
        name: workflow.name.clone(),
        target_rule: workflow.target_rule,
        claims_processed: processed,
        success_rate: round1(workflow.success_rate * 100.0),
        time_reduction: round1(workflow.time_reduction * 100.0),
        labor_saved: labor_saved.round_dp(2),
        revenue_saved: revenue_saved.round_dp(2),
    })
}

/// Price each configured workflow against the observed rule violations.
/// A workflow whose rule was never violated processes nothing.
#[tracing::instrument(skip_all, fields(workflows = config.workflows.len()))]
pub fn analyze_automation(
    analysis: &DatasetAnalysis,
    config: &AutomationConfig,
) -> AnalyticsResult<AutomationAnalysis> {
    let workflow_performance = config
        .workflows
        .iter()
        .map(|workflow| price_workflow(workflow, analysis, config))
        .collect::<AnalyticsResult<Vec<_>>>()?;

    let total_labor_saved: Decimal = workflow_performance.iter().map(|w| w.labor_saved).sum();
    let total_revenue_saved: Decimal = workflow_performance.iter().map(|w| w.revenue_saved).sum();
    let total_impact = checked("total impact", total_labor_saved.checked_add(total_revenue_saved))?;

    tracing::debug!(%total_labor_saved, %total_revenue_saved, "priced automation workflows");

    Ok(AutomationAnalysis {
        workflow_performance,
        financial_impact: FinancialImpact {
            average_time_per_claim: config.average_minutes_per_claim,
            labor_rate_per_hour: config.labor_rate_per_hour,
            total_labor_saved,
            total_revenue_saved,
            total_impact,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{ConfusionMatrix, StatusCounts};
    use std::collections::BTreeMap;

    fn analysis_with(violations: &[(u32, usize)]) -> DatasetAnalysis {
        DatasetAnalysis {
            status_counts: StatusCounts::default(),
            monthly_denials: BTreeMap::new(),
            rule_violations: violations.iter().copied().collect(),
            confusion_matrix: ConfusionMatrix::from_counts(0, 0, 0, 0),
        }
    }

    #[test]
    fn test_claims_processed_floors() {
        assert_eq!(claims_processed(101, 0.8), 80);
        assert_eq!(claims_processed(3, 0.65), 1);
        assert_eq!(claims_processed(0, 0.9), 0);
    }

    #[test]
    fn test_single_workflow_pricing() {
        let config = AutomationConfig {
            workflows: vec![WorkflowConfig::new("Coding Mismatch Detection", 4, 0.75, 0.923, 0.769)],
            ..AutomationConfig::default()
        };
        let analysis = analysis_with(&[(4, 400)]);
        let result = analyze_automation(&analysis, &config).unwrap();
        let workflow = &result.workflow_performance[0];

        // 300 claims * 0.375 h * 0.769 * $35 = 3027.9375
        assert_eq!(workflow.claims_processed, 300);
        assert_eq!(workflow.labor_saved, Decimal::new(302_794, 2));
        // 300 claims * 0.923 * $2500 * 0.15
        assert_eq!(workflow.revenue_saved, Decimal::new(103_837_50, 2));
        assert_eq!(workflow.success_rate, 92.3);
        assert_eq!(workflow.time_reduction, 76.9);
    }

    #[test]
    fn test_totals_sum_workflows() {
        let analysis = analysis_with(&[(1, 200), (4, 300), (5, 150), (6, 120)]);
        let result = analyze_automation(&analysis, &AutomationConfig::default()).unwrap();
        let processed: Vec<u64> = result
            .workflow_performance
            .iter()
            .map(|w| w.claims_processed)
            .collect();
        assert_eq!(processed, vec![160, 225, 97, 108]);

        let impact = &result.financial_impact;
        let labor: Decimal = result.workflow_performance.iter().map(|w| w.labor_saved).sum();
        assert_eq!(impact.total_labor_saved, labor);
        assert_eq!(impact.total_impact, impact.total_labor_saved + impact.total_revenue_saved);
    }

    #[test]
    fn test_unviolated_rule_processes_nothing() {
        let analysis = analysis_with(&[]);
        let result = analyze_automation(&analysis, &AutomationConfig::default()).unwrap();
        assert!(result.workflow_performance.iter().all(|w| w.claims_processed == 0));
        assert_eq!(result.financial_impact.total_impact, Decimal::ZERO);
    }

    #[test]
    fn test_money_serializes_as_string() {
        let analysis = analysis_with(&[(1, 10)]);
        let result = analyze_automation(&analysis, &AutomationConfig::default()).unwrap();
        let json = serde_json::to_value(&result.financial_impact).unwrap();
        assert!(json["totalLaborSaved"].is_string());
        assert_eq!(json["averageTimePerClaim"], 22.5);
    }
}
