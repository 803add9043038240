//! Analysis report
//!
//! The report is the only output of a pipeline run. Its section and field
//! names, and the ten risk-band labels, are what chart renderers and other
//! consumers key off, so they are serialized in camelCase exactly as
//! declared here.

use claims_simulation::{Dataset, ModelTargets, RateBand, SimulationConfig};
use rand::Rng;
use serde::Serialize;

use crate::analyzer::{ConfusionMatrix, DatasetAnalysis, StatusCounts};
use crate::automation::{analyze_automation, AutomationAnalysis};
use crate::config::PipelineConfig;
use crate::error::AnalyticsResult;
use crate::importance::{analyze_feature_importance, FeatureImportance, RuleImportance};
use crate::metrics::{percent, round1, MetricValue};
use crate::risk::{analyze_risk_distribution, HighRiskSummary, RiskDistribution};
use crate::trends::{analyze_denial_trends, DenialTrends};

/// Number of rules quoted in the conclusion
pub const TOP_DENIAL_FACTORS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPercentages {
    pub paid: MetricValue,
    pub denied: MetricValue,
    pub no_response: MetricValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub total_claims: usize,
    /// `<start> to <end>`, ISO dates
    pub date_range: String,
    pub status_breakdown: StatusCounts,
    pub percentages: StatusPercentages,
}

impl DatasetSummary {
    pub fn new(config: &SimulationConfig, counts: StatusCounts) -> Self {
        let total = counts.total();
        Self {
            total_claims: total,
            date_range: format!("{} to {}", config.start_date, config.end_date),
            status_breakdown: counts,
            percentages: StatusPercentages {
                paid: percent(counts.paid, total),
                denied: percent(counts.denied, total),
                no_response: percent(counts.no_response, total),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    #[serde(rename = "Not Denied")]
    NotDenied,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuadrantType {
    #[serde(rename = "True Negative")]
    TrueNegative,
    #[serde(rename = "False Positive")]
    FalsePositive,
    #[serde(rename = "False Negative")]
    FalseNegative,
    #[serde(rename = "True Positive")]
    TruePositive,
}

/// One confusion-matrix cell. `percentage` is relative to the cell's actual
/// class, so each row of the matrix sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixCell {
    pub predicted: Outcome,
    pub actual: Outcome,
    pub count: usize,
    #[serde(rename = "type")]
    pub quadrant: QuadrantType,
    pub percentage: MetricValue,
}

/// Classifier metrics in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetrics {
    pub accuracy: MetricValue,
    pub precision: MetricValue,
    pub recall: MetricValue,
    pub f1_score: MetricValue,
}

impl ModelMetrics {
    pub fn from_matrix(matrix: &ConfusionMatrix) -> Self {
        Self {
            accuracy: matrix.accuracy().as_percent(),
            precision: matrix.precision.as_percent(),
            recall: matrix.recall.as_percent(),
            f1_score: matrix.f1_score.as_percent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfusionMatrixReport {
    /// TN, FP, FN, TP
    pub matrix: [MatrixCell; 4],
    pub metrics: ModelMetrics,
}

impl ConfusionMatrixReport {
    pub fn new(cm: &ConfusionMatrix) -> Self {
        let actual_negative = cm.true_negatives + cm.false_positives;
        let actual_positive = cm.true_positives + cm.false_negatives;
        let cell = |predicted, actual, count, quadrant, class_total| MatrixCell {
            predicted,
            actual,
            count,
            quadrant,
            percentage: percent(count, class_total),
        };
        Self {
            matrix: [
                cell(
                    Outcome::NotDenied,
                    Outcome::NotDenied,
                    cm.true_negatives,
                    QuadrantType::TrueNegative,
                    actual_negative,
                ),
                cell(
                    Outcome::Denied,
                    Outcome::NotDenied,
                    cm.false_positives,
                    QuadrantType::FalsePositive,
                    actual_negative,
                ),
                cell(
                    Outcome::NotDenied,
                    Outcome::Denied,
                    cm.false_negatives,
                    QuadrantType::FalseNegative,
                    actual_positive,
                ),
                cell(
                    Outcome::Denied,
                    Outcome::Denied,
                    cm.true_positives,
                    QuadrantType::TruePositive,
                    actual_positive,
                ),
            ],
            metrics: ModelMetrics::from_matrix(cm),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetComparison {
    /// Configured target, percent
    pub target: f64,
    pub realized: MetricValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelTargetCheck {
    pub accuracy: TargetComparison,
    pub precision: TargetComparison,
    pub recall: TargetComparison,
}

/// Realized population measured against the configured targets. Informational
/// only; nothing here fails a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetCheck {
    /// Configured band, percent
    pub target_denial_rate: RateRange,
    pub months_inside_target: usize,
    pub months_outside_target: usize,
    pub target_no_response_rate: f64,
    pub model_targets: ModelTargetCheck,
}

impl TargetCheck {
    pub fn new(
        band: RateBand,
        no_response_target: f64,
        targets: &ModelTargets,
        trends: &DenialTrends,
        realized: &ModelMetrics,
    ) -> Self {
        let (inside, outside) = trends
            .monthly_data
            .iter()
            .filter_map(|m| m.denial_rate.value())
            .fold((0, 0), |(inside, outside), rate| {
                if band.contains(rate / 100.0) {
                    (inside + 1, outside)
                } else {
                    (inside, outside + 1)
                }
            });
        let compare = |target: f64, realized: MetricValue| TargetComparison {
            target: round1(target * 100.0),
            realized,
        };
        Self {
            target_denial_rate: RateRange {
                min: round1(band.min * 100.0),
                max: round1(band.max * 100.0),
            },
            months_inside_target: inside,
            months_outside_target: outside,
            target_no_response_rate: round1(no_response_target * 100.0),
            model_targets: ModelTargetCheck {
                accuracy: compare(targets.accuracy, realized.accuracy),
                precision: compare(targets.precision, realized.precision),
                recall: compare(targets.recall, realized.recall),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConclusionValidation {
    /// Lowest and highest monthly denial rate; absent for an empty population
    pub denial_rate_range: Option<RateRange>,
    pub no_response_rate: MetricValue,
    pub top_denial_factors: Vec<String>,
    pub model_performance: ModelMetrics,
    pub high_risk_identification: HighRiskSummary,
    pub target_check: TargetCheck,
}

pub fn describe_factor(rule: &RuleImportance) -> String {
    format!(
        "Rule {} ({}): {}% denial rate",
        rule.rule_id, rule.rule_name, rule.denial_rate
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub dataset_summary: DatasetSummary,
    pub denial_trends: DenialTrends,
    pub feature_importance: FeatureImportance,
    pub risk_distribution: RiskDistribution,
    pub confusion_matrix: ConfusionMatrixReport,
    pub automation_analysis: AutomationAnalysis,
    pub conclusion_validation: ConclusionValidation,
}

impl AnalysisReport {
    pub fn to_json_pretty(&self) -> AnalyticsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Assemble every report section. Draws the risk-distribution predictions
/// from `rng`, after the analyzer has taken its own.
#[tracing::instrument(skip_all)]
pub fn generate_report<R: Rng + ?Sized>(
    config: &PipelineConfig,
    dataset: &Dataset,
    analysis: &DatasetAnalysis,
    rng: &mut R,
) -> AnalyticsResult<AnalysisReport> {
    let simulation = &config.simulation;
    let dataset_summary = DatasetSummary::new(simulation, analysis.status_counts);
    let denial_trends = analyze_denial_trends(&analysis.monthly_denials);
    let feature_importance =
        analyze_feature_importance(&dataset.claims, analysis, &dataset.catalogs)?;
    let risk_distribution = analyze_risk_distribution(
        &dataset.claims,
        &config.analytics.risk_prediction,
        rng,
    );
    let confusion_matrix = ConfusionMatrixReport::new(&analysis.confusion_matrix);
    let automation_analysis = analyze_automation(analysis, &config.analytics.automation)?;

    let conclusion_validation = ConclusionValidation {
        denial_rate_range: denial_trends
            .monthly_rate_range()
            .map(|(min, max)| RateRange { min, max }),
        no_response_rate: dataset_summary.percentages.no_response,
        top_denial_factors: feature_importance
            .rule_importance
            .iter()
            .take(TOP_DENIAL_FACTORS)
            .map(describe_factor)
            .collect(),
        model_performance: confusion_matrix.metrics,
        high_risk_identification: risk_distribution.high_risk_summary,
        target_check: TargetCheck::new(
            simulation.target_denial_rate,
            simulation.target_no_response_rate,
            &simulation.model_targets,
            &denial_trends,
            &confusion_matrix.metrics,
        ),
    };

    Ok(AnalysisReport {
        dataset_summary,
        denial_trends,
        feature_importance,
        risk_distribution,
        confusion_matrix,
        automation_analysis,
        conclusion_validation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::MonthlyTally;
    use claims_simulation::YearMonth;
    use std::collections::BTreeMap;

    #[test]
    fn test_dataset_summary_percentages() {
        let counts = StatusCounts {
            paid: 50,
            denied: 40,
            no_response: 10,
        };
        let summary = DatasetSummary::new(&SimulationConfig::default(), counts);
        assert_eq!(summary.total_claims, 100);
        assert_eq!(summary.date_range, "2022-01-31 to 2024-12-31");
        assert_eq!(summary.percentages.denied, MetricValue::Defined(40.0));
        assert_eq!(summary.percentages.no_response, MetricValue::Defined(10.0));
    }

    #[test]
    fn test_matrix_percentages_per_actual_class() {
        let report = ConfusionMatrixReport::new(&ConfusionMatrix::from_counts(30, 10, 90, 20));
        let [tn, fp, fn_, tp] = report.matrix;
        assert_eq!(tn.percentage, MetricValue::Defined(90.0));
        assert_eq!(fp.percentage, MetricValue::Defined(10.0));
        assert_eq!(fn_.percentage, MetricValue::Defined(40.0));
        assert_eq!(tp.percentage, MetricValue::Defined(60.0));
        assert_eq!(tp.quadrant, QuadrantType::TruePositive);
        assert_eq!(report.metrics.precision, MetricValue::Defined(75.0));
        assert_eq!(report.metrics.recall, MetricValue::Defined(60.0));
        assert_eq!(report.metrics.accuracy, MetricValue::Defined(80.0));
    }

    #[test]
    fn test_matrix_serialization_shape() {
        let report = ConfusionMatrixReport::new(&ConfusionMatrix::from_counts(0, 0, 5, 0));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["matrix"][0]["type"], "True Negative");
        assert_eq!(json["matrix"][0]["predicted"], "Not Denied");
        assert_eq!(json["matrix"][3]["percentage"], serde_json::Value::Null);
        assert_eq!(json["metrics"]["precision"], serde_json::Value::Null);
        assert_eq!(json["metrics"]["accuracy"], 100.0);
    }

    #[test]
    fn test_describe_factor() {
        let rule = RuleImportance {
            rule_id: 4,
            rule_name: "Coding mismatches".to_string(),
            violation_count: 12,
            percent_of_violations: MetricValue::Defined(20.0),
            denial_rate: MetricValue::Defined(71.3),
        };
        assert_eq!(
            describe_factor(&rule),
            "Rule 4 (Coding mismatches): 71.3% denial rate"
        );
    }

    #[test]
    fn test_target_check_counts_months() {
        let monthly: BTreeMap<YearMonth, MonthlyTally> = [
            (YearMonth::new(2023, 1), MonthlyTally::new(100, 45)),
            (YearMonth::new(2023, 2), MonthlyTally::new(100, 30)),
            (YearMonth::new(2023, 3), MonthlyTally::new(100, 59)),
        ]
        .into_iter()
        .collect();
        let trends = analyze_denial_trends(&monthly);
        let metrics = ModelMetrics::from_matrix(&ConfusionMatrix::from_counts(9, 1, 9, 1));
        let check = TargetCheck::new(
            RateBand {
                min: 0.37,
                max: 0.59,
            },
            0.125,
            &ModelTargets::default(),
            &trends,
            &metrics,
        );
        // 59% sits on the open upper bound and counts as outside
        assert_eq!(check.months_inside_target, 1);
        assert_eq!(check.months_outside_target, 2);
        assert_eq!(check.target_denial_rate.min, 37.0);
        assert_eq!(check.model_targets.precision.target, 94.0);
        assert_eq!(check.model_targets.precision.realized, MetricValue::Defined(90.0));
        assert_eq!(check.target_no_response_rate, 12.5);
    }
}
