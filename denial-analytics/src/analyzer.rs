use claims_simulation::{Claim, ClaimStatus, YearMonth};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::metrics::{ratio, MetricValue};
use crate::prediction::{is_predicted_denied, PredictionStrategy};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub paid: usize,
    pub denied: usize,
    pub no_response: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: ClaimStatus) {
        match status {
            ClaimStatus::Paid => self.paid += 1,
            ClaimStatus::Denied => self.denied += 1,
            ClaimStatus::NoResponse => self.no_response += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.paid + self.denied + self.no_response
    }
}

/// Claims and denials submitted in one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthlyTally {
    pub total: usize,
    pub denied: usize,
}

impl MonthlyTally {
    pub fn new(total: usize, denied: usize) -> Self {
        Self { total, denied }
    }
}

/// Binary classifier outcome counts with derived metrics.
///
/// "Denied" is the positive class. Metrics with a zero denominator are
/// `Undefined`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
    pub precision: MetricValue,
    pub recall: MetricValue,
    pub f1_score: MetricValue,
}

impl ConfusionMatrix {
    pub fn from_counts(
        true_positives: usize,
        false_positives: usize,
        true_negatives: usize,
        false_negatives: usize,
    ) -> Self {
        let precision = ratio(true_positives, true_positives + false_positives);
        let recall = ratio(true_positives, true_positives + false_negatives);
        let f1_score = match (precision.value(), recall.value()) {
            (Some(p), Some(r)) if p + r > 0.0 => MetricValue::from_f64(2.0 * p * r / (p + r)),
            _ => MetricValue::Undefined,
        };
        Self {
            true_positives,
            false_positives,
            true_negatives,
            false_negatives,
            precision,
            recall,
            f1_score,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> MetricValue {
        ratio(self.true_positives + self.true_negatives, self.total())
    }
}

#[derive(Debug, Default)]
struct ConfusionTally {
    tp: usize,
    fp: usize,
    tn: usize,
    fn_: usize,
}

impl ConfusionTally {
    fn record(&mut self, predicted_denied: bool, actual_denied: bool) {
        match (predicted_denied, actual_denied) {
            (true, true) => self.tp += 1,
            (true, false) => self.fp += 1,
            (false, false) => self.tn += 1,
            (false, true) => self.fn_ += 1,
        }
    }

    fn finish(self) -> ConfusionMatrix {
        ConfusionMatrix::from_counts(self.tp, self.fp, self.tn, self.fn_)
    }
}

/// Aggregates from one pass over the population
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetAnalysis {
    pub status_counts: StatusCounts,
    /// Chronologically ordered
    pub monthly_denials: BTreeMap<YearMonth, MonthlyTally>,
    /// Only rules violated at least once appear
    pub rule_violations: BTreeMap<u32, usize>,
    pub confusion_matrix: ConfusionMatrix,
}

impl DatasetAnalysis {
    pub fn total_claims(&self) -> usize {
        self.status_counts.total()
    }

    pub fn total_violations(&self) -> usize {
        self.rule_violations.values().sum()
    }

    pub fn violations_for(&self, rule_id: u32) -> usize {
        self.rule_violations.get(&rule_id).copied().unwrap_or(0)
    }
}

/// Tally statuses, monthly denials and rule violations, and score each claim
/// with `strategy` for the confusion matrix.
#[tracing::instrument(skip_all, fields(claims = claims.len()))]
pub fn analyze_dataset<R: Rng + ?Sized>(
    claims: &[Claim],
    strategy: &PredictionStrategy,
    rng: &mut R,
) -> DatasetAnalysis {
    let mut status_counts = StatusCounts::default();
    let mut monthly_denials: BTreeMap<YearMonth, MonthlyTally> = BTreeMap::new();
    let mut rule_violations: BTreeMap<u32, usize> = BTreeMap::new();
    let mut confusion = ConfusionTally::default();

    for claim in claims {
        status_counts.record(claim.status);

        let tally = monthly_denials.entry(claim.month()).or_default();
        tally.total += 1;
        if claim.is_denied() {
            tally.denied += 1;
        }

        for rule_id in &claim.attributes.payer_rules_violated {
            *rule_violations.entry(*rule_id).or_insert(0) += 1;
        }

        let prediction = strategy.predict(claim, rng);
        confusion.record(is_predicted_denied(prediction), claim.is_denied());
    }

    let confusion_matrix = confusion.finish();
    tracing::debug!(
        denied = status_counts.denied,
        months = monthly_denials.len(),
        violated_rules = rule_violations.len(),
        "analyzed dataset"
    );

    DatasetAnalysis {
        status_counts,
        monthly_denials,
        rule_violations,
        confusion_matrix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use claims_simulation::{seeded_rng, ClaimAttributes, PatientGender};
    use rust_decimal::Decimal;

    fn claim(id: u64, month: u32, status: ClaimStatus, probability: f64, rules: Vec<u32>) -> Claim {
        Claim {
            claim_id: id,
            attributes: ClaimAttributes {
                submission_date: NaiveDate::from_ymd_opt(2023, month, 15).unwrap(),
                payer: "Medicare".to_string(),
                specialty: "Neurology".to_string(),
                cpt_code: 70100,
                icd10_code: "G40.9".to_string(),
                payer_rules_violated: rules,
                amount_billed: Decimal::new(310_050, 2),
                patient_age: 71,
                patient_gender: PatientGender::Female,
            },
            denial_probability: probability,
            status,
        }
    }

    #[test]
    fn test_counts_and_tallies() {
        let claims = vec![
            claim(1, 1, ClaimStatus::Denied, 0.8, vec![1, 4]),
            claim(2, 1, ClaimStatus::Paid, 0.3, vec![4]),
            claim(3, 2, ClaimStatus::NoResponse, 0.6, vec![]),
            claim(4, 11, ClaimStatus::Denied, 0.4, vec![9]),
        ];
        let analysis = analyze_dataset(&claims, &PredictionStrategy::ExactReuse, &mut seeded_rng(1));

        assert_eq!(
            analysis.status_counts,
            StatusCounts {
                paid: 1,
                denied: 2,
                no_response: 1
            }
        );
        assert_eq!(analysis.total_claims(), 4);
        assert_eq!(
            analysis.monthly_denials.get(&YearMonth::new(2023, 1)),
            Some(&MonthlyTally::new(2, 1))
        );
        assert_eq!(
            analysis.monthly_denials.get(&YearMonth::new(2023, 2)),
            Some(&MonthlyTally::new(1, 0))
        );
        assert_eq!(analysis.violations_for(4), 2);
        assert_eq!(analysis.violations_for(7), 0);
        assert_eq!(analysis.total_violations(), 4);
    }

    #[test]
    fn test_months_in_chronological_order() {
        let claims = vec![
            claim(1, 11, ClaimStatus::Paid, 0.1, vec![]),
            claim(2, 2, ClaimStatus::Paid, 0.1, vec![]),
            claim(3, 10, ClaimStatus::Paid, 0.1, vec![]),
        ];
        let analysis = analyze_dataset(&claims, &PredictionStrategy::ExactReuse, &mut seeded_rng(1));
        let months: Vec<u32> = analysis.monthly_denials.keys().map(|m| m.month).collect();
        assert_eq!(months, vec![2, 10, 11]);
    }

    #[test]
    fn test_confusion_matrix_quadrants() {
        let claims = vec![
            claim(1, 3, ClaimStatus::Denied, 0.8, vec![]),     // TP
            claim(2, 3, ClaimStatus::Paid, 0.7, vec![]),       // FP
            claim(3, 3, ClaimStatus::Paid, 0.2, vec![]),       // TN
            claim(4, 3, ClaimStatus::NoResponse, 0.5, vec![]), // TN, 0.5 is not above the threshold
            claim(5, 3, ClaimStatus::Denied, 0.3, vec![]),     // FN
        ];
        let analysis = analyze_dataset(&claims, &PredictionStrategy::ExactReuse, &mut seeded_rng(1));
        let matrix = analysis.confusion_matrix;
        assert_eq!(
            (
                matrix.true_positives,
                matrix.false_positives,
                matrix.true_negatives,
                matrix.false_negatives
            ),
            (1, 1, 2, 1)
        );
        assert_eq!(matrix.total(), claims.len());
        assert_eq!(matrix.precision, MetricValue::Defined(0.5));
        assert_eq!(matrix.recall, MetricValue::Defined(0.5));
        assert_eq!(matrix.f1_score, MetricValue::Defined(0.5));
        assert_eq!(matrix.accuracy(), MetricValue::Defined(0.6));
    }

    #[test]
    fn test_metrics_undefined_without_positives() {
        let matrix = ConfusionMatrix::from_counts(0, 0, 100, 0);
        assert_eq!(matrix.precision, MetricValue::Undefined);
        assert_eq!(matrix.recall, MetricValue::Undefined);
        assert_eq!(matrix.f1_score, MetricValue::Undefined);
        assert_eq!(matrix.accuracy(), MetricValue::Defined(1.0));
    }

    #[test]
    fn test_f1_undefined_when_precision_and_recall_zero() {
        let matrix = ConfusionMatrix::from_counts(0, 3, 2, 4);
        assert_eq!(matrix.precision, MetricValue::Defined(0.0));
        assert_eq!(matrix.recall, MetricValue::Defined(0.0));
        assert_eq!(matrix.f1_score, MetricValue::Undefined);
    }

    #[test]
    fn test_empty_population() {
        let analysis = analyze_dataset(&[], &PredictionStrategy::ExactReuse, &mut seeded_rng(1));
        assert_eq!(analysis.total_claims(), 0);
        assert!(analysis.monthly_denials.is_empty());
        assert_eq!(analysis.confusion_matrix.accuracy(), MetricValue::Undefined);
    }
}
