use claims_simulation::{Claim, ClaimStatus};
use rand::Rng;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::metrics::{percent, MetricValue};
use crate::prediction::PredictionStrategy;

/// Predictions strictly above this count as high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

pub const RISK_BUCKET_LABELS: [&str; 10] = [
    "0-10%", "10-20%", "20-30%", "30-40%", "40-50%", "50-60%", "60-70%", "70-80%", "80-90%",
    "90-100%",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScore {
    pub claim_id: u64,
    pub actual_status: ClaimStatus,
    pub predicted_probability: f64,
}

/// Ten fixed 10%-wide bands. Serializes as an ordered map keyed by label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskBuckets([usize; 10]);

/// `floor(p * 100 / 10)`, capped at the last band. NaN lands in the first band.
pub fn bucket_index(probability: f64) -> usize {
    let index = (probability * 100.0 / 10.0).floor();
    if index.is_nan() || index < 0.0 {
        0
    } else if index >= 9.0 {
        9
    } else {
        index as usize
    }
}

impl RiskBuckets {
    pub fn record(&mut self, probability: f64) {
        if let Some(slot) = self.0.get_mut(bucket_index(probability)) {
            *slot += 1;
        }
    }

    pub fn count(&self, label: &str) -> Option<usize> {
        RISK_BUCKET_LABELS
            .iter()
            .position(|l| *l == label)
            .and_then(|i| self.0.get(i).copied())
    }

    pub fn counts(&self) -> &[usize; 10] {
        &self.0
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        RISK_BUCKET_LABELS.iter().copied().zip(self.0.iter().copied())
    }
}

impl Serialize for RiskBuckets {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(RISK_BUCKET_LABELS.len()))?;
        for (label, count) in self.iter() {
            map.serialize_entry(label, &count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighRiskSummary {
    pub count: usize,
    pub denied_count: usize,
    /// Share of high-risk claims that were actually denied, in percent
    pub accuracy: MetricValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskDistribution {
    pub risk_scores: Vec<RiskScore>,
    pub risk_buckets: RiskBuckets,
    pub high_risk_summary: HighRiskSummary,
}

/// Score every claim with `strategy`, bin the scores and summarize the
/// high-risk tail.
#[tracing::instrument(skip_all, fields(claims = claims.len()))]
pub fn analyze_risk_distribution<R: Rng + ?Sized>(
    claims: &[Claim],
    strategy: &PredictionStrategy,
    rng: &mut R,
) -> RiskDistribution {
    let mut risk_scores = Vec::with_capacity(claims.len());
    let mut risk_buckets = RiskBuckets::default();
    let mut high_risk = 0;
    let mut high_risk_denied = 0;

    for claim in claims {
        let predicted_probability = strategy.predict(claim, rng);
        risk_buckets.record(predicted_probability);
        if predicted_probability > HIGH_RISK_THRESHOLD {
            high_risk += 1;
            if claim.is_denied() {
                high_risk_denied += 1;
            }
        }
        risk_scores.push(RiskScore {
            claim_id: claim.claim_id,
            actual_status: claim.status,
            predicted_probability,
        });
    }

    RiskDistribution {
        risk_scores,
        risk_buckets,
        high_risk_summary: HighRiskSummary {
            count: high_risk,
            denied_count: high_risk_denied,
            accuracy: percent(high_risk_denied, high_risk),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use claims_simulation::{seeded_rng, ClaimAttributes, PatientGender};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn claim(id: u64, status: ClaimStatus, probability: f64) -> Claim {
        Claim {
            claim_id: id,
            attributes: ClaimAttributes {
                submission_date: NaiveDate::from_ymd_opt(2022, 8, 9).unwrap(),
                payer: "Humana".to_string(),
                specialty: "Oncology".to_string(),
                cpt_code: 96413,
                icd10_code: "C50.9".to_string(),
                payer_rules_violated: vec![],
                amount_billed: Decimal::new(640_000, 2),
                patient_age: 58,
                patient_gender: PatientGender::Female,
            },
            denial_probability: probability,
            status,
        }
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(bucket_index(0.0), 0);
        assert_eq!(bucket_index(0.099), 0);
        assert_eq!(bucket_index(0.70), 7);
        assert_eq!(bucket_index(0.95), 9);
        assert_eq!(bucket_index(1.0), 9);
        assert_eq!(bucket_index(f64::NAN), 0);
        assert_eq!(RISK_BUCKET_LABELS[bucket_index(0.70)], "70-80%");
    }

    #[test]
    fn test_buckets_serialize_in_band_order() {
        let mut buckets = RiskBuckets::default();
        buckets.record(0.05);
        buckets.record(0.72);
        buckets.record(1.0);
        let json = serde_json::to_string(&buckets).unwrap();
        assert!(json.starts_with(r#"{"0-10%":1,"10-20%":0"#));
        assert!(json.ends_with(r#""70-80%":1,"80-90%":0,"90-100%":1}"#));
        assert_eq!(buckets.count("70-80%"), Some(1));
        assert_eq!(buckets.count("100-110%"), None);
    }

    #[test]
    fn test_exact_reuse_high_risk_summary() {
        let claims = vec![
            claim(1, ClaimStatus::Denied, 0.9),
            claim(2, ClaimStatus::Paid, 0.8),
            claim(3, ClaimStatus::Denied, 0.7), // not above the threshold
            claim(4, ClaimStatus::Paid, 0.2),
        ];
        let distribution =
            analyze_risk_distribution(&claims, &PredictionStrategy::ExactReuse, &mut seeded_rng(1));
        assert_eq!(distribution.high_risk_summary.count, 2);
        assert_eq!(distribution.high_risk_summary.denied_count, 1);
        assert_eq!(distribution.high_risk_summary.accuracy, MetricValue::Defined(50.0));
        assert_eq!(distribution.risk_buckets.total(), 4);
        assert_eq!(distribution.risk_scores[2].actual_status, ClaimStatus::Denied);
    }

    #[test]
    fn test_no_high_risk_claims_is_undefined() {
        let claims = vec![claim(1, ClaimStatus::Paid, 0.1)];
        let distribution =
            analyze_risk_distribution(&claims, &PredictionStrategy::ExactReuse, &mut seeded_rng(1));
        assert_eq!(distribution.high_risk_summary.accuracy, MetricValue::Undefined);
    }

    #[test]
    fn test_noisy_strategy_separates_labels() {
        let claims: Vec<Claim> = (1..=200)
            .map(|i| {
                let status = if i % 2 == 0 { ClaimStatus::Denied } else { ClaimStatus::Paid };
                claim(i, status, 0.5)
            })
            .collect();
        let distribution = analyze_risk_distribution(
            &claims,
            &PredictionStrategy::noisy_default(),
            &mut seeded_rng(12),
        );
        for score in &distribution.risk_scores {
            if score.actual_status == ClaimStatus::Denied {
                assert!(score.predicted_probability >= 0.59);
            } else {
                assert!(score.predicted_probability <= 0.41);
            }
        }
        // Nothing can land in the 40-60% gap between the two noise bands
        assert_eq!(distribution.risk_buckets.count("40-50%"), Some(0));
        assert_eq!(distribution.risk_buckets.count("50-60%"), Some(0));
    }

    proptest! {
        #[test]
        fn prop_bucket_counts_sum_to_population(probabilities in prop::collection::vec(0.0f64..=1.0, 0..300)) {
            let mut buckets = RiskBuckets::default();
            for p in &probabilities {
                buckets.record(*p);
            }
            prop_assert_eq!(buckets.total(), probabilities.len());
        }

        #[test]
        fn prop_bucket_label_contains_probability(p in 0.0f64..1.0) {
            let index = bucket_index(p);
            let lower = index as f64 / 10.0;
            prop_assert!(p >= lower - 1e-12);
            prop_assert!(p < lower + 0.1 + 1e-12);
        }
    }
}
