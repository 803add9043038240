//! Synthetic classifier predictions
//!
//! Neither strategy is a real model. `ExactReuse` replays the generator's own
//! probability, so it agrees with the outcomes far more than any trained
//! classifier would. `NoisyCorrelated` only looks at the realized label and
//! adds bounded noise around a per-label center.

use claims_simulation::{jitter, Claim};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};

/// Claims scoring strictly above this are predicted denied
pub const PREDICTED_DENIED_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "camelCase")]
pub enum PredictionStrategy {
    /// Reuse the claim's stored denial probability. Draws nothing from the stream.
    ExactReuse,
    /// `center ± U(-noiseSpread, +noiseSpread)` picked by the actual outcome,
    /// clamped to `[0, 1]`
    #[serde(rename_all = "camelCase")]
    NoisyCorrelated {
        denied_center: f64,
        not_denied_center: f64,
        noise_spread: f64,
    },
}

impl PredictionStrategy {
    /// The risk-distribution defaults: 0.75 / 0.25 with ±0.15 noise
    pub fn noisy_default() -> Self {
        PredictionStrategy::NoisyCorrelated {
            denied_center: 0.75,
            not_denied_center: 0.25,
            noise_spread: 0.15,
        }
    }

    pub fn predict<R: Rng + ?Sized>(&self, claim: &Claim, rng: &mut R) -> f64 {
        match *self {
            PredictionStrategy::ExactReuse => claim.denial_probability,
            PredictionStrategy::NoisyCorrelated {
                denied_center,
                not_denied_center,
                noise_spread,
            } => {
                let center = if claim.is_denied() {
                    denied_center
                } else {
                    not_denied_center
                };
                (center + jitter(rng, noise_spread)).max(0.0).min(1.0)
            }
        }
    }

    pub fn validate(&self, name: &str) -> AnalyticsResult<()> {
        if let PredictionStrategy::NoisyCorrelated {
            denied_center,
            not_denied_center,
            noise_spread,
        } = *self
        {
            for (field, value) in [
                ("deniedCenter", denied_center),
                ("notDeniedCenter", not_denied_center),
                ("noiseSpread", noise_spread),
            ] {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(AnalyticsError::InvalidConfiguration(format!(
                        "{}.{} must be within [0, 1], got {}",
                        name, field, value
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for PredictionStrategy {
    fn default() -> Self {
        PredictionStrategy::ExactReuse
    }
}

/// Strict `> 0.5`; a prediction of exactly 0.5 is not denied
pub fn is_predicted_denied(prediction: f64) -> bool {
    prediction > PREDICTED_DENIED_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use claims_simulation::{seeded_rng, ClaimAttributes, ClaimStatus, PatientGender};
    use rust_decimal::Decimal;

    fn claim(status: ClaimStatus, denial_probability: f64) -> Claim {
        Claim {
            claim_id: 1,
            attributes: ClaimAttributes {
                submission_date: NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
                payer: "Aetna".to_string(),
                specialty: "Cardiology".to_string(),
                cpt_code: 93000,
                icd10_code: "I20.1".to_string(),
                payer_rules_violated: vec![],
                amount_billed: Decimal::new(90_000, 2),
                patient_age: 60,
                patient_gender: PatientGender::Male,
            },
            denial_probability,
            status,
        }
    }

    #[test]
    fn test_exact_reuse_returns_stored_probability() {
        let mut rng = seeded_rng(1);
        let c = claim(ClaimStatus::Paid, 0.63);
        assert_eq!(PredictionStrategy::ExactReuse.predict(&c, &mut rng), 0.63);
    }

    #[test]
    fn test_noisy_correlated_stays_near_center() {
        let strategy = PredictionStrategy::noisy_default();
        let mut rng = seeded_rng(2);
        let denied = claim(ClaimStatus::Denied, 0.1);
        let paid = claim(ClaimStatus::Paid, 0.9);
        for _ in 0..500 {
            let high = strategy.predict(&denied, &mut rng);
            assert!((0.59..=0.91).contains(&high));
            let low = strategy.predict(&paid, &mut rng);
            assert!((0.09..=0.41).contains(&low));
        }
    }

    #[test]
    fn test_noisy_prediction_clamped() {
        let strategy = PredictionStrategy::NoisyCorrelated {
            denied_center: 1.0,
            not_denied_center: 0.0,
            noise_spread: 0.5,
        };
        let mut rng = seeded_rng(3);
        for _ in 0..200 {
            let p = strategy.predict(&claim(ClaimStatus::Denied, 0.5), &mut rng);
            assert!((0.0..=1.0).contains(&p));
            let q = strategy.predict(&claim(ClaimStatus::NoResponse, 0.5), &mut rng);
            assert!((0.0..=1.0).contains(&q));
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!is_predicted_denied(0.5));
        assert!(is_predicted_denied(0.500_001));
    }

    #[test]
    fn test_serde_tagged_representation() {
        let json = serde_json::to_value(PredictionStrategy::noisy_default()).unwrap();
        assert_eq!(json["strategy"], "noisyCorrelated");
        assert_eq!(json["deniedCenter"], 0.75);

        let parsed: PredictionStrategy =
            serde_json::from_str(r#"{"strategy":"exactReuse"}"#).unwrap();
        assert_eq!(parsed, PredictionStrategy::ExactReuse);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let strategy = PredictionStrategy::NoisyCorrelated {
            denied_center: 1.2,
            not_denied_center: 0.25,
            noise_spread: 0.15,
        };
        assert!(strategy.validate("riskPrediction").is_err());
        assert!(PredictionStrategy::noisy_default().validate("riskPrediction").is_ok());
    }
}
