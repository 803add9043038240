//! Simulation configuration
//!
//! Every knob the generator reads lives here: the date window, population
//! size, the target bands the population should land in, the reference
//! catalogs and the seed of the random stream.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::base_rates::BASE_RATE_HEADROOM;
use crate::catalogs::{CatalogSet, ReferenceCatalogs};
use crate::error::{SimulationError, SimulationResult};

/// Open probability band `(min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    pub min: f64,
    pub max: f64,
}

impl RateBand {
    /// Strictly inside the band
    pub fn contains(&self, rate: f64) -> bool {
        rate > self.min && rate < self.max
    }
}

/// Classifier targets quoted by the case study. Reported next to the realized
/// metrics, never enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelTargets {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
}

impl Default for ModelTargets {
    fn default() -> Self {
        Self {
            accuracy: 0.92,
            precision: 0.94,
            recall: 0.94,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_claims: u32,
    pub target_denial_rate: RateBand,
    pub target_no_response_rate: f64,
    pub model_targets: ModelTargets,
    pub catalogs: CatalogSet,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2022, 1, 31).unwrap_or(NaiveDate::MIN),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or(NaiveDate::MIN),
            total_claims: 6685,
            target_denial_rate: RateBand {
                min: 0.37,
                max: 0.59,
            },
            target_no_response_rate: 0.125,
            model_targets: ModelTargets::default(),
            catalogs: CatalogSet::default(),
            seed: 42,
        }
    }
}

fn check_probability(name: &str, value: f64) -> SimulationResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(SimulationError::InvalidConfiguration(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

impl SimulationConfig {
    /// Validate the configuration and build the indexed catalogs it describes
    pub fn validate(&self) -> SimulationResult<ReferenceCatalogs> {
        if self.start_date > self.end_date {
            return Err(SimulationError::InvalidConfiguration(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }

        if self.total_claims == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "total claims must be greater than zero".to_string(),
            ));
        }

        let band = self.target_denial_rate;
        check_probability("target denial rate minimum", band.min)?;
        check_probability("target denial rate maximum", band.max)?;
        if band.min + BASE_RATE_HEADROOM > band.max - BASE_RATE_HEADROOM {
            return Err(SimulationError::InvalidConfiguration(format!(
                "target denial band {}..{} is narrower than the {} headroom kept on each side",
                band.min, band.max, BASE_RATE_HEADROOM
            )));
        }

        check_probability("target no-response rate", self.target_no_response_rate)?;
        check_probability("model accuracy target", self.model_targets.accuracy)?;
        check_probability("model precision target", self.model_targets.precision)?;
        check_probability("model recall target", self.model_targets.recall)?;

        ReferenceCatalogs::build(self.catalogs.clone())
    }
}
