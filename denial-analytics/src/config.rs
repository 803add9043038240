//! Pipeline configuration
//!
//! Combines the simulation knobs with the analysis inputs:
//! - Prediction strategy for the confusion matrix
//! - Prediction strategy for the risk distribution
//! - Automation workflows and the financial constants used to price them

use claims_simulation::{ReferenceCatalogs, SimulationConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::prediction::PredictionStrategy;

/// One automation workflow aimed at a single payer rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    pub name: String,
    pub target_rule: u32,
    /// Share of the rule's violations the workflow picks up
    pub coverage_fraction: f64,
    pub success_rate: f64,
    pub time_reduction: f64,
}

impl WorkflowConfig {
    pub fn new(
        name: &str,
        target_rule: u32,
        coverage_fraction: f64,
        success_rate: f64,
        time_reduction: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            target_rule,
            coverage_fraction,
            success_rate,
            time_reduction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutomationConfig {
    pub workflows: Vec<WorkflowConfig>,
    pub average_minutes_per_claim: f64,
    pub labor_rate_per_hour: Decimal,
    pub average_claim_value: Decimal,
    /// Share of a claim's value treated as at risk when it is denied
    pub at_risk_fraction: f64,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            workflows: vec![
                WorkflowConfig::new("Pre-authorization Verification", 1, 0.80, 0.897, 0.834),
                WorkflowConfig::new("Coding Mismatch Detection", 4, 0.75, 0.923, 0.769),
                WorkflowConfig::new("Medical Necessity Documentation", 5, 0.65, 0.875, 0.712),
                WorkflowConfig::new("Timely Filing Monitoring", 6, 0.90, 0.981, 0.915),
            ],
            average_minutes_per_claim: 22.5,
            labor_rate_per_hour: Decimal::new(35, 0),
            average_claim_value: Decimal::new(2500, 0),
            at_risk_fraction: 0.15,
        }
    }
}

fn check_fraction(name: &str, value: f64) -> AnalyticsResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(AnalyticsError::InvalidConfiguration(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

impl AutomationConfig {
    /// Validate constants and check that every workflow targets a known rule
    pub fn validate(&self, catalogs: &ReferenceCatalogs) -> AnalyticsResult<()> {
        if !self.average_minutes_per_claim.is_finite() || self.average_minutes_per_claim < 0.0 {
            return Err(AnalyticsError::InvalidConfiguration(format!(
                "averageMinutesPerClaim must be a non-negative number, got {}",
                self.average_minutes_per_claim
            )));
        }
        if self.labor_rate_per_hour.is_sign_negative() {
            return Err(AnalyticsError::InvalidConfiguration(
                "laborRatePerHour must not be negative".to_string(),
            ));
        }
        if self.average_claim_value.is_sign_negative() {
            return Err(AnalyticsError::InvalidConfiguration(
                "averageClaimValue must not be negative".to_string(),
            ));
        }
        check_fraction("atRiskFraction", self.at_risk_fraction)?;

        for workflow in &self.workflows {
            check_fraction(&format!("{} coverageFraction", workflow.name), workflow.coverage_fraction)?;
            check_fraction(&format!("{} successRate", workflow.name), workflow.success_rate)?;
            check_fraction(&format!("{} timeReduction", workflow.name), workflow.time_reduction)?;
            catalogs.rule(workflow.target_rule).map_err(|_| {
                AnalyticsError::InvalidConfiguration(format!(
                    "workflow '{}' targets rule {} which is not in the payer rule catalog",
                    workflow.name, workflow.target_rule
                ))
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsConfig {
    /// Prediction used for the confusion matrix
    pub confusion_prediction: PredictionStrategy,
    /// Prediction used for the risk distribution
    pub risk_prediction: PredictionStrategy,
    pub automation: AutomationConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            confusion_prediction: PredictionStrategy::ExactReuse,
            risk_prediction: PredictionStrategy::noisy_default(),
            automation: AutomationConfig::default(),
        }
    }
}

/// Everything one pipeline run reads
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub simulation: SimulationConfig,
    pub analytics: AnalyticsConfig,
}

impl PipelineConfig {
    /// Validate both halves, returning the simulation's indexed catalogs
    pub fn validate(&self) -> AnalyticsResult<ReferenceCatalogs> {
        let catalogs = self.simulation.validate()?;
        self.analytics
            .confusion_prediction
            .validate("confusionPrediction")?;
        self.analytics.risk_prediction.validate("riskPrediction")?;
        self.analytics.automation.validate(&catalogs)?;
        Ok(catalogs)
    }
}
