use serde::Serialize;

use crate::catalogs::ReferenceCatalogs;
use crate::error::SimulationResult;
use crate::models::ClaimAttributes;

pub const MIN_DENIAL_PROBABILITY: f64 = 0.05;
pub const MAX_DENIAL_PROBABILITY: f64 = 0.95;

const PAYER_PIVOT: f64 = 0.45;
const PAYER_SCALE: f64 = 0.5;
const CPT_PIVOT: f64 = 0.10;
const CPT_SCALE: f64 = 0.3;
const ICD_PIVOT: f64 = 0.10;
const ICD_SCALE: f64 = 0.3;
const RULE_SCALE: f64 = 0.8;
const SPECIALTY_PIVOT: f64 = 0.45;
const SPECIALTY_SCALE: f64 = 0.2;

/// Claim-level seasonal term. Applied on top of the month's base rate, which
/// already carries its own seasonal shift.
pub fn claim_seasonal_adjustment(month: u32) -> f64 {
    match month {
        12 | 1 => 0.06,
        7 | 8 => 0.04,
        _ => 0.0,
    }
}

/// Per-factor contributions to a claim's denial score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub base_rate: f64,
    pub payer: f64,
    pub cpt: f64,
    pub icd: f64,
    pub rules: f64,
    pub specialty: f64,
    pub seasonal: f64,
}

impl ScoreBreakdown {
    pub fn factor_sum(&self) -> f64 {
        self.payer + self.cpt + self.icd + self.rules + self.specialty + self.seasonal
    }

    /// Base rate plus all factors, clamped to `[0.05, 0.95]`
    pub fn probability(&self) -> f64 {
        (self.base_rate + self.factor_sum())
            .max(MIN_DENIAL_PROBABILITY)
            .min(MAX_DENIAL_PROBABILITY)
    }
}

/// Deterministic six-factor denial scoring over the reference catalogs
#[derive(Debug, Clone, Copy)]
pub struct DenialProbabilityModel<'a> {
    catalogs: &'a ReferenceCatalogs,
}

impl<'a> DenialProbabilityModel<'a> {
    pub fn new(catalogs: &'a ReferenceCatalogs) -> Self {
        Self { catalogs }
    }

    pub fn breakdown(
        &self,
        claim: &ClaimAttributes,
        month_base_rate: f64,
    ) -> SimulationResult<ScoreBreakdown> {
        let payer = self.catalogs.payer(&claim.payer)?;
        let cpt = self.catalogs.cpt_range_for(claim.cpt_code)?;
        let icd = self.catalogs.icd_prefix_for(&claim.icd10_code)?;
        let specialty = self.catalogs.specialty(&claim.specialty)?;

        let mut rules = 0.0;
        for rule_id in &claim.payer_rules_violated {
            rules += self.catalogs.rule(*rule_id)?.weight * RULE_SCALE;
        }

        Ok(ScoreBreakdown {
            base_rate: month_base_rate,
            payer: (payer.weight - PAYER_PIVOT) * PAYER_SCALE,
            cpt: (cpt.weight - CPT_PIVOT) * CPT_SCALE,
            icd: (icd.weight - ICD_PIVOT) * ICD_SCALE,
            rules,
            specialty: (specialty.weight - SPECIALTY_PIVOT) * SPECIALTY_SCALE,
            seasonal: claim_seasonal_adjustment(claim.month().month),
        })
    }

    pub fn score(&self, claim: &ClaimAttributes, month_base_rate: f64) -> SimulationResult<f64> {
        Ok(self.breakdown(claim, month_base_rate)?.probability())
    }
}
