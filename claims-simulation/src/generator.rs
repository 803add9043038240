use rand::Rng;
use rust_decimal::Decimal;

use crate::base_rates::MonthlyBaseRates;
use crate::catalogs::ReferenceCatalogs;
use crate::config::SimulationConfig;
use crate::error::SimulationResult;
use crate::models::{Claim, ClaimAttributes, ClaimStatus, PatientGender};
use crate::sampler::{chance, pick_uniform, pick_weighted, uniform_date, uniform_int};
use crate::scoring::DenialProbabilityModel;

/// Share of a rule's weight used as its independent violation probability
pub const RULE_VIOLATION_FACTOR: f64 = 0.7;

const BILLED_DOLLARS_MIN: u32 = 500;
const BILLED_DOLLARS_MAX: u32 = 15_000;
pub const PATIENT_AGE_MIN: u8 = 18;
pub const PATIENT_AGE_MAX: u8 = 85;

/// Assign the final status of a claim.
///
/// The no-response check runs first and ignores the probability model; only
/// claims that got a response are tested against `denial_probability`.
pub fn assign_status<R: Rng + ?Sized>(
    no_response_rate: f64,
    denial_probability: f64,
    rng: &mut R,
) -> ClaimStatus {
    if chance(rng, no_response_rate) {
        ClaimStatus::NoResponse
    } else if chance(rng, denial_probability) {
        ClaimStatus::Denied
    } else {
        ClaimStatus::Paid
    }
}

/// Produces claims one at a time with sequential ids starting at 1
pub struct ClaimGenerator<'a> {
    config: &'a SimulationConfig,
    catalogs: &'a ReferenceCatalogs,
    base_rates: &'a MonthlyBaseRates,
    model: DenialProbabilityModel<'a>,
    next_id: u64,
}

impl<'a> ClaimGenerator<'a> {
    pub fn new(
        config: &'a SimulationConfig,
        catalogs: &'a ReferenceCatalogs,
        base_rates: &'a MonthlyBaseRates,
    ) -> Self {
        Self {
            config,
            catalogs,
            base_rates,
            model: DenialProbabilityModel::new(catalogs),
            next_id: 1,
        }
    }

    /// Sample every attribute of a claim except its outcome
    pub fn sample_attributes<R: Rng + ?Sized>(&self, rng: &mut R) -> SimulationResult<ClaimAttributes> {
        let submission_date = uniform_date(rng, self.config.start_date, self.config.end_date);
        let payer = pick_uniform(self.catalogs.payers(), rng)?.name.clone();
        let specialty = pick_uniform(self.catalogs.specialties(), rng)?.name.clone();

        let cpt_range = pick_weighted(self.catalogs.cpt_ranges(), rng)?;
        let cpt_code = uniform_int(rng, cpt_range.min, cpt_range.max);

        let icd_prefix = pick_weighted(self.catalogs.icd10_prefixes(), rng)?;
        let icd10_code = format!(
            "{}{}.{}",
            icd_prefix.prefix,
            uniform_int(rng, 10, 99),
            uniform_int(rng, 0, 9)
        );

        let payer_rules_violated = self
            .catalogs
            .payer_rules()
            .iter()
            .filter(|rule| chance(rng, rule.weight * RULE_VIOLATION_FACTOR))
            .map(|rule| rule.id)
            .collect();

        let dollars = uniform_int(rng, BILLED_DOLLARS_MIN, BILLED_DOLLARS_MAX);
        let cents = uniform_int(rng, 0, 9_999);
        let amount_billed = Decimal::new(i64::from(dollars) * 100 + i64::from(cents), 2);

        let patient_age = rng.gen_range(PATIENT_AGE_MIN..=PATIENT_AGE_MAX);
        let patient_gender = if chance(rng, 0.5) {
            PatientGender::Male
        } else {
            PatientGender::Female
        };

        Ok(ClaimAttributes {
            submission_date,
            payer,
            specialty,
            cpt_code,
            icd10_code,
            payer_rules_violated,
            amount_billed,
            patient_age,
            patient_gender,
        })
    }

    /// Build the next claim: sample, score against its month's base rate, assign status
    pub fn generate_claim<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SimulationResult<Claim> {
        let attributes = self.sample_attributes(rng)?;
        let base_rate = self.base_rates.rate_for(attributes.month())?;
        let denial_probability = self.model.score(&attributes, base_rate)?;
        let status = assign_status(self.config.target_no_response_rate, denial_probability, rng);

        let claim = Claim {
            claim_id: self.next_id,
            attributes,
            denial_probability,
            status,
        };
        self.next_id += 1;
        Ok(claim)
    }
}

/// Everything one generation run produced
#[derive(Debug, Clone)]
pub struct Dataset {
    pub catalogs: ReferenceCatalogs,
    pub base_rates: MonthlyBaseRates,
    pub claims: Vec<Claim>,
}

/// Validate the configuration, then generate the base-rate table and the full
/// claim population from one random stream.
pub fn generate_dataset<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> SimulationResult<Dataset> {
    let catalogs = config.validate()?;
    generate_from_catalogs(config, catalogs, rng)
}

/// Generate from catalogs already produced by [`SimulationConfig::validate`].
/// Claims are drawn from `catalogs`; `config.catalogs` is not read again.
#[tracing::instrument(skip_all, fields(total_claims = config.total_claims, seed = config.seed))]
pub fn generate_from_catalogs<R: Rng + ?Sized>(
    config: &SimulationConfig,
    catalogs: ReferenceCatalogs,
    rng: &mut R,
) -> SimulationResult<Dataset> {
    let base_rates = MonthlyBaseRates::generate(config, rng);

    let claims = {
        let mut generator = ClaimGenerator::new(config, &catalogs, &base_rates);
        (0..config.total_claims)
            .map(|_| generator.generate_claim(rng))
            .collect::<SimulationResult<Vec<_>>>()?
    };

    let denied = claims.iter().filter(|c| c.is_denied()).count();
    tracing::info!(
        claims = claims.len(),
        denied,
        months = base_rates.len(),
        "generated claims dataset"
    );

    Ok(Dataset {
        catalogs,
        base_rates,
        claims,
    })
}
