use rand::Rng;

use crate::catalogs::ReferenceCatalogs;
use crate::config::SimulationConfig;
use crate::error::SimulationResult;
use crate::generator::{generate_from_catalogs, Dataset};
use crate::sampler::seeded_rng;

/// Claims simulation service
pub struct ClaimsSimulationService {
    config: SimulationConfig,
    catalogs: ReferenceCatalogs,
}

impl ClaimsSimulationService {
    /// Create a service from a validated configuration
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        let catalogs = config.validate()?;
        Ok(Self { config, catalogs })
    }

    /// Generate the population from a fresh stream seeded with `config.seed`
    pub fn generate(&self) -> SimulationResult<Dataset> {
        let mut rng = seeded_rng(self.config.seed);
        self.generate_with(&mut rng)
    }

    /// Generate the population from a caller-owned stream, leaving it
    /// positioned after the last claim draw
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> SimulationResult<Dataset> {
        generate_from_catalogs(&self.config, self.catalogs.clone(), rng)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn catalogs(&self) -> &ReferenceCatalogs {
        &self.catalogs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClaimStatus;

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SimulationConfig {
            total_claims: 0,
            ..SimulationConfig::default()
        };
        assert!(ClaimsSimulationService::new(config).is_err());
    }

    #[test]
    fn test_generate_is_deterministic() {
        let config = SimulationConfig {
            total_claims: 200,
            seed: 5,
            ..SimulationConfig::default()
        };
        let service = ClaimsSimulationService::new(config).unwrap();
        let first = service.generate().unwrap();
        let second = service.generate().unwrap();
        assert_eq!(first.claims, second.claims);
        assert_eq!(first.base_rates, second.base_rates);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = ClaimsSimulationService::new(SimulationConfig {
            total_claims: 100,
            seed: 1,
            ..SimulationConfig::default()
        })
        .unwrap();
        let b = ClaimsSimulationService::new(SimulationConfig {
            total_claims: 100,
            seed: 2,
            ..SimulationConfig::default()
        })
        .unwrap();
        assert_ne!(a.generate().unwrap().claims, b.generate().unwrap().claims);
    }

    #[test]
    fn test_default_service_generates_full_population() {
        let service = ClaimsSimulationService::new(SimulationConfig::default()).unwrap();
        let dataset = service.generate().unwrap();
        assert_eq!(dataset.claims.len(), 6685);
        let responded = dataset
            .claims
            .iter()
            .filter(|c| c.status != ClaimStatus::NoResponse)
            .count();
        assert!(responded > 5000);
    }
}
