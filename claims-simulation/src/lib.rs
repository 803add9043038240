//! Claims Simulation for Healthcare Revenue Cycle Analytics
//!
//! Generates a synthetic population of insurance claims whose denial outcomes
//! are correlated with their features:
//! - Reference catalogs (payer rules, CPT ranges, ICD-10 prefixes, payers, specialties)
//! - Weighted and uniform sampling over an explicit, seeded random stream
//! - Monthly baseline denial rates with seasonal adjustment
//! - Six-factor denial probability model
//! - Claim generation with No Response / Denied / Paid status assignment
//!
//! Every random draw goes through the generator handed in by the caller, so a
//! configuration plus a seed fully determines the population.
//!
//! # Example
//!
//! ```rust
//! use claims_simulation::{ClaimsSimulationService, SimulationConfig};
//!
//! let config = SimulationConfig {
//!     total_claims: 250,
//!     seed: 7,
//!     ..SimulationConfig::default()
//! };
//!
//! let service = ClaimsSimulationService::new(config)?;
//! let dataset = service.generate()?;
//! assert_eq!(dataset.claims.len(), 250);
//! # Ok::<(), claims_simulation::SimulationError>(())
//! ```

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::indexing_slicing
    )
)]

pub mod base_rates;
pub mod catalogs;
pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod sampler;
pub mod scoring;
pub mod service;

pub use base_rates::*;
pub use catalogs::*;
pub use config::*;
pub use error::*;
pub use generator::*;
pub use models::*;
pub use sampler::*;
pub use scoring::*;
pub use service::*;
