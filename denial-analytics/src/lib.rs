//! Denial Analytics for Healthcare Revenue Cycle Management
//!
//! Re-derives aggregate statistics from a simulated claim population to check
//! it against its targets:
//! - Status counts, monthly denial tallies and rule-violation counts
//! - Monthly and quarterly denial trends
//! - Feature importance for payer rules, payers and specialties
//! - Confusion matrix and risk-band distribution under configurable
//!   synthetic prediction strategies
//! - Automation workflow and financial impact estimates
//! - Conclusion validation against the configured targets
//!
//! # Example
//!
//! ```rust
//! use denial_analytics::{run_pipeline, PipelineConfig};
//!
//! let mut config = PipelineConfig::default();
//! config.simulation.total_claims = 300;
//!
//! let output = run_pipeline(&config)?;
//! assert_eq!(output.report.dataset_summary.total_claims, 300);
//! # Ok::<(), denial_analytics::AnalyticsError>(())
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

pub mod analyzer;
pub mod automation;
pub mod config;
pub mod error;
pub mod importance;
pub mod metrics;
pub mod prediction;
pub mod report;
pub mod risk;
pub mod service;
pub mod trends;

pub use analyzer::*;
pub use automation::*;
pub use config::*;
pub use error::*;
pub use importance::*;
pub use metrics::*;
pub use prediction::*;
pub use report::*;
pub use risk::*;
pub use service::*;
pub use trends::*;
