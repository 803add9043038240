//! Command-line runner for the denial simulation and analytics pipeline
//!
//! Backs the `rcm-denials` binary:
//! - Layered configuration loading (defaults, file, `RCM_*` environment, flags)
//! - Tracing subscriber setup, colored on a terminal and JSON lines otherwise
//! - Plain-text report summary
//!
//! # Example Usage
//!
//! ```bash
//! # Full report as JSON on stdout
//! rcm-denials run --seed 42
//!
//! # Human-readable digest from a config file
//! rcm-denials run --config denials.yaml --format summary
//!
//! # Start a config file from the defaults
//! rcm-denials default-config --format yaml > denials.yaml
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

pub mod logging;
pub mod settings;
pub mod summary;

pub use logging::*;
pub use settings::*;
pub use summary::*;
