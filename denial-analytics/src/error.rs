use claims_simulation::SimulationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Financial calculation error: {0}")]
    Financial(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
