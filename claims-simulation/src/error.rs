use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A claim referenced a catalog entry that does not exist. Sampling only
    /// draws from closed catalogs, so this is an internal consistency failure.
    #[error("Lookup failure: no {catalog} entry for '{key}'")]
    LookupFailure { catalog: &'static str, key: String },
}

impl SimulationError {
    pub fn lookup(catalog: &'static str, key: impl ToString) -> Self {
        SimulationError::LookupFailure {
            catalog,
            key: key.to_string(),
        }
    }
}

pub type SimulationResult<T> = Result<T, SimulationError>;
