use rand::Rng;
use std::collections::BTreeMap;

use crate::config::SimulationConfig;
use crate::error::{SimulationError, SimulationResult};
use crate::models::YearMonth;
use crate::sampler::jitter;

/// Starting point for every month before seasonality and jitter
pub const BASELINE_DENIAL_RATE: f64 = 0.48;

/// Half-width of the uniform jitter added to each month
pub const BASE_RATE_JITTER: f64 = 0.02;

/// Distance kept from each edge of the target denial band
pub const BASE_RATE_HEADROOM: f64 = 0.05;

/// Month-level seasonal shift: winter and summer spikes, spring and fall dips
pub fn seasonal_adjustment(month: u32) -> f64 {
    match month {
        12 | 1 => 0.07,
        7 | 8 => 0.05,
        4 | 5 => -0.04,
        10 | 11 => -0.03,
        _ => 0.0,
    }
}

/// Baseline denial probability per calendar month of the configured window
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBaseRates {
    rates: BTreeMap<YearMonth, f64>,
}

impl MonthlyBaseRates {
    /// Draw one clamped, jittered base rate per month in `[start, end]`
    pub fn generate<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Self {
        let floor = config.target_denial_rate.min + BASE_RATE_HEADROOM;
        let ceiling = config.target_denial_rate.max - BASE_RATE_HEADROOM;
        let last = YearMonth::from_date(config.end_date);

        let mut rates = BTreeMap::new();
        let mut current = YearMonth::from_date(config.start_date);
        while current <= last {
            let raw = BASELINE_DENIAL_RATE
                + seasonal_adjustment(current.month)
                + jitter(rng, BASE_RATE_JITTER);
            rates.insert(current, raw.max(floor).min(ceiling));
            current = current.next();
        }

        tracing::debug!(months = rates.len(), "generated monthly base rates");
        Self { rates }
    }

    pub fn from_rates(rates: BTreeMap<YearMonth, f64>) -> Self {
        Self { rates }
    }

    pub fn rate_for(&self, month: YearMonth) -> SimulationResult<f64> {
        self.rates
            .get(&month)
            .copied()
            .ok_or_else(|| SimulationError::lookup("monthly base rate", month))
    }

    /// Months in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (YearMonth, f64)> + '_ {
        self.rates.iter().map(|(month, rate)| (*month, *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
