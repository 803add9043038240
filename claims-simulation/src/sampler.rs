use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::catalogs::Weighted;
use crate::error::{SimulationError, SimulationResult};

/// Random stream threaded through every sampling call of a run
pub type SimulationRng = ChaCha8Rng;

/// Build the run's random stream from the configured seed
pub fn seeded_rng(seed: u64) -> SimulationRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Pick one entry with probability `weight / Σweights`.
///
/// Walks the catalog subtracting weights from a draw in `[0, Σweights)`.
/// If rounding keeps the remainder above zero past the final entry, the final
/// entry is returned.
pub fn pick_weighted<'a, T, R>(items: &'a [T], rng: &mut R) -> SimulationResult<&'a T>
where
    T: Weighted,
    R: Rng + ?Sized,
{
    let last = items.last().ok_or_else(|| {
        SimulationError::InvalidCatalog("cannot sample from an empty catalog".to_string())
    })?;

    let mut total = 0.0;
    for weight in items.iter().map(Weighted::weight) {
        if !weight.is_finite() || weight < 0.0 {
            return Err(SimulationError::InvalidCatalog(format!(
                "weight {} is not a finite non-negative number",
                weight
            )));
        }
        total += weight;
    }
    if total <= 0.0 {
        return Err(SimulationError::InvalidCatalog(
            "catalog weights sum to zero".to_string(),
        ));
    }

    let mut remaining = rng.gen::<f64>() * total;
    for item in items {
        remaining -= item.weight();
        if remaining <= 0.0 {
            return Ok(item);
        }
    }
    Ok(last)
}

/// Pick one entry with equal probability
pub fn pick_uniform<'a, T, R>(items: &'a [T], rng: &mut R) -> SimulationResult<&'a T>
where
    R: Rng + ?Sized,
{
    items.choose(rng).ok_or_else(|| {
        SimulationError::InvalidCatalog("cannot sample from an empty catalog".to_string())
    })
}

/// Uniform integer in `[min, max]`; returns `min` when the range is degenerate
pub fn uniform_int<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    if min >= max {
        min
    } else {
        rng.gen_range(min..=max)
    }
}

/// Uniform calendar day in `[start, end]`, both ends inclusive
pub fn uniform_date<R: Rng + ?Sized>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = (end - start).num_days();
    if span <= 0 {
        return start;
    }
    let offset = rng.gen_range(0..=span);
    start
        .checked_add_signed(Duration::days(offset))
        .unwrap_or(end)
}

/// Symmetric noise in `[-half_width, +half_width)`
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, half_width: f64) -> f64 {
    if half_width > 0.0 && half_width.is_finite() {
        rng.gen_range(-half_width..half_width)
    } else {
        0.0
    }
}

/// Bernoulli trial: one uniform draw compared against `p`
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.gen::<f64>() < p
}
