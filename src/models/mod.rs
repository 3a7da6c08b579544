pub mod first_order;

use crate::error::{CaffeineError, CaffeineResult};
use serde::{Deserialize, Serialize};

pub use first_order::FirstOrderElimination;

pub trait EliminationModel {
    /// Total amount in the body at `time`, hours since the first intake.
    fn concentration(&self, time: f64, dose_history: &[DoseEvent]) -> f64;
    fn half_life(&self) -> f64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseEvent {
    pub label: String,
    pub time: f64,   // Hours since the first intake
    pub amount: f64, // mg
}

/// Rate constant of first-order elimination, `ln 2 / half_life`.
pub fn decay_constant(half_life: f64) -> CaffeineResult<f64> {
    if !half_life.is_finite() || half_life <= 0.0 {
        return Err(CaffeineError::Validation(
            format!("Half-life must be a positive number of hours, got {}", half_life)
        ));
    }
    Ok(std::f64::consts::LN_2 / half_life)
}

/// Remaining caffeine (mg) from a single intake of `initial_amount` mg
/// after `time_elapsed` hours.
pub fn caffeine_amount(initial_amount: f64, half_life: f64, time_elapsed: f64) -> CaffeineResult<f64> {
    if !initial_amount.is_finite() || initial_amount < 0.0 {
        return Err(CaffeineError::Validation(
            format!("Initial amount must be non-negative, got {}", initial_amount)
        ));
    }
    if !time_elapsed.is_finite() || time_elapsed < 0.0 {
        return Err(CaffeineError::Validation(
            format!("Elapsed time must be non-negative, got {}", time_elapsed)
        ));
    }

    let lambda = decay_constant(half_life)?;
    Ok(remaining(initial_amount, lambda, time_elapsed))
}

// Unchecked kernel shared with the elimination models.
pub(crate) fn remaining(initial_amount: f64, lambda: f64, time_elapsed: f64) -> f64 {
    initial_amount * (-lambda * time_elapsed).exp()
}
