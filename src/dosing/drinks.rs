use crate::config::{DoseAmount, DrinkKind};
use crate::error::{CaffeineError, CaffeineResult};

/// Typical caffeine content in mg per 100 ml.
pub fn caffeine_per_100ml(drink: DrinkKind) -> f64 {
    match drink {
        DrinkKind::Espresso => 212.0,
        DrinkKind::Coffee => 40.0,
        DrinkKind::BlackTea => 20.0,
        DrinkKind::GreenTea => 12.0,
        DrinkKind::Cola => 10.0,
        DrinkKind::EnergyDrink => 32.0,
    }
}

/// Caffeine in a dose, rounded to whole milligrams for drink-based doses.
pub fn dose_mg(dose: &DoseAmount) -> CaffeineResult<f64> {
    match dose {
        DoseAmount::Milligrams { mg } => Ok(*mg),
        DoseAmount::Drink { drink, volume_ml } => {
            check_positive("Drink volume", *volume_ml)?;
            Ok((caffeine_per_100ml(*drink) * volume_ml / 100.0).round())
        },
        DoseAmount::Custom { mg_per_100ml, volume_ml } => {
            check_positive("Caffeine content", *mg_per_100ml)?;
            check_positive("Drink volume", *volume_ml)?;
            Ok((mg_per_100ml * volume_ml / 100.0).round())
        },
    }
}

fn check_positive(what: &str, value: f64) -> CaffeineResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CaffeineError::InvalidDosing(
            format!("{} must be positive, got {}", what, value)
        ));
    }
    Ok(())
}
