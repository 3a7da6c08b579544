use super::{decay_constant, remaining, DoseEvent, EliminationModel};
use crate::error::CaffeineResult;

/// Single-compartment first-order elimination: every intake decays
/// independently and the amounts superpose.
#[derive(Debug, Clone)]
pub struct FirstOrderElimination {
    half_life: f64,
    lambda: f64,
}

impl FirstOrderElimination {
    pub fn new(half_life: f64) -> CaffeineResult<Self> {
        let lambda = decay_constant(half_life)?;
        Ok(Self { half_life, lambda })
    }
}

impl EliminationModel for FirstOrderElimination {
    fn concentration(&self, time: f64, dose_history: &[DoseEvent]) -> f64 {
        let mut concentration = 0.0;

        for dose in dose_history {
            // Doses not yet taken contribute nothing
            if dose.time <= time {
                concentration += remaining(dose.amount, self.lambda, time - dose.time);
            }
        }

        concentration
    }

    fn half_life(&self) -> f64 {
        self.half_life
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::caffeine_amount;
    use approx::assert_relative_eq;

    fn dose(label: &str, time: f64, amount: f64) -> DoseEvent {
        DoseEvent { label: label.to_string(), time, amount }
    }

    #[test]
    fn test_single_dose_matches_decay_formula() {
        let model = FirstOrderElimination::new(5.0).unwrap();
        let doses = [dose("8AM", 0.0, 200.0)];

        for i in 0..40 {
            let t = i as f64 * 0.5;
            let expected = caffeine_amount(200.0, 5.0, t).unwrap();
            assert_eq!(model.concentration(t, &doses), expected);
        }
    }

    #[test]
    fn test_superposition_of_two_doses() {
        let model = FirstOrderElimination::new(5.0).unwrap();
        let doses = [dose("7AM", 0.0, 120.0), dose("8AM", 1.0, 80.0)];

        assert_relative_eq!(model.concentration(0.0, &doses), 120.0, epsilon = 1e-12);
        assert_relative_eq!(model.concentration(1.0, &doses), 184.466, epsilon = 1e-3);
    }

    #[test]
    fn test_future_doses_contribute_nothing() {
        let model = FirstOrderElimination::new(5.0).unwrap();
        let doses = [dose("10AM", 2.0, 100.0)];

        assert_eq!(model.concentration(0.0, &doses), 0.0);
        assert_eq!(model.concentration(1.99, &doses), 0.0);
        assert_eq!(model.concentration(2.0, &doses), 100.0);
    }

    #[test]
    fn test_rejects_non_positive_half_life() {
        assert!(FirstOrderElimination::new(0.0).is_err());
        assert!(FirstOrderElimination::new(-3.0).is_err());
    }
}
