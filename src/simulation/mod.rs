pub mod series;
pub mod summary;

use crate::config::{Config, IntakeConfig};
use crate::dosing::DosingSchedule;
use crate::models::{EliminationModel, FirstOrderElimination};
use crate::error::{CaffeineError, CaffeineResult};
use log::{info, debug};

pub use series::*;
pub use summary::*;

const MAX_SAMPLES: usize = 1_000_000;

pub struct Simulator {
    model: Box<dyn EliminationModel>,
    padding_hours: f64,
}

impl Simulator {
    pub fn new(half_life: f64, padding_hours: f64) -> CaffeineResult<Self> {
        if !padding_hours.is_finite() || padding_hours < 0.0 {
            return Err(CaffeineError::Validation(
                format!("Padding must be non-negative, got {}", padding_hours)
            ));
        }

        Ok(Self {
            model: Box::new(FirstOrderElimination::new(half_life)?),
            padding_hours,
        })
    }

    pub fn from_config(config: &Config) -> CaffeineResult<Self> {
        Self::new(config.half_life(), config.simulation.padding_hours)
    }

    pub fn half_life(&self) -> f64 {
        self.model.half_life()
    }

    pub fn simulate(&self, schedule: &DosingSchedule, step: f64) -> CaffeineResult<SimulationResult> {
        if schedule.events.is_empty() {
            return Err(CaffeineError::InvalidDosing(
                "Cannot simulate an empty dosing schedule".to_string()
            ));
        }

        let horizon = schedule.last_dose_time() + self.padding_hours;
        let times = sample_times(horizon, step)?;
        info!(
            "Simulating {} doses over {:.2} h ({} samples, half-life {} h)",
            schedule.events.len(), horizon, times.len(), self.half_life()
        );

        let mut concentrations = Vec::with_capacity(times.len());
        for &time in &times {
            let dose_history = schedule.events_before(time);
            concentrations.push(self.model.concentration(time, &dose_history));
        }

        debug!("Peak level {:.2} mg", concentrations.iter().copied().fold(0.0, f64::max));
        Ok(SimulationResult { times, concentrations })
    }
}

/// Sample times `0, step, 2*step, ...` covering `[0, horizon]`. The last
/// sample lands on the horizon or less than one step past it.
pub fn sample_times(horizon: f64, step: f64) -> CaffeineResult<Vec<f64>> {
    if !step.is_finite() || step <= 0.0 {
        return Err(CaffeineError::Validation(
            format!("Simulation step must be positive, got {}", step)
        ));
    }
    if !horizon.is_finite() || horizon < 0.0 {
        return Err(CaffeineError::Simulation(
            format!("Invalid simulation horizon: {}", horizon)
        ));
    }

    let ratio = horizon / step;
    let nearest = ratio.round();
    // Absorb rounding noise so 12.0 / 0.1 does not gain an extra sample
    let n = if (ratio - nearest).abs() <= 1e-9 * nearest.max(1.0) {
        nearest
    } else {
        ratio.ceil()
    };

    if n >= MAX_SAMPLES as f64 {
        return Err(CaffeineError::Simulation(
            format!("Step {} h produces too many samples for a {} h horizon", step, horizon)
        ));
    }

    let n = n as usize;
    Ok((0..=n).map(|i| i as f64 * step).collect())
}

/// Resolves `intakes` (first entry is the time origin) and simulates them
/// with the default padding.
pub fn caffeine_simulation(
    intakes: &[IntakeConfig],
    half_life: f64,
    step: f64,
) -> CaffeineResult<SimulationResult> {
    let schedule = DosingSchedule::from_intakes(intakes)?;
    let simulator = Simulator::new(half_life, crate::config::DEFAULT_PADDING_HOURS)?;
    simulator.simulate(&schedule, step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::caffeine_amount;
    use approx::assert_relative_eq;

    fn intakes(pairs: &[(&str, f64)]) -> Vec<IntakeConfig> {
        pairs.iter()
            .map(|(label, mg)| format!("{}={}", label, mg).parse().unwrap())
            .collect()
    }

    #[test]
    fn test_two_dose_example() {
        let result = caffeine_simulation(&intakes(&[("7AM", 120.0), ("8AM", 80.0)]), 5.0, 0.25).unwrap();

        assert_relative_eq!(result.concentrations[0], 120.0, epsilon = 1e-12);
        // Sample 4 is t = 1.0 h
        assert_eq!(result.times[4], 1.0);
        let expected = 120.0 * (-(2.0_f64.ln() / 5.0)).exp() + 80.0;
        assert_relative_eq!(result.concentrations[4], expected, epsilon = 1e-9);
        assert_relative_eq!(result.concentrations[4], 184.4, epsilon = 0.1);
    }

    #[test]
    fn test_horizon_is_last_dose_plus_twelve_hours() {
        let result = caffeine_simulation(&intakes(&[("7AM", 120.0), ("12PM", 80.0)]), 5.0, 0.25).unwrap();

        // 0..=17 h in quarter hours
        assert_eq!(result.len(), 69);
        assert_eq!(result.times.last().copied(), Some(17.0));
        assert_eq!(result.concentrations.len(), result.times.len());
    }

    #[test]
    fn test_single_dose_reduces_to_decay_formula() {
        let result = caffeine_simulation(&intakes(&[("9AM", 150.0)]), 4.0, 0.5).unwrap();

        for (time, conc) in result.points() {
            assert_eq!(conc, caffeine_amount(150.0, 4.0, time).unwrap());
        }
    }

    #[test]
    fn test_samples_before_a_dose_are_zero() {
        let schedule = DosingSchedule {
            events: vec![crate::models::DoseEvent {
                label: "10AM".to_string(),
                time: 3.0,
                amount: 100.0,
            }],
        };
        let simulator = Simulator::new(5.0, 12.0).unwrap();
        let result = simulator.simulate(&schedule, 0.5).unwrap();

        for (time, conc) in result.points() {
            if time < 3.0 {
                assert_eq!(conc, 0.0);
            } else {
                assert!(conc > 0.0);
            }
        }
    }

    #[test]
    fn test_overnight_schedule() {
        let result = caffeine_simulation(&intakes(&[("11PM", 100.0), ("1AM", 100.0)]), 5.0, 1.0).unwrap();

        // Second dose lands two hours after the first
        assert_eq!(result.times.last().copied(), Some(14.0));
        assert_relative_eq!(
            result.concentrations[2],
            caffeine_amount(100.0, 5.0, 2.0).unwrap() + 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_same_offset_doses_sum() {
        let result = caffeine_simulation(&intakes(&[("8AM", 100.0), ("08AM", 50.0)]), 5.0, 1.0).unwrap();
        assert_eq!(result.concentrations[0], 150.0);
    }

    #[test]
    fn test_sample_times_rounding() {
        assert_eq!(sample_times(1.0, 0.25).unwrap(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        // Uneven division overshoots by less than a step
        assert_eq!(sample_times(1.0, 0.4).unwrap().len(), 4);
        // 12 / 0.1 is not exact in floating point
        assert_eq!(sample_times(12.0, 0.1).unwrap().len(), 121);
        assert_eq!(sample_times(0.0, 0.5).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_invalid_inputs() {
        let doses = intakes(&[("8AM", 100.0)]);
        assert!(matches!(caffeine_simulation(&doses, 5.0, 0.0), Err(CaffeineError::Validation(_))));
        assert!(matches!(caffeine_simulation(&doses, 5.0, -1.0), Err(CaffeineError::Validation(_))));
        assert!(matches!(caffeine_simulation(&doses, 0.0, 0.25), Err(CaffeineError::Validation(_))));
        assert!(matches!(caffeine_simulation(&[], 5.0, 0.25), Err(CaffeineError::InvalidDosing(_))));
        assert!(matches!(sample_times(12.0, 1e-9), Err(CaffeineError::Simulation(_))));
    }

    #[test]
    fn test_negative_drink_cannot_be_simulated() {
        let doses = vec![IntakeConfig {
            time: "8AM".to_string(),
            date: None,
            dose: crate::config::DoseAmount::Custom { mg_per_100ml: -40.0, volume_ml: -250.0 },
        }];
        assert!(matches!(caffeine_simulation(&doses, 5.0, 1.0), Err(CaffeineError::InvalidDosing(_))));
    }
}
