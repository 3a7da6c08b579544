use super::SimulationResult;
use crate::dosing::DosingSchedule;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub n_doses: usize,
    pub total_mg: f64,
    pub half_life_h: f64,
    pub peak_mg: f64,
    pub peak_time_h: f64,
    pub auc_mg_h: f64,
    pub final_mg: f64,
    pub threshold_mg: Option<f64>,
    pub below_threshold_h: Option<f64>, // First time after the last intake
}

impl SimulationSummary {
    pub fn from_result(
        result: &SimulationResult,
        schedule: &DosingSchedule,
        half_life: f64,
        threshold: Option<f64>,
    ) -> Self {
        let below_threshold_h = threshold
            .and_then(|t| result.get_time_below(t, schedule.last_dose_time()));

        Self {
            n_doses: schedule.events.len(),
            total_mg: schedule.total_amount(),
            half_life_h: half_life,
            peak_mg: result.get_max_concentration(),
            peak_time_h: result.get_time_to_max().unwrap_or(0.0),
            auc_mg_h: result.get_auc(),
            final_mg: result.get_final_concentration(),
            threshold_mg: threshold,
            below_threshold_h,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntakeConfig;
    use crate::simulation::Simulator;

    #[test]
    fn test_summary_of_single_dose() {
        let intakes: Vec<IntakeConfig> = vec!["8AM=200".parse().unwrap()];
        let schedule = DosingSchedule::from_intakes(&intakes).unwrap();
        let simulator = Simulator::new(5.0, 12.0).unwrap();
        let result = simulator.simulate(&schedule, 0.25).unwrap();

        let summary = SimulationSummary::from_result(&result, &schedule, 5.0, Some(60.0));

        assert_eq!(summary.n_doses, 1);
        assert_eq!(summary.total_mg, 200.0);
        assert_eq!(summary.peak_mg, 200.0);
        assert_eq!(summary.peak_time_h, 0.0);
        // 200 mg drops under 60 mg at about 8.68 h
        assert_eq!(summary.below_threshold_h, Some(8.75));
        assert!(summary.final_mg < 40.0);
    }

    #[test]
    fn test_summary_without_threshold() {
        let intakes: Vec<IntakeConfig> = vec!["8AM=100".parse().unwrap()];
        let schedule = DosingSchedule::from_intakes(&intakes).unwrap();
        let simulator = Simulator::new(5.0, 12.0).unwrap();
        let result = simulator.simulate(&schedule, 1.0).unwrap();

        let summary = SimulationSummary::from_result(&result, &schedule, 5.0, None);
        assert_eq!(summary.below_threshold_h, None);
    }
}
