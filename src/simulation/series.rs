use serde::{Deserialize, Serialize};

/// Sampled caffeine curve: `concentrations[i]` is the amount in the body
/// at `times[i]` hours since the first intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub times: Vec<f64>,
    pub concentrations: Vec<f64>,
}

impl SimulationResult {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.concentrations.iter().copied())
    }

    pub fn get_max_concentration(&self) -> f64 {
        self.concentrations.iter()
            .copied()
            .fold(0.0, f64::max)
    }

    /// Earliest sample time at which the peak is reached.
    pub fn get_time_to_max(&self) -> Option<f64> {
        self.points()
            .fold(None, |best: Option<(f64, f64)>, point| match best {
                Some(b) if point.1 <= b.1 => Some(b),
                _ => Some(point),
            })
            .map(|(time, _)| time)
    }

    /// Trapezoidal area under the curve, mg*h.
    pub fn get_auc(&self) -> f64 {
        let mut auc = 0.0;

        for (t, c) in self.times.windows(2).zip(self.concentrations.windows(2)) {
            let dt = t[1] - t[0];
            let avg_conc = (c[0] + c[1]) / 2.0;
            auc += dt * avg_conc;
        }

        auc
    }

    pub fn get_final_concentration(&self) -> f64 {
        self.concentrations.last().copied().unwrap_or(0.0)
    }

    /// First sample at or after `after` whose level is below `threshold`.
    pub fn get_time_below(&self, threshold: f64, after: f64) -> Option<f64> {
        self.points()
            .find(|&(time, conc)| time >= after && conc < threshold)
            .map(|(time, _)| time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn result() -> SimulationResult {
        SimulationResult {
            times: vec![0.0, 1.0, 2.0, 3.0, 4.0],
            concentrations: vec![100.0, 150.0, 120.0, 60.0, 30.0],
        }
    }

    #[test]
    fn test_peak() {
        let r = result();
        assert_eq!(r.get_max_concentration(), 150.0);
        assert_eq!(r.get_time_to_max(), Some(1.0));
    }

    #[test]
    fn test_flat_peak_reports_first_time() {
        let r = SimulationResult {
            times: vec![0.0, 1.0, 2.0, 3.0],
            concentrations: vec![50.0, 80.0, 80.0, 40.0],
        };
        assert_eq!(r.get_time_to_max(), Some(1.0));
    }

    #[test]
    fn test_auc() {
        // 125 + 135 + 90 + 45
        assert_relative_eq!(result().get_auc(), 395.0, epsilon = 1e-12);
    }

    #[test]
    fn test_time_below_threshold() {
        let r = result();
        assert_eq!(r.get_time_below(50.0, 1.0), Some(4.0));
        assert_eq!(r.get_time_below(125.0, 1.0), Some(2.0));
        assert_eq!(r.get_time_below(10.0, 0.0), None);
    }

    #[test]
    fn test_empty_result() {
        let r = SimulationResult { times: vec![], concentrations: vec![] };
        assert!(r.is_empty());
        assert_eq!(r.get_max_concentration(), 0.0);
        assert_eq!(r.get_time_to_max(), None);
        assert_eq!(r.get_auc(), 0.0);
        assert_eq!(r.get_final_concentration(), 0.0);
    }
}
