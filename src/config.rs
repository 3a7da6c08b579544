use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use crate::error::{CaffeineError, CaffeineResult};
use log::warn;

pub const DEFAULT_HALF_LIFE: f64 = 5.0;
pub const DEFAULT_STEP: f64 = 0.25;
pub const DEFAULT_PADDING_HOURS: f64 = 12.0;
pub const DEFAULT_THRESHOLD_MG: f64 = 50.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub intakes: Vec<IntakeConfig>,
    #[serde(default)]
    pub metabolism: MetabolismConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeConfig {
    pub time: String,             // 12-hour clock label, e.g. "8AM" or "8:30PM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,  // Only for multi-day schedules
    #[serde(flatten)]
    pub dose: DoseAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DoseAmount {
    Milligrams { mg: f64 },
    Drink { drink: DrinkKind, volume_ml: f64 },
    Custom { mg_per_100ml: f64, volume_ml: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrinkKind {
    Espresso,
    Coffee,
    BlackTea,
    GreenTea,
    Cola,
    EnergyDrink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetabolismConfig {
    HalfLife { half_life: f64 },
    Preset { preset: MetabolismPreset },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetabolismPreset {
    Fast,
    Normal,
    Slow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_step")]
    pub step: f64,                 // Sampling step (hours)
    #[serde(default = "default_padding")]
    pub padding_hours: f64,        // Simulated time after the last intake
    #[serde(default = "default_threshold")]
    pub threshold_mg: Option<f64>, // Level considered low enough to sleep
}

fn default_step() -> f64 {
    DEFAULT_STEP
}

fn default_padding() -> f64 {
    DEFAULT_PADDING_HOURS
}

fn default_threshold() -> Option<f64> {
    Some(DEFAULT_THRESHOLD_MG)
}

impl Default for MetabolismConfig {
    fn default() -> Self {
        MetabolismConfig::HalfLife { half_life: DEFAULT_HALF_LIFE }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            padding_hours: DEFAULT_PADDING_HOURS,
            threshold_mg: Some(DEFAULT_THRESHOLD_MG),
        }
    }
}

impl MetabolismPreset {
    pub fn half_life(&self) -> f64 {
        match self {
            MetabolismPreset::Fast => 3.0,
            MetabolismPreset::Normal => DEFAULT_HALF_LIFE,
            MetabolismPreset::Slow => 8.0,
        }
    }
}

impl MetabolismConfig {
    pub fn half_life(&self) -> f64 {
        match self {
            MetabolismConfig::HalfLife { half_life } => *half_life,
            MetabolismConfig::Preset { preset } => preset.half_life(),
        }
    }
}

impl FromStr for IntakeConfig {
    type Err = CaffeineError;

    /// Parses the command-line form `LABEL=MG`, e.g. `8AM=95`.
    fn from_str(s: &str) -> CaffeineResult<Self> {
        let (label, amount) = s.split_once('=').ok_or_else(|| {
            CaffeineError::InvalidDosing(format!("Expected LABEL=MG, got '{}'", s))
        })?;
        let mg: f64 = amount.trim().parse().map_err(|_| {
            CaffeineError::InvalidDosing(format!("Invalid caffeine amount '{}' in '{}'", amount, s))
        })?;

        Ok(IntakeConfig {
            time: label.trim().to_string(),
            date: None,
            dose: DoseAmount::Milligrams { mg },
        })
    }
}

impl Config {
    pub fn new(intakes: Vec<IntakeConfig>) -> Self {
        Self {
            intakes,
            metabolism: MetabolismConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> CaffeineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn half_life(&self) -> f64 {
        self.metabolism.half_life()
    }

    pub fn validate(&self) -> CaffeineResult<()> {
        let half_life = self.half_life();
        if !half_life.is_finite() || half_life <= 0.0 {
            return Err(CaffeineError::Validation(
                format!("Half-life must be positive, got {}", half_life)
            ));
        }

        self.validate_simulation()?;
        self.validate_intakes()?;

        Ok(())
    }

    fn validate_simulation(&self) -> CaffeineResult<()> {
        let sim = &self.simulation;

        if !sim.step.is_finite() || sim.step <= 0.0 {
            return Err(CaffeineError::Validation(
                format!("Simulation step must be positive, got {}", sim.step)
            ));
        }

        if !sim.padding_hours.is_finite() || sim.padding_hours < 0.0 {
            return Err(CaffeineError::Validation(
                format!("Padding must be non-negative, got {}", sim.padding_hours)
            ));
        }

        if let Some(threshold) = sim.threshold_mg {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(CaffeineError::Validation(
                    format!("Threshold must be non-negative, got {}", threshold)
                ));
            }
        }

        Ok(())
    }

    fn validate_intakes(&self) -> CaffeineResult<()> {
        if self.intakes.is_empty() {
            return Err(CaffeineError::InvalidDosing(
                "At least one intake must be specified".to_string()
            ));
        }

        for intake in &self.intakes {
            crate::dosing::drinks::dose_mg(&intake.dose)?;
        }

        Ok(())
    }

    /// Applies command-line settings on top of the loaded file. Non-empty
    /// `intakes` replace the configured schedule as a whole.
    pub fn apply_overrides(
        &mut self,
        intakes: Vec<IntakeConfig>,
        half_life: Option<f64>,
        step: Option<f64>,
        threshold_mg: Option<f64>,
    ) {
        if !intakes.is_empty() {
            if !self.intakes.is_empty() {
                warn!("Command-line intakes replace the {} intakes from the configuration", self.intakes.len());
            }
            self.intakes = intakes;
        }
        if let Some(half_life) = half_life {
            self.metabolism = MetabolismConfig::HalfLife { half_life };
        }
        if let Some(step) = step {
            self.simulation.step = step;
        }
        if threshold_mg.is_some() {
            self.simulation.threshold_mg = threshold_mg;
        }
    }
}
