pub mod clock;
pub mod drinks;

use crate::config::IntakeConfig;
use crate::models::DoseEvent;
use crate::error::{CaffeineError, CaffeineResult};
use std::collections::HashSet;
use log::debug;

pub use clock::{hours_since, parse_clock_label};

pub struct DosingSchedule {
    pub events: Vec<DoseEvent>,
}

impl DosingSchedule {
    /// Resolves intakes onto hours since the first intake.
    ///
    /// Undated intakes are clock labels anchored on the first entry, rolling
    /// past midnight when a label is earlier than that anchor. When every
    /// intake carries a date the offsets are exact and the events are sorted.
    pub fn from_intakes(intakes: &[IntakeConfig]) -> CaffeineResult<Self> {
        let first = intakes.first().ok_or_else(|| {
            CaffeineError::InvalidDosing("At least one intake is needed to anchor the timeline".to_string())
        })?;

        let dated = intakes.iter().filter(|i| i.date.is_some()).count();
        if dated != 0 && dated != intakes.len() {
            return Err(CaffeineError::InvalidDosing(
                "Either every intake has a date or none does".to_string()
            ));
        }

        let mut seen = HashSet::new();
        for intake in intakes {
            if !seen.insert((intake.date, intake.time.trim())) {
                return Err(CaffeineError::InvalidDosing(
                    format!("Duplicate intake time: {}", intake.time)
                ));
            }
        }

        let mut events = Vec::with_capacity(intakes.len());

        if dated == 0 {
            let reference = parse_clock_label(&first.time)?;
            for intake in intakes {
                let time = hours_since(&intake.time, reference)?;
                events.push(Self::event(intake, time)?);
            }
        } else {
            let mut datetimes = Vec::with_capacity(intakes.len());
            for intake in intakes {
                let time_of_day = parse_clock_label(&intake.time)?;
                // `dated` equals `intakes.len()`, so every date is present
                if let Some(date) = intake.date {
                    datetimes.push((intake, date.and_time(time_of_day)));
                }
            }

            datetimes.sort_by_key(|(_, datetime)| *datetime);
            if let Some(&(_, origin)) = datetimes.first() {
                for (intake, datetime) in datetimes {
                    events.push(Self::event(intake, clock::hours_between(origin, datetime))?);
                }
            }
        }

        debug!("Resolved {} intakes: {:?}", events.len(), events);
        Ok(Self { events })
    }

    fn event(intake: &IntakeConfig, time: f64) -> CaffeineResult<DoseEvent> {
        let amount = drinks::dose_mg(&intake.dose)?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CaffeineError::InvalidDosing(
                format!("Intake at {} must contain a positive amount of caffeine, got {} mg", intake.time, amount)
            ));
        }

        let label = match intake.date {
            Some(date) => format!("{} {}", date, intake.time.trim()),
            None => intake.time.trim().to_string(),
        };

        Ok(DoseEvent { label, time, amount })
    }

    pub fn events_before(&self, time: f64) -> Vec<DoseEvent> {
        self.events.iter()
            .filter(|event| event.time <= time)
            .cloned()
            .collect()
    }

    /// Offset of the latest intake.
    pub fn last_dose_time(&self) -> f64 {
        self.events.iter()
            .map(|event| event.time)
            .fold(0.0, f64::max)
    }

    pub fn total_amount(&self) -> f64 {
        self.events.iter().map(|event| event.amount).sum()
    }
}
