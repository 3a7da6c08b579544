//! Caffeine elimination calculator.
//!
//! [`models::caffeine_amount`] gives the caffeine left from one intake;
//! [`simulation::caffeine_simulation`] superposes a schedule of intakes and
//! samples the total over time, and [`output`] writes the series and an SVG
//! chart of it.

pub mod config;
pub mod models;
pub mod dosing;
pub mod simulation;
pub mod output;
pub mod error;

pub use crate::error::{CaffeineError, CaffeineResult};
