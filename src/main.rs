use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use caffeine_sim::config::{Config, IntakeConfig, DEFAULT_HALF_LIFE};
use caffeine_sim::dosing::DosingSchedule;
use caffeine_sim::models::caffeine_amount;
use caffeine_sim::output;
use caffeine_sim::simulation::{SimulationSummary, Simulator};

#[derive(Parser)]
#[command(name = "caffeine_sim")]
#[command(about = "Caffeine elimination calculator and multi-dose simulator")]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Caffeine left from a single intake
    Decay {
        /// Initial amount (mg)
        #[arg(short, long)]
        dose: f64,

        /// Half-life (hours)
        #[arg(long, default_value_t = DEFAULT_HALF_LIFE)]
        half_life: f64,

        /// Time since the intake (hours)
        #[arg(long)]
        hours: f64,
    },

    /// Simulate caffeine accumulation over a schedule of intakes
    Simulate {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Intake such as 8AM=95; repeat in schedule order, replaces the config's intakes
        #[arg(short, long = "intake", value_name = "LABEL=MG")]
        intakes: Vec<IntakeConfig>,

        /// Half-life (hours)
        #[arg(long)]
        half_life: Option<f64>,

        /// Sampling step (hours)
        #[arg(long)]
        step: Option<f64>,

        /// Level (mg) to report the crossing time for
        #[arg(long)]
        threshold: Option<f64>,

        /// Output directory; prints the series to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Chart file; defaults to chart.svg in the output directory, or in
        /// the working directory when no output directory is given
        #[arg(long, value_name = "PATH")]
        chart: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match cli.command {
        Command::Decay { dose, half_life, hours } => {
            let remaining = caffeine_amount(dose, half_life, hours)
                .context("Failed to compute remaining caffeine")?;
            info!("{} mg with a {} h half-life after {} h", dose, half_life, hours);
            println!("{:.2}", remaining);
        },
        Command::Simulate { config, intakes, half_life, step, threshold, output, chart } => {
            let mut config = match config {
                Some(path) => {
                    let loaded = Config::from_file(&path)
                        .with_context(|| format!("Failed to load configuration from {:?}", path))?;
                    info!("Loaded configuration from {:?}", path);
                    loaded
                },
                None => Config::new(Vec::new()),
            };

            config.apply_overrides(intakes, half_life, step, threshold);
            config.validate().context("Invalid simulation settings")?;

            run_simulation(&config, output, chart)?;
        },
    }

    Ok(())
}

fn run_simulation(config: &Config, output_dir: Option<PathBuf>, chart: Option<PathBuf>) -> anyhow::Result<()> {
    let schedule = DosingSchedule::from_intakes(&config.intakes)?;
    let simulator = Simulator::from_config(config)?;
    let result = simulator.simulate(&schedule, config.simulation.step)?;

    let summary = SimulationSummary::from_result(
        &result,
        &schedule,
        simulator.half_life(),
        config.simulation.threshold_mg,
    );
    info!(
        "Peak {:.1} mg at {:.2} h, {:.1} mg left after {:.2} h",
        summary.peak_mg,
        summary.peak_time_h,
        summary.final_mg,
        result.times.last().copied().unwrap_or(0.0)
    );
    if let (Some(threshold), Some(time)) = (summary.threshold_mg, summary.below_threshold_h) {
        info!("Level falls below {} mg at {:.2} h", threshold, time);
    }

    match output_dir {
        Some(dir) => {
            // Create output directory if it doesn't exist
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create output directory {:?}", dir))?;
            output::save_results(&result, &schedule, &summary, &dir)?;
            info!("Results saved to {:?}", dir);
            if let Some(path) = chart {
                output::save_chart(&result, &schedule, summary.threshold_mg, &path)?;
            }
        },
        None => {
            output::write_concentrations(&result, std::io::stdout().lock())?;
            info!("{} samples written to stdout", result.len());
            let path = chart.unwrap_or_else(|| PathBuf::from("chart.svg"));
            output::save_chart(&result, &schedule, summary.threshold_mg, &path)
                .with_context(|| format!("Failed to write chart to {:?}", path))?;
        },
    }

    Ok(())
}
