pub mod chart;

use crate::config::{IntakeConfig, DEFAULT_PADDING_HOURS};
use crate::dosing::DosingSchedule;
use crate::simulation::{SimulationResult, SimulationSummary, Simulator};
use crate::error::CaffeineResult;
use std::path::Path;
use std::fs::File;
use log::info;

pub use chart::{render_chart, ChartOptions};

pub fn save_results<P: AsRef<Path>>(
    result: &SimulationResult,
    schedule: &DosingSchedule,
    summary: &SimulationSummary,
    output_dir: P,
) -> CaffeineResult<()> {
    let output_path = output_dir.as_ref();

    save_concentration_data(result, &output_path.join("concentrations.csv"))?;
    save_dose_data(schedule, &output_path.join("doses.csv"))?;
    save_summary(summary, &output_path.join("summary.json"))?;

    save_chart(result, schedule, summary.threshold_mg, &output_path.join("chart.svg"))?;

    generate_report(schedule, summary, output_path)?;

    info!("All results saved to {:?}", output_path);
    Ok(())
}

/// Renders the curve to an SVG file, creating missing parent directories.
pub fn save_chart<P: AsRef<Path>>(
    result: &SimulationResult,
    schedule: &DosingSchedule,
    threshold_mg: Option<f64>,
    path: P,
) -> CaffeineResult<()> {
    let path = path.as_ref();
    let options = ChartOptions {
        threshold_mg,
        ..ChartOptions::default()
    };
    let svg = render_chart(result, schedule, &options)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, svg)?;
    info!("Chart written to {:?}", path);
    Ok(())
}

/// Simulates `intakes` with the default padding and renders the curve to
/// `chart_path`, returning the sampled series.
pub fn simulate_and_plot<P: AsRef<Path>>(
    intakes: &[IntakeConfig],
    half_life: f64,
    step: f64,
    chart_path: P,
) -> CaffeineResult<SimulationResult> {
    let schedule = DosingSchedule::from_intakes(intakes)?;
    let result = Simulator::new(half_life, DEFAULT_PADDING_HOURS)?.simulate(&schedule, step)?;
    save_chart(&result, &schedule, None, chart_path)?;
    Ok(result)
}

/// Writes `TIME_H,CAFFEINE_MG` rows to any writer, e.g. stdout.
pub fn write_concentrations<W: std::io::Write>(result: &SimulationResult, writer: W) -> CaffeineResult<()> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(["TIME_H", "CAFFEINE_MG"])?;
    for (time, conc) in result.points() {
        writer.write_record(&[format!("{:.4}", time), format!("{:.4}", conc)])?;
    }

    writer.flush()?;
    Ok(())
}

fn save_concentration_data<P: AsRef<Path>>(result: &SimulationResult, path: P) -> CaffeineResult<()> {
    write_concentrations(result, File::create(path)?)
}

fn save_dose_data<P: AsRef<Path>>(schedule: &DosingSchedule, path: P) -> CaffeineResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(["LABEL", "OFFSET_H", "AMOUNT_MG"])?;
    for event in &schedule.events {
        writer.write_record(&[
            event.label.clone(),
            event.time.to_string(),
            event.amount.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn save_summary<P: AsRef<Path>>(summary: &SimulationSummary, path: P) -> CaffeineResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, summary)?;
    Ok(())
}

/// Markdown report of the schedule and the curve metrics
pub fn generate_report<P: AsRef<Path>>(
    schedule: &DosingSchedule,
    summary: &SimulationSummary,
    output_dir: P,
) -> CaffeineResult<()> {
    let report_path = output_dir.as_ref().join("simulation_report.md");

    let intake_rows: String = schedule.events.iter()
        .map(|e| format!("| {} | {:.2} | {:.1} |\n", e.label, e.time, e.amount))
        .collect();

    let threshold_line = match (summary.threshold_mg, summary.below_threshold_h) {
        (Some(threshold), Some(time)) => format!(
            "- **Below {:.0} mg after**: {:.2} h since first intake", threshold, time
        ),
        (Some(threshold), None) => format!(
            "- **Below {:.0} mg after**: not reached within the simulated window", threshold
        ),
        (None, _) => "- **Threshold**: not set".to_string(),
    };

    let report_content = format!(
        r#"# Caffeine Metabolism Simulation Report

## Intakes
| Label | Hours since first intake | Caffeine (mg) |
|-------|--------------------------|---------------|
{}
- **Total caffeine**: {:.1} mg
- **Half-life**: {:.2} h (decay constant {:.4} /h)

## Caffeine Curve
- **Peak**: {:.1} mg at {:.2} h
- **Area under the curve**: {:.1} mg*h
- **Level at end of simulation**: {:.1} mg
{}

## Files Generated
- `concentrations.csv`: Caffeine in body at each sample time
- `doses.csv`: Resolved intakes
- `summary.json`: Curve metrics
- `chart.svg`: Caffeine level chart
"#,
        intake_rows,
        summary.total_mg,
        summary.half_life_h,
        std::f64::consts::LN_2 / summary.half_life_h,
        summary.peak_mg,
        summary.peak_time_h,
        summary.auc_mg_h,
        summary.final_mg,
        threshold_line,
    );

    std::fs::write(report_path, report_content)?;
    Ok(())
}
