use crate::dosing::DosingSchedule;
use crate::simulation::SimulationResult;
use crate::error::CaffeineResult;
use std::fmt::Write;

const MARGIN_TOP: f64 = 50.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 60.0;
const MARGIN_LEFT: f64 = 70.0;
const LINE_COLOR: &str = "#1f77b4";
const THRESHOLD_COLOR: &str = "#d62728";

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: f64,
    pub height: f64,
    pub title: String,
    pub threshold_mg: Option<f64>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            title: "Caffeine Metabolism Simulation".to_string(),
            threshold_mg: None,
        }
    }
}

struct Frame {
    width: f64,
    height: f64,
    x_max: f64,
    y_max: f64,
}

impl Frame {
    fn x(&self, time: f64) -> f64 {
        time / self.x_max * self.width
    }

    fn y(&self, mg: f64) -> f64 {
        self.height - mg / self.y_max * self.height
    }
}

/// Renders the caffeine curve as a standalone SVG document.
pub fn render_chart(
    result: &SimulationResult,
    schedule: &DosingSchedule,
    options: &ChartOptions,
) -> CaffeineResult<String> {
    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = options.width,
        h = options.height
    )?;
    writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#)?;

    if result.is_empty() {
        writeln!(
            svg,
            r##"<text x="50%" y="50%" text-anchor="middle" fill="#999" font-size="18">Add caffeine intakes to see the chart</text>"##
        )?;
        svg.push_str("</svg>\n");
        return Ok(svg);
    }

    let x_max = result.times.last().copied().unwrap_or(0.0);
    let mut y_max = result.get_max_concentration();
    if let Some(threshold) = options.threshold_mg {
        y_max = y_max.max(threshold);
    }

    let frame = Frame {
        width: (options.width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
        height: (options.height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
        x_max: if x_max > 0.0 { x_max } else { 1.0 },
        y_max: if y_max > 0.0 { y_max * 1.1 } else { 1.0 },
    };

    writeln!(
        svg,
        r#"<text x="{}" y="30" text-anchor="middle" font-size="18">{}</text>"#,
        options.width / 2.0,
        escape(&options.title)
    )?;
    writeln!(svg, r#"<g transform="translate({},{})">"#, MARGIN_LEFT, MARGIN_TOP)?;

    write_grid_and_axes(&mut svg, &frame)?;
    write_dose_markers(&mut svg, &frame, schedule)?;

    if let Some(threshold) = options.threshold_mg {
        let y = frame.y(threshold);
        writeln!(
            svg,
            r#"<line class="threshold" x1="0" x2="{:.2}" y1="{y:.2}" y2="{y:.2}" stroke="{}" stroke-dasharray="6,4"/>"#,
            frame.width,
            THRESHOLD_COLOR
        )?;
    }

    let mut path = String::new();
    for (i, (time, mg)) in result.points().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        write!(path, "{}{:.2},{:.2} ", command, frame.x(time), frame.y(mg))?;
    }
    writeln!(
        svg,
        r#"<path class="caffeine-line" d="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
        path.trim_end(),
        LINE_COLOR
    )?;

    write_legend(&mut svg, &frame, options.threshold_mg)?;

    svg.push_str("</g>\n</svg>\n");
    Ok(svg)
}

fn write_grid_and_axes(svg: &mut String, frame: &Frame) -> CaffeineResult<()> {
    writeln!(svg, r#"<g class="grid" stroke="black" stroke-opacity="0.3" stroke-width="0.5">"#)?;
    for tick in nice_ticks(frame.x_max, 10) {
        let x = frame.x(tick);
        writeln!(svg, r#"<line x1="{x:.2}" x2="{x:.2}" y1="0" y2="{:.2}"/>"#, frame.height)?;
    }
    for tick in nice_ticks(frame.y_max, 8) {
        let y = frame.y(tick);
        writeln!(svg, r#"<line x1="0" x2="{:.2}" y1="{y:.2}" y2="{y:.2}"/>"#, frame.width)?;
    }
    svg.push_str("</g>\n");

    // Axis lines
    writeln!(
        svg,
        r#"<path class="axis" d="M0,0 L0,{h:.2} L{w:.2},{h:.2}" fill="none" stroke="black"/>"#,
        h = frame.height,
        w = frame.width
    )?;

    for tick in nice_ticks(frame.x_max, 10) {
        writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="12">{}</text>"#,
            frame.x(tick),
            frame.height + 18.0,
            format_tick(tick)
        )?;
    }
    for tick in nice_ticks(frame.y_max, 8) {
        writeln!(
            svg,
            r#"<text x="-8" y="{:.2}" text-anchor="end" font-size="12">{}</text>"#,
            frame.y(tick) + 4.0,
            format_tick(tick)
        )?;
    }

    writeln!(
        svg,
        r#"<text class="axis-label" x="{:.2}" y="{:.2}" text-anchor="middle" font-size="14">Time since first intake (hours)</text>"#,
        frame.width / 2.0,
        frame.height + MARGIN_BOTTOM - 15.0
    )?;
    writeln!(
        svg,
        r#"<text class="axis-label" transform="rotate(-90)" x="{:.2}" y="{:.2}" text-anchor="middle" font-size="14">Caffeine in body (mg)</text>"#,
        -frame.height / 2.0,
        -MARGIN_LEFT + 18.0
    )?;

    Ok(())
}

fn write_dose_markers(svg: &mut String, frame: &Frame, schedule: &DosingSchedule) -> CaffeineResult<()> {
    for event in &schedule.events {
        let x = frame.x(event.time);
        writeln!(
            svg,
            r#"<g class="dose"><title>{} - {} mg</title><line x1="{x:.2}" x2="{x:.2}" y1="0" y2="{:.2}" stroke="{}" stroke-opacity="0.3" stroke-dasharray="2,3"/><circle cx="{x:.2}" cy="{:.2}" r="4" fill="{}"/></g>"#,
            escape(&event.label),
            event.amount,
            frame.height,
            LINE_COLOR,
            frame.height,
            LINE_COLOR
        )?;
    }
    Ok(())
}

fn write_legend(svg: &mut String, frame: &Frame, threshold: Option<f64>) -> CaffeineResult<()> {
    let rows = if threshold.is_some() { 2.0 } else { 1.0 };
    let x = frame.width - 200.0;

    writeln!(svg, r#"<g class="legend" font-size="13">"#)?;
    writeln!(
        svg,
        r#"<rect x="{:.2}" y="10" width="190" height="{:.2}" rx="4" fill="white" stroke="black" stroke-opacity="0.3"/>"#,
        x,
        10.0 + rows * 20.0
    )?;
    writeln!(
        svg,
        r#"<line x1="{:.2}" x2="{:.2}" y1="25" y2="25" stroke="{}" stroke-width="2"/><text x="{:.2}" y="29">Caffeine level (mg)</text>"#,
        x + 10.0,
        x + 35.0,
        LINE_COLOR,
        x + 42.0
    )?;
    if let Some(threshold) = threshold {
        writeln!(
            svg,
            r#"<line x1="{:.2}" x2="{:.2}" y1="45" y2="45" stroke="{}" stroke-dasharray="6,4"/><text x="{:.2}" y="49">Threshold ({} mg)</text>"#,
            x + 10.0,
            x + 35.0,
            THRESHOLD_COLOR,
            x + 42.0,
            threshold
        )?;
    }
    svg.push_str("</g>\n");
    Ok(())
}

/// Round tick positions in `[0, max]`, stepping by 1, 2 or 5 times a power of ten.
fn nice_ticks(max: f64, target: usize) -> Vec<f64> {
    if max.is_nan() || max <= 0.0 || target == 0 {
        return vec![0.0];
    }

    let raw = max / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let error = raw / magnitude;
    let step = magnitude * if error >= 7.07 {
        10.0
    } else if error >= 3.16 {
        5.0
    } else if error >= 1.41 {
        2.0
    } else {
        1.0
    };

    let count = (max / step + 1e-9).floor() as usize;
    (0..=count).map(|i| i as f64 * step).collect()
}

fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round())
    } else {
        format!("{:.1}", value)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
