//! Distribution summaries (histograms and kernel densities) of cleaned fields

use std::fmt::Write as _;

use polars::prelude::*;
use serde::Serialize;

use super::error::{PipelineError, PipelineResult};
use super::schema::{AGE, POINTS, SALARY, TOI_PER_GAME};

/// Number of grid points for density estimates
const DENSITY_POINTS: usize = 512;

/// Bandwidths beyond the data range covered by the density grid
const DENSITY_CUT: f64 = 3.0;

/// The fields the standard analysis describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DescribeField {
    Salary,
    Age,
    Points,
    ToiPerGame,
}

impl DescribeField {
    pub const ALL: [DescribeField; 4] = [
        DescribeField::Salary,
        DescribeField::Age,
        DescribeField::Points,
        DescribeField::ToiPerGame,
    ];

    /// Column name in the cleaned table
    pub fn column(&self) -> &'static str {
        match self {
            DescribeField::Salary => SALARY,
            DescribeField::Age => AGE,
            DescribeField::Points => POINTS,
            DescribeField::ToiPerGame => TOI_PER_GAME,
        }
    }

    /// Plot kind used by the standard analysis for this field
    pub fn default_kind(&self) -> PlotKind {
        match self {
            DescribeField::Salary | DescribeField::ToiPerGame => PlotKind::Density,
            DescribeField::Age | DescribeField::Points => PlotKind::Histogram,
        }
    }
}

impl std::fmt::Display for DescribeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DescribeField::Salary => write!(f, "salary"),
            DescribeField::Age => write!(f, "age"),
            DescribeField::Points => write!(f, "points"),
            DescribeField::ToiPerGame => write!(f, "toi-per-game"),
        }
    }
}

impl std::str::FromStr for DescribeField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "salary" => Ok(DescribeField::Salary),
            "age" => Ok(DescribeField::Age),
            "points" | "pts" => Ok(DescribeField::Points),
            "toi-per-game" | "toi_per_game" | "toi" => Ok(DescribeField::ToiPerGame),
            _ => Err(format!(
                "Unknown field: '{}'. Use 'salary', 'age', 'points', or 'toi-per-game'.",
                s
            )),
        }
    }
}

/// Kind of distribution plot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
    #[default]
    Histogram,
    Density,
}

impl std::fmt::Display for PlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlotKind::Histogram => write!(f, "histogram"),
            PlotKind::Density => write!(f, "density"),
        }
    }
}

impl std::str::FromStr for PlotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "histogram" | "hist" => Ok(PlotKind::Histogram),
            "density" => Ok(PlotKind::Density),
            _ => Err(format!(
                "Unknown plot kind: '{}'. Use 'histogram' or 'density'.",
                s
            )),
        }
    }
}

/// Five-number-style summary of a field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub n: usize,
    pub mean: f64,
    pub sd: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

/// One histogram bin. The first bin is closed on both ends; later bins are `(lower, upper]`.
#[derive(Debug, Clone, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// The plotted shape.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DistributionShape {
    Histogram { bins: Vec<HistogramBin> },
    Density { bandwidth: f64, x: Vec<f64>, y: Vec<f64> },
}

/// Rendering artifact for one field.
#[derive(Debug, Clone, Serialize)]
pub struct Distribution {
    pub field: String,
    pub summary: FieldSummary,
    pub shape: DistributionShape,
}

/// Describe a column of the cleaned table.
///
/// Nulls are skipped. `bins` overrides the Sturges bin count for histograms.
pub fn describe_field(
    df: &DataFrame,
    field: &str,
    kind: PlotKind,
    bins: Option<usize>,
) -> PipelineResult<Distribution> {
    let column = df
        .column(field)
        .map_err(|_| PipelineError::FieldNotFound(field.to_string()))?;

    if !column.dtype().is_primitive_numeric() {
        return Err(PipelineError::TypeMismatch {
            column: field.to_string(),
            expected: "numeric".to_string(),
            found: column.dtype().to_string(),
        });
    }

    let cast = column.cast(&DataType::Float64)?;
    let mut values: Vec<f64> = cast
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect();

    if values.is_empty() {
        return Err(PipelineError::InsufficientData(format!(
            "field '{}' has no non-null values",
            field
        )));
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let summary = summarize(&values);

    let shape = match kind {
        PlotKind::Histogram => DistributionShape::Histogram {
            bins: histogram(&values, bins.unwrap_or_else(|| sturges_bins(values.len()))),
        },
        PlotKind::Density => {
            let bandwidth = silverman_bandwidth(&values, summary.sd);
            let (x, y) = gaussian_kde(&values, bandwidth);
            DistributionShape::Density { bandwidth, x, y }
        }
    };

    Ok(Distribution {
        field: field.to_string(),
        summary,
        shape,
    })
}

/// Sturges' rule: `ceil(log2 n) + 1`
pub fn sturges_bins(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    (n as f64).log2().ceil() as usize + 1
}

/// Linear-interpolated quantile of sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn summarize(sorted: &[f64]) -> FieldSummary {
    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let sd = if n > 1 {
        (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };

    FieldSummary {
        n,
        mean,
        sd,
        min: sorted[0],
        median: quantile(sorted, 0.5),
        max: sorted[n - 1],
    }
}

fn histogram(sorted: &[f64], bin_count: usize) -> Vec<HistogramBin> {
    let bin_count = bin_count.max(1);
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    if max == min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: sorted.len(),
        }];
    }

    let width = (max - min) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bin_count {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for &v in sorted {
        // Right-closed bins: a value on a boundary belongs to the lower bin
        let idx = ((v - min) / width).ceil() as usize;
        let idx = idx.saturating_sub(1).min(bin_count - 1);
        bins[idx].count += 1;
    }

    bins
}

/// Silverman's rule of thumb: `0.9 * min(sd, IQR / 1.34) * n^(-1/5)`
fn silverman_bandwidth(sorted: &[f64], sd: f64) -> f64 {
    let iqr = quantile(sorted, 0.75) - quantile(sorted, 0.25);
    let mut spread = sd.min(iqr / 1.34);
    if spread <= 0.0 {
        spread = sd;
    }
    if spread <= 0.0 {
        spread = sorted[0].abs();
    }
    if spread <= 0.0 {
        spread = 1.0;
    }
    0.9 * spread * (sorted.len() as f64).powf(-0.2)
}

fn gaussian_kde(values: &[f64], bandwidth: f64) -> (Vec<f64>, Vec<f64>) {
    let lo = values[0] - DENSITY_CUT * bandwidth;
    let hi = values[values.len() - 1] + DENSITY_CUT * bandwidth;
    let step = (hi - lo) / (DENSITY_POINTS - 1) as f64;
    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let x: Vec<f64> = (0..DENSITY_POINTS).map(|i| lo + step * i as f64).collect();
    let y: Vec<f64> = x
        .iter()
        .map(|&xi| {
            let sum: f64 = values
                .iter()
                .map(|&v| {
                    let z = (xi - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            sum * norm
        })
        .collect();

    (x, y)
}

/// Compact number formatting for axis labels
fn format_value(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1_000_000.0 {
        format!("{:.2}M", v / 1_000_000.0)
    } else if abs >= 10_000.0 {
        format!("{:.0}K", v / 1_000.0)
    } else if abs >= 100.0 || v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

impl Distribution {
    pub fn kind(&self) -> PlotKind {
        match self.shape {
            DistributionShape::Histogram { .. } => PlotKind::Histogram,
            DistributionShape::Density { .. } => PlotKind::Density,
        }
    }

    /// Horizontal bar chart for the terminal. `width` is the longest bar in characters.
    pub fn render_text(&self, width: usize) -> String {
        let width = width.max(1);
        let mut out = String::new();

        // Each row is (label, value, annotation)
        let rows: Vec<(String, f64, String)> = match &self.shape {
            DistributionShape::Histogram { bins } => bins
                .iter()
                .map(|b| {
                    (
                        format!("{:>9} - {:<9}", format_value(b.lower), format_value(b.upper)),
                        b.count as f64,
                        b.count.to_string(),
                    )
                })
                .collect(),
            DistributionShape::Density { x, y, .. } => {
                // Resample the grid down to a readable number of rows
                let rows = 20usize;
                let chunk = x.len().div_ceil(rows);
                x.chunks(chunk)
                    .zip(y.chunks(chunk))
                    .map(|(xs, ys)| {
                        let mean_y = ys.iter().sum::<f64>() / ys.len() as f64;
                        let mid = xs[xs.len() / 2];
                        (format!("{:>9}", format_value(mid)), mean_y, format!("{:.3e}", mean_y))
                    })
                    .collect()
            }
        };

        let peak = rows.iter().map(|r| r.1).fold(0.0f64, f64::max);

        let _ = writeln!(
            out,
            "{} of {} (n = {}, mean = {}, median = {})",
            self.kind(),
            self.field,
            self.summary.n,
            format_value(self.summary.mean),
            format_value(self.summary.median)
        );
        for (label, value, annotation) in rows {
            let len = if peak > 0.0 {
                ((value / peak) * width as f64).round() as usize
            } else {
                0
            };
            let _ = writeln!(out, "{} │{} {}", label, "█".repeat(len), annotation);
        }

        out
    }

    /// Standalone SVG rendering of the plot.
    pub fn to_svg(&self) -> String {
        const W: f64 = 640.0;
        const H: f64 = 400.0;
        const PAD: f64 = 50.0;
        let plot_w = W - 2.0 * PAD;
        let plot_h = H - 2.0 * PAD;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = W,
            h = H
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="24" text-anchor="middle" font-family="sans-serif" font-size="16">{} of {}</text>"#,
            W / 2.0,
            self.kind(),
            self.field
        );

        let (x_min, x_max, y_max) = match &self.shape {
            DistributionShape::Histogram { bins } => (
                bins.first().map(|b| b.lower).unwrap_or(0.0),
                bins.last().map(|b| b.upper).unwrap_or(1.0),
                bins.iter().map(|b| b.count).max().unwrap_or(1) as f64,
            ),
            DistributionShape::Density { x, y, .. } => (
                x.first().copied().unwrap_or(0.0),
                x.last().copied().unwrap_or(1.0),
                y.iter().copied().fold(0.0f64, f64::max),
            ),
        };
        let x_span = if x_max > x_min { x_max - x_min } else { 1.0 };
        let y_max = if y_max > 0.0 { y_max } else { 1.0 };
        let sx = |v: f64| PAD + (v - x_min) / x_span * plot_w;
        let sy = |v: f64| H - PAD - v / y_max * plot_h;

        match &self.shape {
            DistributionShape::Histogram { bins } => {
                for b in bins {
                    let x0 = sx(b.lower);
                    let bar_w = (sx(b.upper) - x0).max(1.0);
                    let y0 = sy(b.count as f64);
                    let _ = writeln!(
                        svg,
                        r##"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="#4c78a8" stroke="white"/>"##,
                        x0,
                        y0,
                        bar_w,
                        H - PAD - y0
                    );
                }
            }
            DistributionShape::Density { x, y, .. } => {
                let points: Vec<String> = x
                    .iter()
                    .zip(y.iter())
                    .map(|(&xi, &yi)| format!("{:.2},{:.2}", sx(xi), sy(yi)))
                    .collect();
                let _ = writeln!(
                    svg,
                    r##"<polyline fill="none" stroke="#4c78a8" stroke-width="2" points="{}"/>"##,
                    points.join(" ")
                );
            }
        }

        // Axes with min/max labels
        let _ = writeln!(
            svg,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="black"/>"#,
            PAD,
            H - PAD,
            W - PAD,
            H - PAD
        );
        let _ = writeln!(
            svg,
            r#"<line x1="{p}" y1="{p}" x2="{p}" y2="{}" stroke="black"/>"#,
            H - PAD,
            p = PAD
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" font-family="sans-serif" font-size="12">{}</text>"#,
            PAD,
            H - PAD + 18.0,
            format_value(x_min)
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="end" font-family="sans-serif" font-size="12">{}</text>"#,
            W - PAD,
            H - PAD + 18.0,
            format_value(x_max)
        );
        svg.push_str("</svg>\n");
        svg
    }
}
