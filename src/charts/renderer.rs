//! Static Chart Renderer
//! Draws the six analysis charts as PNG files using plotters.

use crate::data::{AgeTotals, DailyTotals, RankedTotals, WeeklyTotals, AGE_LABELS};
use anyhow::{anyhow, bail, Result};
use chrono::{Duration, NaiveDate};
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::ops::Range;
use std::path::{Path, PathBuf};

pub const DAILY_TRENDS_FILE: &str = "daily_enrolment_trends.png";
pub const TOP_STATES_FILE: &str = "top_states_enrolment.png";
pub const AGE_DISTRIBUTION_FILE: &str = "age_distribution.png";
pub const TOP_DISTRICTS_FILE: &str = "top_districts.png";
pub const WEEKLY_TRENDS_FILE: &str = "weekly_trends.png";
pub const AGE_CORRELATION_FILE: &str = "age_correlation.png";

// Series palette
const TOTAL_COLOR: RGBColor = RGBColor(31, 119, 180);
const AGE_COLORS: [RGBColor; 3] = [
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(155, 89, 182),
];
const STATE_BAR_COLOR: RGBColor = RGBColor(52, 152, 219);
const DISTRICT_BAR_COLOR: RGBColor = RGBColor(26, 188, 156);

/// Writes the static analysis charts into an output directory
/// (the working directory by default).
pub struct ChartRenderer {
    out_dir: PathBuf,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ChartRenderer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Line chart of the daily total and per-age-band series.
    pub fn daily_trends(&self, daily: &DailyTotals) -> Result<PathBuf> {
        let path = self.out_dir.join(DAILY_TRENDS_FILE);
        let x_range = date_range(&daily.dates)?;
        let y_max = padded_max(&daily.total);

        // The backend borrows `path`; keep it scoped so the path can be returned
        {
            let root = BitMapBackend::new(&path, (1500, 800)).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(
                    "Daily Aadhaar Enrolment Trends by Age Group",
                    ("sans-serif", 30),
                )
                .margin(15)
                .x_label_area_size(60)
                .y_label_area_size(90)
                .build_cartesian_2d(x_range, 0f64..y_max)?;

            chart
                .configure_mesh()
                .x_desc("Date")
                .y_desc("Number of Enrolments")
                .x_labels(12)
                .x_label_formatter(&|d: &NaiveDate| d.format("%d-%m-%Y").to_string())
                .draw()?;

            let series: [(&str, &[f64], RGBColor); 4] = [
                ("Total Enrolments", &daily.total, TOTAL_COLOR),
                (AGE_LABELS[0], &daily.age_0_5, AGE_COLORS[0]),
                (AGE_LABELS[1], &daily.age_5_17, AGE_COLORS[1]),
                (AGE_LABELS[2], &daily.age_18_greater, AGE_COLORS[2]),
            ];

            for (label, values, color) in series {
                let points = daily.dates.iter().copied().zip(values.iter().copied());
                chart
                    .draw_series(LineSeries::new(points, color.stroke_width(2)))?
                    .label(label)
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                    });
            }

            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.85))
                .border_style(&BLACK)
                .position(SeriesLabelPosition::UpperRight)
                .draw()?;

            root.present()?;
        }
        Ok(path)
    }

    /// Vertical bar chart of the ranked state totals.
    pub fn top_states(&self, ranked: &RankedTotals) -> Result<PathBuf> {
        let path = self.out_dir.join(TOP_STATES_FILE);
        self.vertical_bars(
            &path,
            "Top 10 States by Total Aadhaar Enrolments",
            "State",
            "Total Enrolments",
            ranked,
            STATE_BAR_COLOR,
        )?;
        Ok(path)
    }

    /// Pie chart of the age band shares.
    pub fn age_distribution(&self, ages: &AgeTotals) -> Result<PathBuf> {
        let path = self.out_dir.join(AGE_DISTRIBUTION_FILE);
        if ages.grand_total() <= 0.0 {
            bail!("age totals are zero, nothing to plot");
        }

        {
            let root = BitMapBackend::new(&path, (800, 800)).into_drawing_area();
            root.fill(&WHITE)?;
            let root = root.titled(
                "Age Group Distribution in Aadhaar Enrolments",
                ("sans-serif", 28),
            )?;

            let sizes = vec![ages.age_0_5, ages.age_5_17, ages.age_18_greater];
            let colors = AGE_COLORS.to_vec();
            let labels: Vec<String> = AGE_LABELS.iter().map(|s| s.to_string()).collect();
            let center = (400, 400);
            let radius = 280.0;

            let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
            // First slice starts at 12 o'clock, as in the source design
            pie.start_angle(-90.0);
            pie.label_style(("sans-serif", 24).into_font());
            pie.percentages(("sans-serif", 20).into_font().color(&WHITE));
            root.draw(&pie)?;

            root.present()?;
        }
        Ok(path)
    }

    /// Horizontal bar chart of the ranked district totals of one state.
    pub fn top_districts(&self, state: &str, ranked: &RankedTotals) -> Result<PathBuf> {
        let path = self.out_dir.join(TOP_DISTRICTS_FILE);
        let title = format!("Top 10 Districts in {state} by Aadhaar Enrolments");
        let n = ranked.labels.len();
        if n == 0 {
            bail!("no district totals to plot");
        }

        let x_max = padded_max(&ranked.totals);
        {
            let root = BitMapBackend::new(&path, (1200, 800)).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 30))
                .margin(15)
                .x_label_area_size(60)
                .y_label_area_size(220)
                .build_cartesian_2d(0f64..x_max, -0.6f64..(n as f64 - 0.4))?;

            // Rank 0 is drawn at the top row
            let labels = ranked.labels.clone();
            let formatter = move |y: &f64| {
                index_label(*y, n).map_or_else(String::new, |i| labels[n - 1 - i].clone())
            };

            chart
                .configure_mesh()
                .disable_y_mesh()
                .x_desc("Total Enrolments")
                .y_desc("District")
                .y_labels(n)
                .y_label_formatter(&formatter)
                .draw()?;

            chart.draw_series(ranked.totals.iter().enumerate().map(|(rank, &total)| {
                let y = (n - 1 - rank) as f64;
                Rectangle::new(
                    [(0.0, y - 0.35), (total, y + 0.35)],
                    DISTRICT_BAR_COLOR.filled(),
                )
            }))?;

            root.present()?;
        }
        Ok(path)
    }

    /// Line chart of weekly totals over week index.
    pub fn weekly_trends(&self, weekly: &WeeklyTotals) -> Result<PathBuf> {
        let path = self.out_dir.join(WEEKLY_TRENDS_FILE);
        let n = weekly.total.len();
        if n == 0 {
            bail!("no weekly totals to plot");
        }

        let x_max = if n > 1 { (n - 1) as f64 } else { 1.0 };
        {
            let root = BitMapBackend::new(&path, (1500, 800)).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Weekly Aadhaar Enrolment Trends", ("sans-serif", 30))
                .margin(15)
                .x_label_area_size(60)
                .y_label_area_size(90)
                .build_cartesian_2d(0f64..x_max, 0f64..padded_max(&weekly.total))?;

            chart
                .configure_mesh()
                .x_desc("Week Number")
                .y_desc("Number of Enrolments")
                .draw()?;

            let points = weekly
                .total
                .iter()
                .enumerate()
                .map(|(i, &v)| (i as f64, v));
            chart
                .draw_series(LineSeries::new(points, TOTAL_COLOR.stroke_width(2)))?
                .label("Weekly Total")
                .legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 18, y)], TOTAL_COLOR.stroke_width(2))
                });

            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.85))
                .border_style(&BLACK)
                .position(SeriesLabelPosition::UpperRight)
                .draw()?;

            root.present()?;
        }
        Ok(path)
    }

    /// 3x3 heatmap of the age band correlation matrix.
    pub fn age_correlation(&self, matrix: &[[f64; 3]; 3]) -> Result<PathBuf> {
        let path = self.out_dir.join(AGE_CORRELATION_FILE);
        {
            let root = BitMapBackend::new(&path, (900, 700)).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Correlation Between Age Group Enrolments", ("sans-serif", 28))
                .margin(15)
                .build_cartesian_2d(-1.5f64..3.2f64, -0.7f64..3.2f64)?;

            let cells = || (0..3usize).flat_map(|i| (0..3usize).map(move |j| (i, j)));

            // Row 0 of the matrix is the top row of the heatmap
            chart.draw_series(cells().map(|(i, j)| {
                Rectangle::new(
                    [(j as f64, 2.0 - i as f64), (j as f64 + 1.0, 3.0 - i as f64)],
                    diverging_color(matrix[i][j]).filled(),
                )
            }))?;
            chart.draw_series(cells().map(|(i, j)| {
                Rectangle::new(
                    [(j as f64, 2.0 - i as f64), (j as f64 + 1.0, 3.0 - i as f64)],
                    BLACK.stroke_width(1),
                )
            }))?;

            let value_style = ("sans-serif", 22)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart.draw_series(cells().map(|(i, j)| {
                Text::new(
                    format!("{:.2}", matrix[i][j]),
                    (j as f64 + 0.5, 2.5 - i as f64),
                    value_style.clone(),
                )
            }))?;

            let row_style = ("sans-serif", 20)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Right, VPos::Center));
            chart.draw_series(AGE_LABELS.iter().enumerate().map(|(i, label)| {
                Text::new(label.to_string(), (-0.1, 2.5 - i as f64), row_style.clone())
            }))?;

            let col_style = ("sans-serif", 20)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Top));
            chart.draw_series(AGE_LABELS.iter().enumerate().map(|(j, label)| {
                Text::new(label.to_string(), (j as f64 + 0.5, -0.15), col_style.clone())
            }))?;

            root.present()?;
        }
        Ok(path)
    }

    fn vertical_bars(
        &self,
        path: &Path,
        title: &str,
        x_desc: &str,
        y_desc: &str,
        ranked: &RankedTotals,
        color: RGBColor,
    ) -> Result<()> {
        let n = ranked.labels.len();
        if n == 0 {
            bail!("nothing to plot for {title}");
        }

        let y_max = padded_max(&ranked.totals);
        let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 30))
            .margin(15)
            .x_label_area_size(160)
            .y_label_area_size(90)
            .build_cartesian_2d(-0.6f64..(n as f64 - 0.4), 0f64..y_max)?;

        let labels = ranked.labels.clone();
        let formatter =
            move |x: &f64| index_label(*x, n).map_or_else(String::new, |i| labels[i].clone());

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .x_labels(n)
            .x_label_style(
                ("sans-serif", 14)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .x_label_formatter(&formatter)
            .draw()?;

        chart.draw_series(ranked.totals.iter().enumerate().map(|(i, &total)| {
            Rectangle::new(
                [(i as f64 - 0.35, 0.0), (i as f64 + 0.35, total)],
                color.filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }
}

/// Tick value -> bar index, if the tick sits on a bar center.
fn index_label(value: f64, n: usize) -> Option<usize> {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 || rounded >= n as f64 {
        None
    } else {
        Some(rounded as usize)
    }
}

/// X range over the plotted dates, widened for a single-day series.
fn date_range(dates: &[NaiveDate]) -> Result<Range<NaiveDate>> {
    let first = *dates.first().ok_or_else(|| anyhow!("no dates to plot"))?;
    let mut last = *dates.last().ok_or_else(|| anyhow!("no dates to plot"))?;
    if first == last {
        last = last + Duration::days(1);
    }
    Ok(first..last)
}

/// Y range upper bound with headroom; never zero.
fn padded_max(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        1.0
    } else {
        max * 1.05
    }
}

/// Blue-white-red scale over [-1, 1]; NaN maps to the midpoint.
fn diverging_color(v: f64) -> RGBColor {
    const LOW: (u8, u8, u8) = (59, 76, 192);
    const MID: (u8, u8, u8) = (221, 221, 221);
    const HIGH: (u8, u8, u8) = (180, 4, 38);

    let t = if v.is_nan() {
        0.5
    } else {
        ((v + 1.0) / 2.0).clamp(0.0, 1.0)
    };
    let (from, to, u) = if t < 0.5 {
        (LOW, MID, t * 2.0)
    } else {
        (MID, HIGH, (t - 0.5) * 2.0)
    };
    RGBColor(
        lerp(from.0, to.0, u),
        lerp(from.1, to.1, u),
        lerp(from.2, to.2, u),
    )
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_label_only_on_centers() {
        assert_eq!(index_label(0.0, 3), Some(0));
        assert_eq!(index_label(2.0, 3), Some(2));
        assert_eq!(index_label(3.0, 3), None);
        assert_eq!(index_label(-1.0, 3), None);
        assert_eq!(index_label(0.5, 3), None);
    }

    #[test]
    fn padded_max_never_zero() {
        assert_eq!(padded_max(&[]), 1.0);
        assert_eq!(padded_max(&[0.0]), 1.0);
        assert!((padded_max(&[100.0]) - 105.0).abs() < 1e-9);
    }

    #[test]
    fn date_range_widens_single_day() {
        let day: NaiveDate = "2023-01-01".parse().unwrap();
        let range = date_range(&[day]).unwrap();
        assert!(range.start < range.end);
    }

    #[test]
    fn diverging_color_endpoints() {
        assert_eq!(diverging_color(-1.0), RGBColor(59, 76, 192));
        assert_eq!(diverging_color(1.0), RGBColor(180, 4, 38));
        assert_eq!(diverging_color(0.0), RGBColor(221, 221, 221));
    }

    #[test]
    fn charts_return_their_output_paths() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ChartRenderer::new(dir.path());

        let daily = DailyTotals {
            dates: vec![
                "2023-01-01".parse().unwrap(),
                "2023-01-02".parse().unwrap(),
            ],
            age_0_5: vec![1.0, 2.0],
            age_5_17: vec![3.0, 4.0],
            age_18_greater: vec![5.0, 6.0],
            total: vec![9.0, 12.0],
        };
        let path = renderer.daily_trends(&daily).unwrap();
        assert_eq!(path, dir.path().join(DAILY_TRENDS_FILE));
        assert!(path.exists());

        let ages = AgeTotals {
            age_0_5: 10.0,
            age_5_17: 20.0,
            age_18_greater: 70.0,
        };
        assert!(renderer.age_distribution(&ages).unwrap().exists());

        let districts = RankedTotals {
            labels: vec!["Patna".to_string(), "Gaya".to_string()],
            totals: vec![100.0, 50.0],
        };
        assert!(renderer.top_districts("Bihar", &districts).unwrap().exists());

        let weekly = WeeklyTotals {
            years: vec![2023, 2023],
            weeks: vec![1, 2],
            total: vec![10.0, 20.0],
        };
        assert!(renderer.weekly_trends(&weekly).unwrap().exists());

        let matrix = [[1.0, 0.5, -0.5], [0.5, 1.0, 0.0], [-0.5, 0.0, 1.0]];
        assert!(renderer.age_correlation(&matrix).unwrap().exists());
    }
}
