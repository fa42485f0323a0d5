//! Statistics Calculator Module
//! Descriptive statistics, correlation, and the derived key insights.

use crate::data::{AgeTotals, DailyTotals, RankedTotals};
use chrono::NaiveDate;
use statrs::statistics::{Data, Distribution, Max, Min, OrderStatistics};

/// Descriptive statistics for one numeric column (describe()-style).
#[derive(Debug, Clone)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Headline numbers printed at the end of a run.
#[derive(Debug, Clone)]
pub struct KeyInsights {
    pub total_enrolments: f64,
    pub top_state: String,
    pub top_state_total: f64,
    pub age_shares: [f64; 3],
    pub peak_day: NaiveDate,
    pub peak_total: f64,
}

impl KeyInsights {
    /// Derive the insights from the finished aggregates.
    /// `None` when the state ranking or daily series is empty.
    pub fn derive(daily: &DailyTotals, states: &RankedTotals, ages: &AgeTotals) -> Option<Self> {
        let top_state = states.labels.first()?.clone();
        let top_state_total = states.totals.first().copied()?;
        let (peak_day, peak_total) = peak_day(daily)?;

        Some(Self {
            total_enrolments: ages.grand_total(),
            top_state,
            top_state_total,
            age_shares: ages.shares(),
            peak_day,
            peak_total,
        })
    }
}

/// The date whose daily total is maximal (first such date on ties).
pub fn peak_day(daily: &DailyTotals) -> Option<(NaiveDate, f64)> {
    daily
        .dates
        .iter()
        .zip(daily.total.iter())
        .fold(None, |best, (&date, &total)| match best {
            Some((_, best_total)) if total <= best_total => best,
            _ => Some((date, total)),
        })
}

/// Compute descriptive statistics for a column of values.
pub fn summarize(name: &str, values: &[f64]) -> ColumnSummary {
    if values.is_empty() {
        return ColumnSummary {
            name: name.to_string(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        };
    }

    let mut data = Data::new(values.to_vec());
    ColumnSummary {
        name: name.to_string(),
        count: values.len(),
        mean: data.mean().unwrap_or(f64::NAN),
        std: data.std_dev().unwrap_or(f64::NAN),
        min: data.min(),
        q25: data.lower_quartile(),
        median: data.median(),
        q75: data.upper_quartile(),
        max: data.max(),
    }
}

/// Pearson correlation coefficient. NaN when a series has no variance
/// or fewer than two observations.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }

    let mean_x = x[..n].iter().sum::<f64>() / n as f64;
    let mean_y = y[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        let dx = x[i] - mean_x;
        let dy = y[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        cov / denom
    }
}

/// 3x3 Pearson correlation of the daily age-band series,
/// in `AGE_COLS` order.
pub fn correlation_matrix(daily: &DailyTotals) -> [[f64; 3]; 3] {
    let series = [&daily.age_0_5, &daily.age_5_17, &daily.age_18_greater];
    let mut matrix = [[f64::NAN; 3]; 3];
    for (i, a) in series.iter().enumerate() {
        for (j, b) in series.iter().enumerate() {
            matrix[i][j] = pearson(a, b);
        }
    }
    matrix
}

/// Thousands-separated rendering of a count (e.g. 1006029 -> "1,006,029").
pub fn format_count(value: f64) -> String {
    let n = value.round() as i64;
    let digits = n.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily_fixture() -> DailyTotals {
        let dates = ["2023-01-01", "2023-01-02", "2023-01-03"]
            .iter()
            .map(|d| d.parse().unwrap())
            .collect();
        DailyTotals {
            dates,
            age_0_5: vec![1.0, 2.0, 3.0],
            age_5_17: vec![2.0, 4.0, 6.0],
            age_18_greater: vec![9.0, 5.0, 1.0],
            total: vec![12.0, 11.0, 10.0],
        }
    }

    #[test]
    fn summarize_known_values() {
        let s = summarize("age_0_5", &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.median, 2.5);
        assert!((s.std - 1.2909944487358056).abs() < 1e-12);
    }

    #[test]
    fn summarize_empty_is_nan() {
        let s = summarize("empty", &[]);
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan());
    }

    #[test]
    fn pearson_perfectly_correlated() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [10.0, 20.0, 30.0, 40.0];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
        let inv = [40.0, 30.0, 20.0, 10.0];
        assert!((pearson(&x, &inv) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_no_variance_is_nan() {
        assert!(pearson(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn correlation_matrix_diag_and_symmetry() {
        let m = correlation_matrix(&daily_fixture());
        for i in 0..3 {
            assert!((m[i][i] - 1.0).abs() < 1e-12);
            for j in 0..3 {
                assert!((m[i][j] - m[j][i]).abs() < 1e-12);
            }
        }
        // age_0_5 and age_5_17 move together, age_18_greater moves against
        assert!((m[0][1] - 1.0).abs() < 1e-12);
        assert!(m[0][2] < 0.0);
    }

    #[test]
    fn peak_day_is_max_total() {
        let (date, total) = peak_day(&daily_fixture()).unwrap();
        assert_eq!(date.to_string(), "2023-01-01");
        assert_eq!(total, 12.0);
    }

    #[test]
    fn format_count_groups_thousands() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(999.0), "999");
        assert_eq!(format_count(1006029.0), "1,006,029");
        assert_eq!(format_count(-12345.0), "-12,345");
    }
}
