//! Aggregation Module
//! Group-by-sum passes over the combined enrolment table.

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;

/// Age band columns of the source data, in report order.
pub const AGE_COLS: [&str; 3] = ["age_0_5", "age_5_17", "age_18_greater"];

/// Display labels matching `AGE_COLS`.
pub const AGE_LABELS: [&str; 3] = ["Age 0-5", "Age 5-17", "Age 18+"];

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Aggregate for {0} is empty")]
    EmptyAggregate(String),
}

/// Per-day sums of each age band plus the combined total, date-ascending.
#[derive(Debug, Clone)]
pub struct DailyTotals {
    pub dates: Vec<NaiveDate>,
    pub age_0_5: Vec<f64>,
    pub age_5_17: Vec<f64>,
    pub age_18_greater: Vec<f64>,
    pub total: Vec<f64>,
}

/// Labelled totals sorted descending (states or districts).
#[derive(Debug, Clone)]
pub struct RankedTotals {
    pub labels: Vec<String>,
    pub totals: Vec<f64>,
}

impl RankedTotals {
    /// Keep only the first `n` entries.
    pub fn top(&self, n: usize) -> RankedTotals {
        let n = n.min(self.labels.len());
        RankedTotals {
            labels: self.labels[..n].to_vec(),
            totals: self.totals[..n].to_vec(),
        }
    }
}

/// Whole-table sums of the three age bands.
#[derive(Debug, Clone, Copy)]
pub struct AgeTotals {
    pub age_0_5: f64,
    pub age_5_17: f64,
    pub age_18_greater: f64,
}

impl AgeTotals {
    pub fn grand_total(&self) -> f64 {
        self.age_0_5 + self.age_5_17 + self.age_18_greater
    }

    /// Percentage share of each band, in `AGE_COLS` order.
    pub fn shares(&self) -> [f64; 3] {
        let total = self.grand_total();
        [
            self.age_0_5 / total * 100.0,
            self.age_5_17 / total * 100.0,
            self.age_18_greater / total * 100.0,
        ]
    }
}

/// Weekly totals keyed by (calendar year, ISO week), ascending.
#[derive(Debug, Clone)]
pub struct WeeklyTotals {
    pub years: Vec<i32>,
    pub weeks: Vec<i32>,
    pub total: Vec<f64>,
}

/// Runs the group-by-sum aggregation passes.
pub struct Aggregator;

impl Aggregator {
    fn age_sums() -> Vec<Expr> {
        AGE_COLS.iter().map(|c| col(*c).sum()).collect()
    }

    fn total_expr() -> Expr {
        (col("age_0_5") + col("age_5_17") + col("age_18_greater")).alias("total")
    }

    /// Group by date, sum each age band, date-ascending.
    pub fn daily_totals(df: &DataFrame) -> Result<DailyTotals, ProcessorError> {
        let daily = df
            .clone()
            .lazy()
            .filter(col("date").is_not_null())
            .group_by([col("date")])
            .agg(Self::age_sums())
            .with_column(Self::total_expr())
            .sort(["date"], Default::default())
            .collect()?;

        if daily.height() == 0 {
            return Err(ProcessorError::EmptyAggregate("daily totals".into()));
        }

        let dates: Vec<NaiveDate> = daily
            .column("date")?
            .as_materialized_series()
            .date()?
            .as_date_iter()
            .flatten()
            .collect();

        Ok(DailyTotals {
            dates,
            age_0_5: column_f64(&daily, "age_0_5")?,
            age_5_17: column_f64(&daily, "age_5_17")?,
            age_18_greater: column_f64(&daily, "age_18_greater")?,
            total: column_f64(&daily, "total")?,
        })
    }

    /// Group by state, ranked by combined total descending.
    pub fn state_totals(df: &DataFrame) -> Result<RankedTotals, ProcessorError> {
        Self::ranked_totals(df.clone().lazy(), "state")
    }

    /// Group the districts of one state, ranked by combined total descending.
    pub fn district_totals(df: &DataFrame, state: &str) -> Result<RankedTotals, ProcessorError> {
        let filtered = df.clone().lazy().filter(col("state").eq(lit(state)));
        let ranked = Self::ranked_totals(filtered, "district")?;
        if ranked.labels.is_empty() {
            return Err(ProcessorError::EmptyAggregate(format!(
                "districts of {state}"
            )));
        }
        Ok(ranked)
    }

    // Rows whose group key is null are excluded from every grouping pass.
    fn ranked_totals(lf: LazyFrame, key: &str) -> Result<RankedTotals, ProcessorError> {
        let ranked = lf
            .filter(col(key).is_not_null())
            .group_by([col(key)])
            .agg(Self::age_sums())
            .with_column(Self::total_expr())
            .sort(
                ["total"],
                SortMultipleOptions::default().with_order_descending(true),
            )
            .collect()?;

        Ok(RankedTotals {
            labels: column_strings(&ranked, key)?,
            totals: column_f64(&ranked, "total")?,
        })
    }

    /// Group by (calendar year, ISO week), ascending.
    pub fn weekly_totals(df: &DataFrame) -> Result<WeeklyTotals, ProcessorError> {
        let weekly = df
            .clone()
            .lazy()
            .filter(col("date").is_not_null())
            .with_columns([
                col("date").dt().year().alias("year"),
                col("date").dt().week().alias("week"),
            ])
            .group_by([col("year"), col("week")])
            .agg(Self::age_sums())
            .with_column(Self::total_expr())
            .sort(["year", "week"], Default::default())
            .collect()?;

        Ok(WeeklyTotals {
            years: column_i32(&weekly, "year")?,
            weeks: column_i32(&weekly, "week")?,
            total: column_f64(&weekly, "total")?,
        })
    }

    /// Raw values of each age band column, in `AGE_COLS` order.
    pub fn age_column_values(df: &DataFrame) -> Result<[Vec<f64>; 3], ProcessorError> {
        Ok([
            column_f64(df, AGE_COLS[0])?,
            column_f64(df, AGE_COLS[1])?,
            column_f64(df, AGE_COLS[2])?,
        ])
    }

    /// Whole-table sum of each age band.
    pub fn age_totals(df: &DataFrame) -> Result<AgeTotals, ProcessorError> {
        let sums = df.clone().lazy().select(Self::age_sums()).collect()?;
        Ok(AgeTotals {
            age_0_5: scalar_f64(&sums, "age_0_5")?,
            age_5_17: scalar_f64(&sums, "age_5_17")?,
            age_18_greater: scalar_f64(&sums, "age_18_greater")?,
        })
    }
}

/// Extract a column as f64 values (nulls become 0).
fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>, ProcessorError> {
    let casted = df.column(name)?.cast(&DataType::Float64)?;
    let ca = casted.f64()?;
    Ok(ca.into_iter().map(|v| v.unwrap_or(0.0)).collect())
}

fn column_i32(df: &DataFrame, name: &str) -> Result<Vec<i32>, ProcessorError> {
    let casted = df.column(name)?.cast(&DataType::Int32)?;
    let ca = casted.i32()?;
    Ok(ca.into_iter().map(|v| v.unwrap_or(0)).collect())
}

fn column_strings(df: &DataFrame, name: &str) -> Result<Vec<String>, ProcessorError> {
    let series = df.column(name)?.as_materialized_series().clone();
    Ok((0..series.len())
        .filter_map(|i| {
            let val = series.get(i).ok()?;
            if val.is_null() {
                None
            } else {
                Some(val.to_string().trim_matches('"').to_string())
            }
        })
        .collect())
}

fn scalar_f64(df: &DataFrame, name: &str) -> Result<f64, ProcessorError> {
    Ok(column_f64(df, name)?.first().copied().unwrap_or(0.0))
}
