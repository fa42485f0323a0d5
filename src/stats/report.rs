//! Report Module
//! Prints the dataset overview and key insights to stdout.

use crate::data::{Aggregator, ProcessorError, AGE_COLS, AGE_LABELS};
use crate::stats::calculator::{format_count, summarize, ColumnSummary, KeyInsights};
use polars::prelude::*;

/// Print row count, schema, missing-value counts, and descriptive
/// statistics for the age columns.
pub fn print_dataset_overview(df: &DataFrame) -> Result<(), ProcessorError> {
    println!("Total rows: {}", df.height());

    println!("\nColumns:");
    for (name, dtype) in df.schema().iter() {
        println!("  {name}: {dtype}");
    }

    println!("\nMissing values:");
    let nulls = df.null_count();
    for column in nulls.get_columns() {
        let count = column
            .get(0)
            .map(|v| v.to_string())
            .unwrap_or_else(|_| "0".to_string());
        println!("  {}: {}", column.name(), count);
    }

    let age_values = Aggregator::age_column_values(df)?;
    let summaries: Vec<ColumnSummary> = AGE_COLS
        .iter()
        .zip(age_values.iter())
        .map(|(name, values)| summarize(name, values))
        .collect();
    print_summaries(&summaries);

    Ok(())
}

fn print_summaries(summaries: &[ColumnSummary]) {
    println!("\nSummary statistics:");
    println!(
        "{:<16} {:>8} {:>12} {:>12} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    for s in summaries {
        println!(
            "{:<16} {:>8} {:>12.3} {:>12.3} {:>10.1} {:>10.1} {:>10.1} {:>10.1} {:>10.1}",
            s.name, s.count, s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max
        );
    }
}

/// Print the closing insights block.
pub fn print_key_insights(insights: &KeyInsights) {
    println!("\n=== KEY INSIGHTS ===");
    println!(
        "Total enrolments: {}",
        format_count(insights.total_enrolments)
    );
    println!(
        "Top state: {} with {} enrolments",
        insights.top_state,
        format_count(insights.top_state_total)
    );
    println!(
        "Age distribution: {:.1}% ({}), {:.1}% ({}), {:.1}% ({})",
        insights.age_shares[0],
        AGE_LABELS[0],
        insights.age_shares[1],
        AGE_LABELS[1],
        insights.age_shares[2],
        AGE_LABELS[2],
    );
    println!(
        "Peak enrolment day: {} with {} enrolments",
        insights.peak_day.format("%Y-%m-%d"),
        format_count(insights.peak_total)
    );
}
