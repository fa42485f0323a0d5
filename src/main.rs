//! Enrolment Insights
//!
//! Loads the Aadhaar enrolment CSV shards from the working directory,
//! aggregates them by date, state, district, week, and age band, renders
//! the analysis charts as PNG files, and prints summary statistics.

mod charts;
mod data;
mod stats;

use anyhow::{Context, Result};
use charts::ChartRenderer;
use data::{Aggregator, LoaderError, ShardLoader};
use stats::report;
use stats::{correlation_matrix, KeyInsights};

fn main() -> Result<()> {
    let loader = ShardLoader::default();
    let data = match loader.load_all() {
        Ok(df) => df,
        Err(LoaderError::NoShards) => {
            println!("No data files found");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    report::print_dataset_overview(&data)?;

    let renderer = ChartRenderer::default();

    let daily = Aggregator::daily_totals(&data)?;
    renderer.daily_trends(&daily)?;

    let states = Aggregator::state_totals(&data)?;
    renderer.top_states(&states.top(10))?;

    let ages = Aggregator::age_totals(&data)?;
    renderer.age_distribution(&ages)?;

    let top_state = states
        .labels
        .first()
        .cloned()
        .context("no state totals in the data")?;
    let districts = Aggregator::district_totals(&data, &top_state)?;
    renderer.top_districts(&top_state, &districts.top(10))?;

    let weekly = Aggregator::weekly_totals(&data)?;
    renderer.weekly_trends(&weekly)?;

    renderer.age_correlation(&correlation_matrix(&daily))?;

    let insights = KeyInsights::derive(&daily, &states, &ages)
        .context("not enough aggregated data for key insights")?;
    report::print_key_insights(&insights);

    Ok(())
}
