//! Stats module - descriptive statistics, correlation, and reporting

pub mod calculator;
pub mod report;

pub use calculator::{correlation_matrix, KeyInsights};
