//! Shard Loader Module
//! Loads the fixed set of enrolment CSV shards using Polars.

use polars::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

/// The three enrolment shards published by the source API.
pub const SHARD_FILES: [&str; 3] = [
    "api_data_aadhar_enrolment_0_500000.csv",
    "api_data_aadhar_enrolment_500000_1000000.csv",
    "api_data_aadhar_enrolment_1000000_1006029.csv",
];

/// Source date format (e.g. "03-01-2023").
pub const DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("No data files found")]
    NoShards,
}

/// Loads the fixed enrolment shards from a base directory and combines
/// them into one DataFrame. Missing shards are skipped with a notice.
pub struct ShardLoader {
    base_dir: PathBuf,
}

impl Default for ShardLoader {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ShardLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Load one CSV shard using Polars.
    fn load_shard(&self, path: &PathBuf) -> Result<DataFrame, LoaderError> {
        // Use lazy evaluation for memory efficiency, then collect
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Load every shard that exists, print a notice per file, concatenate,
    /// and parse the date column. Errors with `NoShards` if nothing loaded.
    pub fn load_all(&self) -> Result<DataFrame, LoaderError> {
        let mut combined: Option<DataFrame> = None;

        for name in SHARD_FILES {
            let path = self.base_dir.join(name);
            if !path.exists() {
                println!("File {name} not found");
                continue;
            }

            let df = self.load_shard(&path)?;
            println!("Loaded {name} with {} rows", df.height());

            match combined.as_mut() {
                Some(all) => {
                    all.vstack_mut(&df)?;
                }
                None => combined = Some(df),
            }
        }

        let combined = combined.ok_or(LoaderError::NoShards)?;
        parse_dates(combined)
    }
}

/// Replace the string `date` column with a typed Date column.
/// Strict parse: a malformed date is a fatal fault.
pub fn parse_dates(df: DataFrame) -> Result<DataFrame, LoaderError> {
    let parsed = df
        .lazy()
        .with_column(col("date").str().to_date(StrptimeOptions {
            format: Some(DATE_FORMAT.into()),
            ..Default::default()
        }))
        .collect()?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_date_frame(dates: &[&str]) -> DataFrame {
        DataFrame::new(vec![Column::new(
            "date".into(),
            dates.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
        )])
        .unwrap()
    }

    #[test]
    fn parse_dates_produces_date_dtype() {
        let df = string_date_frame(&["03-01-2023", "15-02-2023"]);
        let parsed = parse_dates(df).unwrap();
        assert_eq!(parsed.column("date").unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn parse_dates_rejects_malformed() {
        let df = string_date_frame(&["2023-01-03"]);
        assert!(parse_dates(df).is_err());
    }

    const HEADER: &str = "date,state,district,age_0_5,age_5_17,age_18_greater\n";

    #[test]
    fn load_all_skips_missing_shards() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SHARD_FILES[0]),
            format!("{HEADER}01-01-2023,Bihar,Patna,1,2,3\n02-01-2023,Bihar,Gaya,4,5,6\n"),
        )
        .unwrap();
        std::fs::write(
            dir.path().join(SHARD_FILES[2]),
            format!("{HEADER}03-01-2023,Kerala,Kochi,7,8,9\n"),
        )
        .unwrap();

        // Middle shard is absent and must be skipped, not fatal
        let df = ShardLoader::new(dir.path()).load_all().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn load_all_without_shards_is_no_shards() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShardLoader::new(dir.path()).load_all().unwrap_err();
        assert!(matches!(err, LoaderError::NoShards));
    }
}
