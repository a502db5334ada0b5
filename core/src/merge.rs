//! Raw market exports → merged dataset
//!
//! Joins the daily gold prices, the SPY export and the Sensex export on their
//! trading date and writes the merged CSV the assistant loads at startup.
//! Only dates present in all three sources survive.

use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::dataset::DATE_COLUMN;

/// Merge errors
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("Missing source file: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("Column {column} not found in {}", file.display())]
    MissingColumn { file: PathBuf, column: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Locations of the three raw exports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSources {
    /// `Date, Gold_Price`
    pub gold: PathBuf,
    /// yfinance export: header, two metadata rows, date in the `Price` column
    pub spy: PathBuf,
    /// `Date, Open, High, Low, Close, ...`
    pub sensex: PathBuf,
}

impl MergeSources {
    /// Conventional file names inside a data folder
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            gold: dir.join("gold_prices.csv"),
            spy: dir.join("spy_data.csv"),
            sensex: dir.join("sensex_data.csv"),
        }
    }
}

/// Merge the three exports into `output`; returns the merged row count
pub fn merge_sources(sources: &MergeSources, output: &Path) -> Result<usize, MergeError> {
    let gold = select_renamed(
        &sources.gold,
        0,
        &[("Date", DATE_COLUMN), ("Gold_Price", "Gold_Price")],
    )?;
    let spy = select_renamed(
        &sources.spy,
        2,
        &[("Price", DATE_COLUMN), ("Open", "SPY_Open"), ("Close", "SPY_Close")],
    )?;
    let sensex = select_renamed(
        &sources.sensex,
        0,
        &[
            ("Date", DATE_COLUMN),
            ("Open", "Sensex_Open"),
            ("Close", "Sensex_Close"),
        ],
    )?;
    debug!(
        gold = gold.height(),
        spy = spy.height(),
        sensex = sensex.height(),
        "Read raw market exports"
    );

    let merged = gold
        .inner_join(&spy, [DATE_COLUMN], [DATE_COLUMN])?
        .inner_join(&sensex, [DATE_COLUMN], [DATE_COLUMN])?;
    let mut merged = merged.sort([DATE_COLUMN], SortMultipleOptions::default())?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(output)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut merged)?;

    info!(rows = merged.height(), "Merged data saved to {}", output.display());
    Ok(merged.height())
}

/// Read one export, keep and rename the mapped columns, drop incomplete rows
///
/// Dates are normalized to ISO strings so the joins line up across sources;
/// cells that do not parse become nulls and are dropped with the row.
fn select_renamed(
    path: &Path,
    skip_after_header: usize,
    mapping: &[(&str, &str)],
) -> Result<DataFrame, MergeError> {
    if !path.is_file() {
        return Err(MergeError::MissingSource(path.to_path_buf()));
    }

    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_skip_rows_after_header(skip_after_header)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let mut columns = Vec::with_capacity(mapping.len());
    for (source, target) in mapping {
        let series = frame
            .column(source)
            .map_err(|_| MergeError::MissingColumn {
                file: path.to_path_buf(),
                column: source.to_string(),
            })?;
        let converted = if *target == DATE_COLUMN {
            normalize_dates(series)?
        } else {
            series.cast(&DataType::Float64)?
        };
        columns.push(converted.with_name(target));
    }

    Ok(DataFrame::new(columns)?.drop_nulls::<String>(None)?)
}

fn normalize_dates(series: &Series) -> Result<Series, MergeError> {
    let text = series.cast(&DataType::String)?;
    let iso: Vec<Option<String>> = text
        .str()?
        .into_iter()
        .map(|cell| {
            let day = cell?.trim().split(['T', ' ']).next()?;
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .ok()
                .map(|date| date.format("%Y-%m-%d").to_string())
        })
        .collect();
    Ok(Series::new(DATE_COLUMN, iso))
}
