//! Merged price dataset
//!
//! Loads the merged CSV once, normalizes it (ISO dates, `Float64` price
//! columns, ascending date order) and keeps it immutable for the lifetime of
//! the process. Sessions share it read-only behind an `Arc`.

use chrono::NaiveDate;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::query::DataQueryError;

/// Name of the date column in the merged CSV
pub const DATE_COLUMN: &str = "Date";

/// Price columns produced by the merge step
pub const PRICE_COLUMNS: [&str; 5] = [
    "Gold_Price",
    "SPY_Open",
    "SPY_Close",
    "Sensex_Open",
    "Sensex_Close",
];

/// Accepted textual date layouts, tried in order
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y"];

/// Dataset loading errors
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Data folder or CSV file is absent
    #[error("Missing data source: {}", .0.display())]
    MissingSource(PathBuf),

    /// Required column not present in the file
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Date cell could not be parsed
    #[error("Invalid date '{value}' at row {row}")]
    InvalidDate { row: usize, value: String },

    /// IO error while listing the data folder
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataframe engine error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Date-indexed price table
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Normalized frame (Date as ISO strings, prices as Float64)
    frame: DataFrame,
    /// Parsed date index, parallel to the frame rows
    dates: Vec<NaiveDate>,
}

impl Dataset {
    /// Load the merged CSV from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DatasetError::MissingSource(path.to_path_buf()));
        }

        debug!("Reading dataset from {}", path.display());
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        let dataset = Self::from_frame(frame)?;
        info!(
            rows = dataset.height(),
            first = ?dataset.first_date(),
            last = ?dataset.last_date(),
            "Loaded dataset from {}",
            path.display()
        );
        Ok(dataset)
    }

    /// Load the dataset at `dir/file`, refusing to start when either is absent
    pub fn open(dir: &Path, file: &str) -> Result<Self, DatasetError> {
        if !dir.is_dir() {
            return Err(DatasetError::MissingSource(dir.to_path_buf()));
        }
        Self::load(dir.join(file))
    }

    /// Build a dataset from an in-memory frame
    pub fn from_frame(mut frame: DataFrame) -> Result<Self, DatasetError> {
        let raw_dates = frame
            .column(DATE_COLUMN)
            .map_err(|_| DatasetError::MissingColumn(DATE_COLUMN.to_string()))?
            .cast(&DataType::String)?;

        let mut dates = Vec::with_capacity(frame.height());
        for (row, value) in raw_dates.str()?.into_iter().enumerate() {
            let value = value.unwrap_or_default();
            let date = parse_date(value).ok_or_else(|| DatasetError::InvalidDate {
                row,
                value: value.to_string(),
            })?;
            dates.push(date);
        }

        let iso: Vec<String> = dates
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect();
        frame.with_column(Series::new(DATE_COLUMN, iso))?;

        let names: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        for name in names.iter().filter(|name| name.as_str() != DATE_COLUMN) {
            let cast = {
                let series = frame.column(name)?;
                if !series.dtype().is_numeric() || series.dtype() == &DataType::Float64 {
                    continue;
                }
                series.cast(&DataType::Float64)?
            };
            frame.with_column(cast)?;
        }

        if !dates.windows(2).all(|pair| pair[0] <= pair[1]) {
            let mut order: Vec<IdxSize> = (0..dates.len() as IdxSize).collect();
            order.sort_by_key(|&i| dates[i as usize]);
            dates = order.iter().map(|&i| dates[i as usize]).collect();
            frame = frame.take(&IdxCa::from_vec("order", order))?;
            debug!("Sorted dataset rows by date");
        }

        Ok(Self { frame, dates })
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Underlying frame (read-only)
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Date index in ascending order
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Value columns (everything except the date)
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .filter(|&&name| name != DATE_COLUMN)
            .map(|name| name.to_string())
            .collect()
    }

    /// Extract a numeric column as optional floats
    pub(crate) fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>, DataQueryError> {
        if name == DATE_COLUMN {
            return Err(DataQueryError::NotNumeric(name.to_string()));
        }
        let series = self
            .frame
            .column(name)
            .map_err(|_| DataQueryError::UnknownColumn(name.to_string()))?;
        if !series.dtype().is_numeric() {
            return Err(DataQueryError::NotNumeric(name.to_string()));
        }

        let floats = series
            .cast(&DataType::Float64)
            .map_err(|e| DataQueryError::Computation(e.to_string()))?;
        let values = floats
            .f64()
            .map_err(|e| DataQueryError::Computation(e.to_string()))?;
        Ok(values.into_iter().collect())
    }
}

/// Parse a date cell, ignoring any trailing time component
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.trim().split(['T', ' ']).next()?;
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(day, format).ok())
}

/// List the files in the data folder, sorted by name
pub fn list_data_files(dir: &Path) -> Result<Vec<String>, DatasetError> {
    if !dir.is_dir() {
        return Err(DatasetError::MissingSource(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        files.push(entry?.file_name().to_string_lossy().into_owned());
    }
    files.sort();
    Ok(files)
}
