//! Data query catalogue
//!
//! The assistant never gets raw access to the dataframe. It may only name one
//! of the operations below; arguments are validated per operation and every
//! failure is turned into an `{"error": ...}` result at this boundary.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::dataset::Dataset;

/// Trailing window length used when `years` is omitted
pub const DEFAULT_YEARS: u32 = 5;

/// Row count used by head/tail when `n` is omitted
pub const DEFAULT_ROWS: usize = 5;

const SPY_CLOSE: &str = "SPY_Close";
const SENSEX_CLOSE: &str = "Sensex_Close";

/// Errors raised while answering a query
///
/// These never leave the accessor: `query_data` and `Dataset::execute`
/// convert them into `QueryResult::Error`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataQueryError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Missing parameter '{parameter}' for operation {operation}")]
    MissingParameter {
        operation: &'static str,
        parameter: &'static str,
    },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Column {0} is not numeric")]
    NotNumeric(String),

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Missing value in {column} on {date}")]
    MissingValue { column: String, date: NaiveDate },

    #[error("Division by zero in {0}")]
    DivisionByZero(String),

    #[error("Correlation is undefined for {0} and {1}")]
    UndefinedCorrelation(String, String),

    #[error("No day-over-day changes available for {0}")]
    NoObservations(String),

    #[error("Computation failed: {0}")]
    Computation(String),
}

/// Operations the model may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Correlation,
    Growth,
    AbsoluteGrowth,
    BestDay,
    Head,
    Tail,
}

impl Operation {
    /// Every operation, in schema order
    pub const ALL: [Operation; 6] = [
        Operation::Correlation,
        Operation::Growth,
        Operation::AbsoluteGrowth,
        Operation::BestDay,
        Operation::Head,
        Operation::Tail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Correlation => "correlation",
            Operation::Growth => "growth",
            Operation::AbsoluteGrowth => "absolute_growth",
            Operation::BestDay => "best_day",
            Operation::Head => "head",
            Operation::Tail => "tail",
        }
    }
}

impl FromStr for Operation {
    type Err = DataQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| DataQueryError::UnknownOperation(s.to_string()))
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw `query_data` arguments as sent by the model
///
/// `operation` stays a string so that an unknown name surfaces as a data
/// error from the accessor rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryArgs {
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<usize>,
}

impl QueryArgs {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation: operation.as_str().to_string(),
            ..Self::default()
        }
    }
}

/// Validated query, one variant per operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRequest {
    Correlation { column_x: String, column_y: String },
    Growth { years: u32 },
    AbsoluteGrowth { years: u32 },
    BestDay { index: String },
    Head { n: usize },
    Tail { n: usize },
}

impl QueryRequest {
    pub fn operation(&self) -> Operation {
        match self {
            QueryRequest::Correlation { .. } => Operation::Correlation,
            QueryRequest::Growth { .. } => Operation::Growth,
            QueryRequest::AbsoluteGrowth { .. } => Operation::AbsoluteGrowth,
            QueryRequest::BestDay { .. } => Operation::BestDay,
            QueryRequest::Head { .. } => Operation::Head,
            QueryRequest::Tail { .. } => Operation::Tail,
        }
    }
}

impl TryFrom<QueryArgs> for QueryRequest {
    type Error = DataQueryError;

    fn try_from(args: QueryArgs) -> Result<Self, Self::Error> {
        let operation: Operation = args.operation.parse()?;
        let required = |value: Option<String>, parameter: &'static str| {
            value.ok_or(DataQueryError::MissingParameter {
                operation: operation.as_str(),
                parameter,
            })
        };

        Ok(match operation {
            Operation::Correlation => QueryRequest::Correlation {
                column_x: required(args.column_x, "column_x")?,
                column_y: required(args.column_y, "column_y")?,
            },
            Operation::Growth => QueryRequest::Growth {
                years: args.years.unwrap_or(DEFAULT_YEARS),
            },
            Operation::AbsoluteGrowth => QueryRequest::AbsoluteGrowth {
                years: args.years.unwrap_or(DEFAULT_YEARS),
            },
            Operation::BestDay => QueryRequest::BestDay {
                index: required(args.index, "index")?,
            },
            Operation::Head => QueryRequest::Head {
                n: args.n.unwrap_or(DEFAULT_ROWS),
            },
            Operation::Tail => QueryRequest::Tail {
                n: args.n.unwrap_or(DEFAULT_ROWS),
            },
        })
    }
}

/// One row of the table with the date restored as a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

/// Query outcome; serializes to exactly the documented result keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResult {
    Error {
        error: String,
    },
    Correlation {
        correlation: f64,
    },
    Growth {
        spy_growth_pct: f64,
        sensex_growth_pct: f64,
    },
    AbsoluteGrowth {
        spy_absolute: f64,
        sensex_absolute: f64,
    },
    BestDay {
        best_day: String,
    },
    Rows {
        data: Vec<RowRecord>,
    },
}

impl QueryResult {
    pub fn is_error(&self) -> bool {
        matches!(self, QueryResult::Error { .. })
    }
}

impl From<DataQueryError> for QueryResult {
    fn from(err: DataQueryError) -> Self {
        QueryResult::Error {
            error: err.to_string(),
        }
    }
}

/// Validate raw arguments and run the query; never fails
pub fn query_data(dataset: &Dataset, args: QueryArgs) -> QueryResult {
    match QueryRequest::try_from(args) {
        Ok(request) => dataset.execute(&request),
        Err(err) => {
            warn!("Rejected query: {}", err);
            err.into()
        }
    }
}

impl Dataset {
    /// Run a validated query; every internal failure becomes an error result
    pub fn execute(&self, request: &QueryRequest) -> QueryResult {
        debug!(operation = %request.operation(), "Executing data query");
        let outcome = match request {
            QueryRequest::Correlation { column_x, column_y } => self
                .correlation(column_x, column_y)
                .map(|correlation| QueryResult::Correlation { correlation }),
            QueryRequest::Growth { years } => {
                self.growth(*years).map(|(spy, sensex)| QueryResult::Growth {
                    spy_growth_pct: spy,
                    sensex_growth_pct: sensex,
                })
            }
            QueryRequest::AbsoluteGrowth { years } => {
                self.absolute_growth(*years)
                    .map(|(spy, sensex)| QueryResult::AbsoluteGrowth {
                        spy_absolute: spy,
                        sensex_absolute: sensex,
                    })
            }
            QueryRequest::BestDay { index } => self
                .best_day(index)
                .map(|best_day| QueryResult::BestDay { best_day }),
            QueryRequest::Head { n } => {
                let end = (*n).min(self.height());
                self.rows(0..end).map(|data| QueryResult::Rows { data })
            }
            QueryRequest::Tail { n } => {
                let start = self.height().saturating_sub(*n);
                self.rows(start..self.height())
                    .map(|data| QueryResult::Rows { data })
            }
        };

        outcome.unwrap_or_else(|err| {
            warn!(operation = %request.operation(), "Data query failed: {}", err);
            err.into()
        })
    }

    /// Pearson correlation over rows where both columns have values
    pub fn correlation(&self, column_x: &str, column_y: &str) -> Result<f64, DataQueryError> {
        let xs = self.numeric_column(column_x)?;
        let ys = self.numeric_column(column_y)?;
        let pairs: Vec<(f64, f64)> = xs
            .iter()
            .zip(ys.iter())
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();

        pearson(&pairs).ok_or_else(|| {
            DataQueryError::UndefinedCorrelation(column_x.to_string(), column_y.to_string())
        })
    }

    /// Percentage change of SPY_Close and Sensex_Close over the trailing window
    pub fn growth(&self, years: u32) -> Result<(f64, f64), DataQueryError> {
        let percent = |column: &str| -> Result<f64, DataQueryError> {
            let (first, last) = self.window_endpoints(column, years)?;
            if first == 0.0 {
                return Err(DataQueryError::DivisionByZero(column.to_string()));
            }
            finite((last - first) / first * 100.0, column)
        };
        Ok((percent(SPY_CLOSE)?, percent(SENSEX_CLOSE)?))
    }

    /// Absolute change of SPY_Close and Sensex_Close over the trailing window
    pub fn absolute_growth(&self, years: u32) -> Result<(f64, f64), DataQueryError> {
        let change = |column: &str| -> Result<f64, DataQueryError> {
            let (first, last) = self.window_endpoints(column, years)?;
            finite(last - first, column)
        };
        Ok((change(SPY_CLOSE)?, change(SENSEX_CLOSE)?))
    }

    /// Weekday with the highest mean day-over-day percentage change
    ///
    /// Weekday groups are compared in alphabetical order and the first
    /// maximum wins. Missing and NaN cells are skipped.
    pub fn best_day(&self, column: &str) -> Result<String, DataQueryError> {
        let values = self.numeric_column(column)?;
        let mut groups: BTreeMap<String, (f64, usize)> = BTreeMap::new();

        for i in 1..values.len() {
            let (Some(previous), Some(current)) = (values[i - 1], values[i]) else {
                continue;
            };
            if !previous.is_finite() || !current.is_finite() {
                continue;
            }
            if previous == 0.0 {
                return Err(DataQueryError::DivisionByZero(column.to_string()));
            }
            let change = finite((current - previous) / previous * 100.0, column)?;
            let weekday = self.dates()[i].format("%A").to_string();
            let entry = groups.entry(weekday).or_insert((0.0, 0));
            entry.0 += change;
            entry.1 += 1;
        }

        let mut best: Option<(&str, f64)> = None;
        for (weekday, (sum, count)) in &groups {
            let mean = finite(sum / *count as f64, column)?;
            if best.map_or(true, |(_, top)| mean > top) {
                best = Some((weekday.as_str(), mean));
            }
        }

        best.map(|(weekday, _)| weekday.to_string())
            .ok_or_else(|| DataQueryError::NoObservations(column.to_string()))
    }

    /// Row range of the trailing window ending at the latest date
    ///
    /// A window reaching before the first row clamps to the whole table.
    pub fn trailing_window(&self, years: u32) -> Result<Range<usize>, DataQueryError> {
        let last = self.last_date().ok_or(DataQueryError::EmptyDataset)?;
        let start = last
            .checked_sub_months(Months::new(years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);
        let first_row = self.dates().partition_point(|date| *date < start);
        Ok(first_row..self.height())
    }

    fn window_endpoints(&self, column: &str, years: u32) -> Result<(f64, f64), DataQueryError> {
        let window = self.trailing_window(years)?;
        let values = self.numeric_column(column)?;
        let value_at = |row: usize| {
            values[row]
                .filter(|value| value.is_finite())
                .ok_or_else(|| DataQueryError::MissingValue {
                    column: column.to_string(),
                    date: self.dates()[row],
                })
        };
        Ok((value_at(window.start)?, value_at(window.end - 1)?))
    }

    fn rows(&self, range: Range<usize>) -> Result<Vec<RowRecord>, DataQueryError> {
        let mut columns = Vec::new();
        for name in self.column_names() {
            match self.numeric_column(&name) {
                Ok(values) => columns.push((name, values)),
                Err(DataQueryError::NotNumeric(_)) => continue,
                Err(err) => return Err(err),
            }
        }

        Ok(range
            .map(|row| RowRecord {
                date: self.dates()[row],
                values: columns
                    .iter()
                    .map(|(name, values)| {
                        (name.clone(), values[row].filter(|value| value.is_finite()))
                    })
                    .collect(),
            })
            .collect())
    }
}

/// Reject NaN and infinite results; they cannot be reported as data
fn finite(value: f64, column: &str) -> Result<f64, DataQueryError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DataQueryError::Computation(format!(
            "non-finite result for {}",
            column
        )))
    }
}

/// Sample Pearson correlation; `None` when undefined
fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then_some(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn market() -> Dataset {
        let frame = df![
            "Date" => ["2020-01-01", "2020-06-01", "2021-01-01"],
            "Gold_Price" => [100.0, 110.0, 125.0],
            "SPY_Open" => [298.0, 305.0, 328.0],
            "SPY_Close" => [300.0, 310.0, 330.0],
            "Sensex_Open" => [39900.0, 41000.0, 43900.0],
            "Sensex_Close" => [40000.0, 41000.0, 44000.0],
        ]
        .unwrap();
        Dataset::from_frame(frame).unwrap()
    }

    /// 2024-01-01 is a Monday
    fn week() -> Dataset {
        let frame = df![
            "Date" => [
                "2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04",
                "2024-01-05", "2024-01-08", "2024-01-09",
            ],
            "Gold_Price" => [100.0, 110.0, 99.0, 99.0, 99.0, 99.0, 108.9],
            "Flat" => [0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        ]
        .unwrap();
        Dataset::from_frame(frame).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_operation_round_trip_names() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert!(matches!(
            "median".parse::<Operation>(),
            Err(DataQueryError::UnknownOperation(_))
        ));
    }

    #[test]
    fn test_request_defaults() {
        let growth = QueryRequest::try_from(QueryArgs::new(Operation::Growth)).unwrap();
        assert_eq!(growth, QueryRequest::Growth { years: 5 });
        let tail = QueryRequest::try_from(QueryArgs::new(Operation::Tail)).unwrap();
        assert_eq!(tail, QueryRequest::Tail { n: 5 });
    }

    #[test]
    fn test_request_missing_parameter() {
        let args = QueryArgs {
            column_x: Some("Gold_Price".to_string()),
            ..QueryArgs::new(Operation::Correlation)
        };
        let err = QueryRequest::try_from(args).unwrap_err();
        assert_eq!(
            err,
            DataQueryError::MissingParameter {
                operation: "correlation",
                parameter: "column_y"
            }
        );
    }

    #[test]
    fn test_correlation_is_symmetric() {
        let dataset = market();
        let xy = dataset.correlation("Gold_Price", "SPY_Close").unwrap();
        let yx = dataset.correlation("SPY_Close", "Gold_Price").unwrap();
        assert_eq!(xy, yx);
        assert!(xy > 0.9 && xy <= 1.0);
    }

    #[test]
    fn test_correlation_of_linear_columns_is_one() {
        let frame = df![
            "Date" => ["2020-01-01", "2020-01-02", "2020-01-03"],
            "A" => [1.0, 2.0, 3.0],
            "B" => [2.0, 4.0, 6.0],
        ]
        .unwrap();
        let dataset = Dataset::from_frame(frame).unwrap();
        assert_close(dataset.correlation("A", "B").unwrap(), 1.0);
    }

    #[test]
    fn test_correlation_unknown_column_is_error_result() {
        let args = QueryArgs {
            column_x: Some("Gold_Price".to_string()),
            column_y: Some("Bitcoin".to_string()),
            ..QueryArgs::new(Operation::Correlation)
        };
        let result = query_data(&market(), args);
        assert_eq!(
            result,
            QueryResult::Error {
                error: "Unknown column: Bitcoin".to_string()
            }
        );
    }

    #[test]
    fn test_correlation_constant_column_is_undefined() {
        let frame = df![
            "Date" => ["2020-01-01", "2020-01-02"],
            "A" => [1.0, 1.0],
            "B" => [2.0, 4.0],
        ]
        .unwrap();
        let dataset = Dataset::from_frame(frame).unwrap();
        assert!(matches!(
            dataset.correlation("A", "B"),
            Err(DataQueryError::UndefinedCorrelation(_, _))
        ));
    }

    #[test]
    fn test_growth_one_year() {
        let result = market().execute(&QueryRequest::Growth { years: 1 });
        let QueryResult::Growth {
            spy_growth_pct,
            sensex_growth_pct,
        } = result
        else {
            panic!("unexpected result: {result:?}");
        };
        assert_close(spy_growth_pct, 10.0);
        assert_close(sensex_growth_pct, 10.0);
    }

    #[test]
    fn test_growth_window_clamps_to_full_span() {
        let dataset = market();
        let full_span = dataset.execute(&QueryRequest::Growth { years: 1 });
        let beyond = dataset.execute(&QueryRequest::Growth { years: 40 });
        assert_eq!(full_span, beyond);
        assert!(!beyond.is_error());
    }

    #[test]
    fn test_growth_zero_years_uses_last_row_only() {
        let result = market().execute(&QueryRequest::AbsoluteGrowth { years: 0 });
        assert_eq!(
            result,
            QueryResult::AbsoluteGrowth {
                spy_absolute: 0.0,
                sensex_absolute: 0.0
            }
        );
    }

    #[test]
    fn test_trailing_window_excludes_older_rows() {
        let frame = df![
            "Date" => ["2018-01-01", "2020-06-01", "2021-01-01"],
            "SPY_Close" => [100.0, 310.0, 330.0],
            "Sensex_Close" => [1.0, 41000.0, 44000.0],
        ]
        .unwrap();
        let dataset = Dataset::from_frame(frame).unwrap();
        assert_eq!(dataset.trailing_window(1).unwrap(), 1..3);
        let (spy, sensex) = dataset.absolute_growth(1).unwrap();
        assert_close(spy, 20.0);
        assert_close(sensex, 3000.0);
    }

    #[test]
    fn test_growth_division_by_zero() {
        let frame = df![
            "Date" => ["2020-01-01", "2020-06-01"],
            "SPY_Close" => [0.0, 310.0],
            "Sensex_Close" => [40000.0, 41000.0],
        ]
        .unwrap();
        let dataset = Dataset::from_frame(frame).unwrap();
        let result = dataset.execute(&QueryRequest::Growth { years: 5 });
        assert_eq!(
            result,
            QueryResult::Error {
                error: "Division by zero in SPY_Close".to_string()
            }
        );
    }

    #[test]
    fn test_best_day() {
        let result = week().execute(&QueryRequest::BestDay {
            index: "Gold_Price".to_string(),
        });
        assert_eq!(
            result,
            QueryResult::BestDay {
                best_day: "Tuesday".to_string()
            }
        );
    }

    #[test]
    fn test_best_day_unknown_column() {
        let result = week().execute(&QueryRequest::BestDay {
            index: "Silver".to_string(),
        });
        assert!(result.is_error());
    }

    #[test]
    fn test_best_day_zero_previous_value() {
        let result = week().execute(&QueryRequest::BestDay {
            index: "Flat".to_string(),
        });
        assert_eq!(
            result,
            QueryResult::Error {
                error: "Division by zero in Flat".to_string()
            }
        );
    }

    #[test]
    fn test_head_and_tail() {
        let dataset = market();
        let QueryResult::Rows { data: head } = dataset.execute(&QueryRequest::Head { n: 2 }) else {
            panic!("head should return rows");
        };
        assert_eq!(head.len(), 2);
        assert_eq!(head[0].date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(head[1].values["SPY_Close"], Some(310.0));

        let QueryResult::Rows { data: tail } = dataset.execute(&QueryRequest::Tail { n: 2 }) else {
            panic!("tail should return rows");
        };
        assert_eq!(tail.len(), 2);
        assert!(tail[0].date < tail[1].date);
        assert_eq!(tail[1].date, dataset.last_date().unwrap());
        assert_eq!(tail[1].values["Gold_Price"], Some(125.0));
    }

    #[test]
    fn test_head_larger_than_table() {
        let QueryResult::Rows { data } = market().execute(&QueryRequest::Head { n: 50 }) else {
            panic!("head should return rows");
        };
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_unknown_operation_is_error_result() {
        let args = QueryArgs {
            operation: "drop_table".to_string(),
            ..QueryArgs::default()
        };
        assert_eq!(
            query_data(&market(), args),
            QueryResult::Error {
                error: "Unknown operation: drop_table".to_string()
            }
        );
    }

    #[test]
    fn test_result_json_keys() {
        let growth = QueryResult::Growth {
            spy_growth_pct: 10.0,
            sensex_growth_pct: 2.5,
        };
        let json = serde_json::to_value(&growth).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"spy_growth_pct": 10.0, "sensex_growth_pct": 2.5})
        );

        let error = QueryResult::Error {
            error: "boom".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            serde_json::json!({"error": "boom"})
        );
    }

    #[test]
    fn test_growth_nan_endpoint_is_error_result() {
        let frame = df![
            "Date" => ["2020-01-01", "2021-01-01"],
            "SPY_Close" => [300.0, f64::NAN],
            "Sensex_Close" => [40000.0, 44000.0],
        ]
        .unwrap();
        let dataset = Dataset::from_frame(frame).unwrap();

        let growth = dataset.execute(&QueryRequest::Growth { years: 5 });
        assert_eq!(
            growth,
            QueryResult::Error {
                error: "Missing value in SPY_Close on 2021-01-01".to_string()
            }
        );
        assert!(dataset
            .execute(&QueryRequest::AbsoluteGrowth { years: 5 })
            .is_error());
    }

    #[test]
    fn test_best_day_skips_nan_cells() {
        // Mon 1.0, Tue NaN, Wed 2.0, Thu 1.0: only Thursday has a defined change
        let frame = df![
            "Date" => ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"],
            "A" => [1.0, f64::NAN, 2.0, 1.0],
        ]
        .unwrap();
        let dataset = Dataset::from_frame(frame).unwrap();
        assert_eq!(dataset.best_day("A").unwrap(), "Thursday");

        let frame = df![
            "Date" => ["2024-01-01", "2024-01-02", "2024-01-03"],
            "A" => [1.0, f64::NAN, 2.0],
        ]
        .unwrap();
        let dataset = Dataset::from_frame(frame).unwrap();
        assert_eq!(
            dataset.best_day("A"),
            Err(DataQueryError::NoObservations("A".to_string()))
        );
    }

    #[test]
    fn test_correlation_ignores_nan_pairs() {
        let frame = df![
            "Date" => ["2020-01-01", "2020-01-02", "2020-01-03", "2020-01-04"],
            "A" => [1.0, f64::NAN, 2.0, 3.0],
            "B" => [2.0, 5.0, 4.0, 6.0],
        ]
        .unwrap();
        let dataset = Dataset::from_frame(frame).unwrap();
        assert_close(dataset.correlation("A", "B").unwrap(), 1.0);
    }

    #[test]
    fn test_rows_report_nan_as_null() {
        let frame = df![
            "Date" => ["2020-01-01"],
            "Gold_Price" => [f64::NAN],
        ]
        .unwrap();
        let dataset = Dataset::from_frame(frame).unwrap();
        let rows = dataset.execute(&QueryRequest::Head { n: 1 });
        let QueryResult::Rows { data } = &rows else {
            panic!("head should return rows");
        };
        assert_eq!(data[0].values["Gold_Price"], None);

        let parsed: QueryResult =
            serde_json::from_str(&serde_json::to_string(&rows).unwrap()).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_float_results_survive_serialization() {
        // xorshift keeps the sample deterministic without a rand dependency
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            1.0 + (state >> 11) as f64 / (1u64 << 53) as f64 * 1000.0
        };

        for _ in 0..20_000 {
            let (a, b, c, d) = (next(), next(), next(), next());
            let results = [
                QueryResult::Growth {
                    spy_growth_pct: (b - a) / a * 100.0,
                    sensex_growth_pct: (d - c) / c * 100.0,
                },
                QueryResult::AbsoluteGrowth {
                    spy_absolute: b - a,
                    sensex_absolute: d - c,
                },
                QueryResult::Correlation {
                    correlation: (a - b) / (a + b),
                },
            ];
            for result in results {
                let text = serde_json::to_string(&result).unwrap();
                let parsed: QueryResult = serde_json::from_str(&text).unwrap();
                assert_eq!(parsed, result, "lossy serialization: {text}");
            }
        }
    }

    #[test]
    fn test_rows_survive_serialization() {
        let rows = market().execute(&QueryRequest::Tail { n: 3 });
        let text = serde_json::to_string(&rows).unwrap();
        assert!(text.contains("\"Date\":\"2021-01-01\""));
        let parsed: QueryResult = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, rows);
    }
}
