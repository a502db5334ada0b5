//! MarketLens Core Module
//!
//! The core module owns the merged Gold / SPY / Sensex price table and the
//! fixed catalogue of analytical queries that the assistant is allowed to run
//! against it. It also carries the shared configuration and the preprocessing
//! step that produces the merged CSV from raw market exports.

pub mod config;
pub mod dataset;
pub mod merge;
pub mod query;

pub use config::{AppConfig, ConfigError, FallbackPolicy};
pub use dataset::{list_data_files, Dataset, DatasetError, DATE_COLUMN, PRICE_COLUMNS};
pub use merge::{merge_sources, MergeError, MergeSources};
pub use query::{
    query_data, DataQueryError, Operation, QueryArgs, QueryRequest, QueryResult, RowRecord,
    DEFAULT_ROWS, DEFAULT_YEARS,
};
