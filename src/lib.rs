//! Ranked frequency statistics of one book attribute across a directory of JSON files.
//!
//! Each file is processed by its own task on a fixed-size worker pool; per-file tallies are
//! merged into a shared [`FrequencyTable`] and ranked once every task has joined.

pub mod attribute;
pub mod calculator;
pub mod error;
pub mod files;
pub mod frequency;
pub mod ranking;
pub mod record;
pub mod report;
pub mod service;

pub use attribute::Attribute;
pub use calculator::{format_elapsed, CalculationRequest, Statistics, StatisticsCalculator};
pub use error::CalculationError;
pub use files::{FileSelector, DEFAULT_EXTENSION};
pub use frequency::{FileTally, FrequencyTable};
pub use ranking::{rank, RankedValue};
pub use record::{Book, JsonBookSource, RecordSource, SourceError};
pub use report::{report_file_name, write_report, ReportError, ReportFormat};
pub use service::StatisticsService;
