use crate::calculator::{CalculationRequest, Statistics, StatisticsCalculator};
use crate::record::{JsonBookSource, RecordSource};
use crate::report::{write_report, ReportFormat};
use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

/// Runs a calculation and persists its report. Nothing is written if the calculation fails.
pub struct StatisticsService<S = JsonBookSource> {
    calculator: StatisticsCalculator<S>,
    format: ReportFormat,
}

impl<S: RecordSource + 'static> StatisticsService<S> {
    pub fn new(calculator: StatisticsCalculator<S>) -> Self {
        Self {
            calculator,
            format: ReportFormat::default(),
        }
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn generate_statistics<P: AsRef<Path>>(
        &self,
        request: &CalculationRequest,
        output_dir: P,
    ) -> Result<(Statistics, PathBuf)> {
        let statistics = self.calculator.calculate(request).with_context(|| {
            format!(
                "Failed to calculate {} statistics for {}",
                request.attribute,
                request.directory.display()
            )
        })?;

        let output_dir = output_dir.as_ref();
        info!("Writing report to directory: {}", output_dir.display());
        let report_path = write_report(output_dir, request.attribute, &statistics.entries, self.format)
            .context("Failed to write statistics report")?;

        Ok((statistics, report_path))
    }
}
