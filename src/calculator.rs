use crate::attribute::Attribute;
use crate::error::CalculationError;
use crate::files::FileSelector;
use crate::frequency::{FileTally, FrequencyTable};
use crate::ranking::{rank, RankedValue};
use crate::record::{Book, JsonBookSource, RecordSource, SourceError};
use crossbeam_channel::{bounded, Receiver};
use indicatif::ProgressBar;
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Parameters of one calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationRequest {
    pub directory: PathBuf,
    pub attribute: Attribute,
    pub worker_count: usize,
}

impl CalculationRequest {
    pub fn new<P: Into<PathBuf>>(directory: P, attribute: Attribute, worker_count: usize) -> Self {
        Self {
            directory: directory.into(),
            attribute,
            worker_count,
        }
    }
}

/// Ranked result of a successful calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    pub attribute: Attribute,
    pub entries: Vec<RankedValue>,
    pub processed_files: usize,
    pub total_records: usize,
    pub total_values: usize,
}

impl Statistics {
    pub fn get(&self, value: &str) -> Option<usize> {
        self.entries.iter().find(|e| e.value == value).map(|e| e.count)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

type TaskOutcome = Result<usize, SourceError>;

/// Aggregates attribute statistics over a directory, one pool task per file.
pub struct StatisticsCalculator<S = JsonBookSource> {
    source: Arc<S>,
    selector: FileSelector,
    progress: ProgressBar,
}

impl StatisticsCalculator<JsonBookSource> {
    pub fn new() -> Self {
        Self::with_source(JsonBookSource::new())
    }
}

impl Default for StatisticsCalculator<JsonBookSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: RecordSource + 'static> StatisticsCalculator<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source: Arc::new(source),
            selector: FileSelector::default(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_selector(mut self, selector: FileSelector) -> Self {
        self.selector = selector;
        self
    }

    /// The bar's length is set to the number of selected files and advanced once per file.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn calculate(&self, request: &CalculationRequest) -> Result<Statistics, CalculationError> {
        if request.worker_count < 1 {
            return Err(CalculationError::InvalidConfiguration {
                worker_count: request.worker_count,
            });
        }

        let files = self.selector.select(&request.directory)?;
        let table = Arc::new(FrequencyTable::new());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(request.worker_count)
            .thread_name(|index| format!("stats-worker-{}", index))
            .panic_handler(|panic| {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("Worker task panicked: {}", message);
            })
            .build()?;

        info!(
            "Starting parallel processing of {} files by {} with {} workers...",
            files.len(),
            request.attribute,
            request.worker_count
        );
        self.progress.set_length(files.len() as u64);
        self.progress.set_message("Starting processing...");

        let mut pending: Vec<(PathBuf, Receiver<TaskOutcome>)> = Vec::with_capacity(files.len());
        for filepath in files {
            let (sender, receiver) = bounded(1);
            let source = Arc::clone(&self.source);
            let table = Arc::clone(&table);
            let progress = self.progress.clone();
            let attribute = request.attribute;
            let task_path = filepath.clone();

            pool.spawn(move || {
                let start = Instant::now();
                let outcome = tally_file(source.as_ref(), attribute, &task_path).map(|tally| {
                    let values = tally.values();
                    table.merge_file(tally);
                    values
                });
                let elapsed = start.elapsed();

                let file_name = task_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| task_path.display().to_string());
                progress.inc(1);
                match &outcome {
                    Ok(values) => progress.set_message(format!(
                        "OK: {} ({} values, {})",
                        file_name,
                        values,
                        format_elapsed(elapsed)
                    )),
                    Err(_) => progress.set_message(format!("ERR: {} ({})", file_name, format_elapsed(elapsed))),
                }

                // The coordinator may already have returned on an earlier failure.
                let _ = sender.send(outcome);
            });
            pending.push((filepath, receiver));
        }

        for (filepath, receiver) in pending {
            match receiver.recv() {
                Ok(Ok(_)) => {}
                Ok(Err(source)) => {
                    error!("Error processing file {}: {}", filepath.display(), source);
                    self.progress.abandon_with_message(format!("Failed on {}", filepath.display()));
                    return Err(CalculationError::Parse { path: filepath, source });
                }
                Err(_) => {
                    error!("Worker for {} stopped before reporting a result", filepath.display());
                    self.progress.abandon_with_message(format!("Interrupted on {}", filepath.display()));
                    return Err(CalculationError::InterruptedWait { path: filepath });
                }
            }
        }
        drop(pool);

        let statistics = Statistics {
            attribute: request.attribute,
            entries: rank(table.snapshot()),
            processed_files: table.processed_files(),
            total_records: table.total_records(),
            total_values: table.total_values(),
        };
        self.progress.finish_with_message(format!(
            "Processing finished. {} files, {} distinct values.",
            statistics.processed_files,
            statistics.entries.len()
        ));
        info!(
            "Aggregated {} values from {} records into {} distinct entries.",
            statistics.total_values,
            statistics.total_records,
            statistics.entries.len()
        );
        Ok(statistics)
    }
}

fn tally_file<S: RecordSource + ?Sized>(
    source: &S,
    attribute: Attribute,
    filepath: &Path,
) -> Result<FileTally, SourceError> {
    let mut tally = FileTally::new();
    source.read_records(filepath, &mut |book: Book| {
        tally.add_record();
        for value in attribute.normalized_values(&book) {
            tally.add_value(&value);
        }
    })?;
    debug!(
        "Finished processing {}: {} records, {} values ({} distinct).",
        filepath.display(),
        tally.records(),
        tally.values(),
        tally.distinct_values()
    );
    Ok(tally)
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = elapsed.subsec_millis();

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}.{:03}s", seconds, millis)
    }
}
