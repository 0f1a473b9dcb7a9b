use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts gathered from a single file before they are merged into the shared table.
#[derive(Debug, Default)]
pub struct FileTally {
    counts: HashMap<String, usize>,
    records: usize,
    values: usize,
}

impl FileTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self) {
        self.records += 1;
    }

    pub fn add_value(&mut self, value: &str) {
        self.values += 1;
        if let Some(count) = self.counts.get_mut(value) {
            *count += 1;
        } else {
            self.counts.insert(value.to_string(), 1);
        }
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn values(&self) -> usize {
        self.values
    }

    pub fn distinct_values(&self) -> usize {
        self.counts.len()
    }
}

/// Frequency table shared by every worker of one calculation.
///
/// Writers only ever add; the table is read once, after all workers have joined.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    counts: DashMap<String, AtomicUsize>,
    processed_files: AtomicUsize,
    total_records: AtomicUsize,
    total_values: AtomicUsize,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_file(&self, tally: FileTally) {
        self.processed_files.fetch_add(1, Ordering::Relaxed);
        self.total_records.fetch_add(tally.records, Ordering::Relaxed);
        self.total_values.fetch_add(tally.values, Ordering::Relaxed);

        for (value, count) in tally.counts {
            self.counts
                .entry(value)
                .or_insert_with(|| AtomicUsize::new(0))
                .fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn processed_files(&self) -> usize {
        self.processed_files.load(Ordering::Relaxed)
    }

    pub fn total_records(&self) -> usize {
        self.total_records.load(Ordering::Relaxed)
    }

    pub fn total_values(&self) -> usize {
        self.total_values.load(Ordering::Relaxed)
    }

    /// Reads every counter. Only meaningful once all writers have joined.
    pub fn snapshot(&self) -> HashMap<String, usize> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect()
    }
}
