use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One row of the final statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedValue {
    pub value: String,
    pub count: usize,
}

impl RankedValue {
    pub fn new(value: impl Into<String>, count: usize) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

/// Highest count first; equal counts fall back to the value in ascending order.
pub fn compare(a: &RankedValue, b: &RankedValue) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value))
}

pub fn rank(counts: HashMap<String, usize>) -> Vec<RankedValue> {
    let mut ranked: Vec<RankedValue> = counts
        .into_iter()
        .map(|(value, count)| RankedValue { value, count })
        .collect();
    ranked.sort_unstable_by(compare);
    ranked
}
