//! Ordered concatenation of per-chunk records

use quarry_domain::Record;

/// Collects records chunk by chunk, preserving chunk order and the order
/// within each chunk
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    records: Vec<Record>,
    chunks_appended: usize,
}

impl ResultAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the records of the next chunk (an empty list is allowed)
    pub fn append(&mut self, records: Vec<Record>) {
        self.records.extend(records);
        self.chunks_appended += 1;
    }

    /// Combined records so far; calling this repeatedly yields the same list
    pub fn finalize(&self) -> Vec<Record> {
        self.records.clone()
    }

    /// Consume the aggregator, yielding the combined records
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Number of records collected
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records have been collected
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of chunks appended
    pub fn chunk_count(&self) -> usize {
        self.chunks_appended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str) -> Record {
        Record::new(json!({ "folio": name }))
    }

    #[test]
    fn test_concatenates_in_chunk_order() {
        let mut aggregator = ResultAggregator::new();
        aggregator.append(vec![record("a")]);
        aggregator.append(vec![record("b"), record("c")]);
        aggregator.append(Vec::new());

        assert_eq!(
            aggregator.finalize(),
            vec![record("a"), record("b"), record("c")]
        );
        assert_eq!(aggregator.chunk_count(), 3);
        assert_eq!(aggregator.len(), 3);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut aggregator = ResultAggregator::new();
        aggregator.append(vec![record("x")]);

        let first = aggregator.finalize();
        let second = aggregator.finalize();
        assert_eq!(first, second);
        assert_eq!(aggregator.into_records(), first);
    }

    #[test]
    fn test_empty_chunks_yield_empty_result() {
        let mut aggregator = ResultAggregator::new();
        aggregator.append(Vec::new());
        assert!(aggregator.is_empty());
        assert!(aggregator.finalize().is_empty());
    }
}
