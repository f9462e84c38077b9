use std::collections::HashMap;

use crate::model::SourceRecord;

/// Code → record lookup for one source.
///
/// When a source lists the same code more than once, the later record wins
/// and the earlier ones are counted in `duplicates()`. They stay reachable
/// through fuzzy matching, which scans the raw record sequence.
#[derive(Debug)]
pub struct ExactKeyIndex<'a> {
    records: &'a [SourceRecord],
    by_code: HashMap<&'a str, usize>,
    duplicates: usize,
}

impl<'a> ExactKeyIndex<'a> {
    pub fn build(records: &'a [SourceRecord]) -> Self {
        let mut by_code = HashMap::with_capacity(records.len());
        let mut duplicates = 0;

        for (position, record) in records.iter().enumerate() {
            if let Some(shadowed) = by_code.insert(record.code.as_str(), position) {
                tracing::debug!(
                    code = %record.code,
                    shadowed,
                    kept = position,
                    "duplicate code, keeping the later record"
                );
                duplicates += 1;
            }
        }

        Self {
            records,
            by_code,
            duplicates,
        }
    }

    pub fn lookup(&self, code: &str) -> Option<&'a SourceRecord> {
        self.entry(code).map(|(_, record)| record)
    }

    /// Indexed record together with its position in the source.
    pub fn entry(&self, code: &str) -> Option<(usize, &'a SourceRecord)> {
        self.position(code).map(|i| (i, &self.records[i]))
    }

    /// Position of the indexed record within the source.
    pub fn position(&self, code: &str) -> Option<usize> {
        self.by_code.get(code).copied()
    }

    pub fn codes(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.by_code.keys().copied()
    }

    /// Records in the source, shadowed duplicates included.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(code: &str, name: &str, price: f64) -> SourceRecord {
        SourceRecord::new(code, name, Some(price))
    }

    #[test]
    fn lookup_by_code() {
        let records = vec![rec("A1", "Hammer", 10.0), rec("B2", "Saw", 25.0)];
        let index = ExactKeyIndex::build(&records);
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("B2").unwrap().name, "Saw");
        assert_eq!(index.position("A1"), Some(0));
        assert!(index.lookup("C3").is_none());
        assert_eq!(index.duplicates(), 0);
    }

    #[test]
    fn codes_are_case_sensitive() {
        let records = vec![rec("ab", "Hammer", 10.0)];
        let index = ExactKeyIndex::build(&records);
        assert!(index.lookup("AB").is_none());
    }

    #[test]
    fn duplicate_code_last_write_wins() {
        let records = vec![
            rec("A1", "Hammer (old)", 10.0),
            rec("B2", "Saw", 25.0),
            rec("A1", "Hammer", 12.0),
        ];
        let index = ExactKeyIndex::build(&records);
        let hit = index.lookup("A1").unwrap();
        assert_eq!(hit.name, "Hammer");
        assert_eq!(hit.price, Some(12.0));
        assert_eq!(index.position("A1"), Some(2));
        assert_eq!(index.len(), 2);
        assert_eq!(index.record_count(), 3);
        assert_eq!(index.duplicates(), 1);
    }

    #[test]
    fn empty_code_is_a_key() {
        let records = vec![rec("", "Loose item", 1.0)];
        let index = ExactKeyIndex::build(&records);
        assert_eq!(index.lookup("").unwrap().name, "Loose item");
    }

    #[test]
    fn empty_source() {
        let index = ExactKeyIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.codes().count(), 0);
    }
}
