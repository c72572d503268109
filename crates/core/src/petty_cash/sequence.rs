//! Request name sequence.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use pettycash_shared::SequenceConfig;

/// Placeholder name replaced by the sequence on creation.
pub const PLACEHOLDER_NAME: &str = "New";

/// Yearly running sequence producing names such as `PC/2026/00001`.
#[derive(Debug, Clone)]
pub struct RequestSequence {
    prefix: String,
    padding: usize,
    counters: BTreeMap<i32, u32>,
}

impl RequestSequence {
    /// Creates a sequence from its configuration.
    #[must_use]
    pub fn new(config: &SequenceConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            padding: config.padding,
            counters: BTreeMap::new(),
        }
    }

    /// Returns the next name for a request dated `date`. Numbering restarts
    /// every year.
    pub fn next_name(&mut self, date: NaiveDate) -> String {
        let counter = self.counters.entry(date.year()).or_insert(0);
        *counter += 1;
        format!(
            "{}{}/{:0width$}",
            self.prefix,
            date.year(),
            counter,
            width = self.padding
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 6, 1).unwrap()
    }

    #[test]
    fn test_default_format() {
        let mut seq = RequestSequence::new(&SequenceConfig::default());
        assert_eq!(seq.next_name(date(2026)), "PC/2026/00001");
        assert_eq!(seq.next_name(date(2026)), "PC/2026/00002");
    }

    #[test]
    fn test_restarts_each_year() {
        let mut seq = RequestSequence::new(&SequenceConfig::default());
        seq.next_name(date(2025));
        seq.next_name(date(2025));
        assert_eq!(seq.next_name(date(2026)), "PC/2026/00001");
        assert_eq!(seq.next_name(date(2025)), "PC/2025/00003");
    }

    #[test]
    fn test_custom_prefix_and_padding() {
        let mut seq = RequestSequence::new(&SequenceConfig {
            prefix: "PETTY-".to_string(),
            padding: 3,
        });
        assert_eq!(seq.next_name(date(2026)), "PETTY-2026/001");
    }
}
