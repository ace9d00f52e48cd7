use std::{cmp::Reverse, collections::HashMap};

use crate::error::{Error, Result};

/// Car counts per location. A worker owns one as its local tally and the
/// reducer folds every worker's report into one global tally.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tally {
    counts: HashMap<String, u64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` to the total for `location`. A total that would not fit
    /// in a `u64` is an error and leaves the tally unchanged.
    pub fn add(&mut self, location: &str, count: u64) -> Result<()> {
        match self.counts.get_mut(location) {
            Some(total) => {
                *total = total
                    .checked_add(count)
                    .ok_or_else(|| Error::CountOverflow {
                        location: location.to_string(),
                    })?;
            }
            None => {
                self.counts.insert(location.to_string(), count);
            }
        }
        Ok(())
    }

    pub fn get(&self, location: &str) -> Option<u64> {
        self.counts.get(location).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The `k` busiest locations, count descending, ties by location ascending.
    pub fn ranking(&self, k: usize) -> Ranking {
        let mut entries: Vec<(String, u64)> = self
            .counts
            .iter()
            .map(|(location, count)| (location.clone(), *count))
            .collect();
        entries.sort_by(|a, b| (Reverse(a.1), &a.0).cmp(&(Reverse(b.1), &b.0)));
        entries.truncate(k);
        Ranking(entries)
    }
}

impl IntoIterator for Tally {
    type Item = (String, u64);
    type IntoIter = std::collections::hash_map::IntoIter<String, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}

#[cfg(test)]
pub(crate) fn from_pairs(pairs: &[(&str, u64)]) -> Tally {
    let mut tally = Tally::new();
    for (location, count) in pairs {
        tally.add(location, *count).unwrap();
    }
    tally
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Ranking(Vec<(String, u64)>);

impl Ranking {
    pub fn entries(&self) -> &[(String, u64)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<(String, u64)> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(ranking: &Ranking) -> Vec<(&str, u64)> {
        ranking.entries().iter().map(|(l, c)| (l.as_str(), *c)).collect()
    }

    #[test]
    fn test_add_accumulates() {
        let mut tally = Tally::new();
        tally.add("A", 5).unwrap();
        tally.add("B", 2).unwrap();
        tally.add("A", 3).unwrap();

        assert_eq!(tally.len(), 2);
        assert_eq!(tally.get("A"), Some(8));
        assert_eq!(tally.get("B"), Some(2));
        assert_eq!(tally.get("C"), None);
    }

    #[test]
    fn test_add_rejects_overflowing_total() {
        let mut tally = Tally::new();
        tally.add("A", u64::MAX).unwrap();
        tally.add("B", 1).unwrap();

        let err = tally.add("A", 1).unwrap_err();
        assert!(matches!(err, Error::CountOverflow { ref location } if location == "A"));
        assert_eq!(tally.get("A"), Some(u64::MAX));
        tally.add("A", 0).unwrap();
    }

    #[test]
    fn test_ranking_sorted_and_bounded() {
        let tally = from_pairs(&[("A", 8), ("B", 3), ("C", 9), ("D", 1)]);

        assert_eq!(pairs(&tally.ranking(3)), vec![("C", 9), ("A", 8), ("B", 3)]);
        assert_eq!(tally.ranking(10).len(), 4);
        assert!(tally.ranking(0).is_empty());
    }

    #[test]
    fn test_ranking_breaks_ties_by_location() {
        let tally = from_pairs(&[("north", 4), ("east", 4), ("west", 7), ("south", 4)]);

        assert_eq!(
            pairs(&tally.ranking(3)),
            vec![("west", 7), ("east", 4), ("north", 4)]
        );
    }

    #[test]
    fn test_empty_tally_ranks_nothing() {
        assert!(Tally::new().ranking(3).is_empty());
    }
}
