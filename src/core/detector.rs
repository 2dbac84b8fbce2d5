use crate::core::error::{DedupError, Result};
use crate::core::fingerprint::Fingerprint;
use serde::Serialize;

/// Largest possible Hamming distance between two fingerprints.
pub const MAX_DISTANCE: u32 = 64;

/// Pairs at or below this distance are reported unless configured otherwise.
pub const DEFAULT_THRESHOLD: u32 = 8;

/// Number of differing bits between `a` and `b`.
pub fn distance(a: Fingerprint, b: Fingerprint) -> u32 {
    a.distance(b)
}

pub fn validate_threshold(threshold: u32) -> Result<u32> {
    if threshold > MAX_DISTANCE {
        return Err(DedupError::InvalidThreshold {
            threshold,
            max: MAX_DISTANCE,
        });
    }
    Ok(threshold)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusEntry<I> {
    pub id: I,
    pub fingerprint: Fingerprint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchResult<'a, I> {
    pub first: &'a I,
    pub second: &'a I,
    pub distance: u32,
}

/// Ordered collection of fingerprinted items; insertion order is preserved
/// and identifiers are not deduplicated.
#[derive(Debug, Clone)]
pub struct Corpus<I> {
    entries: Vec<CorpusEntry<I>>,
}

impl<I> Corpus<I> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, id: I, fingerprint: Fingerprint) {
        self.entries.push(CorpusEntry { id, fingerprint });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CorpusEntry<I>] {
        &self.entries
    }

    /// Lazily yields every pair within `threshold` bits.
    ///
    /// Pairs come out ordered by `(first index, second index)` with the first
    /// strictly smaller. The returned iterator borrows the corpus, so no entry
    /// can be added while it is alive.
    pub fn find_matches(&self, threshold: u32) -> Result<Matches<'_, I>> {
        let threshold = validate_threshold(threshold)?;
        Ok(Matches {
            entries: &self.entries,
            threshold,
            i: 0,
            j: 1,
            examined: 0,
        })
    }
}

impl<I> Default for Corpus<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Extend<(I, Fingerprint)> for Corpus<I> {
    fn extend<T: IntoIterator<Item = (I, Fingerprint)>>(&mut self, iter: T) {
        for (id, fingerprint) in iter {
            self.add(id, fingerprint);
        }
    }
}

impl<I> FromIterator<(I, Fingerprint)> for Corpus<I> {
    fn from_iter<T: IntoIterator<Item = (I, Fingerprint)>>(iter: T) -> Self {
        let mut corpus = Corpus::new();
        corpus.extend(iter);
        corpus
    }
}

/// Iterator returned by [`Corpus::find_matches`].
#[derive(Debug, Clone)]
pub struct Matches<'a, I> {
    entries: &'a [CorpusEntry<I>],
    threshold: u32,
    i: usize,
    j: usize,
    examined: usize,
}

impl<I> Matches<'_, I> {
    /// Pairs compared so far; `n * (n - 1) / 2` once the iterator is exhausted.
    pub fn pairs_examined(&self) -> usize {
        self.examined
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl<'a, I> Iterator for Matches<'a, I> {
    type Item = MatchResult<'a, I>;

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries;
        while self.i < entries.len() {
            if self.j >= entries.len() {
                self.i += 1;
                self.j = self.i + 1;
                continue;
            }

            let (a, b) = (&entries[self.i], &entries[self.j]);
            self.j += 1;
            self.examined += 1;

            let d = distance(a.fingerprint, b.fingerprint);
            if d <= self.threshold {
                return Some(MatchResult {
                    first: &a.id,
                    second: &b.id,
                    distance: d,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(bits: u64) -> Fingerprint {
        Fingerprint::from_bits(bits)
    }

    fn sample_fingerprints() -> Vec<Fingerprint> {
        vec![
            fp(0),
            fp(u64::MAX),
            fp(0xaa55_aa55_aa55_aa55),
            fp(0x0000_0000_ffff_ffff),
            fp(0x8000_0000_0000_0001),
        ]
    }

    #[test]
    fn test_distance_properties() {
        let fps = sample_fingerprints();
        for &a in &fps {
            assert_eq!(distance(a, a), 0);
            for &b in &fps {
                assert_eq!(distance(a, b), distance(b, a));
                assert!(distance(a, b) <= MAX_DISTANCE);
            }
        }
        assert_eq!(distance(fp(0), fp(u64::MAX)), 64);
        assert_eq!(distance(fp(0), fp(0x8000_0000_0000_0001)), 2);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(validate_threshold(0).is_ok());
        assert!(validate_threshold(64).is_ok());
        assert!(matches!(
            validate_threshold(65),
            Err(DedupError::InvalidThreshold { threshold: 65, max: 64 })
        ));

        let corpus: Corpus<&str> = Corpus::new();
        assert!(corpus.find_matches(100).is_err());
    }

    #[test]
    fn test_pair_enumeration_completeness() {
        let corpus: Corpus<usize> = (0..7).map(|i| (i, fp(0))).collect();

        let mut matches = corpus.find_matches(0).unwrap();
        let pairs: Vec<(usize, usize)> = matches.by_ref().map(|m| (*m.first, *m.second)).collect();

        assert_eq!(matches.pairs_examined(), 7 * 6 / 2);
        assert_eq!(pairs.len(), 21);
        for (a, b) in &pairs {
            assert!(a < b);
        }
        let mut sorted = pairs.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted, pairs);
    }

    #[test]
    fn test_empty_and_single_corpus() {
        let empty: Corpus<&str> = Corpus::new();
        let mut matches = empty.find_matches(64).unwrap();
        assert!(matches.next().is_none());
        assert_eq!(matches.pairs_examined(), 0);

        let mut single = Corpus::new();
        single.add("only", fp(42));
        let mut matches = single.find_matches(64).unwrap();
        assert!(matches.next().is_none());
        assert_eq!(matches.pairs_examined(), 0);
    }

    #[test]
    fn test_matches_inclusive_threshold_and_order() {
        let mut corpus = Corpus::new();
        corpus.add("a", fp(0b0000));
        corpus.add("b", fp(0b0011));
        corpus.add("c", fp(0b0111));
        corpus.add("d", fp(u64::MAX));

        let found: Vec<_> = corpus
            .find_matches(2)
            .unwrap()
            .map(|m| (*m.first, *m.second, m.distance))
            .collect();

        assert_eq!(found, vec![("a", "b", 2), ("b", "c", 1)]);
    }

    #[test]
    fn test_match_sets_grow_with_threshold() {
        let corpus: Corpus<usize> = sample_fingerprints().into_iter().enumerate().collect();

        let mut previous: Vec<(usize, usize)> = Vec::new();
        for t in 0..=MAX_DISTANCE {
            let current: Vec<(usize, usize)> = corpus
                .find_matches(t)
                .unwrap()
                .map(|m| (*m.first, *m.second))
                .collect();
            for pair in &previous {
                assert!(current.contains(pair), "threshold {} lost {:?}", t, pair);
            }
            previous = current;
        }
        // Every pair matches at the maximum threshold.
        assert_eq!(previous.len(), 5 * 4 / 2);
    }

    #[test]
    fn test_duplicate_identifiers_are_compared() {
        let mut corpus = Corpus::new();
        corpus.add("same.png", fp(7));
        corpus.add("same.png", fp(7));

        let found: Vec<_> = corpus.find_matches(0).unwrap().collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].distance, 0);
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_restartable_by_reinvoking() {
        let corpus: Corpus<u8> = vec![(1, fp(1)), (2, fp(3)), (3, fp(7))].into_iter().collect();

        let first: Vec<_> = corpus.find_matches(1).unwrap().collect();
        let second: Vec<_> = corpus.find_matches(1).unwrap().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
