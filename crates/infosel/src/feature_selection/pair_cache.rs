use std::collections::HashMap;

/// Pairwise criterion terms computed during one selection run.
///
/// Keys are unordered feature pairs. Entries are written once, when a
/// candidate is first scored against a newly selected feature, and are never
/// invalidated while the run lasts; the cache is dropped with the run.
#[derive(Debug, Default)]
pub struct PairTermCache {
    terms: HashMap<(usize, usize), f64>,
}

impl PairTermCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn key(a: usize, b: usize) -> (usize, usize) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn get(&self, a: usize, b: usize) -> Option<f64> {
        self.terms.get(&Self::key(a, b)).copied()
    }

    pub fn contains(&self, a: usize, b: usize) -> bool {
        self.terms.contains_key(&Self::key(a, b))
    }

    /// Store a term unless the pair is already known. Returns whether the
    /// term was new.
    pub fn insert(&mut self, a: usize, b: usize, term: f64) -> bool {
        match self.terms.entry(Self::key(a, b)) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(term);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
