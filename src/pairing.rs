//! Choosing the next two books to compare.
//!
//! The book with the least certain rating goes first, against the opponent
//! closest to it in rating that it has not met yet.

use std::{cmp::Reverse, fmt};

use ordered_float::OrderedFloat;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::{Book, BookId};

/// Order-independent key of an unordered pair of books.
///
/// The two ids are kept sorted, so `PairKey::new(a, b) == PairKey::new(b, a)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairKey {
    low: BookId,
    high: BookId,
}

impl PairKey {
    pub fn new(a: &BookId, b: &BookId) -> PairKey {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        PairKey {
            low: low.clone(),
            high: high.clone(),
        }
    }

    pub fn ids(&self) -> (&BookId, &BookId) {
        (&self.low, &self.high)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}|{}", self.low, self.high)
    }
}

pub fn pair_key(a: &BookId, b: &BookId) -> PairKey {
    PairKey::new(a, b)
}

/// Pairs already presented during the current session. Only grows until the
/// session is reset.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SeenPairs {
    inner: FxHashSet<PairKey>,
}

impl SeenPairs {
    pub fn new() -> SeenPairs {
        SeenPairs::default()
    }

    /// Returns `false` if the pair was already seen.
    pub fn insert(&mut self, a: &BookId, b: &BookId) -> bool {
        self.inner.insert(PairKey::new(a, b))
    }

    pub fn contains(&self, a: &BookId, b: &BookId) -> bool {
        self.contains_key(&PairKey::new(a, b))
    }

    pub fn contains_key(&self, key: &PairKey) -> bool {
        self.inner.contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl Extend<PairKey> for SeenPairs {
    fn extend<T: IntoIterator<Item = PairKey>>(&mut self, iter: T) {
        self.inner.extend(iter);
    }
}

/// Number of distinct pairs among `num_books` books.
pub fn max_pairs(num_books: usize) -> usize {
    num_books * num_books.saturating_sub(1) / 2
}

/// Picks the next pair to compare, or `None` when every pair has been seen.
///
/// Candidates are tried by deviation, highest first. Each candidate is
/// matched against the other books by rating distance, closest first, and the
/// first pair not in `seen` is returned. Both sorts are stable, so ties keep
/// the order of `books`.
pub fn pick_pair<'a>(books: &'a [Book], seen: &SeenPairs) -> Option<(&'a Book, &'a Book)> {
    let mut by_deviation: Vec<&Book> = books.iter().collect();
    by_deviation.sort_by_key(|book| Reverse(OrderedFloat(book.rating.deviation.0)));

    for a in by_deviation {
        let mut opponents: Vec<&Book> = books.iter().filter(|b| b.id != a.id).collect();
        opponents.sort_by_key(|b| OrderedFloat((b.rating.rating - a.rating.rating).abs().0));

        if let Some(b) = opponents.into_iter().find(|b| !seen.contains(&a.id, &b.id)) {
            debug!(first = %a.id, second = %b.id, "picked pair");
            return Some((a, b));
        }
    }

    debug!(books = books.len(), seen = seen.len(), "all pairs exhausted");
    None
}
