use thiserror::Error;
use tracing::{debug, info};

use crate::{pick_pair, Book, BookId, Library, RatingSystem, SeenPairs};

/// When a ranking session is considered done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPolicy {
    /// The session is complete once every book took part in at least this
    /// many comparisons.
    pub comparisons_per_book: u32,
}

impl Default for StopPolicy {
    fn default() -> StopPolicy {
        StopPolicy {
            comparisons_per_book: 12,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown book: {0}")]
    UnknownBook(BookId),
    #[error("cannot compare {0} with itself")]
    SameBook(BookId),
    #[error("pair {0}|{1} was already compared")]
    AlreadySeen(BookId, BookId),
}

/// Two books to present to the reader.
#[derive(Debug, Clone, PartialEq)]
pub struct Matchup {
    pub first: Book,
    pub second: Book,
}

/// A quiz over one collection: owns the books and the pairs presented so far.
#[derive(Debug, Clone)]
pub struct RankingSession {
    library: Library,
    seen: SeenPairs,
    rating_system: RatingSystem,
    policy: StopPolicy,
    completed: usize,
}

impl RankingSession {
    pub fn new(library: Library, rating_system: RatingSystem, policy: StopPolicy) -> RankingSession {
        RankingSession {
            library,
            seen: SeenPairs::new(),
            rating_system,
            policy,
            completed: 0,
        }
    }

    /// Continues a session in which the pairs in `seen` were already
    /// presented.
    #[must_use]
    pub fn with_seen(mut self, seen: SeenPairs) -> RankingSession {
        self.seen = seen;
        self
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn into_library(self) -> Library {
        self.library
    }

    pub fn seen(&self) -> &SeenPairs {
        &self.seen
    }

    pub fn policy(&self) -> StopPolicy {
        self.policy
    }

    /// Comparisons recorded since the session started (skips excluded).
    pub fn completed_comparisons(&self) -> usize {
        self.completed
    }

    /// Comparisons recorded since the ratings were last fresh, across
    /// resumed sessions.
    pub fn total_comparisons(&self) -> usize {
        self.library
            .books()
            .iter()
            .map(|book| book.comparisons as usize)
            .sum::<usize>()
            / 2
    }

    fn threshold_reached(&self) -> bool {
        self.library
            .books()
            .iter()
            .all(|book| book.comparisons >= self.policy.comparisons_per_book)
    }

    pub fn is_complete(&self) -> bool {
        self.library.len() < 2
            || self.threshold_reached()
            || pick_pair(self.library.books(), &self.seen).is_none()
    }

    /// The next pair to present, or `None` once the session is complete.
    pub fn next_matchup(&self) -> Option<Matchup> {
        if self.library.len() < 2 || self.threshold_reached() {
            return None;
        }
        pick_pair(self.library.books(), &self.seen).map(|(first, second)| Matchup {
            first: first.clone(),
            second: second.clone(),
        })
    }

    fn check_pair(&self, a: &BookId, b: &BookId) -> Result<(usize, usize), SessionError> {
        if a == b {
            return Err(SessionError::SameBook(a.clone()));
        }
        let position = |id: &BookId| {
            self.library
                .books()
                .iter()
                .position(|book| book.id == *id)
                .ok_or_else(|| SessionError::UnknownBook(id.clone()))
        };
        let indices = (position(a)?, position(b)?);
        if self.seen.contains(a, b) {
            return Err(SessionError::AlreadySeen(a.clone(), b.clone()));
        }
        Ok(indices)
    }

    /// Records that the reader preferred `winner` over `loser`.
    ///
    /// Both books are updated from their ratings before this comparison.
    /// Nothing changes if an error is returned.
    pub fn record(&mut self, winner: &BookId, loser: &BookId) -> Result<(), SessionError> {
        let (w, l) = self.check_pair(winner, loser)?;

        let books = self.library.books_mut();
        let (winner_rating, loser_rating) = self
            .rating_system
            .update_ratings(&books[w].rating, &books[l].rating);

        books[w].rating = winner_rating;
        books[w].comparisons += 1;
        books[l].rating = loser_rating;
        books[l].comparisons += 1;

        self.seen.insert(winner, loser);
        self.completed += 1;

        debug!(
            %winner,
            %loser,
            winner_rating = winner_rating.rating.0,
            loser_rating = loser_rating.rating.0,
            "comparison recorded"
        );
        Ok(())
    }

    /// Marks the pair as seen without changing any rating.
    pub fn skip(&mut self, a: &BookId, b: &BookId) -> Result<(), SessionError> {
        self.check_pair(a, b)?;
        self.seen.insert(a, b);
        debug!(%a, %b, "pair skipped");
        Ok(())
    }

    /// Starts over: forgets the presented pairs and restores every book to
    /// its initial rating.
    pub fn reset(&mut self) {
        let fresh = self.rating_system.new_rating();
        for book in self.library.books_mut() {
            book.rating = fresh;
            book.comparisons = 0;
        }
        self.seen.clear();
        self.completed = 0;
        info!(books = self.library.len(), "session reset");
    }

    /// Books sorted by rating, best first.
    pub fn rankings(&self) -> Vec<&Book> {
        self.library.ranked()
    }

    pub fn top(&self, n: usize) -> Vec<&Book> {
        let mut ranked = self.rankings();
        ranked.truncate(n);
        ranked
    }
}
