//! Rank a personal book collection through pairwise comparisons.
//!
//! Every comparison updates both books with a single-opponent
//! [Glicko](http://www.glicko.net/glicko/glicko.pdf) step. The pair to present
//! next is chosen by [`pick_pair`]: the least certain book first, against the
//! closest-rated book it has not met yet.
//!
//! ```
//! use bookrank::{Book, Library, RankingSession, RatingSystem, StopPolicy};
//!
//! let rating_system = RatingSystem::new();
//! let library = Library::from_books([
//!     Book::new(&rating_system, "dune", "Dune"),
//!     Book::new(&rating_system, "emma", "Emma"),
//!     Book::new(&rating_system, "ulysses", "Ulysses"),
//! ]);
//!
//! let mut session = RankingSession::new(library, rating_system, StopPolicy::default());
//! while let Some(matchup) = session.next_matchup() {
//!     // Ask the reader. Here the first book always wins.
//!     session.record(&matchup.first.id, &matchup.second.id).unwrap();
//! }
//!
//! for (i, book) in session.rankings().iter().enumerate() {
//!     println!("{}. {} ({:.0})", i + 1, book.title, book.rating.rating.0);
//! }
//! ```

mod book;
mod library;
mod pairing;
mod rating;
mod rating_system;
mod score;
mod session;

pub use book::{Book, BookId};
pub use library::Library;
pub use pairing::{max_pairs, pair_key, pick_pair, PairKey, SeenPairs};
pub use rating::{Rating, RatingDifference, RatingScalar};
pub use rating_system::{update, RatingSystem, RatingSystemBuilder, Q};
pub use score::Score;
pub use session::{Matchup, RankingSession, SessionError, StopPolicy};
