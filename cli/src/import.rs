//! Turning Goodreads rows into books, with metadata from a [`BookSearch`].

use bookrank::{Book, RatingSystem};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    goodreads::GoodreadsEntry,
    normalize::{entry_key, Normalizer},
    openlibrary::{doc_to_book, BookSearch, SearchDoc, SearchQuery, PLACEHOLDER_COVER},
};

/// How a row was matched to a search result.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MatchTier {
    /// Exactly one result matched both title and author.
    Strict,
    /// Exactly one result matched the author.
    AuthorOnly,
    /// A title-only search returned exactly one result.
    TitleOnly,
    /// Nothing reliable was found; the book was built from the row itself.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub book: Book,
    pub tier: MatchTier,
}

pub struct Resolver<'a, S: ?Sized> {
    search: &'a S,
    normalizer: Normalizer,
    rating_system: RatingSystem,
    placeholder: String,
}

fn single<T>(mut items: Vec<T>) -> Option<T> {
    if items.len() == 1 {
        items.pop()
    } else {
        None
    }
}

impl<'a, S: BookSearch + ?Sized> Resolver<'a, S> {
    pub fn new(search: &'a S, normalizer: Normalizer, rating_system: RatingSystem) -> Resolver<'a, S> {
        Resolver {
            search,
            normalizer,
            rating_system,
            placeholder: PLACEHOLDER_COVER.to_owned(),
        }
    }

    /// Cover used for matched books without one, and for fallback books.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    fn author_matches(&self, doc: &SearchDoc, author: &str) -> bool {
        doc.author_name
            .iter()
            .any(|name| self.normalizer.author(name).contains(author))
    }

    fn matched(&self, doc: &SearchDoc, tier: MatchTier) -> Option<Resolved> {
        doc_to_book(doc, &self.rating_system, &self.placeholder).map(|book| Resolved { book, tier })
    }

    fn fallback(&self, entry: &GoodreadsEntry) -> Resolved {
        let mut book = Book::new(
            &self.rating_system,
            format!("csv-{}", Uuid::now_v7()),
            entry.title.trim(),
        )
        .with_thumbnail(self.placeholder.as_str());
        if let Some(author) = entry.author.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            book = book.with_authors([author]);
        }
        Resolved {
            book,
            tier: MatchTier::Fallback,
        }
    }

    /// Finds the book described by `entry`. Each tier is only used when it
    /// yields exactly one candidate. Lookup failures are logged and end in
    /// the fallback book; they are never returned.
    pub fn resolve(&self, entry: &GoodreadsEntry) -> Resolved {
        let title = self.normalizer.title(&entry.title);
        let author = self.normalizer.author(entry.author.as_deref().unwrap_or_default());

        let query = SearchQuery::Free(format!("{} {}", title, entry.author.as_deref().unwrap_or_default()));
        let docs = match self.search.search(&query) {
            Ok(docs) => docs,
            Err(err) => {
                warn!(title = %entry.title, %err, "book search failed, using csv data");
                return self.fallback(entry);
            }
        };

        let strict = single(
            docs.iter()
                .filter(|doc| {
                    doc.title
                        .as_deref()
                        .is_some_and(|t| self.normalizer.title(t).contains(&title))
                        && self.author_matches(doc, &author)
                })
                .collect(),
        );
        if let Some(resolved) = strict.and_then(|doc| self.matched(doc, MatchTier::Strict)) {
            debug!(title = %entry.title, id = %resolved.book.id, "strict match");
            return resolved;
        }

        let author_only = single(docs.iter().filter(|doc| self.author_matches(doc, &author)).collect());
        if let Some(resolved) = author_only.and_then(|doc| self.matched(doc, MatchTier::AuthorOnly)) {
            warn!(
                csv = %entry.title,
                author = entry.author.as_deref().unwrap_or_default(),
                matched = %resolved.book.title,
                "author-only match"
            );
            return resolved;
        }

        match self.search.search(&SearchQuery::Title(title)) {
            Ok(docs) => {
                if let Some(resolved) = single(docs).and_then(|doc| self.matched(&doc, MatchTier::TitleOnly)) {
                    warn!(csv = %entry.title, matched = %resolved.book.title, "title-only match");
                    return resolved;
                }
            }
            Err(err) => warn!(title = %entry.title, %err, "title search failed"),
        }

        warn!(
            csv = %entry.title,
            author = entry.author.as_deref().unwrap_or_default(),
            "no reliable match, using csv data"
        );
        self.fallback(entry)
    }

    /// Resolves every entry, skipping rows that repeat an earlier title and
    /// first author. `progress` is called after each row with the number of
    /// rows handled so far.
    pub fn resolve_all(&self, entries: &[GoodreadsEntry], mut progress: impl FnMut(usize)) -> Vec<Resolved> {
        let mut seen = FxHashSet::default();
        let mut resolved = Vec::new();

        for (i, entry) in entries.iter().enumerate() {
            if seen.insert(entry_key(&entry.title, entry.author.as_deref())) {
                resolved.push(self.resolve(entry));
            } else {
                debug!(title = %entry.title, "skipping duplicate row");
            }
            progress(i + 1);
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::VecDeque};

    use super::*;
    use crate::openlibrary::LookupError;

    /// Answers queries from a script, in order. Runs out into empty results.
    #[derive(Default)]
    struct Scripted {
        answers: RefCell<VecDeque<Result<Vec<SearchDoc>, LookupError>>>,
        queries: RefCell<Vec<SearchQuery>>,
    }

    impl Scripted {
        fn then(self, docs: Vec<SearchDoc>) -> Scripted {
            self.answers.borrow_mut().push_back(Ok(docs));
            self
        }
    }

    impl BookSearch for Scripted {
        fn search(&self, query: &SearchQuery) -> Result<Vec<SearchDoc>, LookupError> {
            self.queries.borrow_mut().push(query.clone());
            self.answers.borrow_mut().pop_front().unwrap_or(Ok(Vec::new()))
        }
    }

    /// Fails every request.
    struct Offline;

    impl BookSearch for Offline {
        fn search(&self, _query: &SearchQuery) -> Result<Vec<SearchDoc>, LookupError> {
            let err = reqwest::blocking::Client::new()
                .get("not a url")
                .send()
                .expect_err("relative url cannot be sent");
            Err(LookupError::Http(err))
        }
    }

    fn doc(key: &str, title: &str, authors: &[&str], cover: Option<u64>) -> SearchDoc {
        SearchDoc {
            key: Some(key.to_owned()),
            title: Some(title.to_owned()),
            author_name: authors.iter().map(|a| a.to_string()).collect(),
            cover_i: cover,
        }
    }

    fn entry(title: &str, author: &str) -> GoodreadsEntry {
        GoodreadsEntry {
            title: title.to_owned(),
            author: Some(author.to_owned()),
            date_read: Some("2025/01/01".to_owned()),
            shelf: Some("read".to_owned()),
        }
    }

    fn resolver<S: BookSearch>(search: &S) -> Resolver<'_, S> {
        Resolver::new(search, Normalizer::default(), RatingSystem::new())
    }

    #[test]
    fn test_strict_match() {
        let search = Scripted::default().then(vec![doc("/works/OL1W", "The Hobbit", &["J. R. R. Tolkien"], Some(123))]);
        let resolved = resolver(&search).resolve(&entry("The Hobbit", "Tolkien"));

        assert_eq!(resolved.tier, MatchTier::Strict);
        assert_eq!(resolved.book.id.as_str(), "/works/OL1W");
        assert_eq!(resolved.book.title, "The Hobbit");
        assert_eq!(resolved.book.authors, ["J. R. R. Tolkien"]);
        assert_eq!(resolved.book.thumbnail, "https://covers.openlibrary.org/b/id/123-M.jpg");
        assert_eq!(resolved.book.rating, RatingSystem::new().new_rating());
        assert_eq!(*search.queries.borrow(), [SearchQuery::Free("the hobbit Tolkien".to_owned())]);
    }

    #[test]
    fn test_strict_match_ignores_subtitles() {
        let search = Scripted::default().then(vec![doc(
            "/works/OL5W",
            "The Hobbit (Illustrated Edition) — Deluxe",
            &["J.R.R. Tolkien"],
            None,
        )]);
        let resolved = resolver(&search).resolve(&entry("The Hobbit: Illustrated", "Tolkien"));
        assert_eq!(resolved.tier, MatchTier::Strict);
        assert_eq!(resolved.book.id.as_str(), "/works/OL5W");
        assert_eq!(resolved.book.thumbnail, PLACEHOLDER_COVER);
    }

    #[test]
    fn test_author_only_match() {
        let search = Scripted::default().then(vec![doc("/works/OL2W", "Some Other Book", &["Agatha Christie"], None)]);
        let resolved = resolver(&search).resolve(&entry("Unknown Title", "Christie"));
        assert_eq!(resolved.tier, MatchTier::AuthorOnly);
        assert_eq!(resolved.book.id.as_str(), "/works/OL2W");
        assert_eq!(search.queries.borrow().len(), 1);
    }

    #[test]
    fn test_ambiguous_strict_falls_through_to_title_search() {
        let search = Scripted::default()
            .then(vec![
                doc("/works/OL3W", "Dune", &["Frank Herbert"], None),
                doc("/works/OL9W", "Dune Messiah", &["Frank Herbert"], None),
            ])
            .then(vec![doc("/works/OL3W", "Dune", &["Frank Herbert"], Some(7))]);

        let resolved = resolver(&search).resolve(&entry("Dune", "Herbert"));
        assert_eq!(resolved.tier, MatchTier::TitleOnly);
        assert_eq!(resolved.book.id.as_str(), "/works/OL3W");
        assert_eq!(search.queries.borrow()[1], SearchQuery::Title("dune".to_owned()));
    }

    #[test]
    fn test_title_only_match_after_empty_search() {
        let search = Scripted::default()
            .then(Vec::new())
            .then(vec![doc("/works/OL3W", "Dune", &["Frank Herbert"], None)]);
        let resolved = resolver(&search).resolve(&entry("Dune", "Herbert"));
        assert_eq!(resolved.tier, MatchTier::TitleOnly);
        assert_eq!(resolved.book.title, "Dune");
    }

    #[test_log::test]
    fn test_fallback() {
        let search = Scripted::default().then(Vec::new()).then(Vec::new());
        let resolved = resolver(&search).resolve(&entry(" Unknown Book ", "Unknown Author"));
        assert_eq!(resolved.tier, MatchTier::Fallback);
        assert!(resolved.book.id.as_str().starts_with("csv-"));
        assert_eq!(resolved.book.title, "Unknown Book");
        assert_eq!(resolved.book.authors, ["Unknown Author"]);
        assert_eq!(resolved.book.thumbnail, PLACEHOLDER_COVER);
    }

    #[test]
    fn test_fallback_without_author() {
        let search = Scripted::default();
        let mut row = entry("Anonymous Poems", "");
        row.author = None;
        let resolved = resolver(&search).resolve(&row);
        assert_eq!(resolved.tier, MatchTier::Fallback);
        assert!(resolved.book.authors.is_empty());
    }

    #[test_log::test]
    fn test_lookup_failure_falls_back() {
        let resolved = resolver(&Offline).resolve(&entry("Dune", "Frank Herbert"));
        assert_eq!(resolved.tier, MatchTier::Fallback);
        assert_eq!(resolved.book.title, "Dune");
    }

    #[test]
    fn test_fallback_ids_are_unique() {
        let a = resolver(&Scripted::default()).resolve(&entry("A", "X"));
        let b = resolver(&Scripted::default()).resolve(&entry("A", "X"));
        assert_ne!(a.book.id, b.book.id);
    }

    #[test]
    fn test_resolve_all_skips_duplicates() {
        let search = Scripted::default();
        let entries = [
            entry("Dune", "Frank Herbert"),
            entry("Dune (Deluxe Edition)", "Frank Herbert, Brian Herbert"),
            entry("Emma", "Jane Austen"),
        ];
        let mut handled = Vec::new();
        let resolved = resolver(&search)
            .placeholder("")
            .resolve_all(&entries, |n| handled.push(n));

        assert_eq!(resolved.len(), 2);
        assert_eq!(handled, [1, 2, 3]);
        assert_eq!(resolved[1].book.title, "Emma");
        assert_eq!(resolved[1].book.thumbnail, "");
    }
}
