//! Book metadata lookup against the [Open Library search API](https://openlibrary.org/dev/docs/api/search).

use std::time::Duration;

use bookrank::{Book, RatingSystem};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://openlibrary.org";

/// Shown for matched books that have no cover of their own.
pub const PLACEHOLDER_COVER: &str = "https://covers.openlibrary.org/b/id/10909258-M.jpg";

/// Free-text searches return at most this many books.
pub const MAX_SEARCH_RESULTS: usize = 20;

const UNTITLED: &str = "Untitled";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("book search request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("book search returned {0}")]
    Status(reqwest::StatusCode),
}

/// One document of a search response. Everything but the key may be absent.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SearchDoc {
    pub key: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub author_name: Vec<String>,
    pub cover_i: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub docs: Vec<SearchDoc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// Matches title, author and other fields.
    Free(String),
    /// Matches titles only.
    Title(String),
}

/// Something that finds book metadata for a query.
pub trait BookSearch {
    fn search(&self, query: &SearchQuery) -> Result<Vec<SearchDoc>, LookupError>;
}

pub fn cover_url(cover_id: u64) -> String {
    format!("https://covers.openlibrary.org/b/id/{cover_id}-M.jpg")
}

/// Turns a search document into an unranked book. `placeholder` becomes the
/// thumbnail if the document has no cover. Documents without a key have no
/// stable id and yield `None`.
pub fn doc_to_book(doc: &SearchDoc, rating_system: &RatingSystem, placeholder: &str) -> Option<Book> {
    let key = doc.key.as_deref()?;
    let thumbnail = doc.cover_i.map_or_else(|| placeholder.to_owned(), cover_url);
    Some(
        Book::new(rating_system, key, doc.title.as_deref().unwrap_or(UNTITLED))
            .with_authors(doc.author_name.iter().cloned())
            .with_thumbnail(thumbnail),
    )
}

/// Free-text search for books to add by hand. An empty query returns nothing
/// without asking `search`.
pub fn search_books<S: BookSearch + ?Sized>(
    search: &S,
    query: &str,
    rating_system: &RatingSystem,
) -> Result<Vec<Book>, LookupError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    Ok(search
        .search(&SearchQuery::Free(query.to_owned()))?
        .iter()
        .take(MAX_SEARCH_RESULTS)
        .filter_map(|doc| doc_to_book(doc, rating_system, ""))
        .collect())
}

/// Blocking client for the Open Library search endpoint.
pub struct OpenLibrary {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl OpenLibrary {
    pub fn new(endpoint: impl Into<String>) -> Result<OpenLibrary, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("bookrank/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(OpenLibrary {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_owned(),
        })
    }
}

impl BookSearch for OpenLibrary {
    fn search(&self, query: &SearchQuery) -> Result<Vec<SearchDoc>, LookupError> {
        let params = match query {
            SearchQuery::Free(q) => [("q", q.as_str())],
            SearchQuery::Title(title) => [("title", title.as_str())],
        };

        debug!(?query, "searching open library");

        let response = self
            .client
            .get(format!("{}/search.json", self.endpoint))
            .query(&params)
            .send()?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status()));
        }

        let response: SearchResponse = response.json()?;
        Ok(response.docs)
    }
}
