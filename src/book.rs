use std::{borrow::Borrow, fmt};

use crate::{Rating, RatingSystem};

/// Opaque identifier of a book, unique within a collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BookId(Box<str>);

impl BookId {
    pub fn new(id: impl Into<Box<str>>) -> BookId {
        BookId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BookId {
    fn from(id: &str) -> BookId {
        BookId::new(id)
    }
}

impl From<String> for BookId {
    fn from(id: String) -> BookId {
        BookId::new(id)
    }
}

impl Borrow<str> for BookId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A book of the collection together with its ranking state.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Book {
    pub id: BookId,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub authors: Vec<String>,
    /// Cover image URL. May be empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub thumbnail: String,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub rating: Rating,
    /// Number of completed comparisons involving this book.
    #[cfg_attr(feature = "serde", serde(default))]
    pub comparisons: u32,
}

impl Book {
    /// A book that has not been compared yet.
    pub fn new(rating_system: &RatingSystem, id: impl Into<BookId>, title: impl Into<String>) -> Book {
        Book {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            thumbnail: String::new(),
            rating: rating_system.new_rating(),
            comparisons: 0,
        }
    }

    #[must_use]
    pub fn with_authors<I, S>(mut self, authors: I) -> Book
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Book {
        self.thumbnail = thumbnail.into();
        self
    }

    #[must_use]
    pub fn with_rating(mut self, rating: Rating) -> Book {
        self.rating = rating;
        self
    }
}
