use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashSet;

use crate::{Book, BookId};

/// In-memory book collection, kept in insertion order.
///
/// Ids are unique: adding a book whose id is already present is a no-op.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Library {
    books: Vec<Book>,
}

impl Library {
    pub fn new() -> Library {
        Library::default()
    }

    /// Builds a library, dropping books whose id was seen before.
    pub fn from_books(books: impl IntoIterator<Item = Book>) -> Library {
        let mut library = Library::new();
        library.extend(books);
        library
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: &BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == *id)
    }

    pub fn contains(&self, id: &BookId) -> bool {
        self.get(id).is_some()
    }

    /// Returns `false` if a book with the same id is already present.
    pub fn add(&mut self, book: Book) -> bool {
        if self.contains(&book.id) {
            return false;
        }
        self.books.push(book);
        true
    }

    /// Merges `books` into the library, skipping ids that are already present
    /// (including repeats within `books`). Returns the number of books added.
    pub fn extend(&mut self, books: impl IntoIterator<Item = Book>) -> usize {
        let mut ids: FxHashSet<BookId> = self.books.iter().map(|book| book.id.clone()).collect();
        let before = self.books.len();
        for book in books {
            if ids.insert(book.id.clone()) {
                self.books.push(book);
            }
        }
        self.books.len() - before
    }

    /// Replaces the book with the same id. Returns `false` if there is none.
    pub fn update(&mut self, book: Book) -> bool {
        match self.books.iter_mut().find(|b| b.id == book.id) {
            Some(slot) => {
                *slot = book;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &BookId) -> Option<Book> {
        let index = self.books.iter().position(|book| book.id == *id)?;
        Some(self.books.remove(index))
    }

    pub fn clear(&mut self) {
        self.books.clear();
    }

    pub(crate) fn books_mut(&mut self) -> &mut [Book] {
        &mut self.books
    }

    /// Books sorted by rating, best first. Equal ratings keep insertion order.
    pub fn ranked(&self) -> Vec<&Book> {
        let mut ranked: Vec<&Book> = self.books.iter().collect();
        ranked.sort_by_key(|book| Reverse(OrderedFloat(book.rating.rating.0)));
        ranked
    }
}

impl From<Vec<Book>> for Library {
    fn from(books: Vec<Book>) -> Library {
        Library::from_books(books)
    }
}
