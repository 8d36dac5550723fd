//! The collection on disk: one JSON file.

use std::{
    fs,
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use bookrank::{Library, SeenPairs};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::goodreads::Year;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid collection file {}: {source}", path.display())]
    Json { path: PathBuf, source: serde_json::Error },
}

/// Everything that survives between runs.
#[serde_as]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Collection {
    /// Year the books were imported for, if the import was filtered.
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub year_filter: Option<Year>,
    #[serde(default)]
    pub books: Library,
    /// Pairs presented in the ranking session in progress.
    #[serde(default)]
    pub seen: SeenPairs,
}

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Store {
        Store { path: path.into() }
    }

    /// `$HOME/.local/share/bookrank/collection.json`, or `collection.json` in
    /// the working directory without a home.
    pub fn default_path() -> PathBuf {
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("bookrank")
                .join("collection.json"),
            None => PathBuf::from("collection.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// A missing file is an empty collection.
    pub fn load(&self) -> Result<Collection, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Collection::default()),
            Err(err) => return Err(self.io_error(err)),
        };

        let collection: Collection = serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), books = collection.books.len(), "loaded collection");
        Ok(collection)
    }

    /// Replaces the file atomically: the collection is written to a sibling
    /// temporary file that is then renamed over the old one.
    pub fn save(&self, collection: &Collection) -> Result<(), StoreError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
                parent
            }
            None => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir).map_err(|err| self.io_error(err))?;
        let mut writer = BufWriter::new(file.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, collection).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        writer.flush().map_err(|err| self.io_error(err))?;
        drop(writer);
        file.as_file().sync_all().map_err(|err| self.io_error(err))?;
        file.persist(&self.path).map_err(|err| self.io_error(err.error))?;
        debug!(path = %self.path.display(), books = collection.books.len(), "saved collection");
        Ok(())
    }

    /// Deletes the file. Clearing a store that was never saved is not an
    /// error.
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use bookrank::{Book, BookId, RatingSystem};

    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let collection = Store::new(dir.path().join("nothing.json")).load().unwrap();
        assert!(collection.books.is_empty());
        assert!(collection.seen.is_empty());
        assert_eq!(collection.year_filter, None);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("nested").join("collection.json"));

        let rating_system = RatingSystem::new();
        let mut collection = Collection {
            year_filter: Some("2024".parse().unwrap()),
            ..Collection::default()
        };
        collection.books.add(
            Book::new(&rating_system, "/works/OL1W", "Dune")
                .with_authors(["Frank Herbert"])
                .with_thumbnail("https://covers.openlibrary.org/b/id/1-M.jpg"),
        );
        collection.books.add(Book::new(&rating_system, "csv-1", "Emma"));
        collection.seen.insert(&BookId::from("csv-1"), &BookId::from("/works/OL1W"));

        store.save(&collection).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.year_filter, collection.year_filter);
        assert_eq!(loaded.books.books(), collection.books.books());
        assert!(loaded.seen.contains(&BookId::from("/works/OL1W"), &BookId::from("csv-1")));
    }

    #[test]
    fn test_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("collection.json"));
        fs::write(
            store.path(),
            r#"{
                "year_filter": "2023",
                "books": [{"id": "a", "title": "A", "rating": 1600.0, "deviation": 120.5, "comparisons": 3}]
            }"#,
        )
        .unwrap();

        let collection = store.load().unwrap();
        assert_eq!(collection.year_filter.map(|y| y.to_string()), Some("2023".to_owned()));
        let book = &collection.books.books()[0];
        assert_eq!(book.rating.rating.0, 1600.0);
        assert_eq!(book.rating.deviation.0, 120.5);
        assert_eq!(book.comparisons, 3);
        assert!(book.authors.is_empty());
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("collection.json"));
        fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_save_replaces_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("collection.json"));
        let rating_system = RatingSystem::new();

        let mut collection = Collection::default();
        collection.books.add(Book::new(&rating_system, "a", "A"));
        store.save(&collection).unwrap();
        collection.books.add(Book::new(&rating_system, "b", "B"));
        store.save(&collection).unwrap();

        assert_eq!(store.load().unwrap().books.len(), 2);
        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("collection.json"));
        store.clear().unwrap();
        store.save(&Collection::default()).unwrap();
        assert!(store.path().exists());
        store.clear().unwrap();
        assert!(!store.path().exists());
    }
}
