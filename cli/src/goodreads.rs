//! Goodreads library export (`goodreads_library_export.csv`).

use std::{fmt, io, str::FromStr};

use serde::Deserialize;
use serde_with::{serde_as, NoneAsEmptyString};
use thiserror::Error;
use tracing::debug;

/// Goodreads writes this instead of leaving the column empty.
const DATE_NOT_SET: &str = "not set";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
#[error("invalid year {0:?}, expected four digits")]
pub struct InvalidYear(String);

/// A calendar year used to filter books by the date they were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Year(String);

impl FromStr for Year {
    type Err = InvalidYear;

    fn from_str(s: &str) -> Result<Year, InvalidYear> {
        if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Year(s.to_owned()))
        } else {
            Err(InvalidYear(s.to_owned()))
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Year {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[serde_as]
#[derive(Deserialize, Debug)]
struct RawRow {
    #[serde(rename = "Title", default)]
    #[serde_as(as = "NoneAsEmptyString")]
    title: Option<String>,
    #[serde(rename = "Author", default)]
    #[serde_as(as = "NoneAsEmptyString")]
    author: Option<String>,
    #[serde(rename = "Date Read", default)]
    #[serde_as(as = "NoneAsEmptyString")]
    date_read: Option<String>,
    #[serde(rename = "Bookshelves", default)]
    #[serde_as(as = "NoneAsEmptyString")]
    shelf: Option<String>,
}

/// A row of the export that describes a book the user has read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoodreadsEntry {
    pub title: String,
    pub author: Option<String>,
    pub date_read: Option<String>,
    pub shelf: Option<String>,
}

impl GoodreadsEntry {
    fn has_date_read(&self) -> bool {
        self.date_read.as_deref().is_some_and(|date| date != DATE_NOT_SET)
    }

    /// With a year, only books read in that year qualify. Without one, any
    /// book with a read date or on the `read` shelf qualifies.
    pub fn is_read(&self, year: Option<&Year>) -> bool {
        match year {
            Some(year) => {
                self.has_date_read()
                    && self
                        .date_read
                        .as_deref()
                        .is_some_and(|date| date.starts_with(year.as_str()))
            }
            None => self.has_date_read() || self.shelf.as_deref() == Some("read"),
        }
    }
}

/// Parses an export and keeps the rows describing read books. Values are
/// trimmed and columns other than title, author, date read and shelves are
/// ignored.
pub fn read_entries<R: io::Read>(reader: R, year: Option<&Year>) -> Result<Vec<GoodreadsEntry>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    let mut rows = 0;

    for row in reader.deserialize() {
        let row: RawRow = row?;
        rows += 1;

        let Some(title) = row.title else {
            continue;
        };

        let entry = GoodreadsEntry {
            title,
            author: row.author,
            date_read: row.date_read,
            shelf: row.shelf,
        };

        if entry.is_read(year) {
            entries.push(entry);
        }
    }

    debug!(rows, kept = entries.len(), ?year, "parsed goodreads export");
    Ok(entries)
}
