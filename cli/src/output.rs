use std::io::{self, Write};

use bookrank::Book;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct RankedBook<'a> {
    rank: usize,
    id: &'a str,
    title: &'a str,
    authors: &'a [String],
    thumbnail: &'a str,
    rating: f64,
    deviation: f64,
    comparisons: u32,
}

fn ranked<'a, 'b>(books: &'b [&'a Book]) -> impl Iterator<Item = RankedBook<'a>> + 'b {
    books.iter().enumerate().map(|(i, book)| RankedBook {
        rank: i + 1,
        id: book.id.as_str(),
        title: &book.title,
        authors: &book.authors,
        thumbnail: &book.thumbnail,
        rating: f64::from(book.rating.rating),
        deviation: f64::from(book.rating.deviation),
        comparisons: book.comparisons,
    })
}

/// Plain text table, best book first. `books` must already be ranked.
pub fn write_rankings<W: Write>(mut writer: W, books: &[&Book]) -> io::Result<()> {
    if books.is_empty() {
        return writeln!(writer, "No books yet. Import some with `bookrank import`.");
    }

    let title_width = books.iter().map(|book| book.title.chars().count()).max().unwrap_or(0).clamp(5, 50);

    writeln!(
        writer,
        "{:>4}  {:<title_width$}  {:>6}  {:>5}  {:>5}  authors",
        "rank", "title", "rating", "±rd", "games"
    )?;

    for book in ranked(books) {
        let title: String = book.title.chars().take(title_width).collect();
        writeln!(
            writer,
            "{:>4}  {:<title_width$}  {:>6.0}  {:>5.0}  {:>5}  {}",
            book.rank,
            title,
            book.rating,
            book.deviation,
            book.comparisons,
            book.authors.join(", ")
        )?;
    }

    Ok(())
}

pub fn write_json<W: Write>(writer: W, books: &[&Book]) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, &ranked(books).collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use bookrank::{Rating, RatingDifference, RatingScalar, RatingSystem};

    use super::*;

    fn books() -> Vec<Book> {
        let rating_system = RatingSystem::new();
        vec![
            Book::new(&rating_system, "/works/OL1W", "Dune")
                .with_authors(["Frank Herbert"])
                .with_rating(Rating {
                    rating: RatingScalar(1662.2),
                    deviation: RatingDifference(290.2),
                }),
            Book::new(&rating_system, "csv-1", "Emma"),
        ]
    }

    #[test]
    fn test_write_rankings() {
        let books = books();
        let mut out = Vec::new();
        write_rankings(&mut out, &books.iter().collect::<Vec<_>>()).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("rank  title"));
        assert_eq!(lines[1], "   1  Dune     1662    290      0  Frank Herbert");
        assert_eq!(lines[2].trim_end(), "   2  Emma     1500    350      0");
    }

    #[test]
    fn test_write_rankings_empty() {
        let mut out = Vec::new();
        write_rankings(&mut out, &[]).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("No books yet"));
    }

    #[test]
    fn test_write_json() {
        let books = books();
        let mut out = Vec::new();
        write_json(&mut out, &books.iter().collect::<Vec<_>>()).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["rank"], 1);
        assert_eq!(value[0]["id"], "/works/OL1W");
        assert_eq!(value[0]["authors"][0], "Frank Herbert");
        assert_eq!(value[1]["rating"], 1500.0);
        assert_eq!(value[1]["comparisons"], 0);
    }
}
