//! Text normalisation used to compare titles and authors from different
//! sources.

use std::sync::LazyLock;

use regex::Regex;

static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(.*?\)").expect("valid regex"));
static DASH_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*[—–-].*$").expect("valid regex"));
static COLON_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*:.*$").expect("valid regex"));

fn strip_subtitles(title: &str) -> String {
    let stripped = PARENTHESIZED.replace_all(title, "");
    let stripped = DASH_SUFFIX.replace(&stripped, "");
    COLON_SUFFIX.replace(&stripped, "").into_owned()
}

/// Letters kept in addition to ASCII.
pub const DEFAULT_EXTRA_LETTERS: &str = "çğıöşü";

/// Which non-ASCII letters survive normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Letters {
    /// ASCII plus the listed characters (compared after lowercasing).
    Allowlist(Vec<char>),
    /// Every alphabetic Unicode character.
    Unicode,
}

impl Default for Letters {
    fn default() -> Letters {
        Letters::Allowlist(DEFAULT_EXTRA_LETTERS.chars().collect())
    }
}

impl Letters {
    fn is_extra_letter(&self, c: char) -> bool {
        match self {
            Letters::Allowlist(extra) => extra.contains(&c),
            Letters::Unicode => c.is_alphabetic(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    letters: Letters,
}

impl Normalizer {
    pub fn new(letters: Letters) -> Normalizer {
        Normalizer { letters }
    }

    /// Lowercases, drops parenthesized parts, subtitles after a dash or a
    /// colon, and punctuation.
    pub fn title(&self, title: &str) -> String {
        self.keep(&strip_subtitles(&title.to_lowercase()), |c| c.is_ascii_alphanumeric())
    }

    /// Lowercases and keeps letters and whitespace only.
    pub fn author(&self, author: &str) -> String {
        self.keep(&author.to_lowercase(), |c| c.is_ascii_alphabetic())
    }

    fn keep(&self, s: &str, ascii: impl Fn(char) -> bool) -> String {
        s.chars()
            .filter(|&c| ascii(c) || c.is_whitespace() || self.letters.is_extra_letter(c))
            .collect::<String>()
            .trim()
            .to_owned()
    }
}

/// Key under which two Goodreads rows count as the same book: the title
/// without subtitles plus the first listed author.
pub fn entry_key(title: &str, author: Option<&str>) -> String {
    let author = author
        .and_then(|author| author.split(',').next())
        .map(|author| author.trim().to_lowercase())
        .unwrap_or_default();
    format!("{}-{}", strip_subtitles(&title.to_lowercase()).trim(), author)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.title("The Hobbit (Illustrated Edition) — Deluxe"), "the hobbit");
        assert_eq!(normalizer.title("The Hobbit: Illustrated"), "the hobbit");
        assert_eq!(normalizer.title("Catch-22"), "catch");
        assert_eq!(normalizer.title("1984 (Signet Classics)"), "1984");
        assert_eq!(normalizer.title("Don't Panic!"), "dont panic");
        assert_eq!(normalizer.title("  Kürk Mantolu Madonna "), "kürk mantolu madonna");
    }

    #[test]
    fn test_author() {
        let normalizer = Normalizer::default();
        assert_eq!(normalizer.author("J.R.R. Tolkien"), "jrr tolkien");
        assert_eq!(normalizer.author("Sabahattin Ali"), "sabahattin ali");
        assert_eq!(normalizer.author("Orhan Pamuk 2"), "orhan pamuk");
    }

    #[test]
    fn test_letter_sets() {
        let ascii = Normalizer::new(Letters::Allowlist(Vec::new()));
        assert_eq!(ascii.author("Émile Zola"), "mile zola");

        let unicode = Normalizer::new(Letters::Unicode);
        assert_eq!(unicode.author("Émile Zola"), "émile zola");
        assert_eq!(unicode.title("Война и мир"), "война и мир");
    }

    #[test]
    fn test_entry_key() {
        assert_eq!(
            entry_key("Dune (Dune Chronicles, #1)", Some("Frank Herbert, Brian Herbert")),
            "dune-frank herbert"
        );
        assert_eq!(entry_key("Dune: Deluxe", None), "dune-");
    }
}
