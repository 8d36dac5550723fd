//! Config file loading and creation.
//!
//! The config lives at `~/.config/bookrank/config.toml`. Every field is
//! optional and command line flags take precedence.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use bookrank::StopPolicy;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use thiserror::Error;

use crate::{
    goodreads::Year,
    normalize::{Letters, Normalizer, DEFAULT_EXTRA_LETTERS},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("HOME environment variable not set")]
    NoHome,
    #[error("failed to access config at {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("config file already exists at {}", .0.display())]
    AlreadyExists(PathBuf),
}

#[serde_as]
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub store: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub comparisons_per_book: Option<u32>,
    pub placeholder_cover: Option<String>,
    pub extra_letters: Option<String>,
    pub unicode_letters: Option<bool>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub year: Option<Year>,
}

impl Config {
    pub fn normalizer(&self) -> Normalizer {
        if self.unicode_letters == Some(true) {
            Normalizer::new(Letters::Unicode)
        } else {
            let extra = self.extra_letters.as_deref().unwrap_or(DEFAULT_EXTRA_LETTERS);
            Normalizer::new(Letters::Allowlist(extra.to_lowercase().chars().collect()))
        }
    }

    pub fn stop_policy(&self) -> StopPolicy {
        self.comparisons_per_book
            .map_or_else(StopPolicy::default, |comparisons_per_book| StopPolicy {
                comparisons_per_book,
            })
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# bookrank configuration
# All values here can be overridden by command line flags.

# Where the collection is kept
# store = \"/home/me/.local/share/bookrank/collection.json\"

# Open Library instance used to look up books
# endpoint = \"https://openlibrary.org\"

# A ranking session is done once every book was compared this often
# comparisons_per_book = 12

# Cover shown for matched books without one
# placeholder_cover = \"https://covers.openlibrary.org/b/id/10909258-M.jpg\"

# Letters kept besides ASCII when matching titles and authors
# extra_letters = \"çğıöşü\"

# Keep every Unicode letter instead (overrides extra_letters)
# unicode_letters = false

# Only import books read in this year
# year = \"2025\"
";

/// `~/.config/bookrank/config.toml`
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::NoHome)?;
    Ok(PathBuf::from(home).join(".config").join("bookrank").join("config.toml"))
}

/// Returns the default (all `None`) if the file does not exist.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_owned(),
            source,
        }),
    }
}

/// Writes the commented template. Fails if the file already exists.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_owned()));
    }

    let io_error = |source| ConfigError::Io {
        path: path.to_owned(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.stop_policy(), StopPolicy::default());
    }

    #[test]
    fn test_template_parses_to_default() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_create_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookrank").join("config.toml");
        create_default_config(&path).unwrap();
        assert_eq!(load_config(&path).unwrap(), Config::default());
        assert!(matches!(create_default_config(&path), Err(ConfigError::AlreadyExists(_))));
    }

    #[test]
    fn test_values() {
        let config: Config = toml::from_str(
            r#"
            store = "/tmp/books.json"
            comparisons_per_book = 5
            extra_letters = "ÉÀ"
            year = "2024"
            "#,
        )
        .unwrap();

        assert_eq!(config.store, Some(PathBuf::from("/tmp/books.json")));
        assert_eq!(config.stop_policy().comparisons_per_book, 5);
        assert_eq!(config.year, Some("2024".parse().unwrap()));
        assert_eq!(config.normalizer().author("Émile Zola"), "émile zola");
    }

    #[test]
    fn test_invalid_values() {
        assert!(toml::from_str::<Config>(r#"year = "24""#).is_err());
        assert!(toml::from_str::<Config>("colour = 1").is_err());
    }

    #[test]
    fn test_unicode_letters() {
        let config: Config = toml::from_str("unicode_letters = true").unwrap();
        assert_eq!(config.normalizer().title("Война и мир"), "война и мир");
    }
}
