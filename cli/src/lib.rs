//! Command line front end for [`bookrank`]: Goodreads import, Open Library
//! lookup, the interactive quiz and a JSON collection store.

pub mod config;
mod error;
pub mod goodreads;
pub mod import;
pub mod normalize;
pub mod openlibrary;
pub mod output;
pub mod quiz;
pub mod store;

pub use error::Error;
