//! English to French dictionary lookups over a comma-separated word list.
//!
//! A [`Lexicon`] is loaded once and then queried for full entries,
//! translations, or prefix suggestions when a word is missing. [`History`]
//! keeps the most recent raw queries of an interactive session.

mod error;
mod history;
mod lexicon;
mod lookup;

pub use error::LoadError;
pub use history::History;
pub use lexicon::{Entry, Lexicon};
pub use lookup::{Lookup, NO_SIMILAR_WORDS, SIMILAR_WORDS_HEADER, Suggestion};
