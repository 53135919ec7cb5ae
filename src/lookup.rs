use std::fmt;

use tracing::trace;

use crate::lexicon::{Entry, Lexicon, fold_case};

pub const SIMILAR_WORDS_HEADER: &str = "Your word was not found. Try these similar words:";
pub const NO_SIMILAR_WORDS: &str = "No similar words were found :(";

/// Outcome of a prefix-shrinking suggestion search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion<'a> {
    /// Headwords starting with `probe`, the longest prefix of the query that
    /// matched anything.
    Similar {
        probe: String,
        entries: Vec<&'a Entry>,
    },
    NoneFound,
}

impl<'a> Suggestion<'a> {
    pub fn entries(&self) -> &[&'a Entry] {
        match self {
            Suggestion::Similar { entries, .. } => entries,
            Suggestion::NoneFound => &[],
        }
    }

    pub fn headwords(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries().iter().map(|&entry| entry.headword())
    }

    pub fn probe(&self) -> Option<&str> {
        match self {
            Suggestion::Similar { probe, .. } => Some(probe.as_str()),
            Suggestion::NoneFound => None,
        }
    }
}

impl fmt::Display for Suggestion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::Similar { entries, .. } => {
                f.write_str(SIMILAR_WORDS_HEADER)?;
                for entry in entries {
                    write!(f, "\n{}", entry.headword())?;
                }
                Ok(())
            }
            Suggestion::NoneFound => f.write_str(NO_SIMILAR_WORDS),
        }
    }
}

/// Result of an entry or translation query.
///
/// Misses are never errors; they resolve to a [`Suggestion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a> {
    Entry(&'a Entry),
    Translation(&'a Entry),
    Suggestions(Suggestion<'a>),
}

impl Lookup<'_> {
    pub fn is_match(&self) -> bool {
        !matches!(self, Lookup::Suggestions(_))
    }
}

impl fmt::Display for Lookup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Entry(entry) => write!(
                f,
                "{} {} {}",
                entry.headword(),
                entry.part_of_speech(),
                entry.definition()
            ),
            Lookup::Translation(entry) => f.write_str(entry.translation()),
            Lookup::Suggestions(suggestion) => fmt::Display::fmt(suggestion, f),
        }
    }
}

impl Lexicon {
    /// Looks up the full entry for `word`, falling back to suggestions.
    pub fn lookup_entry(&self, word: &str) -> Lookup<'_> {
        match self.get(word) {
            Some(entry) => Lookup::Entry(entry),
            None => Lookup::Suggestions(self.suggest(word)),
        }
    }

    /// Looks up the French translation of `word`, falling back to suggested
    /// English headwords.
    pub fn lookup_translation(&self, word: &str) -> Lookup<'_> {
        match self.get(word) {
            Some(entry) => Lookup::Translation(entry),
            None => Lookup::Suggestions(self.suggest(word)),
        }
    }

    /// `"{headword} {part_of_speech} {definition}"`, or the suggestion text.
    pub fn get_entry(&self, word: &str) -> String {
        self.lookup_entry(word).to_string()
    }

    pub fn get_translation(&self, word: &str) -> String {
        self.lookup_translation(word).to_string()
    }

    /// Finds headwords sharing the longest possible prefix with `word`.
    ///
    /// The probe starts as the whole (case-folded) word and loses one
    /// trailing character per round until some headword starts with it. A
    /// single-character probe with no match ends the search.
    pub fn suggest(&self, word: &str) -> Suggestion<'_> {
        let mut probe = fold_case(word);
        if probe.is_empty() {
            return Suggestion::NoneFound;
        }
        loop {
            let entries = self.folded_prefix(&probe);
            if !entries.is_empty() {
                trace!(probe = %probe, matches = entries.len(), "suggestion probe matched");
                return Suggestion::Similar { probe, entries };
            }
            if probe.chars().count() <= 1 {
                return Suggestion::NoneFound;
            }
            probe.pop();
        }
    }
}
