use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use fst::automaton::Str;
use fst::{Automaton, IntoStreamer, Map, MapBuilder, Streamer};
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::LoadError;

const DELIMITER: char = ',';
/// Splitting stops here so definitions may contain the delimiter.
const FIELD_COUNT: usize = 4;

/// One dictionary record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    headword: String,
    translation: String,
    part_of_speech: String,
    definition: String,
}

impl Entry {
    pub fn new(
        headword: impl Into<String>,
        translation: impl Into<String>,
        part_of_speech: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            headword: headword.into(),
            translation: translation.into(),
            part_of_speech: part_of_speech.into(),
            definition: definition.into(),
        }
    }

    /// English headword in its original case.
    pub fn headword(&self) -> &str {
        &self.headword
    }

    /// French equivalent of the headword.
    pub fn translation(&self) -> &str {
        &self.translation
    }

    pub fn part_of_speech(&self) -> &str {
        &self.part_of_speech
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }
}

/// Read-only headword store, keyed by case-folded headword.
///
/// The folded keys live in an FST map whose values index into `entries`,
/// so exact and prefix queries share one structure.
pub struct Lexicon {
    index: Map<Vec<u8>>,
    entries: Vec<Entry>,
}

impl Lexicon {
    /// Loads a comma-separated dictionary file.
    ///
    /// The first line is treated as a header and skipped. Rows with fewer than
    /// four fields are ignored.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| LoadError::from_io(path.to_path_buf(), err))?;
        let rows = read_rows(BufReader::new(file))
            .map_err(|err| LoadError::from_io(path.to_path_buf(), err))?;
        let lexicon = Self::from_rows(rows)?;
        debug!(
            path = %path.display(),
            entries = lexicon.len(),
            "loaded dictionary"
        );
        Ok(lexicon)
    }

    /// Parses dictionary rows from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, LoadError> {
        let rows = read_rows(reader)?;
        Self::from_rows(rows)
    }

    fn from_rows(rows: BTreeMap<String, Entry>) -> Result<Self, LoadError> {
        // BTreeMap iteration yields keys in the sorted order the builder requires.
        let mut builder = MapBuilder::memory();
        let mut entries = Vec::with_capacity(rows.len());
        for (key, entry) in rows {
            builder.insert(&key, entries.len() as u64)?;
            entries.push(entry);
        }
        let index = Map::new(builder.into_inner()?)?;
        Ok(Self { index, entries })
    }

    /// Returns the entry for an exact, case-insensitive headword match.
    pub fn get(&self, word: &str) -> Option<&Entry> {
        self.index
            .get(fold_case(word))
            .and_then(|id| self.entries.get(id as usize))
    }

    /// Returns every entry whose folded headword starts with `prefix`.
    pub fn prefix(&self, prefix: &str) -> Vec<&Entry> {
        self.folded_prefix(&fold_case(prefix))
    }

    pub(crate) fn folded_prefix(&self, folded: &str) -> Vec<&Entry> {
        let automaton = Str::new(folded).starts_with();
        let mut stream = self.index.search(automaton).into_stream();
        let mut results = Vec::new();
        while let Some((_, id)) = stream.next() {
            if let Some(entry) = self.entries.get(id as usize) {
                results.push(entry);
            }
        }
        results
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub(crate) fn fold_case(word: &str) -> String {
    word.to_lowercase()
}

fn read_rows<R: BufRead>(mut reader: R) -> io::Result<BTreeMap<String, Entry>> {
    let mut buf = Vec::new();
    // Header row.
    reader.read_until(b'\n', &mut buf)?;

    let mut rows = BTreeMap::new();
    let mut skipped = 0usize;
    let mut line_no = 1usize;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        // Undecodable bytes become U+FFFD; the row itself is kept.
        let line = String::from_utf8_lossy(&buf);
        match parse_record(&line) {
            Some((key, entry)) => {
                if rows.insert(key, entry).is_some() {
                    trace!(line = line_no, "headword redefined; keeping later row");
                }
            }
            None => {
                skipped += 1;
                trace!(line = line_no, "skipping row with fewer than {FIELD_COUNT} fields");
            }
        }
    }
    debug!(rows = rows.len(), skipped, "parsed dictionary rows");
    Ok(rows)
}

fn parse_record(line: &str) -> Option<(String, Entry)> {
    let mut fields = line.splitn(FIELD_COUNT, DELIMITER).map(str::trim);
    let headword = fields.next()?;
    let translation = fields.next()?;
    let part_of_speech = fields.next()?;
    let definition = fields.next()?;
    Some((
        fold_case(headword),
        Entry::new(headword, translation, part_of_speech, definition),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Write;

    const HEADER: &str = "English,French,Type,Definition\n";

    fn lexicon(rows: &str) -> Lexicon {
        let source = format!("{HEADER}{rows}");
        Lexicon::from_reader(source.as_bytes()).expect("valid source")
    }

    #[test]
    fn loads_every_well_formed_row() {
        let lex = lexicon(
            "cat,chat,noun,a small domesticated feline\n\
             dog,chien,noun,a domesticated canine\n\
             run,courir,verb,to move swiftly on foot\n",
        );
        assert_eq!(lex.len(), 3);
        assert_eq!(lex.iter().count(), 3);
        for word in ["cat", "dog", "run"] {
            assert_eq!(lex.get(word).map(Entry::headword), Some(word));
        }
    }

    #[test]
    fn header_is_discarded_without_validation() {
        let lex = Lexicon::from_reader("cat,chat,noun,feline\ndog,chien,noun,canine\n".as_bytes())
            .expect("valid source");
        assert!(lex.get("cat").is_none());
        assert!(lex.get("dog").is_some());
    }

    #[test]
    fn lookups_ignore_case_but_keep_display_form() {
        let lex = lexicon("Paris,Paris,noun,capital of France\n");
        let entry = lex.get("PARIS").expect("case-insensitive hit");
        assert_eq!(entry.headword(), "Paris");
        assert_eq!(lex.get("paris"), Some(entry));
    }

    #[test]
    fn later_duplicate_headword_wins() {
        let lex = lexicon("bank,banque,noun,money place\nBank,rive,noun,edge of a river\n");
        assert_eq!(lex.len(), 1);
        let entry = lex.get("bank").expect("entry");
        assert_eq!(entry.translation(), "rive");
        assert_eq!(entry.headword(), "Bank");
    }

    #[test]
    fn short_rows_are_skipped() {
        let lex = lexicon("broken,casse,adj\n\napple,pomme,noun,a fruit\n");
        assert_eq!(lex.len(), 1);
        assert!(lex.get("broken").is_none());
        assert_eq!(lex.get("apple").map(Entry::translation), Some("pomme"));
    }

    #[test]
    fn definition_keeps_extra_delimiters() {
        let lex = lexicon("set,ensemble,noun, a group of things, usually alike, together \n");
        let entry = lex.get("set").expect("entry");
        assert_eq!(entry.definition(), "a group of things, usually alike, together");
    }

    #[test]
    fn fields_are_trimmed() {
        let lex = lexicon("  Tree , arbre ,  noun , a woody plant\r\n");
        let entry = lex.get("tree").expect("trimmed key");
        assert_eq!(
            entry,
            &Entry::new("Tree", "arbre", "noun", "a woody plant")
        );
    }

    #[test]
    fn empty_source_yields_empty_lexicon() {
        let lex = Lexicon::from_reader("".as_bytes()).expect("empty source");
        assert!(lex.is_empty());
        assert!(lex.prefix("a").is_empty());
    }

    #[test]
    fn prefix_matches_folded_headwords() {
        let lex = lexicon(
            "Car,voiture,noun,a vehicle\n\
             card,carte,noun,a piece of stiff paper\n\
             cat,chat,noun,a feline\n",
        );
        let words: HashSet<_> = lex.prefix("CAR").into_iter().map(Entry::headword).collect();
        assert_eq!(words, HashSet::from(["Car", "card"]));
        assert!(lex.prefix("z").is_empty());
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{HEADER}cat,chat,noun,a small domesticated feline\n").expect("write");
        let lex = Lexicon::load(file.path()).expect("load");
        assert_eq!(lex.get("cat").map(Entry::translation), Some("chat"));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.csv");
        match Lexicon::load(&path) {
            Err(LoadError::NotFound { path: reported }) => assert_eq!(reported, path),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("missing file should not load"),
        }
    }

    #[test]
    fn undecodable_bytes_do_not_abort_the_load() {
        let source: &[u8] = b"English,French,Type,Definition\n\
            cat,chat,noun,a feline\n\
            na\xefve,naif,adj,innocent\n\
            dog,chien,noun,a canine\n";
        let lex = Lexicon::from_reader(source).expect("valid rows still load");
        assert_eq!(lex.len(), 3);
        assert_eq!(lex.get("cat").map(Entry::translation), Some("chat"));
        assert_eq!(lex.get("dog").map(Entry::translation), Some("chien"));
        let naive = lex.get("na\u{fffd}ve").expect("row kept with replacement char");
        assert_eq!(naive.translation(), "naif");
    }

    #[test]
    fn last_row_without_newline_is_loaded() {
        let lex = Lexicon::from_reader("h\ncat,chat,noun,a feline".as_bytes()).expect("load");
        assert_eq!(lex.get("cat").map(Entry::definition), Some("a feline"));
    }
}
