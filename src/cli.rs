use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use atty::Stream;
use clap::{Parser, Subcommand};
use lexicon_rs::{History, Lexicon, Lookup, Suggestion};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_LEXICON_PATH: &str = "data/dictionary.csv";

const MENU: &str = "\
Welcome to the Lexicon!
Enter 1 to search a word
Enter 2 to translate a word
Enter 3 to show your search history
Enter 4 to quit";
const INVALID_CHOICE: &str = "Invalid entry. Please enter 1, 2, 3 or 4.";
const PAUSE: &str = "Press \"Enter\" for main menu.";

#[derive(Parser, Debug)]
#[command(name = "lexicon-rs", about = "English/French dictionary lookup", version)]
pub struct Cli {
    /// Comma-separated dictionary file (headword,translation,type,definition).
    #[arg(long, global = true, env = "LEXICON_PATH", default_value = DEFAULT_LEXICON_PATH)]
    lexicon: PathBuf,

    /// Number of recent queries kept by the interactive menu.
    #[arg(long, global = true, default_value_t = History::DEFAULT_CAPACITY)]
    history_size: usize,

    /// Emit JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive menu (the default).
    Menu,
    /// Show the dictionary entry for each word.
    Entry {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Translate each word into French.
    Translate {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// List headwords sharing the longest matching prefix with a word.
    Suggest { word: String },
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing();

    let lexicon = Lexicon::load(&cli.lexicon)?;
    debug!(entries = lexicon.len(), "dictionary ready");

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let stdin = io::stdin();
            let session = Session::new(
                &lexicon,
                History::with_capacity(cli.history_size),
                stdin.lock(),
                io::stdout().lock(),
            );
            session.run()?;
            Ok(())
        }
        Command::Entry { words } => {
            handle_lookups(&words, |word| lexicon.lookup_entry(word), cli.json)
        }
        Command::Translate { words } => {
            handle_lookups(&words, |word| lexicon.lookup_translation(word), cli.json)
        }
        Command::Suggest { word } => handle_suggest(&lexicon, &word, cli.json),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn handle_lookups<'a, F>(words: &[String], lookup: F, as_json: bool) -> Result<(), Box<dyn Error>>
where
    F: Fn(&str) -> Lookup<'a>,
{
    if as_json {
        let payload: Vec<_> = words
            .iter()
            .map(|word| lookup_to_json(word, &lookup(word)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for word in words {
            print_lookup(&lookup(word));
        }
    }
    Ok(())
}

fn handle_suggest(lexicon: &Lexicon, word: &str, as_json: bool) -> Result<(), Box<dyn Error>> {
    let suggestion = lexicon.suggest(word);
    if as_json {
        let payload = json!({
            "query": word,
            "suggestions": suggestion_to_json(&suggestion),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{suggestion}");
    }
    Ok(())
}

fn lookup_to_json(query: &str, lookup: &Lookup<'_>) -> serde_json::Value {
    match lookup {
        Lookup::Entry(entry) => json!({ "query": query, "found": true, "entry": entry }),
        Lookup::Translation(entry) => json!({
            "query": query,
            "found": true,
            "headword": entry.headword(),
            "translation": entry.translation(),
        }),
        Lookup::Suggestions(suggestion) => json!({
            "query": query,
            "found": false,
            "suggestions": suggestion_to_json(suggestion),
        }),
    }
}

fn suggestion_to_json(suggestion: &Suggestion<'_>) -> serde_json::Value {
    json!({
        "probe": suggestion.probe(),
        "headwords": suggestion.headwords().collect::<Vec<_>>(),
    })
}

fn print_lookup(lookup: &Lookup<'_>) {
    match lookup {
        Lookup::Entry(entry) if stdout_is_tty() => {
            let text = format!(
                "**{}** *{}* {}",
                entry.headword(),
                entry.part_of_speech(),
                entry.definition()
            );
            let skin = MadSkin::default();
            println!("{}", FmtText::from(&skin, &text, Some(markdown_width())));
        }
        other => println!("{other}"),
    }
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Search,
    Translate,
    ShowHistory,
    Quit,
}

impl MenuChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Search),
            "2" => Some(MenuChoice::Translate),
            "3" => Some(MenuChoice::ShowHistory),
            "4" => Some(MenuChoice::Quit),
            _ => None,
        }
    }
}

/// Interactive menu loop. Ends on "4" or when input runs out.
struct Session<'a, R, W> {
    lexicon: &'a Lexicon,
    history: History,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    fn new(lexicon: &'a Lexicon, history: History, input: R, output: W) -> Self {
        Self {
            lexicon,
            history,
            input,
            output,
        }
    }

    fn run(mut self) -> io::Result<History> {
        loop {
            writeln!(self.output, "{MENU}")?;
            self.output.flush()?;
            let keep_going = match self.read_choice()? {
                None | Some(MenuChoice::Quit) => false,
                Some(MenuChoice::ShowHistory) => {
                    writeln!(self.output, "{}", self.history.render())?;
                    self.pause()?
                }
                Some(choice) => self.query(choice)?,
            };
            if !keep_going {
                break;
            }
        }
        Ok(self.history)
    }

    fn read_choice(&mut self) -> io::Result<Option<MenuChoice>> {
        while let Some(line) = self.read_line()? {
            match MenuChoice::parse(&line) {
                Some(choice) => return Ok(Some(choice)),
                None => writeln!(self.output, "{INVALID_CHOICE}")?,
            }
        }
        Ok(None)
    }

    /// Blank input returns to the menu without being recorded.
    fn query(&mut self, choice: MenuChoice) -> io::Result<bool> {
        let prompt = match choice {
            MenuChoice::Translate => "Enter word to translate:",
            _ => "Enter word to search:",
        };
        writeln!(self.output, "{prompt}")?;
        self.output.flush()?;
        let Some(word) = self.read_line()? else {
            return Ok(false);
        };
        if word.trim().is_empty() {
            return Ok(true);
        }

        self.history.append(word.as_str());
        let lookup = match choice {
            MenuChoice::Translate => self.lexicon.lookup_translation(&word),
            _ => self.lexicon.lookup_entry(&word),
        };
        debug!(query = %word, matched = lookup.is_match(), "menu lookup");
        writeln!(self.output, "{lookup}")?;
        self.pause()
    }

    fn pause(&mut self) -> io::Result<bool> {
        writeln!(self.output, "{PAUSE}")?;
        self.output.flush()?;
        Ok(self.read_line()?.is_some())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}
