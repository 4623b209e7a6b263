//! Interactive front end: line editing, history, completion and printing of replies.

use std::fs;
use std::path::{Path, PathBuf};

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Config, Context, Editor, Helper};
use tracing::debug;

use crate::colors::{cyan, gray, red};
use crate::commands::{needs_more_input, COMMANDS, HELP};
use crate::runner::Toolchain;
use crate::session::{Reply, Session};

/// Environment variable used to override the history location.
const HISTORY_PATH_ENV: &str = "GOLOOP_HISTORY_PATH";

/// Go keywords for tab completion.
const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for", "func", "go",
    "goto", "if", "import", "interface", "map", "package", "range", "return", "select", "struct", "switch", "type",
    "var",
];

pub struct ReplOptions {
    /// Load and save line-editing history
    pub history: bool,
}

/// Completes control commands at the start of a line, and declared names
/// and keywords elsewhere.
#[derive(Default)]
struct GoloopHelper {
    names: Vec<String>,
}

impl GoloopHelper {
    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let start = line[..pos]
            .char_indices()
            .rev()
            .find(|&(_, c)| !(c.is_alphanumeric() || c == '_' || c == '.' || c == '?'))
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        let word = &line[start..pos];
        if word.is_empty() {
            return (start, Vec::new());
        }

        let pair = |s: &str| Pair { display: s.to_string(), replacement: s.to_string() };
        let candidates = if line.trim_start() == word && word.starts_with('.') {
            COMMANDS.iter().filter(|cmd| cmd.starts_with(word)).map(|cmd| pair(*cmd)).collect()
        } else {
            self.names
                .iter()
                .map(String::as_str)
                .chain(GO_KEYWORDS.iter().copied())
                .filter(|candidate| candidate.starts_with(word))
                .map(pair)
                .collect()
        };
        (start, candidates)
    }
}

impl Completer for GoloopHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(line, pos))
    }
}

impl Hinter for GoloopHelper {
    type Hint = String;
}

impl Highlighter for GoloopHelper {}

impl Validator for GoloopHelper {}

impl Helper for GoloopHelper {}

/// Runs the read-submit-print loop until `.q` or end of input.
pub fn run_repl<T: Toolchain>(mut session: Session<T>, options: &ReplOptions) -> rustyline::Result<()> {
    println!("{}", HELP);

    match session.replay() {
        Ok(replies) => replies.iter().for_each(show),
        Err(err) => {
            let path = session.transcript().map(|t| t.path().display().to_string()).unwrap_or_default();
            eprintln!("{} failed to read transcript {}: {}", red("Warning:"), path, err);
        }
    }

    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<GoloopHelper, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(GoloopHelper::default()));
    refresh_names(&mut rl, &session);

    let history_path = if options.history { get_history_path() } else { None };
    if let Some(ref path) = history_path {
        if path.exists() {
            if let Err(err) = rl.load_history(path) {
                eprintln!("{} failed to load history from {}: {}", red("Warning:"), path.display(), err);
            }
        }
    }

    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { format!("{} ", cyan("go>")) } else { format!("{} ", gray("...")) };

        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() && buffer.is_empty() {
                    continue;
                }
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);
                if needs_more_input(&buffer) {
                    continue;
                }

                let input = std::mem::take(&mut buffer);
                match session.dispatch(&input) {
                    Reply::Quit => break,
                    reply => show(&reply),
                }
                refresh_names(&mut rl, &session);
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                println!("{}", gray("(Ctrl-C to exit)"));
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                session.shutdown();
                return Err(err);
            }
        }
    }

    if let Some(ref path) = history_path {
        save_history(&mut rl, path);
    }
    session.shutdown();
    debug!("session ended");
    Ok(())
}

fn show(reply: &Reply) {
    match reply {
        Reply::Output(text) => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
        }
        Reply::Failure(err) => println!("{}", red(&err.to_string())),
        Reply::Silent | Reply::Quit => {}
    }
}

fn refresh_names<T: Toolchain>(rl: &mut Editor<GoloopHelper, DefaultHistory>, session: &Session<T>) {
    if let Some(helper) = rl.helper_mut() {
        helper.names = session.declared_names().into_iter().map(str::to_string).collect();
    }
}

fn save_history(rl: &mut Editor<GoloopHelper, DefaultHistory>, path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            eprintln!("{} failed to create history directory {}: {}", red("Warning:"), parent.display(), err);
        }
    }
    if let Err(err) = rl.save_history(path) {
        eprintln!("{} failed to save history to {}: {}", red("Warning:"), path.display(), err);
    }
}

/// Resolve the path to the history file.
///
/// Rules:
/// - `GOLOOP_HISTORY_PATH` set to an absolute path: use as-is.
/// - `GOLOOP_HISTORY_PATH` set to `~/...` or a relative path: resolve under HOME.
/// - Otherwise: `${HOME}/.goloop/history`.
fn resolve_history_path(home: Option<&Path>, override_path: Option<&str>) -> Option<PathBuf> {
    let home_path = || home.map(Path::to_path_buf);

    if let Some(raw) = override_path.map(str::trim).filter(|value| !value.is_empty()) {
        if raw == "~" {
            return home_path();
        }
        let relative = raw.strip_prefix("~/").unwrap_or(raw);
        let configured = PathBuf::from(relative);
        if configured.is_relative() {
            return Some(home_path()?.join(configured));
        }
        return Some(configured);
    }

    Some(home_path()?.join(".goloop").join("history"))
}

fn get_history_path() -> Option<PathBuf> {
    let home = dirs::home_dir();
    let override_path = std::env::var(HISTORY_PATH_ENV).ok();
    resolve_history_path(home.as_deref(), override_path.as_deref())
}
