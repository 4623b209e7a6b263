//! The session controller: owns the entry log and the sequence counter, routes
//! each input line to a command or to the submit path, and rolls back whatever
//! a failed build added.

use std::io;
use std::path::{Path, PathBuf};

use goloop_core::{assemble, print_expression, print_values, Entry, EntryKind, EntryLog};
use goloop_syntax::{classify, parse_expression, ExpressionKind, ParseError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::commands::{parse_line, ParsedLine, ReplCommand, HELP};
use crate::config::ConfigError;
use crate::diagnostics::annotate;
use crate::runner::{Outcome, Runner, Toolchain};
use crate::transcript::Transcript;

/// Reported by undo when there is nothing left to show.
pub const NO_SOURCE: &str = "(no go source)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Commit the fragment only if the whole program still builds and runs
    BuildAndRun,
    /// Commit without building; used while replaying a transcript
    AccumulateOnly,
}

/// Why a line was rejected. The session state is unchanged after any of these.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Generation(String),
    #[error("{0}")]
    Compile(String),
    #[error("{0}")]
    Runtime(String),
    #[error("[goloop] \"{0}\": command not found")]
    UnknownCommand(String),
}

#[derive(Debug, Error)]
pub enum SessionSetupError {
    #[error("cannot use staging directory '{path}': {source}")]
    StagingDir { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Creates the staging directory if needed and returns its absolute path.
pub fn prepare_staging(dir: &Path) -> Result<PathBuf, SessionSetupError> {
    let setup_err = |source| SessionSetupError::StagingDir { path: dir.to_path_buf(), source };
    std::fs::create_dir_all(dir).map_err(setup_err)?;
    dir.canonicalize().map_err(setup_err)
}

/// What the front end should do with the result of one line.
#[derive(Debug)]
pub enum Reply {
    Silent,
    Output(String),
    Failure(SubmitError),
    Quit,
}

impl From<Result<String, SubmitError>> for Reply {
    fn from(result: Result<String, SubmitError>) -> Self {
        match result {
            Ok(output) if output.is_empty() => Reply::Silent,
            Ok(output) => Reply::Output(output),
            Err(e) => Reply::Failure(e),
        }
    }
}

pub struct Session<T: Toolchain> {
    log: EntryLog,
    sequence: u32,
    runner: Runner<T>,
    transcript: Option<Transcript>,
}

impl<T: Toolchain> Session<T> {
    pub fn new(runner: Runner<T>) -> Self {
        Self { log: EntryLog::new(), sequence: 0, runner, transcript: None }
    }

    /// Saves the visible fragments to `transcript` after every accepted change.
    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = Some(transcript);
        self
    }

    pub fn log(&self) -> &EntryLog { &self.log }

    pub fn transcript(&self) -> Option<&Transcript> { self.transcript.as_ref() }

    /// Handles one line of user input.
    pub fn dispatch(&mut self, line: &str) -> Reply {
        match parse_line(line) {
            ParsedLine::Empty => Reply::Silent,
            ParsedLine::UnknownCommand(command) => Reply::Failure(SubmitError::UnknownCommand(command.to_string())),
            ParsedLine::Fragment(fragment) => self.submit(fragment, Mode::BuildAndRun).into(),
            ParsedLine::Command(command) => match command {
                ReplCommand::Quit => Reply::Quit,
                ReplCommand::Variables => Reply::Output(self.variables_listing()),
                ReplCommand::Source => match self.source_listing() {
                    listing if listing.is_empty() => Reply::Silent,
                    listing => Reply::Output(listing),
                },
                ReplCommand::Undo => Reply::Output(self.undo()),
                ReplCommand::Help => Reply::Output(HELP.to_string()),
                ReplCommand::EvalOnce(fragment) => self.evaluate_once(fragment).into(),
                ReplCommand::PrintOnce(expr) => self.print_once(expr).into(),
            },
        }
    }

    /// Submits one fragment. On success returns what the program printed.
    pub fn submit(&mut self, fragment: &str, mode: Mode) -> Result<String, SubmitError> {
        self.submit_with(fragment, mode, true)
    }

    fn submit_with(&mut self, fragment: &str, mode: Mode, persist: bool) -> Result<String, SubmitError> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Ok(String::new());
        }
        if self.log.is_declared(fragment) {
            return self.print_value(fragment, mode);
        }

        let shape = classify(fragment)?;
        if shape.expression == Some(ExpressionKind::Value) {
            return self.print_value(fragment, mode);
        }

        let watermark = self.next_sequence();
        if shape.is_import() {
            // committed unbuilt: Go rejects a program with an unused import
            debug!(sequence = watermark, paths = ?shape.imports, "import accepted");
            self.log.append(Entry::import(watermark, fragment, shape.imports));
            if persist {
                self.persist();
            }
            return Ok(String::new());
        }

        let printed = if !shape.declared.is_empty() {
            self.log.append(Entry::declaration(watermark, fragment, shape.declared.clone()));
            shape.declared
        } else if !shape.assigned.is_empty() {
            if shape.assigned.iter().all(|name| self.log.is_declared(name)) {
                self.log.append(Entry::assignment(watermark, fragment));
            } else {
                self.log.append(Entry::declaration(watermark, fragment, shape.assigned.clone()));
            }
            shape.assigned
        } else {
            self.log.append(Entry::statement(watermark, fragment));
            Vec::new()
        };

        if mode == Mode::AccumulateOnly {
            return Ok(String::new());
        }
        if !printed.is_empty() {
            let names: Vec<&str> = printed.iter().map(String::as_str).collect();
            self.log.append(Entry::print(watermark, print_values(&names)));
        }

        match self.build() {
            Ok(output) => {
                if persist {
                    self.persist();
                }
                Ok(output)
            }
            Err(e) => {
                self.rollback(watermark);
                Err(e)
            }
        }
    }

    fn print_value(&mut self, expr: &str, mode: Mode) -> Result<String, SubmitError> {
        match mode {
            Mode::BuildAndRun => self.print_once(expr),
            Mode::AccumulateOnly => Ok(String::new()),
        }
    }

    /// Builds and runs `fragment` as if submitted, then forgets it whatever happened.
    pub fn evaluate_once(&mut self, fragment: &str) -> Result<String, SubmitError> {
        let watermark = self.sequence + 1;
        let result = self.submit_with(fragment, Mode::BuildAndRun, false);
        self.rollback(watermark);
        result
    }

    /// Prints the value of `expr` against the current program. The print is
    /// never kept.
    pub fn print_once(&mut self, expr: &str) -> Result<String, SubmitError> {
        let expr = expr.trim();
        parse_expression(expr)?;
        let watermark = self.sequence + 1;
        self.log.append(Entry::print(watermark, print_expression(expr)));
        let result = self.build();
        self.rollback(watermark);
        result
    }

    /// Drops the most recent submission and returns the listing that remains.
    pub fn undo(&mut self) -> String {
        let Some(last) = self.log.last_sequence() else {
            return NO_SOURCE.to_string();
        };
        self.rollback(last);
        self.persist();
        if self.log.is_empty() {
            NO_SOURCE.to_string()
        } else {
            self.source_listing()
        }
    }

    pub fn declared_names(&self) -> Vec<&str> { self.log.declared_names() }

    /// Declared names in declaration order, formatted as `[a b]`.
    pub fn variables_listing(&self) -> String {
        format!("[{}]", self.declared_names().join(" "))
    }

    /// Visible fragments, imports first, each numbered by its listing position.
    pub fn source_listing(&self) -> String {
        self.listing()
            .iter()
            .enumerate()
            .map(|(i, entry)| format!(" {}:\t{}", i + 1, entry.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Restores the session from its transcript: every saved fragment is
    /// accumulated without building, then the result is built once. Returns
    /// the rejected lines, a failed build, and finally the listing.
    pub fn replay(&mut self) -> io::Result<Vec<Reply>> {
        let Some(transcript) = &self.transcript else {
            return Ok(Vec::new());
        };
        let fragments = transcript.load()?;
        if fragments.is_empty() {
            return Ok(Vec::new());
        }
        info!(count = fragments.len(), "replaying transcript");

        let mut replies = Vec::new();
        for fragment in &fragments {
            if let Err(e) = self.submit_with(fragment, Mode::AccumulateOnly, false) {
                warn!(%fragment, error = %e, "skipping transcript line");
                replies.push(Reply::Failure(e));
            }
        }
        if self.log.is_empty() {
            return Ok(replies);
        }
        if let Err(e) = self.build() {
            warn!("replayed program does not build");
            replies.push(Reply::Failure(e));
        }
        replies.push(Reply::Output(self.source_listing()));
        Ok(replies)
    }

    /// Removes staging files. Called when the session ends.
    pub fn shutdown(&self) {
        self.runner.cleanup();
    }

    fn next_sequence(&mut self) -> u32 {
        self.sequence += 1;
        self.sequence
    }

    fn listing(&self) -> Vec<&Entry> {
        let (mut imports, body): (Vec<&Entry>, Vec<&Entry>) =
            self.log.visible_entries().partition(|e| e.kind == EntryKind::Import);
        imports.extend(body);
        imports
    }

    fn build(&self) -> Result<String, SubmitError> {
        let program = assemble(&self.log);
        let report = self.runner.build_and_run(&program.text);
        match report.outcome {
            Outcome::Success => Ok(report.output),
            Outcome::GenerationFailure => Err(SubmitError::Generation(report.output)),
            Outcome::CompileFailure => Err(SubmitError::Compile(annotate(&report.output, &program, &self.log))),
            Outcome::RuntimeFailure => Err(SubmitError::Runtime(report.output)),
        }
    }

    fn rollback(&mut self, watermark: u32) {
        let removed = self.log.rollback_to(watermark);
        self.sequence = self.log.last_sequence().unwrap_or(0);
        if removed > 0 {
            debug!(watermark, removed, "rolled back");
        }
    }

    fn persist(&self) {
        let Some(transcript) = &self.transcript else { return };
        let listing = self.listing();
        if let Err(e) = transcript.save(listing.iter().map(|e| e.text.as_str())) {
            warn!(path = %transcript.path().display(), error = %e, "cannot save transcript");
        }
    }
}
