//! The `<project>.changes` file: the visible fragments of a session, one per
//! line, replayed when the project is opened again.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::commands::needs_more_input;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    path: PathBuf,
}

impl Transcript {
    pub fn new(dir: &Path, project: &str) -> Self {
        Self { path: dir.join(format!("{}.changes", project)) }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Reads the saved fragments. A missing file is an empty transcript.
    /// Lines are regrouped so a fragment spanning several lines comes back whole.
    pub fn load(&self) -> io::Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut fragments = Vec::new();
        let mut pending = String::new();
        for line in content.lines() {
            if pending.is_empty() && line.trim().is_empty() {
                continue;
            }
            if !pending.is_empty() {
                pending.push('\n');
            }
            pending.push_str(line);
            if !needs_more_input(&pending) {
                fragments.push(std::mem::take(&mut pending));
            }
        }
        if !pending.is_empty() {
            fragments.push(pending);
        }
        debug!(path = %self.path.display(), count = fragments.len(), "loaded transcript");
        Ok(fragments)
    }

    /// Overwrites the file with `fragments`.
    pub fn save<'a>(&self, fragments: impl IntoIterator<Item = &'a str>) -> io::Result<()> {
        let mut content = String::new();
        for fragment in fragments {
            content.push_str(fragment);
            content.push('\n');
        }
        fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "saved transcript");
        Ok(())
    }
}
