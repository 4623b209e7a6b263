//! The entry log: every accepted fragment of a session, in submission order.

use strum::Display;

/// Name of the no-op helper that marks declared names as used.
pub const USE_HELPER: &str = "goloopUse";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum EntryKind {
    Import,
    Statement,
    Declaration,
    Assignment,
    Print,
}

/// One fragment, either submitted by the user or synthesized by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub sequence: u32,
    pub kind: EntryKind,
    pub text: String,
    /// Scaffolding (companions, prints) is hidden from listings
    pub visible: bool,
    /// Declared identifiers for a declaration, package paths for an import
    pub names: Vec<String>,
}

impl Entry {
    fn new(sequence: u32, kind: EntryKind, text: impl Into<String>, visible: bool, names: Vec<String>) -> Self {
        Self { sequence, kind, text: text.into(), visible, names }
    }

    pub fn import(sequence: u32, text: impl Into<String>, paths: Vec<String>) -> Self {
        Self::new(sequence, EntryKind::Import, text, true, paths)
    }

    pub fn statement(sequence: u32, text: impl Into<String>) -> Self {
        Self::new(sequence, EntryKind::Statement, text, true, Vec::new())
    }

    pub fn declaration(sequence: u32, text: impl Into<String>, names: Vec<String>) -> Self {
        Self::new(sequence, EntryKind::Declaration, text, true, names)
    }

    pub fn assignment(sequence: u32, text: impl Into<String>) -> Self {
        Self::new(sequence, EntryKind::Assignment, text, true, Vec::new())
    }

    pub fn print(sequence: u32, text: impl Into<String>) -> Self {
        Self::new(sequence, EntryKind::Print, text, false, Vec::new())
    }

    fn companion(&self) -> Entry {
        let text = format!("{}({})", USE_HELPER, self.names.join(", "));
        Self::new(self.sequence, EntryKind::Statement, text, false, Vec::new())
    }
}

/// Append-only, rollback-capable log of entries.
#[derive(Debug, Clone, Default)]
pub struct EntryLog {
    entries: Vec<Entry>,
}

impl EntryLog {
    pub fn new() -> Self { Self::default() }

    /// Appends an entry. A declaration brings its invisible companion along,
    /// so the declared names always count as used.
    pub fn append(&mut self, entry: Entry) {
        debug_assert!(
            self.last_sequence().map_or(true, |last| entry.sequence >= last),
            "sequence numbers must not decrease"
        );
        let companion = (entry.kind == EntryKind::Declaration && !entry.names.is_empty()).then(|| entry.companion());
        self.entries.push(entry);
        if let Some(companion) = companion {
            self.entries.push(companion);
        }
    }

    /// Declared names over all surviving declarations, first declaration first.
    pub fn declared_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for entry in self.entries.iter().filter(|e| e.kind == EntryKind::Declaration) {
            for name in &entry.names {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.kind == EntryKind::Declaration && e.names.iter().any(|n| n == name))
    }

    /// Removes trailing entries whose sequence is at or above `watermark`.
    /// Returns how many were removed.
    pub fn rollback_to(&mut self, watermark: u32) -> usize {
        let keep = self.entries.iter().rposition(|e| e.sequence < watermark).map_or(0, |i| i + 1);
        let removed = self.entries.len() - keep;
        self.entries.truncate(keep);
        removed
    }

    /// Entries shown to the user, in append order.
    pub fn visible_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.visible)
    }

    pub(crate) fn all_entries(&self) -> &[Entry] { &self.entries }

    pub fn last_sequence(&self) -> Option<u32> { self.entries.last().map(|e| e.sequence) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, index: usize) -> Option<&Entry> { self.entries.get(index) }
}
