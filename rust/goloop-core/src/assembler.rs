//! Turns an entry log into one complete Go program.
//!
//! Layout is fixed: package clause, `fmt` import, user imports, the two
//! helper functions, then `main` holding every body fragment in submission
//! order and at most one print statement at the end. Assembly is a pure
//! function of the log, so assembling twice yields identical text.

use crate::entry::{EntryKind, EntryLog, USE_HELPER};

/// Name of the helper that picks the first of possibly several values.
pub const FIRST_HELPER: &str = "goloopFirst";

/// Where one entry landed in the generated text (1-based, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub entry: usize,
    pub first_line: usize,
    pub last_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub text: String,
    pub placements: Vec<Placement>,
}

impl Program {
    /// Index of the log entry that produced generated line `line`.
    pub fn entry_at(&self, line: usize) -> Option<usize> {
        self.placements
            .iter()
            .find(|p| (p.first_line..=p.last_line).contains(&line))
            .map(|p| p.entry)
    }

    /// Generated line number of the first line of entry `index`.
    pub fn line_of(&self, index: usize) -> Option<usize> {
        self.placements.iter().find(|p| p.entry == index).map(|p| p.first_line)
    }
}

struct Writer {
    text: String,
    line: usize,
    placements: Vec<Placement>,
}

impl Writer {
    fn push(&mut self, s: &str) {
        self.text.push_str(s);
        self.text.push('\n');
        self.line += 1;
    }

    /// Writes a fragment, indenting every line by `indent`, and records its placement.
    fn fragment(&mut self, entry: usize, text: &str, indent: &str) {
        let first_line = self.line + 1;
        let mut lines = text.lines().peekable();
        if lines.peek().is_none() {
            self.push(indent);
        }
        for l in lines {
            self.push(&format!("{}{}", indent, l));
        }
        self.placements.push(Placement { entry, first_line, last_line: self.line });
    }
}

pub fn assemble(log: &EntryLog) -> Program {
    let entries = log.all_entries();
    let mut w = Writer { text: String::new(), line: 0, placements: Vec::new() };

    w.push("package main");
    w.push("");
    w.push("import \"fmt\"");
    for (i, entry) in entries.iter().enumerate().filter(|(_, e)| e.kind == EntryKind::Import) {
        w.fragment(i, &entry.text, "");
    }
    w.push("");
    w.push(&format!("func {}(values ...interface{{}}) {{}}", USE_HELPER));
    w.push("");
    w.push(&format!("func {}(values ...interface{{}}) interface{{}} {{", FIRST_HELPER));
    w.push("\tif len(values) == 0 {");
    w.push("\t\treturn nil");
    w.push("\t}");
    w.push("\treturn values[0]");
    w.push("}");
    w.push("");
    w.push("func main() {");
    w.push("\tfmt.Print(\"\")");

    for (i, entry) in entries.iter().enumerate() {
        match entry.kind {
            EntryKind::Statement | EntryKind::Declaration | EntryKind::Assignment => {
                w.fragment(i, &entry.text, "\t")
            }
            EntryKind::Import | EntryKind::Print => {}
        }
    }

    // Only the newest print counts, and only while its submission is the latest one
    let print = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind == EntryKind::Print)
        .max_by_key(|(i, e)| (e.sequence, *i));
    if let Some((i, entry)) = print {
        if Some(entry.sequence) == log.last_sequence() {
            w.fragment(i, &entry.text, "\t");
        }
    }

    w.push("}");
    Program { text: w.text, placements: w.placements }
}

/// Print statement showing the current values of `names`, comma separated.
pub fn print_values(names: &[&str]) -> String {
    let verbs = vec!["%v"; names.len()].join(",");
    format!("fmt.Printf(\"{}\", {})", verbs, names.join(", "))
}

/// Print statement showing the (first) value of an arbitrary expression.
pub fn print_expression(expr: &str) -> String {
    format!("fmt.Printf(\"%v\", {}({}))", FIRST_HELPER, expr.trim())
}
