//! Compiler diagnostic cleanup and best-effort mapping back to fragments.

use std::sync::OnceLock;

use goloop_core::{EntryLog, Program};
use regex::Regex;

/// Drops `#` package headers and surrounding blank lines from compiler output.
pub fn filter_noise(text: &str) -> String {
    let kept: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
    let start = kept.iter().position(|l| !l.trim().is_empty()).unwrap_or(kept.len());
    let end = kept.iter().rposition(|l| !l.trim().is_empty()).map_or(start, |i| i + 1);
    kept[start..end].join("\n")
}

fn location_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\S*\.go:(\d+)(?::\d+)?:").expect("valid location pattern"))
}

/// Adds an `at: <fragment>` line under every diagnostic whose line number
/// falls inside a fragment of `program`.
pub fn annotate(text: &str, program: &Program, log: &EntryLog) -> String {
    let mut out = Vec::new();
    for line in text.lines() {
        out.push(line.to_string());
        let Some(caps) = location_pattern().captures(line) else { continue };
        let Some(index) = caps[1].parse().ok().and_then(|n: usize| program.entry_at(n)) else { continue };
        if let Some(fragment) = fragment_for(log, index) {
            out.push(format!("    at: {}", fragment));
        }
    }
    out.join("\n")
}

/// First line of the user-visible fragment behind entry `index`. Scaffolding
/// resolves to the visible entry of the same submission.
fn fragment_for(log: &EntryLog, index: usize) -> Option<&str> {
    let entry = log.get(index)?;
    let source = if entry.visible {
        entry
    } else {
        (0..index)
            .rev()
            .filter_map(|i| log.get(i))
            .take_while(|e| e.sequence == entry.sequence)
            .find(|e| e.visible)
            .unwrap_or(entry)
    };
    source.text.lines().next()
}
