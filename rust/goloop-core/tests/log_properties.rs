//! Invariants of the entry log and the programs assembled from it.

use goloop_core::{assemble, print_values, Entry, EntryKind, EntryLog};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// A small session: an import, two declarations, an assignment and a statement.
fn session_log() -> EntryLog {
    let mut log = EntryLog::new();
    log.append(Entry::import(1, "import \"strings\"", names(&["strings"])));
    log.append(Entry::declaration(2, "s := \"go\"", names(&["s"])));
    log.append(Entry::print(2, print_values(&["s"])));
    log.append(Entry::declaration(3, "n, m := 1, 2", names(&["n", "m"])));
    log.append(Entry::print(3, print_values(&["n", "m"])));
    log.append(Entry::assignment(4, "n = m"));
    log.append(Entry::print(4, print_values(&["n"])));
    log.append(Entry::statement(5, "fmt.Println(strings.ToUpper(s))"));
    log
}

// ============================================================================
// Consistency
// ============================================================================

#[test]
fn every_declaration_is_followed_by_its_companion() {
    let log = session_log();
    for i in 0..log.len() {
        let entry = log.get(i).unwrap();
        if entry.kind == EntryKind::Declaration {
            let companion = log.get(i + 1).expect("companion missing");
            assert_eq!(companion.kind, EntryKind::Statement);
            assert_eq!(companion.sequence, entry.sequence);
            assert!(!companion.visible);
            for name in &entry.names {
                assert!(companion.text.contains(name.as_str()));
            }
        }
    }
}

#[test]
fn declared_names_match_surviving_declarations() {
    let mut log = session_log();
    assert_eq!(log.declared_names(), vec!["s", "n", "m"]);
    log.rollback_to(3);
    assert_eq!(log.declared_names(), vec!["s"]);
    assert!(!log.is_declared("n"));
}

#[test]
fn sequences_never_decrease() {
    let log = session_log();
    let sequences: Vec<u32> = (0..log.len()).map(|i| log.get(i).unwrap().sequence).collect();
    assert!(sequences.windows(2).all(|w| w[0] <= w[1]));
}

// ============================================================================
// Rollback
// ============================================================================

#[test]
fn rollback_restores_earlier_program() {
    let mut log = session_log();
    let mut earlier = log.clone();
    earlier.rollback_to(4);
    let expected = assemble(&earlier).text;

    log.append(Entry::declaration(6, "extra := 1", names(&["extra"])));
    log.append(Entry::print(6, print_values(&["extra"])));
    log.rollback_to(4);
    assert_eq!(assemble(&log).text, expected);
}

#[test]
fn rollback_past_everything_empties_the_log() {
    let mut log = session_log();
    let total = log.len();
    assert_eq!(log.rollback_to(0), total);
    assert!(log.is_empty());
    assert_eq!(log.last_sequence(), None);
}

// ============================================================================
// Assembly
// ============================================================================

#[test]
fn listing_hides_scaffolding() {
    let log = session_log();
    let visible: Vec<&str> = log.visible_entries().map(|e| e.text.as_str()).collect();
    assert_eq!(
        visible,
        vec![
            "import \"strings\"",
            "s := \"go\"",
            "n, m := 1, 2",
            "n = m",
            "fmt.Println(strings.ToUpper(s))",
        ]
    );
}

#[test]
fn body_order_follows_submission_order() {
    let text = assemble(&session_log()).text;
    let order = ["s := \"go\"", "goloopUse(s)", "n, m := 1, 2", "goloopUse(n, m)", "n = m", "fmt.Println"];
    let positions: Vec<usize> = order.iter().map(|s| text.find(s).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", text);
}

#[test]
fn trailing_print_belongs_to_last_submission() {
    let mut log = session_log();
    // last submission is a plain statement: no print at all
    assert!(!assemble(&log).text.contains("Printf"));

    log.append(Entry::assignment(6, "m = 5"));
    log.append(Entry::print(6, print_values(&["m"])));
    let text = assemble(&log).text;
    assert_eq!(text.matches("Printf").count(), 1);
    assert!(text.contains("fmt.Printf(\"%v\", m)\n}"));
}

#[test]
fn every_contributing_entry_has_a_placement() {
    let log = session_log();
    let program = assemble(&log);
    for i in 0..log.len() {
        let kind = log.get(i).unwrap().kind;
        if kind != EntryKind::Print {
            let line = program.line_of(i).unwrap_or_else(|| panic!("entry {} not placed", i));
            assert_eq!(program.entry_at(line), Some(i));
        }
    }
}
