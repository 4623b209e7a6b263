//! Session behaviour end to end, against a shell stand-in for `go build`.

#![cfg(unix)]

mod support;

use std::fs;

use goloop_cli::session::{Mode, Reply, SubmitError, NO_SOURCE};
use goloop_core::assemble;
use support::{fake_project, fake_session, fake_session_keeping_source};

fn output(reply: Reply) -> String {
    match reply {
        Reply::Output(text) => text,
        other => panic!("expected output, got {:?}", other),
    }
}

fn failure(reply: Reply) -> SubmitError {
    match reply {
        Reply::Failure(err) => err,
        other => panic!("expected failure, got {:?}", other),
    }
}

// =============================================================================
// Submissions
// =============================================================================

#[test]
fn declaration_is_listed_and_named() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_session(dir.path());
    assert_eq!(output(s.dispatch("a := 1")), "ok\n");
    assert_eq!(s.declared_names(), vec!["a"]);
    assert_eq!(s.source_listing(), " 1:\ta := 1");
}

#[test]
fn assignment_to_unknown_names_declares_them() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_session(dir.path());
    s.submit("c, d = 3, 4", Mode::BuildAndRun).unwrap();
    assert_eq!(s.variables_listing(), "[c d]");
}

#[test]
fn imports_precede_statements() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_session(dir.path());
    s.submit("import \"strings\"", Mode::BuildAndRun).unwrap();
    s.submit("strings.ToUpper(\"x\")", Mode::BuildAndRun).unwrap();

    let text = assemble(s.log()).text;
    let import_at = text.find("import \"strings\"").unwrap();
    let call_at = text.find("strings.ToUpper(\"x\")").unwrap();
    assert!(import_at < call_at);
    assert_eq!(s.source_listing(), " 1:\timport \"strings\"\n 2:\tstrings.ToUpper(\"x\")");
}

#[test]
fn syntax_error_leaves_session_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_session(dir.path());
    s.dispatch("a := 1");
    let err = failure(s.dispatch("b := "));
    assert!(matches!(err, SubmitError::Parse(_)));
    assert!(err.to_string().contains("syntax error"));
    assert_eq!(s.declared_names(), vec!["a"]);
    assert_eq!(s.source_listing(), " 1:\ta := 1");
}

#[test]
fn compile_error_rolls_back_and_points_at_fragment() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_session(dir.path());
    s.dispatch("a := 1");
    let before = s.log().len();

    let err = failure(s.dispatch("fmt.Println(undefinedThing)"));
    let text = err.to_string();
    assert!(matches!(err, SubmitError::Compile(_)));
    assert!(!text.contains("# command-line-arguments"));
    assert!(text.contains("undefined: undefinedThing"));
    assert!(text.contains("    at: fmt.Println(undefinedThing)"));
    assert_eq!(s.log().len(), before);
    assert_eq!(s.source_listing(), " 1:\ta := 1");
}

#[test]
fn runtime_error_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_session(dir.path());
    let err = failure(s.dispatch("panic(\"no\")"));
    assert!(matches!(err, SubmitError::Runtime(ref out) if out == "boom\n"));
    assert!(s.log().is_empty());
}

#[test]
fn staging_files_do_not_survive_a_build() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_session(dir.path());
    s.dispatch("a := 1");
    s.dispatch("fmt.Println(undefinedThing)");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

// =============================================================================
// Commands
// =============================================================================

#[test]
fn undo_drops_whole_submission() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_session(dir.path());
    s.dispatch("a := 1");
    s.dispatch("b := a + 1");
    assert_eq!(output(s.dispatch(".u")), " 1:\ta := 1");
    assert_eq!(s.variables_listing(), "[a]");
    assert_eq!(output(s.dispatch(".undo")), NO_SOURCE);
    assert_eq!(output(s.dispatch(".u")), NO_SOURCE);
}

#[test]
fn eval_once_and_print_once_leave_no_trace() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_session(dir.path());
    s.dispatch("a := 1");
    let before = s.log().len();

    assert_eq!(output(s.dispatch("!b := 2")), "ok\n");
    assert_eq!(output(s.dispatch("=a+1")), "ok\n");
    assert!(matches!(failure(s.dispatch("!fmt.Println(undefinedThing)")), SubmitError::Compile(_)));
    assert_eq!(s.log().len(), before);
    assert_eq!(s.variables_listing(), "[a]");
}

#[test]
fn known_name_and_value_expression_are_printed_not_kept() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_session(dir.path());
    s.dispatch("a := 1");
    let before = s.log().len();
    assert_eq!(output(s.dispatch("a")), "ok\n");
    assert_eq!(output(s.dispatch("a * 3")), "ok\n");
    assert_eq!(s.log().len(), before);
}

#[test]
fn unknown_command_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_session(dir.path());
    let err = failure(s.dispatch(".frobnicate"));
    assert_eq!(err.to_string(), "[goloop] \".frobnicate\": command not found");
    assert!(s.log().is_empty());
}

#[test]
fn print_once_builds_program_ending_in_value_print() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_session_keeping_source(dir.path());
    let source = dir.path().join("image.go");

    s.dispatch("a := 1");
    let program = fs::read_to_string(&source).unwrap();
    assert!(program.ends_with("\ta := 1\n\tgoloopUse(a)\n\tfmt.Printf(\"%v\", a)\n}\n"), "{}", program);

    assert_eq!(output(s.dispatch("=a+1")), "ok\n");
    let program = fs::read_to_string(&source).unwrap();
    assert!(program.ends_with("\tgoloopUse(a)\n\tfmt.Printf(\"%v\", goloopFirst(a+1))\n}\n"), "{}", program);
    assert!(!program.contains("fmt.Printf(\"%v\", a)"), "{}", program);
    assert_eq!(s.source_listing(), " 1:\ta := 1");
}

// =============================================================================
// Transcript
// =============================================================================

#[test]
fn transcript_follows_accepted_changes() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_project(dir.path(), "demo");
    let path = dir.path().join("demo.changes");

    s.dispatch("a := 1");
    s.dispatch("import \"os\"");
    s.dispatch("fmt.Println(undefinedThing)");
    s.dispatch("!b := 2");
    assert_eq!(fs::read_to_string(&path).unwrap(), "import \"os\"\na := 1\n");

    s.dispatch(".u");
    assert_eq!(fs::read_to_string(&path).unwrap(), "a := 1\n");
}

#[test]
fn transcript_is_replayed_on_startup() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("demo.changes"),
        "import \"os\"\na := 1\nfor i := 0; i < 2; i++ {\n\ta += i\n}\nb := \n",
    )
    .unwrap();

    let mut s = fake_project(dir.path(), "demo");
    let replies = s.replay().unwrap();
    assert_eq!(replies.len(), 2);
    assert!(matches!(replies[0], Reply::Failure(SubmitError::Parse(_))));
    match &replies[1] {
        Reply::Output(listing) => {
            assert_eq!(listing, " 1:\timport \"os\"\n 2:\ta := 1\n 3:\tfor i := 0; i < 2; i++ {\n\ta += i\n}")
        }
        other => panic!("expected listing, got {:?}", other),
    }
    assert_eq!(s.variables_listing(), "[a]");
}

#[test]
fn missing_transcript_replays_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = fake_project(dir.path(), "fresh");
    assert!(s.replay().unwrap().is_empty());
    assert!(s.log().is_empty());
}
