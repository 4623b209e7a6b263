//! Tests for classifying realistic one-line Go fragments.

use goloop_syntax::{classify, parse_expression, ExpressionKind, ParseError};

fn declared(src: &str) -> Vec<String> {
    classify(src).expect("classify failed").declared
}

fn assigned(src: &str) -> Vec<String> {
    classify(src).expect("classify failed").assigned
}

fn assert_rejected(src: &str) {
    assert!(classify(src).is_err(), "expected {:?} to be rejected", src);
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn define_with_composite_literal() {
    assert_eq!(declared("people := []person{{\"ann\", 3}, {\"bob\", 4}}"), vec!["people"]);
    assert_eq!(declared("m := map[string]int{\"a\": 1}"), vec!["m"]);
}

#[test]
fn define_with_function_literal() {
    assert_eq!(declared("sq := func(n int) int { return n * n }"), vec!["sq"]);
}

#[test]
fn define_with_multiple_results() {
    assert_eq!(declared("n, err := strconv.Atoi(\"42\")"), vec!["n", "err"]);
    assert_eq!(declared("v, ok := x.(string)"), vec!["v", "ok"]);
    assert_eq!(declared("r, ok := <-ch"), vec!["r", "ok"]);
}

#[test]
fn var_with_type_only() {
    assert_eq!(declared("var buf [4]byte"), vec!["buf"]);
    assert_eq!(declared("var handler func(w io.Writer) error"), vec!["handler"]);
    assert_eq!(declared("var ch chan<- int"), vec!["ch"]);
}

#[test]
fn blank_identifier_declares_nothing() {
    assert!(declared("_ = fmt.Sprint(1)").is_empty());
    assert!(declared("var _ = 1").is_empty());
}

// ============================================================================
// Assignments
// ============================================================================

#[test]
fn compound_assignments() {
    for op in ["+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", "&^="] {
        assert_eq!(assigned(&format!("x {} 1", op)), vec!["x"], "operator {}", op);
    }
}

#[test]
fn swap_assignment() {
    assert_eq!(assigned("a, b = b, a"), vec!["a", "b"]);
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn control_flow_is_a_plain_statement() {
    for src in [
        "for i := range 10 { fmt.Println(i) }",
        "switch { case x > 1: fmt.Println(\"big\") }",
        "if err != nil { panic(err) }",
        "go func() { done <- true }()",
        "defer f.Close()",
        "{ x := 1; _ = x }",
    ] {
        let shape = classify(src).unwrap_or_else(|e| panic!("{:?} failed: {}", src, e));
        assert!(shape.declared.is_empty() && shape.assigned.is_empty(), "{:?}", src);
        assert!(shape.expression.is_none(), "{:?}", src);
    }
}

#[test]
fn multi_line_block_fragment() {
    let src = "for i := 0; i < 3; i++ {\n\tfmt.Println(i)\n}";
    let shape = classify(src).unwrap();
    assert_eq!(shape.expression, None);
}

#[test]
fn bare_expressions() {
    assert_eq!(classify("a * 3").unwrap().expression, Some(ExpressionKind::Value));
    assert_eq!(classify("\"text\"").unwrap().expression, Some(ExpressionKind::Value));
    assert_eq!(classify("os.Exit(1)").unwrap().expression, Some(ExpressionKind::Call));
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn incomplete_fragments_are_rejected() {
    assert_rejected("a := ");
    assert_rejected("for i := 0; i < 3; i++ {");
    assert_rejected("fmt.Println(");
    assert_rejected("x := []int{1, 2");
}

#[test]
fn multiple_statements_are_rejected() {
    assert_rejected("a := 1; b := 2");
    assert_rejected("x++; y++");
}

#[test]
fn top_level_only_declarations_are_rejected() {
    assert_rejected("func f() {}");
    assert_rejected("package main");
}

#[test]
fn lexical_errors_surface_as_parse_errors() {
    let err = classify("s := 'ab").unwrap_err();
    assert!(matches!(err, ParseError::Lex(_)), "got {:?}", err);
    assert!(err.to_string().starts_with("1:"));
}

#[test]
fn print_once_expressions() {
    assert!(parse_expression("len(s) + cap(s)").is_ok());
    assert!(parse_expression("x := 1").is_err());
}
