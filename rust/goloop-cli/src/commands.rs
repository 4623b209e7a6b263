//! Recognition of control commands and of input that continues on the next line.

use goloop_syntax::lexer::{LexError, Lexer};
use goloop_syntax::tokens::TokenKind;

pub const HELP: &str = "[goloop] .q = quit, !<source> = eval once, =<source> = print once, \
                        .v = variables, .s = source, .u = undo, .? = help";

/// Control commands, for completion.
pub const COMMANDS: &[&str] = &[".q", ".v", ".s", ".u", ".?"];

#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand<'a> {
    Quit,
    Variables,
    Source,
    Undo,
    Help,
    EvalOnce(&'a str),
    PrintOnce(&'a str),
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    Empty,
    Command(ReplCommand<'a>),
    UnknownCommand(&'a str),
    Fragment(&'a str),
}

/// Commands are matched by prefix on the trimmed line, so `.quit` quits.
pub fn parse_line(line: &str) -> ParsedLine<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ParsedLine::Empty;
    }
    let command = if let Some(rest) = trimmed.strip_prefix('.') {
        match rest.chars().next() {
            Some('q') => ReplCommand::Quit,
            Some('v') => ReplCommand::Variables,
            Some('s') => ReplCommand::Source,
            Some('u') => ReplCommand::Undo,
            Some('?') => ReplCommand::Help,
            _ => return ParsedLine::UnknownCommand(trimmed),
        }
    } else if let Some(expr) = trimmed.strip_prefix('=') {
        ReplCommand::PrintOnce(expr)
    } else if let Some(fragment) = trimmed.strip_prefix('!') {
        ReplCommand::EvalOnce(fragment)
    } else {
        return ParsedLine::Fragment(trimmed);
    };
    ParsedLine::Command(command)
}

/// Whether `input` has unclosed brackets, or an unterminated raw string or
/// block comment, and so continues on the next line.
pub fn needs_more_input(input: &str) -> bool {
    let tokens = match Lexer::new(input).tokenize() {
        Ok(tokens) => tokens,
        Err(LexError::UnterminatedRawString { .. } | LexError::UnterminatedComment { .. }) => return true,
        // let the parser report it
        Err(_) => return false,
    };
    let mut depth: i32 = 0;
    for token in &tokens {
        match token.kind {
            TokenKind::LParen | TokenKind::LBrack | TokenKind::LBrace => depth += 1,
            TokenKind::RParen | TokenKind::RBrack | TokenKind::RBrace => depth -= 1,
            _ => {}
        }
    }
    depth > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line(".q"), ParsedLine::Command(ReplCommand::Quit));
        assert_eq!(parse_line("  .quit "), ParsedLine::Command(ReplCommand::Quit));
        assert_eq!(parse_line(".v"), ParsedLine::Command(ReplCommand::Variables));
        assert_eq!(parse_line(".s"), ParsedLine::Command(ReplCommand::Source));
        assert_eq!(parse_line(".u"), ParsedLine::Command(ReplCommand::Undo));
        assert_eq!(parse_line(".?"), ParsedLine::Command(ReplCommand::Help));
        assert_eq!(parse_line("=a+1"), ParsedLine::Command(ReplCommand::PrintOnce("a+1")));
        assert_eq!(
            parse_line("!fmt.Println(1)"),
            ParsedLine::Command(ReplCommand::EvalOnce("fmt.Println(1)"))
        );
    }

    #[test]
    fn test_parse_other_lines() {
        assert_eq!(parse_line(".x"), ParsedLine::UnknownCommand(".x"));
        assert_eq!(parse_line("   "), ParsedLine::Empty);
        assert_eq!(parse_line("\ta := 1"), ParsedLine::Fragment("a := 1"));
    }

    #[test]
    fn test_needs_more_input() {
        assert!(needs_more_input("for i := 0; i < 3; i++ {"));
        assert!(needs_more_input("fmt.Println("));
        assert!(needs_more_input("s := `first line"));
        assert!(needs_more_input("x := 1 /* still"));
        assert!(!needs_more_input("for {}"));
        assert!(!needs_more_input("s := \"{\""));
        assert!(!needs_more_input("a := }"));
        assert!(!needs_more_input("s := \"open"));
    }
}
