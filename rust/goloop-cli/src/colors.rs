//! ANSI color helpers for terminal output. `NO_COLOR` turns them off.

use std::sync::OnceLock;

fn enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var_os("NO_COLOR").is_none())
}

fn paint(code: &str, s: &str) -> String {
    if enabled() {
        format!("\x1b[{}m{}\x1b[0m", code, s)
    } else {
        s.to_string()
    }
}

/// Format text in red.
pub fn red(s: &str) -> String {
    paint("31", s)
}

/// Format text in cyan.
pub fn cyan(s: &str) -> String {
    paint("36", s)
}

/// Format text in gray.
pub fn gray(s: &str) -> String {
    paint("90", s)
}
