//! Shared fixtures: a shell stand-in for the Go toolchain and session builders.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

use goloop_cli::runner::{GoToolchain, Runner, StagingPaths, Toolchain};
use goloop_cli::session::Session;
use goloop_cli::transcript::Transcript;

/// "Compiles" by inspecting the generated source:
/// - `undefinedThing` anywhere is reported as a compile error on its real line,
/// - `panic(` produces a program that writes `boom` to stderr and exits 2,
/// - anything else produces a program that prints `ok`.
pub struct FakeGo;

const FAKE_BUILD: &str = r##"src="$1"; out="$2"
line=$(grep -n undefinedThing "$src" | head -n 1 | cut -d: -f1)
if [ -n "$line" ]; then
  echo "# command-line-arguments"
  echo "$src:$line:14: undefined: undefinedThing"
  exit 1
fi
if grep -q 'panic(' "$src"; then
  printf '#!/bin/sh\necho boom >&2\nexit 2\n' > "$out"
else
  printf '#!/bin/sh\necho ok\n' > "$out"
fi
chmod +x "$out""##;

impl Toolchain for FakeGo {
    fn compile_command(&self, source: &Path, artifact: &Path) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(FAKE_BUILD).arg("sh").arg(source).arg(artifact);
        cmd
    }
}

pub fn fake_session(dir: &Path) -> Session<FakeGo> {
    Session::new(Runner::new(FakeGo, StagingPaths::new(dir, "image"), false))
}

/// Like [`fake_session`], but the generated `image.go` survives each build.
pub fn fake_session_keeping_source(dir: &Path) -> Session<FakeGo> {
    Session::new(Runner::new(FakeGo, StagingPaths::new(dir, "image"), true))
}

pub fn fake_project(dir: &Path, project: &str) -> Session<FakeGo> {
    fake_session(dir).with_transcript(Transcript::new(dir, project))
}

/// Whether a working `go` is on PATH.
pub fn go_available() -> bool {
    Command::new("go").arg("version").output().map(|o| o.status.success()).unwrap_or(false)
}

pub fn go_session(dir: &Path) -> Session<GoToolchain> {
    Session::new(Runner::new(GoToolchain::new("go", Vec::new()), StagingPaths::new(dir, "image"), false))
}
