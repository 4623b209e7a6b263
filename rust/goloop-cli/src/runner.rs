//! Build/run orchestration: stage the program, compile it, run it, capture
//! what it printed and say which step failed.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use strum::Display;
use tracing::{debug, warn};

use crate::config::{ConfigError, GoloopConfig};
use crate::diagnostics;

/// Describes how to compile a staged source file and how to launch the result.
/// Stdio redirection is owned by the [`Runner`].
pub trait Toolchain {
    fn compile_command(&self, source: &Path, artifact: &Path) -> Command;

    fn run_command(&self, artifact: &Path) -> Command {
        Command::new(artifact)
    }
}

/// `go build -o <artifact> [flags] <source>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoToolchain {
    pub go: OsString,
    pub build_flags: Vec<String>,
}

impl GoToolchain {
    pub fn new(go: impl Into<OsString>, build_flags: Vec<String>) -> Self {
        Self { go: go.into(), build_flags }
    }

    pub fn from_config(config: &GoloopConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(&config.toolchain.go, config.build_flags()?))
    }
}

impl Toolchain for GoToolchain {
    fn compile_command(&self, source: &Path, artifact: &Path) -> Command {
        let mut cmd = Command::new(&self.go);
        cmd.arg("build").arg("-o").arg(artifact).args(&self.build_flags).arg(source);
        cmd
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Outcome {
    #[strum(serialize = "success")]
    Success,
    #[strum(serialize = "generation failure")]
    GenerationFailure,
    #[strum(serialize = "compile failure")]
    CompileFailure,
    #[strum(serialize = "runtime failure")]
    RuntimeFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub outcome: Outcome,
    /// Program stdout on success, otherwise the failure text
    pub output: String,
}

impl BuildReport {
    fn new(outcome: Outcome, output: impl Into<String>) -> Self {
        Self { outcome, output: output.into() }
    }

    pub fn is_success(&self) -> bool { self.outcome == Outcome::Success }
}

/// File names used for one build attempt, all inside the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingPaths {
    pub source: PathBuf,
    pub artifact: PathBuf,
    pub build_log: PathBuf,
    pub run_log: PathBuf,
    pub err_log: PathBuf,
}

impl StagingPaths {
    pub fn new(dir: &Path, image: &str) -> Self {
        Self {
            source: dir.join(format!("{}.go", image)),
            artifact: dir.join(format!("{}{}", image, std::env::consts::EXE_SUFFIX)),
            build_log: dir.join(format!("{}.build.log", image)),
            run_log: dir.join(format!("{}.run.log", image)),
            err_log: dir.join(format!("{}.err.log", image)),
        }
    }

    fn scratch(&self) -> [&Path; 4] {
        [&self.artifact, &self.build_log, &self.run_log, &self.err_log]
    }
}

pub struct Runner<T: Toolchain> {
    toolchain: T,
    staging: StagingPaths,
    keep_source: bool,
}

impl<T: Toolchain> Runner<T> {
    pub fn new(toolchain: T, staging: StagingPaths, keep_source: bool) -> Self {
        Self { toolchain, staging, keep_source }
    }

    pub fn staging(&self) -> &StagingPaths { &self.staging }

    /// Runs one generate, compile, run cycle. Staging files are removed
    /// afterwards whatever the outcome; the source survives when `keep_source` is set.
    pub fn build_and_run(&self, program: &str) -> BuildReport {
        let report = self.attempt(program);
        debug!(outcome = %report.outcome, "build finished");
        for path in self.staging.scratch() {
            remove_quietly(path);
        }
        if !self.keep_source {
            remove_quietly(&self.staging.source);
        }
        report
    }

    /// Removes every staging file, the source included.
    pub fn cleanup(&self) {
        for path in self.staging.scratch() {
            remove_quietly(path);
        }
        remove_quietly(&self.staging.source);
    }

    fn attempt(&self, program: &str) -> BuildReport {
        let paths = &self.staging;
        if let Err(e) = fs::write(&paths.source, program) {
            return BuildReport::new(Outcome::GenerationFailure, format!("generate Go source failed: {}", e));
        }
        debug!(path = %paths.source.display(), bytes = program.len(), "wrote staging source");

        match self.compile() {
            Ok(status) if status.success() => {}
            Ok(status) => {
                debug!(%status, "compiler reported errors");
                let log = read_capture(&paths.build_log);
                return BuildReport::new(Outcome::CompileFailure, diagnostics::filter_noise(&log));
            }
            Err(e) => return BuildReport::new(Outcome::CompileFailure, format!("cannot run compiler: {}", e)),
        }

        match self.run() {
            Ok(status) => {
                let stdout = read_capture(&paths.run_log);
                let stderr = read_capture(&paths.err_log);
                if status.success() && stderr.is_empty() {
                    BuildReport::new(Outcome::Success, stdout)
                } else {
                    debug!(%status, stderr_bytes = stderr.len(), "program failed");
                    let mut output = stdout + &stderr;
                    if output.trim().is_empty() {
                        output = status.to_string();
                    }
                    BuildReport::new(Outcome::RuntimeFailure, output)
                }
            }
            Err(e) => BuildReport::new(Outcome::RuntimeFailure, format!("cannot run program: {}", e)),
        }
    }

    fn compile(&self) -> io::Result<ExitStatus> {
        let paths = &self.staging;
        let log = File::create(&paths.build_log)?;
        let mut cmd = self.toolchain.compile_command(&paths.source, &paths.artifact);
        cmd.stdin(Stdio::null()).stdout(Stdio::from(log.try_clone()?)).stderr(Stdio::from(log));
        debug!(?cmd, "compiling");
        cmd.status()
    }

    fn run(&self) -> io::Result<ExitStatus> {
        let paths = &self.staging;
        let mut cmd = self.toolchain.run_command(&paths.artifact);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(File::create(&paths.run_log)?))
            .stderr(Stdio::from(File::create(&paths.err_log)?));
        debug!(?cmd, "running");
        cmd.status()
    }
}

fn read_capture(path: &Path) -> String {
    match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read captured output");
            String::new()
        }
    }
}

fn remove_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "cannot remove staging file"),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// Shell stand-in for `go build`: "compiles" by writing a script that
    /// echoes what the source asks for.
    struct ScriptToolchain;

    const FAKE_BUILD: &str = r##"src="$1"; out="$2"
if grep -q undefinedThing "$src"; then
  echo "# command-line-arguments"
  echo "$src:14:2: undefined: undefinedThing"
  exit 1
fi
if grep -q 'panic(' "$src"; then
  printf '#!/bin/sh\necho boom >&2\nexit 2\n' > "$out"
else
  printf '#!/bin/sh\necho ok\n' > "$out"
fi
chmod +x "$out""##;

    impl Toolchain for ScriptToolchain {
        fn compile_command(&self, source: &Path, artifact: &Path) -> Command {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(FAKE_BUILD).arg("sh").arg(source).arg(artifact);
            cmd
        }
    }

    fn runner(dir: &Path, keep_source: bool) -> Runner<ScriptToolchain> {
        Runner::new(ScriptToolchain, StagingPaths::new(dir, "image"), keep_source)
    }

    fn leftovers(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_success_captures_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let report = runner(dir.path(), false).build_and_run("package main\n");
        assert_eq!(report, BuildReport::new(Outcome::Success, "ok\n"));
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn test_compile_failure_drops_noise() {
        let dir = tempfile::tempdir().unwrap();
        let report = runner(dir.path(), false).build_and_run("undefinedThing\n");
        assert_eq!(report.outcome, Outcome::CompileFailure);
        assert!(!report.output.contains("# command-line-arguments"));
        assert!(report.output.ends_with(":14:2: undefined: undefinedThing"));
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn test_stderr_output_is_a_runtime_failure() {
        let dir = tempfile::tempdir().unwrap();
        let report = runner(dir.path(), false).build_and_run("panic(1)\n");
        assert_eq!(report.outcome, Outcome::RuntimeFailure);
        assert_eq!(report.output, "boom\n");
    }

    #[test]
    fn test_keep_source_leaves_only_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let r = runner(dir.path(), true);
        assert!(r.build_and_run("package main\n").is_success());
        assert_eq!(leftovers(dir.path()), vec!["image.go"]);
        r.cleanup();
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn test_missing_staging_dir_is_a_generation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let report = runner(&dir.path().join("absent"), false).build_and_run("package main\n");
        assert_eq!(report.outcome, Outcome::GenerationFailure);
    }

    #[test]
    fn test_missing_compiler_is_a_compile_failure() {
        let dir = tempfile::tempdir().unwrap();
        let go = GoToolchain::new("/nonexistent/go", Vec::new());
        let report = Runner::new(go, StagingPaths::new(dir.path(), "image"), false).build_and_run("package main\n");
        assert_eq!(report.outcome, Outcome::CompileFailure);
        assert!(report.output.starts_with("cannot run compiler"));
    }

    #[test]
    fn test_go_compile_command() {
        let go = GoToolchain::new("go", vec!["-race".to_string()]);
        let cmd = go.compile_command(Path::new("/s/image.go"), Path::new("/s/image"));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["build", "-o", "/s/image", "-race", "/s/image.go"]);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::CompileFailure.to_string(), "compile failure");
    }
}
