//! goloop: an interactive Go session that keeps the accumulated program
//! building and running after every line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use goloop_cli::colors::red;
use goloop_cli::config::GoloopConfig;
use goloop_cli::repl::{run_repl, ReplOptions};
use goloop_cli::runner::{GoToolchain, Runner, StagingPaths};
use goloop_cli::session::{prepare_staging, Session, SessionSetupError};
use goloop_cli::transcript::Transcript;

const LOG_ENV: &str = "GOLOOP_LOG";

#[derive(ClapParser)]
#[command(name = "goloop", version, about = "Interactive Go: submit a line, build, run, keep what works")]
struct Cli {
    /// Project name: staging base name and `<PROJECT>.changes` transcript
    #[arg()]
    project: Option<String>,

    /// Log every build step and keep the generated source
    #[arg(long)]
    debug: bool,

    /// Go driver to use instead of the configured one
    #[arg(long, value_name = "PATH")]
    go: Option<String>,

    /// Read configuration from this file instead of searching for goloop.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for the generated source, binary and captured output
    #[arg(long, value_name = "DIR")]
    staging_dir: Option<PathBuf>,

    /// Do not load or save line-editing history
    #[arg(long)]
    no_history: bool,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(std::io::stderr)).init();
}

fn load_config(cli: &Cli) -> Result<GoloopConfig, SessionSetupError> {
    let mut config = match &cli.config {
        Some(path) => GoloopConfig::load_from(path)?,
        None => GoloopConfig::load()?,
    };
    if let Some(go) = &cli.go {
        config.toolchain.go = go.clone();
    }
    if let Some(dir) = &cli.staging_dir {
        config.session.staging_dir = dir.clone();
    }
    if let Some(project) = &cli.project {
        config.session.image = project.clone();
    }
    if cli.debug {
        config.session.keep_source = true;
    }
    if cli.no_history {
        config.session.history = false;
    }
    Ok(config)
}

fn build_session(cli: &Cli, config: &GoloopConfig) -> Result<Session<GoToolchain>, SessionSetupError> {
    let staging_dir = prepare_staging(&config.session.staging_dir)?;
    let toolchain = GoToolchain::from_config(config)?;
    let staging = StagingPaths::new(&staging_dir, &config.session.image);
    tracing::debug!(dir = %staging_dir.display(), image = %config.session.image, "staging ready");

    let session = Session::new(Runner::new(toolchain, staging, config.session.keep_source));
    Ok(match &cli.project {
        Some(project) => session.with_transcript(Transcript::new(&staging_dir, project)),
        None => session,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let setup = load_config(&cli).and_then(|config| Ok((build_session(&cli, &config)?, config)));
    let (session, config) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("{} {}", red("error:"), e);
            return ExitCode::FAILURE;
        }
    };

    let options = ReplOptions { history: config.session.history };
    match run_repl(session, &options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", red("error:"), e);
            ExitCode::FAILURE
        }
    }
}
