mod app;
mod cli;
mod confirm;
mod delete;
mod fzf;
mod git;
mod locale;
mod markup;
mod select;
mod tui;
mod ui;
mod workflow;

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, SelectorKind, prescan_lang};
use crate::confirm::TerminalConfirm;
use crate::fzf::FzfSelector;
use crate::git::{GitCli, discover_workdir};
use crate::locale::{Language, Localizer};
use crate::select::Selector;
use crate::tui::CheckboxSelector;
use crate::workflow::{FatalError, Options, Outcome, Workflow};

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().collect();

    let language = Language::from_env(prescan_lang(&args).as_deref());
    let localizer = match Localizer::for_language(language) {
        Ok(localizer) => localizer,
        Err(err) => {
            eprintln!("{err:#}");
            return ExitCode::FAILURE;
        }
    };

    let cli = Cli::parse_localized(args, &localizer);
    init_logging(cli.verbose);

    if let Some(branch) = cli.preview_branch.as_deref() {
        return match preview(&cli, branch) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("{err:#}");
                ExitCode::FAILURE
            }
        };
    }

    match run(&cli, &localizer) {
        Ok(outcome) => {
            debug!(?outcome, "run finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let detail = err.to_string();
            eprintln!(
                "{}",
                localizer.tr_with(err.message_key(), &[("Error", detail.as_str())])
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Logs share the terminal with the selector, so keep them off stdout.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli, localizer: &Localizer) -> Result<Outcome, FatalError> {
    let workdir = discover_workdir(cli.repo.as_deref()).map_err(FatalError::Repository)?;
    debug!(workdir = %workdir.display(), "using repository");
    let git = GitCli::new(workdir.clone());

    let mut selector: Box<dyn Selector + '_> = match cli.selector {
        SelectorKind::Fzf => {
            let exe = std::env::current_exe().map_err(FatalError::ExecutablePath)?;
            Box::new(FzfSelector::new(
                cli.fzf_bin.clone(),
                &exe,
                &workdir,
                localizer,
            ))
        }
        SelectorKind::Builtin => Box::new(CheckboxSelector::new(localizer)),
    };

    let options = Options {
        list_only: cli.list_only,
        dry_run: cli.dry_run,
    };

    Workflow::new(localizer, io::stdout(), options).run(
        &git,
        selector.as_mut(),
        &mut TerminalConfirm,
    )
}

/// Entry point for fzf's preview window: recent history of one branch.
fn preview(cli: &Cli, branch: &str) -> Result<()> {
    let workdir = discover_workdir(cli.repo.as_deref())?;
    let history = GitCli::new(workdir)
        .history(branch)
        .with_context(|| format!("Failed to read history of '{branch}'"))?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(history.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
