use std::io::{self, Write};

use thiserror::Error;
use tracing::{debug, warn};

use crate::confirm::{Confirmer, render_table};
use crate::delete::{DeleteStatus, delete_branches};
use crate::git::{BranchCandidate, Git, ListError, annotate_merged, list_candidates};
use crate::locale::Localizer;
use crate::select::{SelectError, Selection, Selector};

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub list_only: bool,
    pub dry_run: bool,
}

/// How a run that did not hit a fatal error ended. Every variant exits 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NothingToDelete,
    Listed,
    NothingSelected,
    SelectionCancelled,
    NoDetails,
    Declined,
    Finished { deleted: usize, failed: usize },
}

#[derive(Debug, Error)]
pub enum FatalError {
    #[error("{0:#}")]
    Repository(anyhow::Error),
    #[error(transparent)]
    List(#[from] ListError),
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error("{0}")]
    ExecutablePath(io::Error),
    #[error("{0:#}")]
    Prompt(anyhow::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl FatalError {
    /// Catalog id of the message shown before exiting.
    pub fn message_key(&self) -> &'static str {
        match self {
            FatalError::Repository(_) => "ErrorOpeningRepository",
            FatalError::List(ListError::CurrentBranch(_)) => "ErrorGettingCurrentBranch",
            FatalError::List(_) => "ErrorRunningGitBranch",
            FatalError::Select(SelectError::Unavailable { .. }) => "ErrorSelectorUnavailable",
            FatalError::Select(SelectError::Failed { .. }) => "ErrorSelectorFailed",
            FatalError::Select(SelectError::Terminal(_)) => "ErrorTerminal",
            FatalError::ExecutablePath(_) => "ErrorExecutablePath",
            FatalError::Prompt(_) | FatalError::Output(_) => "ErrorTerminal",
        }
    }
}

pub struct Workflow<'a, W> {
    localizer: &'a Localizer,
    out: W,
    options: Options,
}

impl<'a, W: Write> Workflow<'a, W> {
    pub fn new(localizer: &'a Localizer, out: W, options: Options) -> Self {
        Self {
            localizer,
            out,
            options,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn run(
        &mut self,
        git: &dyn Git,
        selector: &mut dyn Selector,
        confirmer: &mut dyn Confirmer,
    ) -> Result<Outcome, FatalError> {
        let (current, names) = list_candidates(git)?;
        debug!(current = %current, candidates = names.len(), "listed branches");

        if names.is_empty() {
            self.say("NoBranchesToDelete", &[])?;
            return Ok(Outcome::NothingToDelete);
        }

        let (candidates, warning) = annotate_merged(git, names);
        if let Some(err) = warning {
            warn!(error = %err, "merged-branch lookup failed");
            self.say("WarningMergedStatus", &[("Error", err.to_string().as_str())])?;
        }

        if self.options.list_only {
            self.print_listing(&current, &candidates)?;
            return Ok(Outcome::Listed);
        }

        let chosen = match selector.select(&candidates)? {
            Selection::Cancelled => {
                self.say("SelectionCancelled", &[])?;
                return Ok(Outcome::SelectionCancelled);
            }
            Selection::Chosen(chosen) if chosen.is_empty() => {
                self.say("NoBranchesSelected", &[])?;
                return Ok(Outcome::NothingSelected);
            }
            Selection::Chosen(chosen) => chosen,
        };
        let names: Vec<String> = chosen.into_iter().map(|candidate| candidate.name).collect();

        let mut details = Vec::with_capacity(names.len());
        for name in &names {
            match git.branch_detail(name) {
                Ok(detail) => details.push(detail),
                Err(err) => {
                    debug!(branch = %name, error = %err, "detail lookup failed");
                    self.say(
                        "ErrorGettingBranchDetails",
                        &[("Branch", name.as_str()), ("Error", err.to_string().as_str())],
                    )?;
                }
            }
        }

        if details.is_empty() {
            self.say("NoBranchesSelected", &[])?;
            return Ok(Outcome::NoDetails);
        }

        writeln!(self.out)?;
        self.say("ConfirmDeletion", &[])?;
        write!(self.out, "{}", render_table(&details, self.localizer))?;
        self.out.flush()?;

        let proceed = confirmer
            .confirm(&self.localizer.tr("ProceedWithDeletion"))
            .map_err(FatalError::Prompt)?;
        if !proceed {
            self.say("DeletionCancelled", &[])?;
            return Ok(Outcome::Declined);
        }

        // Every selected branch, including ones whose details could not be shown.
        let results = delete_branches(git, &names, self.options.dry_run);
        let mut deleted = 0;
        let mut failed = 0;
        for result in &results {
            let branch = result.name.as_str();
            match &result.status {
                DeleteStatus::Deleted(report) => {
                    deleted += 1;
                    self.say("BranchDeletedSuccessfully", &[("Branch", branch)])?;
                    if !report.is_empty() {
                        writeln!(self.out, "{report}")?;
                    }
                }
                DeleteStatus::DryRun => {
                    deleted += 1;
                    self.say("BranchWouldBeDeleted", &[("Branch", branch)])?;
                }
                DeleteStatus::Error(err) => {
                    failed += 1;
                    self.say(
                        "ErrorDeletingBranch",
                        &[("Branch", branch), ("Error", err.as_str())],
                    )?;
                }
            }
        }

        Ok(Outcome::Finished { deleted, failed })
    }

    fn print_listing(&mut self, current: &str, candidates: &[BranchCandidate]) -> io::Result<()> {
        self.say("CandidateListing", &[("Branch", current)])?;
        let merged = self.localizer.tr("Merged");
        let unmerged = self.localizer.tr("Unmerged");
        for candidate in candidates {
            let status = if candidate.merged { &merged } else { &unmerged };
            writeln!(self.out, "  {:<30} {status}", candidate.name)?;
        }
        Ok(())
    }

    fn say(&mut self, key: &str, args: &[(&str, &str)]) -> io::Result<()> {
        writeln!(self.out, "{}", self.localizer.tr_with(key, args))
    }
}
