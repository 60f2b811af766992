use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use git2::Repository;
use thiserror::Error;
use tracing::debug;

use crate::markup::strip_ansi;

/// Pretty format producing hash, author, date and subject on separate lines.
const DETAIL_FORMAT: &str = "--pretty=format:%H%n%an%n%ad%n%s";
const DETAIL_FIELDS: usize = 4;
const PREVIEW_DEPTH: &str = "30";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchCandidate {
    pub name: String,
    pub merged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchDetail {
    pub name: String,
    pub hash: String,
    pub author: String,
    pub date: String,
    pub subject: String,
}

impl BranchDetail {
    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(8)
            .map(|(index, _)| index)
            .unwrap_or(self.hash.len());
        &self.hash[..end]
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run `git {args}`: {source}")]
    Spawn {
        args: String,
        #[source]
        source: io::Error,
    },
    #[error("`git {args}` exited with {}{}", code_label(.code), output_suffix(.output))]
    Status {
        args: String,
        code: Option<i32>,
        output: String,
    },
}

fn code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

fn output_suffix(output: &str) -> String {
    if output.is_empty() {
        String::new()
    } else {
        format!(": {output}")
    }
}

#[derive(Debug, Error)]
pub enum ListError {
    #[error("{0}")]
    CurrentBranch(CommandError),
    #[error("{0}")]
    Branches(CommandError),
    #[error("{0}")]
    Merged(CommandError),
}

#[derive(Debug, Error)]
pub enum DetailError {
    #[error("{0}")]
    Query(CommandError),
    #[error("expected 4 fields from git log, got {fields}: {output:?}")]
    Malformed { fields: usize, output: String },
}

/// The version-control operations the workflow needs.
pub trait Git {
    fn current_branch(&self) -> Result<String, ListError>;
    fn local_branches(&self) -> Result<Vec<String>, ListError>;
    fn merged_branches(&self) -> Result<Vec<String>, ListError>;
    fn branch_detail(&self, name: &str) -> Result<BranchDetail, DetailError>;
    /// Non-forced delete. Returns git's own report on success.
    fn delete_branch(&self, name: &str) -> Result<String, CommandError>;
}

/// Runs the `git` executable inside a repository work tree.
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }

    pub fn history(&self, name: &str) -> Result<String, CommandError> {
        self.run(&[
            "log",
            "--oneline",
            "--graph",
            "--decorate",
            "--color=always",
            "-n",
            PREVIEW_DEPTH,
            name,
            "--",
        ])
    }

    fn run(&self, args: &[&str]) -> Result<String, CommandError> {
        let joined = args.join(" ");
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.workdir)
            .args(args)
            .output()
            .map_err(|source| CommandError::Spawn {
                args: joined.clone(),
                source,
            })?;

        debug!(args = %joined, status = %output.status, "git finished");

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let text = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        Err(CommandError::Status {
            args: joined,
            code: output.status.code(),
            output: text,
        })
    }
}

impl Git for GitCli {
    fn current_branch(&self) -> Result<String, ListError> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
            .map(|out| out.trim().to_string())
            .map_err(ListError::CurrentBranch)
    }

    fn local_branches(&self) -> Result<Vec<String>, ListError> {
        self.run(&["branch", "--no-column", "--no-color"])
            .map(|out| parse_branch_listing(&out))
            .map_err(ListError::Branches)
    }

    fn merged_branches(&self) -> Result<Vec<String>, ListError> {
        self.run(&["branch", "--merged", "--no-column", "--no-color"])
            .map(|out| parse_branch_listing(&out))
            .map_err(ListError::Merged)
    }

    fn branch_detail(&self, name: &str) -> Result<BranchDetail, DetailError> {
        let out = self
            .run(&["log", "-1", DETAIL_FORMAT, name, "--"])
            .map_err(DetailError::Query)?;
        parse_commit_detail(name, &out)
    }

    fn delete_branch(&self, name: &str) -> Result<String, CommandError> {
        self.run(&["branch", "-d", name])
            .map(|out| out.trim().to_string())
    }
}

/// Finds the repository containing `path` (or the current directory) and
/// returns the directory git commands should run in.
pub fn discover_workdir(path: Option<&Path>) -> Result<PathBuf> {
    let start = path.unwrap_or_else(|| Path::new("."));
    let repo = Repository::discover(start)
        .with_context(|| format!("Failed to discover a Git repository from {}", start.display()))?;
    let dir = repo.workdir().unwrap_or_else(|| repo.path());
    Ok(dir.to_path_buf())
}

/// Parses `git branch` output into bare names, in the order git printed them.
pub fn parse_branch_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let line = strip_ansi(line);
            let line = line.trim();
            let name = line
                .strip_prefix("* ")
                .or_else(|| line.strip_prefix("+ "))
                .unwrap_or(line)
                .trim();
            // "(HEAD detached at ...)" and similar pseudo entries
            if name.is_empty() || name.starts_with('(') {
                None
            } else {
                Some(name.to_string())
            }
        })
        .collect()
}

pub fn parse_commit_detail(name: &str, output: &str) -> Result<BranchDetail, DetailError> {
    let fields: Vec<&str> = output
        .split('\n')
        .map(|field| field.strip_suffix('\r').unwrap_or(field))
        .collect();

    if fields.len() < DETAIL_FIELDS {
        return Err(DetailError::Malformed {
            fields: fields.len(),
            output: output.to_string(),
        });
    }

    Ok(BranchDetail {
        name: name.to_string(),
        hash: fields[0].trim().to_string(),
        author: fields[1].to_string(),
        date: fields[2].to_string(),
        subject: fields[3].to_string(),
    })
}

/// Local branches other than the checked-out one. Any git failure here is
/// fatal to the run.
pub fn list_candidates<G: Git + ?Sized>(git: &G) -> Result<(String, Vec<String>), ListError> {
    let current = git.current_branch()?;
    let mut names = git.local_branches()?;
    names.retain(|name| *name != current);
    Ok((current, names))
}

/// Tags each name with whether it is merged into HEAD. A failed lookup is
/// handed back alongside candidates that are all marked unmerged.
pub fn annotate_merged<G: Git + ?Sized>(
    git: &G,
    names: Vec<String>,
) -> (Vec<BranchCandidate>, Option<ListError>) {
    let (merged, warning) = match git.merged_branches() {
        Ok(merged) => (merged.into_iter().collect::<HashSet<_>>(), None),
        Err(err) => (HashSet::new(), Some(err)),
    };

    let candidates = names
        .into_iter()
        .map(|name| BranchCandidate {
            merged: merged.contains(&name),
            name,
        })
        .collect();
    (candidates, warning)
}
