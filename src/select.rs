use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::git::BranchCandidate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Chosen candidates in the order the selector reported them. May be empty.
    Chosen(Vec<BranchCandidate>),
    /// The user backed out (Esc, Ctrl-C, q).
    Cancelled,
}

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("failed to start {}: {source}", .program.display())]
    Unavailable {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} exited with {}", .program.display(), status_label(.code))]
    Failed { program: PathBuf, code: Option<i32> },
    #[error(transparent)]
    Terminal(#[from] io::Error),
}

fn status_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

pub trait Selector {
    fn select(&mut self, candidates: &[BranchCandidate]) -> Result<Selection, SelectError>;
}

/// Maps names reported by a selector back onto the candidates they came from,
/// keeping the reported order. Unknown names and repeats are dropped.
pub fn resolve_chosen<I>(candidates: &[BranchCandidate], names: I) -> Vec<BranchCandidate>
where
    I: IntoIterator<Item = String>,
{
    let by_name: HashMap<&str, &BranchCandidate> = candidates
        .iter()
        .map(|candidate| (candidate.name.as_str(), candidate))
        .collect();
    let mut picked = HashSet::new();
    let mut chosen = Vec::new();

    for name in names {
        if let Some(&candidate) = by_name.get(name.as_str()) {
            if picked.insert(name) {
                chosen.push(candidate.clone());
            }
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<BranchCandidate> {
        ["alpha", "beta", "gamma"]
            .into_iter()
            .map(|name| BranchCandidate {
                name: name.to_string(),
                merged: name == "beta",
            })
            .collect()
    }

    #[test]
    fn keeps_selector_order() {
        let chosen = resolve_chosen(&candidates(), ["gamma".to_string(), "alpha".to_string()]);
        let names: Vec<_> = chosen.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["gamma", "alpha"]);
    }

    #[test]
    fn drops_unknown_and_repeated_names() {
        let chosen = resolve_chosen(
            &candidates(),
            ["beta", "delta", "beta"].map(String::from),
        );
        assert_eq!(chosen.len(), 1);
        assert!(chosen[0].merged);
    }

    #[test]
    fn resolves_every_name_of_a_large_selection() {
        let many: Vec<_> = (0..20_000)
            .map(|i| BranchCandidate {
                name: format!("topic/{i:05}"),
                merged: false,
            })
            .collect();
        let reversed = many.iter().rev().map(|c| c.name.clone());

        let chosen = resolve_chosen(&many, reversed);
        assert_eq!(chosen.len(), many.len());
        assert_eq!(chosen[0].name, "topic/19999");
        assert_eq!(chosen[19_999].name, "topic/00000");
    }
}
