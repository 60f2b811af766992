use tracing::debug;

use crate::git::Git;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    pub name: String,
    pub status: DeleteStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Deleted; carries git's own report.
    Deleted(String),
    DryRun,
    Error(String),
}

/// Deletes each branch independently. A failure is recorded and the rest are
/// still attempted; nothing already deleted is restored.
pub fn delete_branches<G: Git + ?Sized>(
    git: &G,
    names: &[String],
    dry_run: bool,
) -> Vec<DeleteResult> {
    let mut results = Vec::with_capacity(names.len());

    for name in names {
        if dry_run {
            results.push(DeleteResult {
                name: name.clone(),
                status: DeleteStatus::DryRun,
            });
            continue;
        }

        let status = match git.delete_branch(name) {
            Ok(report) => DeleteStatus::Deleted(report),
            Err(err) => {
                debug!(branch = %name, error = %err, "delete failed");
                DeleteStatus::Error(err.to_string())
            }
        };

        results.push(DeleteResult {
            name: name.clone(),
            status,
        });
    }

    results
}
