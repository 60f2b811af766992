use std::fmt::Write as _;

use anyhow::Result;
use dialoguer::{Confirm, theme::ColorfulTheme};

use crate::git::BranchDetail;
use crate::locale::Localizer;

const RULE_WIDTH: usize = 90;

/// Asks the final yes/no question before anything is deleted.
pub trait Confirmer {
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Terminal prompt defaulting to "no". Esc or q counts as "no".
pub struct TerminalConfirm;

impl Confirmer for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact_opt()?;
        Ok(answer.unwrap_or(false))
    }
}

/// Fixed-width summary of the branches about to be deleted.
pub fn render_table(details: &[BranchDetail], localizer: &Localizer) -> String {
    let mut table = String::new();
    let rule = "-".repeat(RULE_WIDTH);

    let _ = writeln!(
        table,
        "{:<20} {:<8} {:<20} {:<25} {}",
        localizer.tr("Branch"),
        localizer.tr("Hash"),
        localizer.tr("Author"),
        localizer.tr("Date"),
        localizer.tr("Message"),
    );
    let _ = writeln!(table, "{rule}");
    for detail in details {
        let _ = writeln!(
            table,
            "{:<20} {:<8} {:<20} {:<25} {}",
            detail.name,
            detail.short_hash(),
            detail.author,
            detail.date,
            detail.subject,
        );
    }
    let _ = writeln!(table, "{rule}");
    table
}
