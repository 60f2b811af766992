use std::sync::LazyLock;

use crossterm::style::Stylize;
use regex::Regex;

use crate::git::BranchCandidate;

/// CSI sequences (colors, cursor movement) and OSC sequences (hyperlinks).
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b(?:\[[0-9;?]*[ -/]*[@-~]|\][^\x07\x1b]*(?:\x07|\x1b\\))")
        .expect("ANSI escape pattern is valid")
});

const INDICATOR_START: &str = " (";

/// Recovers a bare branch name from a decorated display line: escape
/// sequences are removed, then everything from the first `" ("` on.
pub fn strip_markup(decorated: &str) -> String {
    let text = strip_ansi(decorated);

    let bare = match text.find(INDICATOR_START) {
        Some(index) => &text[..index],
        None => &text[..],
    };
    bare.trim().to_string()
}

pub fn strip_ansi(text: &str) -> String {
    let mut text = text.to_string();
    // Removing one sequence can splice the halves of another together.
    loop {
        let stripped = ANSI_ESCAPE.replace_all(&text, "").into_owned();
        if stripped == text {
            return text;
        }
        text = stripped;
    }
}

/// Renders a candidate for display in a terminal selector. Merged branches get
/// a trailing `" (<label>)"` indicator; `strip_markup` undoes both.
pub fn decorate(candidate: &BranchCandidate, merged_label: &str) -> String {
    if candidate.merged {
        format!(
            "{}{INDICATOR_START}{})",
            candidate.name.as_str().green(),
            merged_label.dark_grey()
        )
    } else {
        format!("{}", candidate.name.as_str().yellow())
    }
}
