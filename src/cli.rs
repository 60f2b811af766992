use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgAction, CommandFactory, FromArgMatches, Parser, ValueEnum, ValueHint};

use crate::locale::Localizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SelectorKind {
    /// Pipe candidates through the fzf fuzzy finder.
    Fzf,
    /// Built-in checkbox list.
    Builtin,
}

#[derive(Debug, Parser)]
#[command(
    name = "us-fuzzy-branch-delete",
    about = "Interactive helper to pick, review and delete local Git branches",
    version,
    disable_help_flag = true
)]
pub struct Cli {
    /// Show help
    #[arg(short, long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Specify the language (e.g., en, ja)
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Path to the Git repository (defaults to current directory).
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub repo: Option<PathBuf>,

    /// How branches are picked.
    #[arg(long, value_enum, default_value_t = SelectorKind::Fzf)]
    pub selector: SelectorKind,

    /// fzf executable used by `--selector fzf`.
    #[arg(long, value_hint = ValueHint::CommandName, default_value = "fzf")]
    pub fzf_bin: PathBuf,

    /// Only list candidate branches with their merge status.
    #[arg(long)]
    pub list_only: bool,

    /// Show what would happen without deleting.
    #[arg(long)]
    pub dry_run: bool,

    /// Log git invocations to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print recent history of a branch (used by the fzf preview window).
    #[arg(long, value_name = "BRANCH", hide = true)]
    pub preview_branch: Option<String>,
}

impl Cli {
    /// Parses `args` with help text taken from `localizer`. Exits the process
    /// on `--help`, `--version` or a usage error, like `Parser::parse`.
    pub fn parse_localized<I, T>(args: I, localizer: &Localizer) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let command = Self::command()
            .about(localizer.tr("HelpDescription"))
            .override_usage(localizer.tr("HelpUsage"))
            .mut_arg("help", |arg| arg.help(localizer.tr("HelpFlag")))
            .mut_arg("lang", |arg| arg.help(localizer.tr("HelpLangFlag")));

        let matches = command.get_matches_from(args);
        Self::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
    }
}

/// Finds a `--lang` value before full parsing so `--help` can be localized.
pub fn prescan_lang(args: &[OsString]) -> Option<String> {
    let mut iter = args.iter().skip(1).filter_map(|arg| arg.to_str());
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }
        if arg == "--lang" {
            return iter.next().map(str::to_string);
        }
        if let Some(value) = arg.strip_prefix("--lang=") {
            return Some(value.to_string());
        }
    }
    None
}
