use std::collections::HashMap;

use anyhow::{Context, Result};

const EN_CATALOG: &str = include_str!("../locales/en.json");
const JA_CATALOG: &str = include_str!("../locales/ja.json");

/// Environment variables consulted, in order, when no `--lang` is given.
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Japanese,
}

impl Language {
    /// Picks the language from an explicit code, then the locale environment.
    /// Unrecognized or missing values fall back to English.
    pub fn resolve<F>(explicit: Option<&str>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let code = explicit
            .filter(|code| !code.trim().is_empty())
            .map(str::to_string)
            .or_else(|| {
                LOCALE_VARS
                    .iter()
                    .filter_map(|&var| env(var))
                    .find(|value| !value.trim().is_empty())
            });

        match code.as_deref().map(two_letter_code).as_deref() {
            Some("ja") => Language::Japanese,
            _ => Language::English,
        }
    }

    pub fn from_env(explicit: Option<&str>) -> Self {
        Self::resolve(explicit, |var| std::env::var(var).ok())
    }

    fn catalog_source(self) -> &'static str {
        match self {
            Language::English => EN_CATALOG,
            Language::Japanese => JA_CATALOG,
        }
    }
}

fn two_letter_code(value: &str) -> String {
    value.trim().chars().take(2).collect::<String>().to_lowercase()
}

/// Resolves message ids to localized text. Built once per run and handed to
/// every stage that reports something to the user.
#[derive(Debug, Clone)]
pub struct Localizer {
    messages: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl Localizer {
    pub fn for_language(language: Language) -> Result<Self> {
        let fallback = parse_catalog(EN_CATALOG).context("Failed to parse English catalog")?;
        let messages = match language {
            Language::English => fallback.clone(),
            other => parse_catalog(other.catalog_source())
                .with_context(|| format!("Failed to parse {other:?} catalog"))?,
        };
        Ok(Self { messages, fallback })
    }

    #[cfg(test)]
    pub fn from_catalog(messages: HashMap<String, String>) -> Self {
        Self {
            messages,
            fallback: HashMap::new(),
        }
    }

    pub fn tr(&self, key: &str) -> String {
        self.tr_with(key, &[])
    }

    /// Looks up `key` and substitutes `{Name}` placeholders from `args`.
    pub fn tr_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        let template = self
            .messages
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(String::as_str)
            .unwrap_or(key);

        fill_placeholders(template, args)
    }
}

/// Replaces each `{Name}` in one pass, so substituted values are never
/// rescanned. Unknown or unterminated placeholders are copied through.
fn fill_placeholders(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = &after[..close];
        match args.iter().find(|(arg, _)| *arg == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

fn parse_catalog(source: &str) -> Result<HashMap<String, String>> {
    Ok(serde_json::from_str(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |var: &str| {
            pairs
                .iter()
                .find(|(name, _)| *name == var)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn explicit_flag_wins_over_environment() {
        let lang = Language::resolve(Some("ja"), env_of(&[("LANG", "en_US.UTF-8")]));
        assert_eq!(lang, Language::Japanese);
    }

    #[test]
    fn environment_prefix_selects_language() {
        assert_eq!(
            Language::resolve(None, env_of(&[("LANG", "ja_JP.UTF-8")])),
            Language::Japanese
        );
        assert_eq!(
            Language::resolve(None, env_of(&[("LC_ALL", "JA"), ("LANG", "en_US")])),
            Language::Japanese
        );
    }

    #[test]
    fn unknown_or_missing_language_defaults_to_english() {
        assert_eq!(
            Language::resolve(Some("fr"), env_of(&[])),
            Language::English
        );
        assert_eq!(Language::resolve(None, env_of(&[])), Language::English);
        assert_eq!(
            Language::resolve(Some(""), env_of(&[("LANG", "C")])),
            Language::English
        );
    }

    #[test]
    fn embedded_catalogs_share_keys() {
        let en = parse_catalog(EN_CATALOG).unwrap();
        let ja = parse_catalog(JA_CATALOG).unwrap();
        let mut missing: Vec<_> = en.keys().filter(|key| !ja.contains_key(*key)).collect();
        missing.sort();
        assert!(missing.is_empty(), "ja catalog is missing {missing:?}");
    }

    #[test]
    fn substitutes_placeholders() {
        let localizer = Localizer::for_language(Language::English).unwrap();
        assert_eq!(
            localizer.tr_with("BranchDeletedSuccessfully", &[("Branch", "feature-a")]),
            "Branch feature-a deleted successfully."
        );
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let localizer = Localizer::for_language(Language::English).unwrap();
        assert_eq!(
            localizer.tr_with(
                "ErrorDeletingBranch",
                &[("Branch", "x{Error}"), ("Error", "boom")]
            ),
            "Error deleting branch x{Error}: boom"
        );
    }

    #[test]
    fn unmatched_braces_are_copied_through() {
        assert_eq!(
            fill_placeholders("{Known} {Other} {open", &[("Known", "k")]),
            "k {Other} {open"
        );
    }

    #[test]
    fn missing_translation_falls_back_to_english() {
        let mut localizer = Localizer::for_language(Language::Japanese).unwrap();
        localizer.messages.remove("NoBranchesToDelete");
        assert_eq!(localizer.tr("NoBranchesToDelete"), "No branches to delete.");
        assert!(localizer.tr("ErrorDeletingBranch").starts_with("ブランチ"));
    }

    #[test]
    fn japanese_catalog_is_used() {
        let localizer = Localizer::for_language(Language::Japanese).unwrap();
        assert_eq!(localizer.tr("NoBranchesToDelete"), "削除するブランチがありません。");
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        let localizer = Localizer::from_catalog(HashMap::new());
        assert_eq!(localizer.tr("Nope"), "Nope");
    }
}
