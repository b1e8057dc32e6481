//! Client-side localization.
//!
//! A [`Localizer`] owns the active [`TranslationTable`] and swaps it wholesale
//! whenever a load for a newer request completes. The [`LocaleStore`] is the
//! only writer of the selected locale; it announces changes over channels and
//! the listener spawned by [`spawn_locale_listener`] turns them into loads.

use std::fmt;
use std::str::FromStr;

mod error;
mod loader;
mod parser;
mod source;
mod store;
mod table;

pub use error::LocaleError;
pub use loader::{LoadOutcome, Localizer};
pub use parser::parse_resources;
pub use source::{DirResources, HttpResources, ResourceSource, Resources};
pub use store::{LocaleStore, LocaleUpdate, spawn_locale_listener};
pub use table::TranslationTable;

/// Preference key holding the last selected locale.
pub const LOCALE_PREF_KEY: &str = "locale";

/// Locales shipped with the launcher, in toggle order.
pub const BUNDLED_LOCALES: [&str; 2] = ["en", "fa"];

/// Identifier of a resource document, e.g. `en` or `pt-BR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleCode(String);

impl LocaleCode {
    pub const DEFAULT: &'static str = "en";

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the resource document relative to the asset root.
    pub fn resource_path(&self) -> String {
        format!("/{}.xml", self.0)
    }

    /// The code following `self` in `available`, wrapping around. Codes not in
    /// the list move to the first entry.
    pub fn next_in(&self, available: &[LocaleCode]) -> Option<LocaleCode> {
        let position = available.iter().position(|code| code == self);
        let next = match position {
            Some(idx) => (idx + 1) % available.len(),
            None => 0,
        };
        available.get(next).cloned()
    }
}

impl Default for LocaleCode {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid locale code {0:?}")]
pub struct InvalidLocaleCode(pub String);

impl FromStr for LocaleCode {
    type Err = InvalidLocaleCode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'));
        if valid {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(InvalidLocaleCode(raw.to_owned()))
        }
    }
}

/// Parse the bundled locale list. Entries are compile-time constants.
pub fn bundled_locales() -> Vec<LocaleCode> {
    BUNDLED_LOCALES
        .iter()
        .filter_map(|code| code.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_open_set_of_codes() {
        for raw in ["en", "fa", "pt-BR", "zh_Hans", " de "] {
            assert!(raw.parse::<LocaleCode>().is_ok(), "{raw} should parse");
        }
        assert_eq!("  de ".parse::<LocaleCode>().unwrap().as_str(), "de");
    }

    #[test]
    fn rejects_codes_that_would_escape_the_asset_root() {
        for raw in ["", "   ", "../etc", "en/fa", "en.xml"] {
            assert!(raw.parse::<LocaleCode>().is_err(), "{raw} should fail");
        }
    }

    #[test]
    fn resource_path_follows_locale() {
        let code: LocaleCode = "fa".parse().unwrap();
        assert_eq!(code.resource_path(), "/fa.xml");
    }

    #[test]
    fn next_in_cycles_through_available_locales() {
        let available = bundled_locales();
        let en: LocaleCode = "en".parse().unwrap();
        let fa: LocaleCode = "fa".parse().unwrap();
        let de: LocaleCode = "de".parse().unwrap();

        assert_eq!(en.next_in(&available), Some(fa.clone()));
        assert_eq!(fa.next_in(&available), Some(en.clone()));
        assert_eq!(de.next_in(&available), Some(en));
        assert_eq!(fa.next_in(&[]), None);
    }

    #[test]
    fn bundled_documents_parse_with_matching_keys() {
        let en = parse_resources(
            &"en".parse().unwrap(),
            include_str!("../../assets/locales/en.xml"),
        )
        .unwrap();
        let fa = parse_resources(
            &"fa".parse().unwrap(),
            include_str!("../../assets/locales/fa.xml"),
        )
        .unwrap();

        assert!(!en.is_empty());
        assert_eq!(en.len(), fa.len());
        for key in en.keys() {
            assert!(fa.contains(key), "fa.xml is missing {key}");
        }
        assert_eq!(fa.lookup("install_selected"), "نصب نسخه انتخابی");
    }
}
