use thiserror::Error;

use super::LocaleCode;

/// Failures of a localization load. The active table is never touched when
/// one of these is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocaleError {
    #[error("resource for locale {locale} is unavailable: {reason}")]
    ResourceUnavailable { locale: LocaleCode, reason: String },
    #[error("resource for locale {locale} is malformed: {reason}")]
    ParseError { locale: LocaleCode, reason: String },
}

impl LocaleError {
    pub fn locale(&self) -> &LocaleCode {
        match self {
            LocaleError::ResourceUnavailable { locale, .. }
            | LocaleError::ParseError { locale, .. } => locale,
        }
    }
}
