use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SubburnError};

/// Languages the pipeline can translate into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    Arabic,
    German,
    Spanish,
    French,
    Hebrew,
    Italian,
    Japanese,
    Portuguese,
    Russian,
    Chinese,
    English,
    Persian,
}

impl Language {
    pub const ALL: [Language; 12] = [
        Language::Arabic,
        Language::German,
        Language::Spanish,
        Language::French,
        Language::Hebrew,
        Language::Italian,
        Language::Japanese,
        Language::Portuguese,
        Language::Russian,
        Language::Chinese,
        Language::English,
        Language::Persian,
    ];

    /// ISO 639-1 code
    pub fn code(self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::German => "de",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::Hebrew => "he",
            Language::Italian => "it",
            Language::Japanese => "ja",
            Language::Portuguese => "pt",
            Language::Russian => "ru",
            Language::Chinese => "zh",
            Language::English => "en",
            Language::Persian => "fa",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Arabic => "Arabic",
            Language::German => "German",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::Hebrew => "Hebrew",
            Language::Italian => "Italian",
            Language::Japanese => "Japanese",
            Language::Portuguese => "Portuguese",
            Language::Russian => "Russian",
            Language::Chinese => "Chinese",
            Language::English => "English",
            Language::Persian => "Persian",
        }
    }

    /// Whether subtitles in this language get the bundled right-to-left
    /// typeface and its sizing defaults.
    ///
    /// Hebrew is written right-to-left too, but the bundled typeface only
    /// covers Arabic script, so it keeps the regular defaults.
    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Arabic | Language::Persian)
    }

    pub fn from_code(code: &str) -> Result<Self> {
        let normalized = code.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.code() == normalized)
            .ok_or_else(|| SubburnError::UnsupportedLanguage {
                code: code.to_string(),
                supported: Self::supported_codes(),
            })
    }

    /// Comma separated list of supported codes, for diagnostics.
    pub fn supported_codes() -> String {
        Self::ALL
            .iter()
            .map(|lang| lang.code())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `'ar' (Arabic), 'de' (German), ...` for help and error output.
    pub fn describe_all() -> String {
        Self::ALL
            .iter()
            .map(|lang| format!("'{}' ({})", lang.code(), lang.name()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = SubburnError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s)
    }
}

impl TryFrom<String> for Language {
    type Error = SubburnError;

    fn try_from(value: String) -> Result<Self> {
        Self::from_code(&value)
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_is_case_insensitive() {
        assert_eq!(Language::from_code("he").unwrap(), Language::Hebrew);
        assert_eq!(Language::from_code(" EN ").unwrap(), Language::English);
        assert_eq!("fa".parse::<Language>().unwrap(), Language::Persian);
    }

    #[test]
    fn test_unknown_code_lists_supported_codes() {
        let err = Language::from_code("ko").unwrap_err();
        match err {
            SubburnError::UnsupportedLanguage { code, supported } => {
                assert_eq!(code, "ko");
                assert!(supported.contains("ar"));
                assert!(supported.contains("fa"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_codes_round_trip_through_serde() {
        let json = serde_json::to_string(&Language::Japanese).unwrap();
        assert_eq!(json, "\"ja\"");
        let lang: Language = serde_json::from_str("\"ru\"").unwrap();
        assert_eq!(lang, Language::Russian);
        assert!(serde_json::from_str::<Language>("\"xx\"").is_err());
    }

    #[test]
    fn test_rtl_languages() {
        let rtl: Vec<_> = Language::ALL.iter().filter(|l| l.is_rtl()).collect();
        assert_eq!(rtl, vec![&Language::Arabic, &Language::Persian]);
    }
}
