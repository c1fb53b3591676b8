use std::collections::BTreeMap;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{Result, SubburnError};
use crate::language::Language;

/// Direct pairs available besides the English pivots
const DIRECT_PAIRS: &[(Language, Language)] = &[
    (Language::German, Language::French),
    (Language::French, Language::German),
    (Language::Spanish, Language::French),
    (Language::French, Language::Spanish),
    (Language::German, Language::Spanish),
    (Language::Spanish, Language::German),
];

fn opus_model(from: &str, to: &str) -> String {
    format!("Helsinki-NLP/opus-mt-{}-{}", from, to)
}

/// Lookup from a language pair to the model that translates it.
#[derive(Debug, Clone)]
pub struct ModelTable {
    entries: BTreeMap<(Language, Language), String>,
}

impl ModelTable {
    /// English to and from every supported language, plus the direct pairs.
    pub fn builtin() -> Self {
        let mut entries = BTreeMap::new();

        for lang in Language::ALL {
            if lang == Language::English {
                continue;
            }
            entries.insert((lang, Language::English), opus_model(lang.code(), "en"));

            // The English -> Japanese model is published under the `jap` code
            let target_code = match lang {
                Language::Japanese => "jap",
                other => other.code(),
            };
            entries.insert((Language::English, lang), opus_model("en", target_code));
        }

        for &(from, to) in DIRECT_PAIRS {
            entries.insert((from, to), opus_model(from.code(), to.code()));
        }

        Self { entries }
    }

    /// Built-in table with `"src-tgt" = "model"` overrides applied.
    pub fn from_config(config: &TranslateConfig) -> Result<Self> {
        let mut table = Self::builtin();

        for (pair, model) in &config.models {
            let (from, to) = pair.split_once('-').ok_or_else(|| {
                SubburnError::Config(format!(
                    "Invalid translation model key '{}'. Expected 'src-tgt'",
                    pair
                ))
            })?;
            let from = Language::from_code(from)?;
            let to = Language::from_code(to)?;
            debug!("Model override {} -> {}: {}", from, to, model);
            table.entries.insert((from, to), model.clone());
        }

        Ok(table)
    }

    pub fn model_for(&self, from: Language, to: Language) -> Result<&str> {
        self.entries
            .get(&(from, to))
            .map(String::as_str)
            .ok_or_else(|| SubburnError::UnsupportedLanguagePair {
                from: from.code().to_string(),
                to: to.code().to_string(),
                supported: Language::supported_codes(),
            })
    }

    /// Resolve a detected source code against a requested target.
    ///
    /// The detected code has to be a supported language with a model for
    /// the pair; anything else fails before translation starts.
    pub fn resolve(&self, detected: &str, to: Language) -> Result<(Language, &str)> {
        let from = Language::from_code(detected).map_err(|_| SubburnError::UnsupportedLanguagePair {
            from: detected.to_string(),
            to: to.code().to_string(),
            supported: Language::supported_codes(),
        })?;
        let model = self.model_for(from, to)?;
        Ok((from, model))
    }

    /// Startup check for a requested target.
    ///
    /// With a known source the exact pair must be mapped; otherwise at least
    /// one source has to translate into the target.
    pub fn check_target(&self, to: Language, from: Option<Language>) -> Result<()> {
        match from {
            Some(from) if from == to => Ok(()),
            Some(from) => self.model_for(from, to).map(|_| ()),
            None => {
                let sources = self.sources_for(to);
                if !sources.is_empty() {
                    debug!("{} sources translate into '{}'", sources.len(), to);
                    Ok(())
                } else {
                    Err(SubburnError::UnsupportedLanguage {
                        code: to.code().to_string(),
                        supported: Language::supported_codes(),
                    })
                }
            }
        }
    }

    /// Sources with a model into `to`
    pub fn sources_for(&self, to: Language) -> Vec<Language> {
        self.entries
            .keys()
            .filter(|&&(_, target)| target == to)
            .map(|&(from, _)| from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_english_pivots() {
        let table = ModelTable::builtin();
        assert_eq!(
            table.model_for(Language::Hebrew, Language::English).unwrap(),
            "Helsinki-NLP/opus-mt-he-en"
        );
        assert_eq!(
            table.model_for(Language::English, Language::Japanese).unwrap(),
            "Helsinki-NLP/opus-mt-en-jap"
        );
        assert_eq!(
            table.model_for(Language::German, Language::French).unwrap(),
            "Helsinki-NLP/opus-mt-de-fr"
        );
    }

    #[test]
    fn test_every_language_is_reachable() {
        let table = ModelTable::builtin();
        for lang in Language::ALL {
            assert!(table.check_target(lang, None).is_ok(), "{}", lang);
        }
    }

    #[test]
    fn test_unmapped_pair_fails_with_supported_codes() {
        let table = ModelTable::builtin();
        let err = table.model_for(Language::Hebrew, Language::Japanese).unwrap_err();
        match err {
            SubburnError::UnsupportedLanguagePair { from, to, supported } => {
                assert_eq!(from, "he");
                assert_eq!(to, "ja");
                assert!(supported.contains("en"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(table.check_target(Language::Japanese, Some(Language::Hebrew)).is_err());
        assert!(table.check_target(Language::Hebrew, Some(Language::Hebrew)).is_ok());
    }

    #[test]
    fn test_resolve_rejects_unsupported_detected_language() {
        let table = ModelTable::builtin();
        let (from, model) = table.resolve("he", Language::English).unwrap();
        assert_eq!(from, Language::Hebrew);
        assert_eq!(model, "Helsinki-NLP/opus-mt-he-en");

        let err = table.resolve("ko", Language::English).unwrap_err();
        assert!(matches!(err, SubburnError::UnsupportedLanguagePair { ref from, .. } if from == "ko"));
    }

    #[test]
    fn test_config_overrides() {
        let mut config = TranslateConfig::default();
        config.models.insert("he-ja".to_string(), "custom/he-ja".to_string());
        config.models.insert("en-ja".to_string(), "custom/en-ja".to_string());

        let table = ModelTable::from_config(&config).unwrap();
        assert_eq!(table.model_for(Language::Hebrew, Language::Japanese).unwrap(), "custom/he-ja");
        assert_eq!(table.model_for(Language::English, Language::Japanese).unwrap(), "custom/en-ja");
        assert!(table.sources_for(Language::Japanese).contains(&Language::Hebrew));
    }

    #[test]
    fn test_bad_override_key() {
        let mut config = TranslateConfig::default();
        config.models.insert("hebrew".to_string(), "x".to_string());
        assert!(matches!(ModelTable::from_config(&config), Err(SubburnError::Config(_))));

        let mut config = TranslateConfig::default();
        config.models.insert("he-xx".to_string(), "x".to_string());
        assert!(matches!(
            ModelTable::from_config(&config),
            Err(SubburnError::UnsupportedLanguage { .. })
        ));
    }
}
