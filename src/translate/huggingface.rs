use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TranslateConfig;
use crate::error::{Result, SubburnError};
use crate::language::Language;
use super::{ModelTable, Translator};

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a [String],
}

#[derive(Debug, Deserialize)]
struct InferenceOutput {
    translation_text: String,
}

/// Decode an inference response, checking it matches the request length
fn parse_response(body: &str, expected: usize) -> Result<Vec<String>> {
    let outputs: Vec<InferenceOutput> = serde_json::from_str(body).map_err(|e| {
        SubburnError::Translation(format!("Unexpected translation response: {}", e))
    })?;

    if outputs.len() != expected {
        return Err(SubburnError::Translation(format!(
            "Expected {} translations, got {}",
            expected,
            outputs.len()
        )));
    }

    Ok(outputs.into_iter().map(|o| o.translation_text.trim().to_string()).collect())
}

/// Translation through a Hugging Face style inference endpoint, one model
/// per language pair.
pub struct HuggingFaceTranslator {
    client: Client,
    config: TranslateConfig,
    models: ModelTable,
}

impl HuggingFaceTranslator {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let models = ModelTable::from_config(&config)?;

        Ok(Self {
            client,
            config,
            models,
        })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), model)
    }

    fn api_token(&self) -> Option<String> {
        if self.config.api_token_env.is_empty() {
            return None;
        }
        std::env::var(&self.config.api_token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

#[async_trait]
impl Translator for HuggingFaceTranslator {
    async fn translate_batch(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> Result<Vec<String>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.models.model_for(source, target)?;
        let url = self.model_url(model);
        debug!("Requesting {} translations from {}", texts.len(), url);

        let mut request = self.client.post(&url).json(&InferenceRequest { inputs: texts });
        if let Some(token) = self.api_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Translation request to {} failed with {}", url, status);
            return Err(SubburnError::Translation(format!(
                "Model {} returned HTTP {}: {}",
                model, status, body
            )));
        }

        parse_response(&body, texts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let body = r#"[{"translation_text": " Hello "}, {"translation_text": "World"}]"#;
        assert_eq!(parse_response(body, 2).unwrap(), vec!["Hello", "World"]);
    }

    #[test]
    fn test_parse_response_length_mismatch() {
        let body = r#"[{"translation_text": "Hello"}]"#;
        assert!(matches!(parse_response(body, 2), Err(SubburnError::Translation(_))));
    }

    #[test]
    fn test_parse_error_payload() {
        let body = r#"{"error": "Model is currently loading"}"#;
        assert!(matches!(parse_response(body, 1), Err(SubburnError::Translation(_))));
    }

    #[test]
    fn test_model_url() {
        let translator = HuggingFaceTranslator::new(TranslateConfig {
            endpoint: "http://localhost:8080/models/".to_string(),
            ..TranslateConfig::default()
        })
        .unwrap();

        assert_eq!(
            translator.model_url("Helsinki-NLP/opus-mt-he-en"),
            "http://localhost:8080/models/Helsinki-NLP/opus-mt-he-en"
        );
    }

    #[tokio::test]
    async fn test_unmapped_pair_fails_before_any_request() {
        let translator = HuggingFaceTranslator::new(TranslateConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            ..TranslateConfig::default()
        })
        .unwrap();

        let err = translator
            .translate_batch(&["shalom".to_string()], Language::Hebrew, Language::Japanese)
            .await
            .unwrap_err();
        assert!(matches!(err, SubburnError::UnsupportedLanguagePair { .. }));
    }
}
