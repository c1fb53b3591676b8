// Machine translation seam
//
// - Models: language pair -> model identifier lookup
// - HuggingFace: HTTP inference endpoint serving the pair models
//
// Segments are translated batch by batch, in order, keeping their timing.

pub mod huggingface;
pub mod models;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

pub use models::ModelTable;
use crate::config::TranslateConfig;
use crate::error::{Result, SubburnError};
use crate::language::Language;
use crate::transcribe::Segment;

/// Main trait for translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a batch of texts; the result has the same length and order
    async fn translate_batch(
        &self,
        texts: &[String],
        source: Language,
        target: Language,
    ) -> Result<Vec<String>>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    pub fn create_translator(config: TranslateConfig) -> Result<Box<dyn Translator>> {
        Ok(Box::new(huggingface::HuggingFaceTranslator::new(config)?))
    }
}

/// Translate segment texts in fixed-size batches, preserving order and timing.
pub async fn translate_segments(
    translator: &dyn Translator,
    segments: &[Segment],
    source: Language,
    target: Language,
    batch_size: usize,
) -> Result<Vec<Segment>> {
    if batch_size == 0 {
        return Err(SubburnError::Config("Translation batch size must be at least 1".to_string()));
    }

    info!("Translating {} segments from '{}' to '{}'", segments.len(), source, target);

    let batches = segments.len().div_ceil(batch_size);
    let progress = ProgressBar::new(batches as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Translating [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut translated = Vec::with_capacity(segments.len());
    for (index, batch) in segments.chunks(batch_size).enumerate() {
        let texts: Vec<String> = batch.iter().map(|seg| seg.text.clone()).collect();
        debug!("Batch {}/{}: {} texts", index + 1, batches, texts.len());

        let results = translator.translate_batch(&texts, source, target).await?;
        if results.len() != texts.len() {
            progress.abandon();
            return Err(SubburnError::Translation(format!(
                "Batch {} returned {} translations for {} texts",
                index + 1,
                results.len(),
                texts.len()
            )));
        }

        translated.extend(batch.iter().zip(results).map(|(seg, text)| seg.with_text(text)));
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(translated)
}
