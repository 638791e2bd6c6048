//! Generated study material and its transient cache.
//!
//! Content comes from an external generator (a language model in the full
//! app) and is cached under `reading-content-v{N}-{refKey}` so revisiting a
//! reading does not pay for another generation. The cache is disposable: it
//! is the first thing evicted under storage pressure and a failed cache write
//! never fails the load.

use crate::core::curriculum::Locale;
use crate::core::error;
use crate::core::schedule::{DailyReading, format_reference, reference_key};
use crate::core::schemas::{CONTENT_CACHE_MARKER, CONTENT_CACHE_VERSION};
use crate::core::store::Store;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Structured generator response. Every field is required on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBundle {
    pub passage: String,
    pub pre_reading_questions: Vec<String>,
    pub meditation_guide: String,
    pub context: String,
    pub intention: String,
    pub image_prompt: String,
    pub summary: String,
    /// Image reference attached after generation; cache-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ContentBundle {
    /// Parse and validate a raw generator response.
    pub fn from_json(raw: &str) -> Result<Self, error::LectioError> {
        let bundle: Self = serde_json::from_str(raw).map_err(|e| {
            error::LectioError::Generation(format!("malformed generator response: {e}"))
        })?;
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn validate(&self) -> Result<(), error::LectioError> {
        let fields = [
            ("passage", &self.passage),
            ("meditationGuide", &self.meditation_guide),
            ("context", &self.context),
            ("intention", &self.intention),
            ("imagePrompt", &self.image_prompt),
            ("summary", &self.summary),
        ];
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(error::LectioError::Generation(format!(
                "generator response has empty fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Produces study material for a reading.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, reading: &DailyReading, locale: Locale) -> anyhow::Result<ContentBundle>;
}

/// Produces an illustration; `None` when generation fails.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str, locale: Locale) -> Option<String>;
}

pub fn cache_key(reference: &str) -> String {
    format!(
        "{CONTENT_CACHE_MARKER}{CONTENT_CACHE_VERSION}-{}",
        reference_key(reference)
    )
}

pub fn get_cached(store: &Store, reference: &str) -> Result<Option<ContentBundle>, error::LectioError> {
    let key = cache_key(reference);
    let Some(raw) = store.get(&key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(bundle) => Ok(Some(bundle)),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "dropping unreadable cache entry");
            store.remove(&key)?;
            Ok(None)
        }
    }
}

pub fn put_cached(store: &Store, reference: &str, bundle: &ContentBundle) -> Result<(), error::LectioError> {
    store.set(&cache_key(reference), &serde_json::to_string(bundle)?)
}

/// Whether `key` has the exact cache shape `reading-content-v{digits}-{refKey}`.
pub fn is_cache_key(key: &str) -> bool {
    let Some(rest) = key.strip_prefix(CONTENT_CACHE_MARKER) else {
        return false;
    };
    match rest.split_once('-') {
        Some((version, _)) => !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Delete every cache entry of every version. Returns how many went.
pub fn evict_all(store: &Store) -> Result<usize, error::LectioError> {
    let mut evicted = 0usize;
    for (key, _) in store.scan_prefix(CONTENT_CACHE_MARKER)? {
        if !is_cache_key(&key) {
            tracing::debug!(key = %key, "not a cache key, keeping");
            continue;
        }
        store.remove(&key)?;
        evicted += 1;
    }
    if evicted > 0 {
        tracing::info!(evicted, "transient content cache evicted");
    }
    Ok(evicted)
}

/// Cached content for `reading`, generating (and caching) it on a miss.
///
/// Generator failures leave the store untouched. Image failures degrade to
/// no image.
pub async fn load(
    store: &Store,
    generator: &dyn ContentGenerator,
    images: Option<&dyn ImageGenerator>,
    reading: &DailyReading,
    locale: Locale,
) -> Result<ContentBundle, error::LectioError> {
    let reference = format_reference(reading, locale);
    match get_cached(store, &reference) {
        Ok(Some(bundle)) => {
            tracing::debug!(reference = %reference, "content cache hit");
            return Ok(bundle);
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(reference = %reference, error = %e, "content cache unavailable"),
    }

    let mut bundle = generator
        .generate(reading, locale)
        .await
        .map_err(|e| error::LectioError::Generation(format!("{e:#}")))?;
    bundle.validate()?;

    if let Some(images) = images {
        bundle.image = images.generate_image(&bundle.image_prompt, locale).await;
        if bundle.image.is_none() {
            tracing::warn!(reference = %reference, "image generation failed, continuing without image");
        }
    }

    if let Err(e) = put_cached(store, &reference, &bundle) {
        tracing::warn!(reference = %reference, error = %e, "could not cache generated content");
    }
    Ok(bundle)
}
