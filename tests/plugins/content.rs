use async_trait::async_trait;
use lectio::core::curriculum::{Curriculum, Locale};
use lectio::core::error::LectioError;
use lectio::core::schedule::DailyReading;
use lectio::core::store::Store;
use lectio::plugins::content::{self, ContentBundle, ContentGenerator, ImageGenerator};
use std::sync::atomic::{AtomicUsize, Ordering};

fn bundle_for(reference: &str) -> ContentBundle {
    ContentBundle {
        passage: format!("Text of {reference}"),
        pre_reading_questions: vec!["Who is speaking?".to_string(), "To whom?".to_string()],
        meditation_guide: "Breathe and read again.".to_string(),
        context: "First-century letter.".to_string(),
        intention: "Walk by the Spirit.".to_string(),
        image_prompt: "sunrise over a city wall".to_string(),
        summary: format!("Summary of {reference}"),
        image: None,
    }
}

#[derive(Default)]
struct CountingGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl ContentGenerator for CountingGenerator {
    async fn generate(&self, reading: &DailyReading, locale: Locale) -> anyhow::Result<ContentBundle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(bundle_for(&reading.reference(locale)))
    }
}

struct FailingGenerator;

#[async_trait]
impl ContentGenerator for FailingGenerator {
    async fn generate(&self, _reading: &DailyReading, _locale: Locale) -> anyhow::Result<ContentBundle> {
        anyhow::bail!("model unavailable")
    }
}

struct HollowGenerator;

#[async_trait]
impl ContentGenerator for HollowGenerator {
    async fn generate(&self, reading: &DailyReading, locale: Locale) -> anyhow::Result<ContentBundle> {
        let mut bundle = bundle_for(&reading.reference(locale));
        bundle.meditation_guide = "   ".to_string();
        Ok(bundle)
    }
}

struct FixedImage(Option<&'static str>);

#[async_trait]
impl ImageGenerator for FixedImage {
    async fn generate_image(&self, _prompt: &str, _locale: Locale) -> Option<String> {
        self.0.map(str::to_string)
    }
}

fn day_one(locale: Locale) -> DailyReading {
    Curriculum::pauline().reading_for_day(1, locale)
}

#[tokio::test]
async fn miss_generates_and_caches_then_hit_skips_generator() {
    let store = Store::in_memory();
    let generator = CountingGenerator::default();
    let images = FixedImage(Some("data:image/png;base64,QUJD"));
    let reading = day_one(Locale::En);

    let first = content::load(&store, &generator, Some(&images), &reading, Locale::En)
        .await
        .expect("load");
    assert_eq!(first.passage, "Text of Galatians 1-2");
    assert_eq!(first.image.as_deref(), Some("data:image/png;base64,QUJD"));
    assert!(store.get("reading-content-v9-Galatians12").expect("get").is_some());

    let second = content::load(&store, &generator, Some(&images), &reading, Locale::En)
        .await
        .expect("load");
    assert_eq!(second, first);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn locales_cache_separately() {
    let store = Store::in_memory();
    let generator = CountingGenerator::default();
    content::load(&store, &generator, None, &day_one(Locale::En), Locale::En)
        .await
        .expect("en");
    content::load(&store, &generator, None, &day_one(Locale::Ko), Locale::Ko)
        .await
        .expect("ko");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
    assert!(
        store
            .get(&content::cache_key("갈라디아서 1-2장"))
            .expect("get")
            .is_some()
    );
}

#[tokio::test]
async fn generator_failure_leaves_store_untouched() {
    let store = Store::in_memory();
    let err = content::load(&store, &FailingGenerator, None, &day_one(Locale::En), Locale::En)
        .await
        .expect_err("generator failed");
    assert!(matches!(err, LectioError::Generation(ref m) if m.contains("model unavailable")));
    assert!(store.is_empty().expect("is_empty"));
}

#[tokio::test]
async fn incomplete_responses_are_rejected() {
    let store = Store::in_memory();
    let err = content::load(&store, &HollowGenerator, None, &day_one(Locale::En), Locale::En)
        .await
        .expect_err("empty field");
    assert!(matches!(err, LectioError::Generation(ref m) if m.contains("meditationGuide")));
    assert!(store.is_empty().expect("is_empty"));
}

#[tokio::test]
async fn image_failure_degrades_to_no_image() {
    let store = Store::in_memory();
    let generator = CountingGenerator::default();
    let bundle = content::load(
        &store,
        &generator,
        Some(&FixedImage(None)),
        &day_one(Locale::En),
        Locale::En,
    )
    .await
    .expect("load");
    assert_eq!(bundle.image, None);
    let cached = store
        .get("reading-content-v9-Galatians12")
        .expect("get")
        .expect("cached");
    assert!(!cached.contains("\"image\""));
}

#[tokio::test]
async fn cache_write_failure_does_not_fail_the_load() {
    let store = Store::in_memory_with_quota(64);
    let generator = CountingGenerator::default();
    let bundle = content::load(&store, &generator, None, &day_one(Locale::En), Locale::En)
        .await
        .expect("load succeeds without caching");
    assert_eq!(bundle.summary, "Summary of Galatians 1-2");
    assert!(store.is_empty().expect("is_empty"));
}

#[tokio::test]
async fn unreadable_cache_entries_are_regenerated() {
    let store = Store::in_memory();
    store
        .set("reading-content-v9-Galatians12", "{\"passage\": 1}")
        .expect("corrupt entry");
    let generator = CountingGenerator::default();
    let bundle = content::load(&store, &generator, None, &day_one(Locale::En), Locale::En)
        .await
        .expect("load");
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        content::get_cached(&store, "Galatians 1-2").expect("get"),
        Some(bundle)
    );
}

#[test]
fn from_json_requires_every_field() {
    let complete = serde_json::to_string(&bundle_for("Romans 1-2")).expect("serialize");
    let parsed = ContentBundle::from_json(&complete).expect("parse");
    assert_eq!(parsed.pre_reading_questions.len(), 2);
    assert!(complete.contains("preReadingQuestions"));

    let missing = r#"{"passage":"p","preReadingQuestions":[],"meditationGuide":"m","context":"c","intention":"i","imagePrompt":"x"}"#;
    assert!(matches!(
        ContentBundle::from_json(missing),
        Err(LectioError::Generation(_))
    ));
}

#[test]
fn evict_all_removes_every_cache_generation_only() {
    let store = Store::in_memory();
    content::put_cached(&store, "Romans 1-2", &bundle_for("Romans 1-2")).expect("put");
    store.set("reading-content-v3-Romans12", "{}").expect("old generation");
    store.set("grace_lastCompletedDay", "4").expect("user data");

    assert_eq!(content::evict_all(&store).expect("evict"), 2);
    assert_eq!(content::evict_all(&store).expect("evict again"), 0);
    assert_eq!(store.len().expect("len"), 1);
    assert_eq!(
        store.get("grace_lastCompletedDay").expect("get").as_deref(),
        Some("4")
    );
}
