//! Load path tests: category providers, fallback chain and multi-record loads.

mod common;

use common::{Behavior, RecordingProvider, loaded_by, static_category};
use gamedb_core::{Lifetime, NOT_FOUND_ERROR, ProviderFault, Record};
use gamedb_database::{GameDatabase, StaticCategory};
use gamedb_providers::{FileSystemProvider, MemoryProvider};
use std::sync::Arc;

/// Stand-in for an engine texture type.
type Texture = Vec<[u8; 4]>;

// ═══════════════════════════════════════════════════════════════════════════════
// FALLBACK PATH
// ═══════════════════════════════════════════════════════════════════════════════

/// Unsupported and failing fallbacks are skipped; the first success is returned.
#[tokio::test]
async fn fallback_providers_are_tried_in_order() {
    let unsupported = RecordingProvider::new("unsupported", Behavior::Unsupported);
    let failing = RecordingProvider::new("failing", Behavior::Fails);
    let first_ok = RecordingProvider::new("first_ok", Behavior::Succeeds);
    let second_ok = RecordingProvider::new("second_ok", Behavior::Succeeds);

    let database = GameDatabase::builder()
        .with_category(Arc::new(static_category("audio", &["click"])))
        .with_fallback(unsupported.clone())
        .with_fallback(failing.clone())
        .with_fallback(first_ok.clone())
        .with_fallback_location(second_ok.clone())
        .build();
    database.initialize(&Lifetime::new()).await.unwrap();

    let result = database.load::<String>("loose/file", &Lifetime::new()).await;
    assert!(result.is_complete());
    assert_eq!(loaded_by(&result).as_deref(), Some("first_ok"));

    assert!(unsupported.calls().is_empty());
    assert_eq!(failing.calls(), ["loose/file"]);
    assert_eq!(first_ok.calls(), ["loose/file"]);
    assert!(second_ok.calls().is_empty());
}

/// Secondary fallbacks are reached once every primary one has failed.
#[tokio::test]
async fn secondary_fallbacks_follow_primary() {
    let failing = RecordingProvider::new("failing", Behavior::Fails);
    let remote = RecordingProvider::new("remote", Behavior::Succeeds);
    let database = GameDatabase::builder()
        .with_fallback(failing.clone())
        .with_fallback_location(remote.clone())
        .build();
    database.initialize(&Lifetime::new()).await.unwrap();

    let result = database.load::<String>("x", &Lifetime::new()).await;
    assert_eq!(loaded_by(&result).as_deref(), Some("remote"));
}

/// A miss with no supporting fallback yields the canonical not-found result.
#[tokio::test]
async fn missing_resource_is_canonical_not_found() {
    let unsupported = RecordingProvider::new("unsupported", Behavior::Unsupported);
    let database = GameDatabase::builder()
        .with_category(Arc::new(
            StaticCategory::new("Audio").with_record(Record::new("click").with_name("r1")),
        ))
        .with_category(Arc::new(
            StaticCategory::new("Sprites").with_record(Record::new("click").with_name("r2")),
        ))
        .with_fallback(unsupported.clone())
        .build();
    database.initialize(&Lifetime::new()).await.unwrap();

    let result = database.load::<Texture>("missing", &Lifetime::new()).await;
    assert!(!result.is_complete());
    assert!(result.is_not_found());
    assert_eq!(result.error, NOT_FOUND_ERROR);
    assert_eq!(result.id, "missing");
    assert!(result.asset.is_none());
    assert!(unsupported.calls().is_empty());
}

/// A category without a provider defers to the fallback chain.
#[tokio::test]
async fn providerless_category_uses_fallback() {
    let files = RecordingProvider::new("files", Behavior::Succeeds);
    let database = GameDatabase::builder()
        .with_category(Arc::new(
            StaticCategory::new("audio")
                .with_record(Record::new("click").with_resource_path("sfx/click")),
        ))
        .with_fallback(files.clone())
        .build();
    database.initialize(&Lifetime::new()).await.unwrap();

    let result = database.load::<String>("click", &Lifetime::new()).await;
    assert!(result.is_complete());
    // The fallback chain is keyed by the requested id, not the record path.
    assert_eq!(files.calls(), ["click"]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// CATEGORY PATH
// ═══════════════════════════════════════════════════════════════════════════════

/// The category provider is called with the record's resolved path.
#[tokio::test]
async fn category_provider_receives_resolved_path() {
    let sfx = RecordingProvider::new("sfx", Behavior::Succeeds);
    let database = GameDatabase::builder()
        .with_category(Arc::new(
            StaticCategory::new("audio")
                .with_record(Record::new("click").with_resource_path("ui/sfx/click"))
                .with_record(Record::new("beep"))
                .with_provider(sfx.clone()),
        ))
        .build();
    database.initialize(&Lifetime::new()).await.unwrap();

    database.load::<String>("click", &Lifetime::new()).await;
    database.load::<String>("BEEP", &Lifetime::new()).await;
    assert_eq!(sfx.calls(), ["ui/sfx/click", "beep"]);
}

/// A failed category load is returned as-is; fallbacks are not consulted.
#[tokio::test]
async fn no_fallback_after_category_failure() {
    let broken = RecordingProvider::new("broken", Behavior::Fails);
    let fallback = RecordingProvider::new("fallback", Behavior::Succeeds);
    let database = GameDatabase::builder()
        .with_category(Arc::new(
            StaticCategory::new("audio")
                .with_record(Record::new("click"))
                .with_provider(broken.clone()),
        ))
        .with_fallback(fallback.clone())
        .build();
    database.initialize(&Lifetime::new()).await.unwrap();

    let result = database.load::<String>("click", &Lifetime::new()).await;
    assert!(!result.is_complete());
    assert_eq!(broken.calls(), ["click"]);
    assert!(fallback.calls().is_empty());
}

/// Trailing whitespace is trimmed before resolution.
#[tokio::test]
async fn trailing_whitespace_is_trimmed() {
    let sfx = Arc::new(MemoryProvider::new("sfx").with_asset("click", "audio bytes".to_string()));
    let database = GameDatabase::builder()
        .with_category(Arc::new(
            StaticCategory::new("audio")
                .with_record(Record::new("click"))
                .with_provider(sfx),
        ))
        .build();
    database.initialize(&Lifetime::new()).await.unwrap();

    let asset = database
        .load_asset::<String>("click \t\n", &Lifetime::new())
        .await;
    assert_eq!(asset.as_deref().map(String::as_str), Some("audio bytes"));
    assert!(!database.load::<String>(" click", &Lifetime::new()).await.is_complete());
}

/// Provider faults reach the caller inside the result.
#[tokio::test]
async fn provider_faults_are_captured() {
    let sfx = Arc::new(MemoryProvider::new("sfx").with_asset("click", 7u32));
    let database = GameDatabase::builder()
        .with_category(Arc::new(
            StaticCategory::new("audio")
                .with_record(Record::new("click"))
                .with_provider(sfx),
        ))
        .build();
    database.initialize(&Lifetime::new()).await.unwrap();

    let result = database.load::<String>("click", &Lifetime::new()).await;
    assert!(matches!(result.fault_ref(), Some(ProviderFault::TypeMismatch { .. })));
}

/// Loads through a filesystem provider with extension probing.
#[tokio::test]
async fn loads_from_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("ui")).unwrap();
    std::fs::write(dir.path().join("ui/title.txt"), "Welcome").unwrap();
    std::fs::write(dir.path().join("ui/credits.txt"), "Thanks").unwrap();

    let files = Arc::new(FileSystemProvider::new(dir.path()).with_extension("txt"));
    let database = GameDatabase::builder()
        .with_category(Arc::new(
            StaticCategory::new("text")
                .with_record(Record::new("title").with_resource_path("ui/title"))
                .with_provider(files.clone()),
        ))
        .with_fallback(files)
        .build();
    database.initialize(&Lifetime::new()).await.unwrap();

    let title = database.load_asset::<String>("title", &Lifetime::new()).await;
    assert_eq!(title.as_deref().map(String::as_str), Some("Welcome"));

    assert!(!database.find("ui/credits").found);
    let loose = database.load_asset::<String>("ui/credits", &Lifetime::new()).await;
    assert_eq!(loose.as_deref().map(String::as_str), Some("Thanks"));
}

/// An ended lifetime cancels the load.
#[tokio::test]
async fn terminated_lifetime_cancels_load() {
    let sfx = RecordingProvider::new("sfx", Behavior::Succeeds);
    let database = GameDatabase::builder()
        .with_category(Arc::new(
            StaticCategory::new("audio")
                .with_record(Record::new("click"))
                .with_provider(sfx.clone()),
        ))
        .build();
    database.initialize(&Lifetime::new()).await.unwrap();

    let lifetime = Lifetime::new();
    lifetime.terminate();
    let result = database.load::<String>("click", &lifetime).await;
    assert!(matches!(result.fault_ref(), Some(ProviderFault::Cancelled)));
    assert!(sfx.calls().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOAD ALL
// ═══════════════════════════════════════════════════════════════════════════════

/// `load_all` loads what `find_all` resolves: the first owning category's match.
#[tokio::test]
async fn load_all_follows_find_all() {
    let ui = RecordingProvider::new("ui", Behavior::Succeeds);
    let extra = RecordingProvider::new("extra", Behavior::Succeeds);
    let database = GameDatabase::builder()
        .with_category(Arc::new(
            StaticCategory::new("ui")
                .with_record(Record::new("a").with_label("icons"))
                .with_record(Record::new("b").with_label("icons"))
                .with_provider(ui.clone()),
        ))
        .with_category(Arc::new(
            StaticCategory::new("extra")
                .with_record(Record::new("c").with_label("icons"))
                .with_provider(extra.clone()),
        ))
        .build();
    database.initialize(&Lifetime::new()).await.unwrap();

    let results = database.load_all::<String>("icons ", &Lifetime::new()).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "b");
    assert_eq!(loaded_by(&results[0]).as_deref(), Some("ui"));
    assert!(extra.calls().is_empty());
}

/// `load_all` of a filter nothing owns returns no results.
#[tokio::test]
async fn load_all_of_a_miss_is_empty() {
    let fallback = RecordingProvider::new("fallback", Behavior::Succeeds);
    let database = GameDatabase::builder()
        .with_category(Arc::new(static_category("audio", &["click"])))
        .with_fallback(fallback.clone())
        .build();
    database.initialize(&Lifetime::new()).await.unwrap();

    let results = database.load_all::<String>("missing", &Lifetime::new()).await;
    assert!(results.is_empty());
    assert!(fallback.calls().is_empty());
}
