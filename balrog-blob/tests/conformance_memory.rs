use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use balrog_blob::{
    BlobConfig, BlobError, BlobMerger, BlobName, BlobResult, BlobStore, BlobTarget, DataVersion,
    FetchedBlob, MemoryBlobStore, MergeMode, WriteRequest,
};

/// Test factory functions
fn create_test_target() -> BlobTarget {
    BlobTarget::new(
        BlobName::from_string("Firefox-mozilla-central-nightly-20150101000000".to_string()),
        "Firefox",
    )
}

fn locale_patch(locale: &str) -> Value {
    json!({
        "platforms": {
            "WINNT_x86-msvc": {
                "locales": {
                    locale: {"buildID": "20150101000000"}
                }
            }
        }
    })
}

/// A1. Stale Data Version Is Rejected
#[tokio::test]
async fn test_stale_data_version_is_rejected() {
    let store = MemoryBlobStore::new();
    let target = create_test_target();

    // Arrange: document at T1, read by us
    store.force_write(&target.name, "Firefox", json!({"a": 1}));
    let read = store.fetch(&target.name).await.unwrap();
    assert_eq!(read.data_version, DataVersion(1));

    // Another writer moves it to T2
    let t2 = store.force_write(&target.name, "Firefox", json!({"a": 1, "b": 2}));
    assert_eq!(t2, DataVersion(2));

    // Act: write with T1
    let result = store
        .write(WriteRequest {
            target: target.clone(),
            document: json!({"a": 1, "c": 3}),
            data_version: Some(read.data_version),
        })
        .await;

    // Assert: rejected, document untouched
    assert!(matches!(result, Err(BlobError::Conflict { .. })));
    assert_eq!(store.document(&target.name), Some(json!({"a": 1, "b": 2})));

    // A fresh fetch-merge-write with T2 goes through
    let mut current = store.fetch(&target.name).await.unwrap();
    balrog_blob::deep_merge(&mut current.document, json!({"c": 3}));
    let t3 = store
        .write(WriteRequest {
            target: target.clone(),
            document: current.document,
            data_version: Some(current.data_version),
        })
        .await
        .unwrap();

    assert_eq!(t3, DataVersion(3));
    assert_eq!(
        store.document(&target.name),
        Some(json!({"a": 1, "b": 2, "c": 3}))
    );
}

/// A2. Sequential Locale Submissions Accumulate
#[tokio::test]
async fn test_sequential_locale_submissions_accumulate() {
    let store = Arc::new(MemoryBlobStore::new());
    let merger = BlobMerger::new(store.clone(), &BlobConfig::default());
    let target = create_test_target();

    for locale in ["en-US", "de", "fr"] {
        merger
            .merge_and_write(&target, locale_patch(locale), MergeMode::CreateOrUpdate)
            .await
            .unwrap();
    }

    let doc = store.document(&target.name).unwrap();
    let locales = doc["platforms"]["WINNT_x86-msvc"]["locales"].as_object().unwrap();
    assert_eq!(locales.len(), 3);
    assert_eq!(store.data_version(&target.name), Some(DataVersion(3)));
}

/// Store that lets another writer slip in between our fetch and our write
struct RacingStore {
    inner: MemoryBlobStore,
    interloper: Mutex<Option<Value>>,
}

#[async_trait]
impl BlobStore for RacingStore {
    async fn fetch(&self, name: &BlobName) -> BlobResult<FetchedBlob> {
        self.inner.fetch(name).await
    }

    async fn write(&self, request: WriteRequest) -> BlobResult<DataVersion> {
        let pending = self.interloper.lock().take();
        if let Some(patch) = pending {
            let mut concurrent = self
                .inner
                .document(request.name())
                .unwrap_or_else(|| json!({}));
            balrog_blob::deep_merge(&mut concurrent, patch);
            self.inner
                .force_write(request.name(), &request.target.product, concurrent);
        }
        self.inner.write(request).await
    }

    async fn update_rule(&self, rule_id: u64, mapping: &BlobName) -> BlobResult<()> {
        self.inner.update_rule(rule_id, mapping).await
    }
}

/// A3. Concurrent Edits Both Survive
#[tokio::test]
async fn test_concurrent_edits_both_survive() {
    let target = create_test_target();
    let store = Arc::new(RacingStore {
        inner: MemoryBlobStore::new(),
        interloper: Mutex::new(Some(locale_patch("de"))),
    });
    store
        .inner
        .force_write(&target.name, "Firefox", locale_patch("en-US"));

    let merger = BlobMerger::new(store.clone(), &BlobConfig::default());

    // Act: our write loses the first race, then retries from a fresh read
    let outcome = merger
        .merge_and_write(&target, locale_patch("fr"), MergeMode::Existing)
        .await
        .unwrap();

    // Assert: nothing lost
    assert_eq!(outcome.attempts, 2);
    let doc = store.inner.document(&target.name).unwrap();
    let locales = doc["platforms"]["WINNT_x86-msvc"]["locales"].as_object().unwrap();
    for locale in ["en-US", "de", "fr"] {
        assert!(locales.contains_key(locale), "missing {}", locale);
    }
    assert_eq!(outcome.data_version, DataVersion(3));
}

/// A4. Rules Only Move When Registered
#[tokio::test]
async fn test_rules_only_move_when_registered() {
    let store = MemoryBlobStore::new();
    let name = BlobName::from_string("Firefox-40.0-build2".to_string());

    let result = store.update_rule(1, &name).await;
    assert!(matches!(result, Err(BlobError::NotFound { .. })));

    store.insert_rule(1, None);
    store.update_rule(1, &name).await.unwrap();
    assert_eq!(store.rule_mapping(1), Some(name));
}
