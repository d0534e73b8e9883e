//! Unit tests for package document cache

use super::*;
use std::collections::HashMap;

fn create_test_metadata() -> Arc<PackageMetadataResponse> {
    Arc::new(PackageMetadataResponse {
        name: "test-package".to_string(),
        description: None,
        dist_tags: {
            let mut tags = HashMap::new();
            tags.insert("latest".to_string(), "1.0.0".to_string());
            tags
        },
        versions: HashMap::new(),
        modified: None,
    })
}

#[test]
fn test_metadata_cache_insert_and_get() {
    let cache = MetadataCache::new();
    let metadata = create_test_metadata();

    cache.insert("test-package".to_string(), Arc::clone(&metadata));

    let retrieved = cache.get("test-package").unwrap();
    assert!(Arc::ptr_eq(&retrieved, &metadata));
    assert!(cache.get("other-package").is_none());
    assert_eq!(
        cache.stats(),
        CacheStats {
            entries: 1,
            hits: 1,
            misses: 1,
        }
    );
}

#[test]
fn test_expired_entry_is_evicted_on_get() {
    let cache = MetadataCache::with_ttl(Duration::ZERO);
    cache.insert("test-package".to_string(), create_test_metadata());
    assert_eq!(cache.stats().entries, 1);

    assert!(cache.get("test-package").is_none());
    assert_eq!(cache.stats().entries, 0);
    assert_eq!(cache.stats().misses, 1);
}
