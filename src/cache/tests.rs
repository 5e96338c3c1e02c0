//! Cache store tests

use std::sync::atomic::{AtomicU64, Ordering};

use tempfile::TempDir;

use super::*;

/// Clock that only moves when told to
#[derive(Default)]
struct ManualClock(AtomicU64);

impl ManualClock {
    fn at(secs: u64) -> Arc<Self> {
        Arc::new(Self(AtomicU64::new(secs)))
    }

    fn set(&self, secs: u64) {
        self.0.store(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

fn store(temp: &TempDir, clock: Arc<ManualClock>, max_age_secs: u64, max_size_bytes: u64) -> CacheStore {
    CacheStore::with_clock(
        temp.path().join("cache"),
        CacheLimits {
            max_age: Duration::from_secs(max_age_secs),
            max_size_bytes,
        },
        clock,
    )
}

#[test]
fn test_miss_then_hit() {
    let temp = TempDir::new().unwrap();
    let cache = store(&temp, ManualClock::at(1_000), 60, 1024);

    assert_eq!(cache.get("adapter/drizzle", "1.0.0").unwrap(), None);
    cache.set("adapter/drizzle", "1.0.0", "id: drizzle\n").unwrap();
    assert_eq!(
        cache.get("adapter/drizzle", "1.0.0").unwrap().as_deref(),
        Some("id: drizzle\n")
    );
    assert_eq!(cache.get("adapter/drizzle", "2.0.0").unwrap(), None);
    assert!(temp.path().join("cache").join(index::INDEX_FILE).exists());
}

#[test]
fn test_get_refreshes_last_accessed() {
    let temp = TempDir::new().unwrap();
    let clock = ManualClock::at(1_000);
    let cache = store(&temp, clock.clone(), 60, 1024);

    cache.set("framework/nextjs", "14.0.0", "a").unwrap();
    clock.set(1_050);
    assert!(cache.get("framework/nextjs", "14.0.0").unwrap().is_some());

    // 100s after creation but only 50s after the last read
    clock.set(1_100);
    assert!(cache.get("framework/nextjs", "14.0.0").unwrap().is_some());
    let entry = &cache.list().unwrap()[0];
    assert_eq!(entry.created, 1_000);
    assert_eq!(entry.last_accessed, 1_100);
}

#[test]
fn test_expired_entry_is_purged_on_get() {
    let temp = TempDir::new().unwrap();
    let clock = ManualClock::at(1_000);
    let cache = store(&temp, clock.clone(), 60, 1024);

    cache.set("adapter/zod", "3.0.0", "zod").unwrap();
    clock.set(1_061);
    assert_eq!(cache.get("adapter/zod", "3.0.0").unwrap(), None);
    assert!(cache.list().unwrap().is_empty());
    assert_eq!(
        fs::read_dir(temp.path().join("cache").join(BLOBS_DIR))
            .unwrap()
            .count(),
        0
    );
}

#[test]
fn test_set_over_ceiling_evicts_oldest_quarter() {
    let temp = TempDir::new().unwrap();
    let clock = ManualClock::at(0);
    // Eight 10-byte entries fill 80 of 100 bytes
    let cache = store(&temp, clock.clone(), 10_000, 100);
    for i in 0..8u64 {
        clock.set(100 + i);
        cache
            .set(&format!("adapter/m{i}"), "1.0.0", &format!("content-{i:02}"))
            .unwrap();
    }
    assert_eq!(cache.stats().unwrap().total_size, 80);

    // A 30-byte insert pushes the total to 110
    clock.set(200);
    cache
        .set("feature/big", "1.0.0", &"x".repeat(30))
        .unwrap();

    let ids: Vec<String> = cache.list().unwrap().into_iter().map(|e| e.module_id).collect();
    // ceil(9 / 4) = 3 oldest entries removed in that single pass
    assert_eq!(ids.len(), 6);
    for evicted in ["adapter/m0", "adapter/m1", "adapter/m2"] {
        assert!(!ids.contains(&evicted.to_string()), "{evicted} should be evicted");
    }
    assert!(ids.contains(&"feature/big".to_string()));
}

#[test]
fn test_set_under_ceiling_does_not_evict() {
    let temp = TempDir::new().unwrap();
    let cache = store(&temp, ManualClock::at(0), 10_000, 100);
    cache.set("adapter/a", "1.0.0", "0123456789").unwrap();
    cache.set("adapter/b", "1.0.0", "0123456789").unwrap();
    assert_eq!(cache.stats().unwrap().entries, 2);
}

#[test]
fn test_shared_blob_survives_until_unreferenced() {
    let temp = TempDir::new().unwrap();
    let cache = store(&temp, ManualClock::at(0), 10_000, 1024);
    cache.set("adapter/a", "1.0.0", "same").unwrap();
    cache.set("adapter/a", "1.1.0", "same").unwrap();
    cache.set("adapter/b", "1.0.0", "other").unwrap();

    let blobs = temp.path().join("cache").join(BLOBS_DIR);
    assert_eq!(fs::read_dir(&blobs).unwrap().count(), 2);

    assert_eq!(cache.remove("adapter/b").unwrap(), 1);
    assert_eq!(fs::read_dir(&blobs).unwrap().count(), 1);
    assert_eq!(cache.remove("adapter/a").unwrap(), 2);
    assert_eq!(fs::read_dir(&blobs).unwrap().count(), 0);
}

#[test]
fn test_remove_unknown_module_fails() {
    let temp = TempDir::new().unwrap();
    let cache = store(&temp, ManualClock::at(0), 60, 1024);
    let err = cache.remove("adapter/ghost").unwrap_err();
    assert!(err.to_string().contains("Module not found in cache"));
}

#[test]
fn test_clear_removes_everything() {
    let temp = TempDir::new().unwrap();
    let cache = store(&temp, ManualClock::at(0), 60, 1024);
    cache.set("adapter/a", "1.0.0", "a").unwrap();
    cache.clear().unwrap();
    assert!(!temp.path().join("cache").exists());
    assert_eq!(cache.stats().unwrap(), CacheStats {
        max_size: 1024,
        ..CacheStats::default()
    });
}

#[test]
fn test_index_persists_across_instances() {
    let temp = TempDir::new().unwrap();
    let clock = ManualClock::at(10);
    store(&temp, clock.clone(), 60, 1024)
        .set("framework/vue", "3.4.0", "vue")
        .unwrap();

    let reopened = store(&temp, clock, 60, 1024);
    assert_eq!(
        reopened.get("framework/vue", "3.4.0").unwrap().as_deref(),
        Some("vue")
    );
}

#[test]
fn test_corrupt_blob_is_a_miss() {
    let temp = TempDir::new().unwrap();
    let cache = store(&temp, ManualClock::at(0), 60, 1024);
    cache.set("adapter/a", "1.0.0", "original").unwrap();
    let blob = cache.blob_path(&hash::hash_content(b"original"));
    fs::write(blob, "tampered").unwrap();

    assert_eq!(cache.get("adapter/a", "1.0.0").unwrap(), None);
    assert!(cache.list().unwrap().is_empty());
}

#[test]
fn test_concurrent_sets_keep_every_indexed_blob() {
    let temp = TempDir::new().unwrap();
    let cache = store(&temp, ManualClock::at(1_000), 60, 64);
    let shared = "shared: true\n";

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let cache = &cache;
            scope.spawn(move || {
                for round in 0..10 {
                    let id = format!("adapter/m{worker}");
                    cache.set(&id, &round.to_string(), shared).unwrap();
                    cache
                        .set(&id, "unique", &format!("worker: {worker}\nround: {round}\n"))
                        .unwrap();
                }
            });
        }
    });

    for entry in cache.list().unwrap() {
        assert!(
            cache.get(&entry.module_id, &entry.version).unwrap().is_some(),
            "dangling entry {}@{}",
            entry.module_id,
            entry.version
        );
    }
}
