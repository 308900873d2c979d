//! Resolution engine behavior against a scripted in-memory backend:
//! cache reuse, deep-path decomposition, TTL expiry and single-flight
//! deduplication.

use std::sync::Arc;
use std::time::Duration;

use common::account::{SortBy, SortDirection};
use common::error::DriverError;
use common::file::FileKind;

use service::testkit::{working_account, MemoryDriver, MemoryTree, MEMORY_DRIVER};
use service::{DirCache, Resolver};

fn setup(ttl: Duration) -> (Arc<Resolver>, MemoryDriver, Arc<MemoryTree>) {
    let cache = Arc::new(DirCache::new(ttl));
    let resolver = Arc::new(Resolver::new(cache));
    let tree = MemoryTree::new();
    let driver = MemoryDriver::new(resolver.clone(), tree.clone());
    (resolver, driver, tree)
}

#[tokio::test]
async fn repeat_listing_hits_backend_once() {
    let (resolver, driver, tree) = setup(Duration::from_secs(60));
    tree.add_file("/", "a.txt", 3);
    tree.add_file("/", "b.txt", 5);
    let account = working_account(MEMORY_DRIVER, "acct");

    let first = resolver.files(&driver, "/", &account).await.unwrap();
    let second = resolver.files(&driver, "/", &account).await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert_eq!(driver.list_calls(), 1);
}

#[tokio::test]
async fn deep_path_resolves_through_ancestor_listings() {
    let (resolver, driver, tree) = setup(Duration::from_secs(60));
    let docs = tree.add_dir("/", "docs");
    let work = tree.add_dir(&docs, "work");
    tree.add_file(&work, "report.pdf", 1024);
    let account = working_account(MEMORY_DRIVER, "acct");

    let entity = resolver
        .file(&driver, "/docs/work/report.pdf", &account)
        .await
        .unwrap();
    assert_eq!(entity.name, "report.pdf");
    assert_eq!(entity.size, 1024);
    assert!(!entity.is_dir());
    // One listing per ancestor directory: /, /docs, /docs/work.
    assert_eq!(driver.list_calls(), 3);

    // Every ancestor listing is now warm, so a re-resolve is free.
    resolver
        .file(&driver, "/docs/work/report.pdf", &account)
        .await
        .unwrap();
    assert_eq!(driver.list_calls(), 3);
}

#[tokio::test]
async fn root_is_synthetic_and_never_listed_for_stat() {
    let (resolver, driver, _tree) = setup(Duration::from_secs(60));
    let account = working_account(MEMORY_DRIVER, "acct");

    let root = resolver.file(&driver, "/", &account).await.unwrap();
    assert_eq!(root.name, "acct");
    assert_eq!(root.kind, FileKind::Folder);
    assert_eq!(root.id.as_deref(), Some("/"));
    assert_eq!(driver.list_calls(), 0);
}

#[tokio::test]
async fn missing_leaf_is_path_not_found() {
    let (resolver, driver, tree) = setup(Duration::from_secs(60));
    tree.add_file("/", "present.txt", 1);
    let account = working_account(MEMORY_DRIVER, "acct");

    let err = resolver
        .file(&driver, "/absent.txt", &account)
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::PathNotFound));
}

#[tokio::test]
async fn listing_a_file_is_not_folder() {
    let (resolver, driver, tree) = setup(Duration::from_secs(60));
    tree.add_file("/", "notes.txt", 9);
    let account = working_account(MEMORY_DRIVER, "acct");

    let err = resolver
        .files(&driver, "/notes.txt", &account)
        .await
        .unwrap_err();
    assert!(matches!(err, DriverError::NotFolder));
}

#[tokio::test]
async fn empty_listings_are_not_cached() {
    let (resolver, driver, tree) = setup(Duration::from_secs(60));
    tree.add_dir("/", "empty");
    let account = working_account(MEMORY_DRIVER, "acct");

    assert!(resolver.files(&driver, "/empty", &account).await.unwrap().is_empty());
    assert!(resolver.files(&driver, "/empty", &account).await.unwrap().is_empty());
    // Two calls for /empty plus the one root listing that resolved it.
    assert_eq!(driver.list_calls(), 3);
}

#[tokio::test]
async fn expired_listing_is_refetched() {
    let (resolver, driver, tree) = setup(Duration::from_millis(30));
    tree.add_file("/", "a.txt", 1);
    let account = working_account(MEMORY_DRIVER, "acct");

    resolver.files(&driver, "/", &account).await.unwrap();
    assert_eq!(driver.list_calls(), 1);
    tokio::time::sleep(Duration::from_millis(60)).await;
    resolver.files(&driver, "/", &account).await.unwrap();
    assert_eq!(driver.list_calls(), 2);
}

#[tokio::test]
async fn stale_window_serves_old_listing_until_expiry() {
    let (resolver, driver, tree) = setup(Duration::from_millis(50));
    tree.add_file("/", "old.txt", 1);
    let account = working_account(MEMORY_DRIVER, "acct");

    let before = resolver.files(&driver, "/", &account).await.unwrap();
    assert_eq!(before[0].name, "old.txt");

    // The backend changes behind the cache's back.
    tree.remove("/", "old.txt");
    tree.add_file("/", "new.txt", 2);

    let stale = resolver.files(&driver, "/", &account).await.unwrap();
    assert_eq!(stale[0].name, "old.txt");

    tokio::time::sleep(Duration::from_millis(80)).await;
    let fresh = resolver.files(&driver, "/", &account).await.unwrap();
    assert_eq!(fresh[0].name, "new.txt");
}

#[tokio::test]
async fn concurrent_misses_share_one_backend_call() {
    let (resolver, driver, tree) = setup(Duration::from_secs(60));
    for i in 0..4u64 {
        tree.add_file("/", &format!("f{i}.txt"), i);
    }
    let account = working_account(MEMORY_DRIVER, "acct");

    let (a, b, c, d) = tokio::join!(
        resolver.files(&driver, "/", &account),
        resolver.files(&driver, "/", &account),
        resolver.files(&driver, "/", &account),
        resolver.files(&driver, "/", &account),
    );
    for result in [a, b, c, d] {
        assert_eq!(result.unwrap().len(), 4);
    }
    assert_eq!(driver.list_calls(), 1);
}

#[tokio::test]
async fn listings_sort_per_account_preference() {
    let (resolver, driver, tree) = setup(Duration::from_secs(60));
    tree.add_file("/", "small.bin", 1);
    tree.add_file("/", "large.bin", 100);
    tree.add_dir("/", "zfolder");
    let mut account = working_account(MEMORY_DRIVER, "acct");
    account.sort_by = SortBy::Size;
    account.sort_direction = SortDirection::Desc;

    let entries = resolver.files(&driver, "/", &account).await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    // Descending size; the folder lists as size zero.
    assert_eq!(names, ["large.bin", "small.bin", "zfolder"]);
}
