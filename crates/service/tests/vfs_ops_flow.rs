//! Operation-layer flows against full service state: account lifecycle,
//! mutation-driven cache invalidation, and the fire-and-forget batch
//! protocol.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use common::batch::BatchKind;
use common::driver::{DownloadLink, FileStream};
use common::error::DriverError;

use service::testkit::{
    working_account, MemoryDriver, MemoryTree, TaskDriver, MEMORY_DRIVER, TASK_DRIVER,
};
use service::{vfs_ops, DriverRegistry, ServiceConfig, ServiceState, VfsOpsError};

struct Env {
    state: ServiceState,
    memory: Arc<MemoryDriver>,
    task: Arc<TaskDriver>,
    tree: Arc<MemoryTree>,
}

async fn env() -> Env {
    let config = ServiceConfig {
        cache_expiration: Duration::from_secs(60),
        ..ServiceConfig::default()
    };
    let tree = MemoryTree::new();
    let mut memory_slot = None;
    let mut task_slot = None;
    let state = ServiceState::from_config_with(&config, |resolver| {
        let mut registry = DriverRegistry::with_defaults(resolver.clone());
        let memory = Arc::new(MemoryDriver::new(resolver.clone(), tree.clone()));
        let task = Arc::new(TaskDriver::new(resolver, tree.clone()));
        memory_slot = Some(memory.clone());
        task_slot = Some(task.clone());
        registry.register(memory);
        registry.register(task);
        registry
    })
    .await
    .expect("state setup");
    Env {
        state,
        memory: memory_slot.unwrap(),
        task: task_slot.unwrap(),
        tree,
    }
}

#[tokio::test]
async fn account_lifecycle_round_trip() {
    let env = env().await;
    let account = working_account(MEMORY_DRIVER, "mem");
    let saved = vfs_ops::save_account(account, &env.state).await.unwrap();
    assert!(saved.is_working());

    let loaded = vfs_ops::get_account("mem", &env.state).await.unwrap();
    assert_eq!(loaded.driver, MEMORY_DRIVER);
    assert_eq!(vfs_ops::list_accounts(&env.state).await.unwrap().len(), 1);

    vfs_ops::delete_account("mem", &env.state).await.unwrap();
    let err = vfs_ops::get_account("mem", &env.state).await.unwrap_err();
    assert!(matches!(err, VfsOpsError::AccountNotFound(_)));
}

#[tokio::test]
async fn deleting_missing_account_is_not_found() {
    let env = env().await;
    let err = vfs_ops::delete_account("ghost", &env.state).await.unwrap_err();
    assert!(matches!(err, VfsOpsError::AccountNotFound(name) if name == "ghost"));
}

#[tokio::test]
async fn unknown_driver_is_rejected_on_save() {
    let env = env().await;
    let mut account = working_account(MEMORY_DRIVER, "odd");
    account.driver = "no-such-backend".to_string();
    let err = vfs_ops::save_account(account, &env.state).await.unwrap_err();
    assert!(matches!(err, VfsOpsError::UnknownDriver(_)));
}

#[tokio::test]
async fn failed_validation_is_persisted_and_returned() {
    let env = env().await;
    let mut account = working_account("local", "disk");
    account.root_folder = "/definitely/not/a/real/directory".to_string();

    let err = vfs_ops::save_account(account, &env.state).await.unwrap_err();
    assert!(matches!(
        err,
        VfsOpsError::Driver(DriverError::AuthFailed(_))
    ));

    // The record landed anyway, carrying the failure description.
    let stored = vfs_ops::get_account("disk", &env.state).await.unwrap();
    assert!(!stored.is_working());
    assert!(stored.status.contains("not an existing directory"));

    // And serving requests against it is refused.
    let err = vfs_ops::list_files("/", "disk", &env.state).await.unwrap_err();
    assert!(matches!(err, VfsOpsError::AccountNotReady(_, _)));
}

#[tokio::test]
async fn make_dir_invalidates_parent_listing() {
    let env = env().await;
    vfs_ops::save_account(working_account(MEMORY_DRIVER, "mem"), &env.state)
        .await
        .unwrap();
    env.tree.add_file("/", "seed.txt", 1);

    vfs_ops::list_files("/", "mem", &env.state).await.unwrap();
    assert_eq!(env.memory.list_calls(), 1);

    vfs_ops::make_dir("/fresh", "mem", &env.state).await.unwrap();

    let entries = vfs_ops::list_files("/", "mem", &env.state).await.unwrap();
    assert_eq!(env.memory.list_calls(), 2);
    assert!(entries.iter().any(|e| e.name == "fresh" && e.is_dir()));
}

#[tokio::test]
async fn upload_invalidates_destination_listing() {
    let env = env().await;
    vfs_ops::save_account(working_account(MEMORY_DRIVER, "mem"), &env.state)
        .await
        .unwrap();
    env.tree.add_dir("/", "inbox");

    vfs_ops::list_files("/inbox", "mem", &env.state).await.unwrap();

    let body = b"hello".to_vec();
    let stream = FileStream {
        name: "hello.txt".to_string(),
        parent_path: "/inbox".to_string(),
        mime: "text/plain".to_string(),
        size: body.len() as u64,
        reader: Box::new(Cursor::new(body)),
    };
    vfs_ops::upload_file(Some(stream), "mem", &env.state)
        .await
        .unwrap();

    let entries = vfs_ops::list_files("/inbox", "mem", &env.state).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "hello.txt");
    assert_eq!(entries[0].size, 5);
}

#[tokio::test]
async fn upload_without_stream_never_reaches_backend() {
    let env = env().await;
    vfs_ops::save_account(working_account(MEMORY_DRIVER, "mem"), &env.state)
        .await
        .unwrap();
    let calls_before = env.memory.list_calls();

    let err = vfs_ops::upload_file(None, "mem", &env.state).await.unwrap_err();
    assert!(matches!(err, VfsOpsError::Driver(DriverError::EmptyFile)));
    assert_eq!(env.memory.list_calls(), calls_before);
}

#[tokio::test]
async fn link_on_directory_is_not_file() {
    let env = env().await;
    vfs_ops::save_account(working_account(MEMORY_DRIVER, "mem"), &env.state)
        .await
        .unwrap();
    env.tree.add_dir("/", "folder");
    env.tree.add_file("/", "leaf.txt", 2);

    let err = vfs_ops::resolve_link("/folder", "mem", &env.state)
        .await
        .unwrap_err();
    assert!(matches!(err, VfsOpsError::Driver(DriverError::NotFile)));

    let link = vfs_ops::resolve_link("/leaf.txt", "mem", &env.state)
        .await
        .unwrap();
    assert_eq!(link, DownloadLink::Url("mem://mem/leaf.txt".to_string()));
}

#[tokio::test]
async fn move_refreshes_both_parents() {
    let env = env().await;
    vfs_ops::save_account(working_account(MEMORY_DRIVER, "mem"), &env.state)
        .await
        .unwrap();
    env.tree.add_dir("/", "src");
    env.tree.add_dir("/", "dst");
    env.tree.add_file("/src", "doc.txt", 7);

    assert_eq!(vfs_ops::list_files("/src", "mem", &env.state).await.unwrap().len(), 1);
    vfs_ops::move_item("/src/doc.txt", "/dst/doc.txt", "mem", &env.state)
        .await
        .unwrap();

    // Both sides were invalidated, so each shows the post-move truth.
    assert!(vfs_ops::list_files("/src", "mem", &env.state).await.unwrap().is_empty());
    let dst = vfs_ops::list_files("/dst", "mem", &env.state).await.unwrap();
    assert_eq!(dst.len(), 1);
    assert_eq!(dst[0].name, "doc.txt");
}

#[tokio::test]
async fn rename_is_visible_after_invalidation() {
    let env = env().await;
    vfs_ops::save_account(working_account(MEMORY_DRIVER, "mem"), &env.state)
        .await
        .unwrap();
    env.tree.add_file("/", "before.txt", 3);

    vfs_ops::list_files("/", "mem", &env.state).await.unwrap();
    vfs_ops::rename_item("/before.txt", "after.txt", "mem", &env.state)
        .await
        .unwrap();

    let entries = vfs_ops::list_files("/", "mem", &env.state).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "after.txt");
}

#[tokio::test]
async fn batch_delete_is_fire_and_forget() {
    let env = env().await;
    vfs_ops::save_account(working_account(TASK_DRIVER, "cloud"), &env.state)
        .await
        .unwrap();
    env.tree.add_file("/", "victim.txt", 10);

    vfs_ops::list_files("/", "cloud", &env.state).await.unwrap();
    assert_eq!(env.task.list_calls(), 1);

    vfs_ops::delete_item("/victim.txt", "cloud", &env.state)
        .await
        .unwrap();

    let submitted = env.task.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].kind(), BatchKind::Delete);
    assert_eq!(submitted[0].target_container_id(), "");
    assert_eq!(submitted[0].items()[0].source_id, "/victim.txt");
    assert!(!submitted[0].items()[0].is_container);

    // Invalidation forced a refetch, and the vendor has not executed the
    // task yet, so the entry is legitimately still visible.
    let entries = vfs_ops::list_files("/", "cloud", &env.state).await.unwrap();
    assert!(env.task.list_calls() >= 2);
    assert!(entries.iter().any(|e| e.name == "victim.txt"));
}

#[tokio::test]
async fn batch_move_carries_target_container() {
    let env = env().await;
    vfs_ops::save_account(working_account(TASK_DRIVER, "cloud"), &env.state)
        .await
        .unwrap();
    env.tree.add_dir("/", "archive");
    env.tree.add_file("/", "report.pdf", 22);

    vfs_ops::move_item("/report.pdf", "/archive/report.pdf", "cloud", &env.state)
        .await
        .unwrap();

    let submitted = env.task.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].kind(), BatchKind::Move);
    assert_eq!(submitted[0].target_container_id(), "/archive");
    assert_eq!(submitted[0].items()[0].dest_name, "report.pdf");
}

#[tokio::test]
async fn account_replacement_wipes_its_cached_listings() {
    let env = env().await;
    vfs_ops::save_account(working_account(MEMORY_DRIVER, "mem"), &env.state)
        .await
        .unwrap();
    env.tree.add_file("/", "a.txt", 1);

    vfs_ops::list_files("/", "mem", &env.state).await.unwrap();
    assert_eq!(env.state.cache().len(), 1);

    // Re-saving the account drops everything cached under its name.
    vfs_ops::save_account(working_account(MEMORY_DRIVER, "mem"), &env.state)
        .await
        .unwrap();
    assert!(env.state.cache().is_empty());
}

#[tokio::test]
async fn preview_defaults_to_not_supported() {
    let env = env().await;
    vfs_ops::save_account(working_account(MEMORY_DRIVER, "mem"), &env.state)
        .await
        .unwrap();
    env.tree.add_file("/", "a.txt", 1);

    let err = vfs_ops::preview_file("/a.txt", "mem", &env.state)
        .await
        .unwrap_err();
    assert!(matches!(err, VfsOpsError::Driver(DriverError::NotSupported)));
}
