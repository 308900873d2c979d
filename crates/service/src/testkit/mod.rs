//! Test support: scripted in-memory backends with call-count
//! instrumentation.
//!
//! [`MemoryDriver`] behaves like an id-addressed vendor whose mutations are
//! synchronous; [`TaskDriver`] only records batch submissions, the way a
//! fire-and-forget vendor queue would. Both count `list_raw` calls so tests
//! can assert exactly when the resolution engine went to the backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::AsyncReadExt;

use common::account::Account;
use common::batch::{BatchItem, BatchTask};
use common::driver::{
    DownloadLink, Driver, DriverConfig, FileStream, Item, LinkArgs, Lister, RawListing,
};
use common::error::DriverError;
use common::file::{kind_for_name, FileEntity, FileKind};
use common::vpath;

use crate::resolve::Resolver;

pub const MEMORY_DRIVER: &str = "memfs";
pub const TASK_DRIVER: &str = "memtask";

/// One scripted backend entry. The virtual path doubles as the backend id,
/// which keeps resolved ids easy to assert against.
#[derive(Debug, Clone)]
pub struct MemEntry {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
}

/// A shared scripted tree, keyed by directory id.
///
/// Tests hold onto the `Arc` and mutate the script while the driver is
/// registered, so staleness scenarios can change the backend behind the
/// cache's back.
#[derive(Default)]
pub struct MemoryTree {
    dirs: Mutex<HashMap<String, Vec<MemEntry>>>,
}

impl MemoryTree {
    pub fn new() -> Arc<Self> {
        let tree = Self::default();
        tree.dirs.lock().insert("/".to_string(), Vec::new());
        Arc::new(tree)
    }

    /// Add a directory under `parent` and return its id.
    pub fn add_dir(&self, parent: &str, name: &str) -> String {
        let parent = vpath::normalize(parent);
        let id = vpath::join(&parent, name);
        let mut dirs = self.dirs.lock();
        dirs.entry(id.clone()).or_default();
        let children = dirs.entry(parent).or_default();
        children.retain(|entry| entry.name != name);
        children.push(MemEntry {
            id: id.clone(),
            name: name.to_string(),
            size: 0,
            is_dir: true,
        });
        id
    }

    pub fn add_file(&self, parent: &str, name: &str, size: u64) {
        let parent = vpath::normalize(parent);
        let id = vpath::join(&parent, name);
        let mut dirs = self.dirs.lock();
        let children = dirs.entry(parent).or_default();
        children.retain(|entry| entry.name != name);
        children.push(MemEntry {
            id,
            name: name.to_string(),
            size,
            is_dir: false,
        });
    }

    pub fn remove(&self, parent: &str, name: &str) {
        let parent = vpath::normalize(parent);
        let id = vpath::join(&parent, name);
        let mut dirs = self.dirs.lock();
        dirs.remove(&id);
        if let Some(children) = dirs.get_mut(&parent) {
            children.retain(|entry| entry.name != name);
        }
    }

    fn children(&self, dir_id: &str) -> Result<Vec<MemEntry>, DriverError> {
        self.dirs
            .lock()
            .get(dir_id)
            .cloned()
            .ok_or(DriverError::PathNotFound)
    }

    /// Relocate an entry; `dst` is the full destination path.
    fn move_entry(&self, src: &str, dst: &str) -> Result<(), DriverError> {
        let src = vpath::normalize(src);
        let dst = vpath::normalize(dst);
        let (src_parent, src_name) = vpath::split(&src);
        let (dst_parent, dst_name) = vpath::split(&dst);
        let mut dirs = self.dirs.lock();
        if !dirs.contains_key(&dst_parent) {
            return Err(DriverError::PathNotFound);
        }
        let from = dirs.get_mut(&src_parent).ok_or(DriverError::PathNotFound)?;
        let index = from
            .iter()
            .position(|entry| entry.name == src_name)
            .ok_or(DriverError::PathNotFound)?;
        let mut entry = from.remove(index);
        entry.id = dst.clone();
        entry.name = dst_name;
        dirs.entry(dst_parent).or_default().push(entry);
        Ok(())
    }
}

fn entity_for(entry: &MemEntry, driver: &'static str) -> FileEntity {
    FileEntity {
        id: Some(entry.id.clone()),
        name: entry.name.clone(),
        size: entry.size,
        kind: if entry.is_dir {
            FileKind::Folder
        } else {
            kind_for_name(&entry.name)
        },
        driver,
        updated_at: None,
        thumbnail: None,
    }
}

fn classify_raw(
    raw: &RawListing,
    driver: &'static str,
) -> Result<Vec<FileEntity>, DriverError> {
    let entries = raw
        .downcast_ref::<Vec<MemEntry>>()
        .ok_or_else(|| DriverError::Vendor("unexpected raw listing shape".to_string()))?;
    Ok(entries.iter().map(|entry| entity_for(entry, driver)).collect())
}

/// An account wired to the given driver, already marked working, rooted at
/// the tree root.
pub fn working_account(driver: &str, name: &str) -> Account {
    let mut account = Account {
        name: name.to_string(),
        driver: driver.to_string(),
        username: String::new(),
        password: String::new(),
        root_folder: "/".to_string(),
        status: String::new(),
        drive_id: String::new(),
        proxy: false,
        sort_by: Default::default(),
        sort_direction: Default::default(),
        updated_at: None,
    };
    account.mark_working();
    account
}

/// Id-addressed scripted backend with synchronous mutations.
pub struct MemoryDriver {
    resolver: Arc<Resolver>,
    tree: Arc<MemoryTree>,
    list_calls: AtomicUsize,
}

impl MemoryDriver {
    pub fn new(resolver: Arc<Resolver>, tree: Arc<MemoryTree>) -> Self {
        Self {
            resolver,
            tree,
            list_calls: AtomicUsize::new(0),
        }
    }

    /// How many times the engine actually hit the backend listing call.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn tree(&self) -> &Arc<MemoryTree> {
        &self.tree
    }
}

#[async_trait]
impl Lister for MemoryDriver {
    fn config(&self) -> DriverConfig {
        DriverConfig::named(MEMORY_DRIVER)
    }

    async fn list_raw(
        &self,
        dir: &FileEntity,
        _path: &str,
        _account: &Account,
    ) -> Result<RawListing, DriverError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let id = dir.id.as_deref().ok_or(DriverError::PathNotFound)?;
        Ok(Arc::new(self.tree.children(id)?))
    }

    fn classify(
        &self,
        raw: &RawListing,
        _account: &Account,
    ) -> Result<Vec<FileEntity>, DriverError> {
        classify_raw(raw, MEMORY_DRIVER)
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    fn items(&self) -> Vec<Item> {
        vec![Item::text("root_folder", "root folder id", false)]
    }

    async fn save(&self, account: &mut Account, _old: Option<&Account>) -> Result<(), DriverError> {
        if account.root_folder.is_empty() {
            account.root_folder = "/".to_string();
        }
        account.mark_working();
        Ok(())
    }

    async fn file(&self, path: &str, account: &Account) -> Result<FileEntity, DriverError> {
        self.resolver.file(self, path, account).await
    }

    async fn files(&self, path: &str, account: &Account) -> Result<Vec<FileEntity>, DriverError> {
        self.resolver.files(self, path, account).await
    }

    async fn link(&self, args: &LinkArgs, account: &Account) -> Result<DownloadLink, DriverError> {
        let entity = self.resolver.file(self, &args.path, account).await?;
        if entity.is_dir() {
            return Err(DriverError::NotFile);
        }
        Ok(DownloadLink::Url(format!(
            "mem://{}{}",
            account.name,
            vpath::normalize(&args.path)
        )))
    }

    async fn make_dir(&self, path: &str, account: &Account) -> Result<(), DriverError> {
        let path = vpath::normalize(path);
        let (parent, name) = vpath::split(&path);
        // Parent has to exist in the script.
        self.resolver.file(self, &parent, account).await?;
        self.tree.add_dir(&parent, &name);
        Ok(())
    }

    async fn move_item(&self, src: &str, dst: &str, account: &Account) -> Result<(), DriverError> {
        self.resolver.file(self, src, account).await?;
        self.tree.move_entry(src, dst)
    }

    async fn rename(&self, src: &str, dst: &str, account: &Account) -> Result<(), DriverError> {
        self.resolver.file(self, src, account).await?;
        let src = vpath::normalize(src);
        let dst = vpath::normalize(dst);
        let (_, dst_name) = vpath::split(&dst);
        let target = vpath::join(&vpath::parent_of(&src), &dst_name);
        self.tree.move_entry(&src, &target)
    }

    async fn copy_item(&self, src: &str, dst: &str, account: &Account) -> Result<(), DriverError> {
        let entity = self.resolver.file(self, src, account).await?;
        let dst = vpath::normalize(dst);
        let (dst_parent, dst_name) = vpath::split(&dst);
        self.resolver.file(self, &dst_parent, account).await?;
        if entity.is_dir() {
            self.tree.add_dir(&dst_parent, &dst_name);
        } else {
            self.tree.add_file(&dst_parent, &dst_name, entity.size);
        }
        Ok(())
    }

    async fn delete(&self, path: &str, account: &Account) -> Result<(), DriverError> {
        self.resolver.file(self, path, account).await?;
        let path = vpath::normalize(path);
        let (parent, name) = vpath::split(&path);
        self.tree.remove(&parent, &name);
        Ok(())
    }

    async fn upload(
        &self,
        stream: Option<FileStream>,
        account: &Account,
    ) -> Result<(), DriverError> {
        let mut stream = stream.ok_or(DriverError::EmptyFile)?;
        let parent = vpath::normalize(&stream.parent_path);
        self.resolver.file(self, &parent, account).await?;
        let mut body = Vec::new();
        stream.reader.read_to_end(&mut body).await?;
        self.tree.add_file(&parent, &stream.name, body.len() as u64);
        Ok(())
    }
}

/// Scripted backend whose mutations are fire-and-forget batch submissions.
///
/// Move, copy, and delete resolve their sources like the real task-based
/// driver, record the [`BatchTask`], and return without touching the tree.
/// Tests inspect `submitted()` and mutate the tree themselves when they want
/// the backend view to change.
pub struct TaskDriver {
    resolver: Arc<Resolver>,
    tree: Arc<MemoryTree>,
    list_calls: AtomicUsize,
    submitted: Mutex<Vec<BatchTask>>,
}

impl TaskDriver {
    pub fn new(resolver: Arc<Resolver>, tree: Arc<MemoryTree>) -> Self {
        Self {
            resolver,
            tree,
            list_calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn tree(&self) -> &Arc<MemoryTree> {
        &self.tree
    }

    pub fn submitted(&self) -> Vec<BatchTask> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl Lister for TaskDriver {
    fn config(&self) -> DriverConfig {
        DriverConfig::named(TASK_DRIVER)
    }

    async fn list_raw(
        &self,
        dir: &FileEntity,
        _path: &str,
        _account: &Account,
    ) -> Result<RawListing, DriverError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let id = dir.id.as_deref().ok_or(DriverError::PathNotFound)?;
        Ok(Arc::new(self.tree.children(id)?))
    }

    fn classify(
        &self,
        raw: &RawListing,
        _account: &Account,
    ) -> Result<Vec<FileEntity>, DriverError> {
        classify_raw(raw, TASK_DRIVER)
    }
}

#[async_trait]
impl Driver for TaskDriver {
    fn items(&self) -> Vec<Item> {
        vec![Item::text("root_folder", "root folder id", false)]
    }

    async fn save(&self, account: &mut Account, _old: Option<&Account>) -> Result<(), DriverError> {
        if account.root_folder.is_empty() {
            account.root_folder = "/".to_string();
        }
        account.mark_working();
        Ok(())
    }

    async fn file(&self, path: &str, account: &Account) -> Result<FileEntity, DriverError> {
        self.resolver.file(self, path, account).await
    }

    async fn files(&self, path: &str, account: &Account) -> Result<Vec<FileEntity>, DriverError> {
        self.resolver.files(self, path, account).await
    }

    async fn link(&self, args: &LinkArgs, account: &Account) -> Result<DownloadLink, DriverError> {
        let entity = self.resolver.file(self, &args.path, account).await?;
        if entity.is_dir() {
            return Err(DriverError::NotFile);
        }
        Ok(DownloadLink::Url(format!(
            "mem://{}{}",
            account.name,
            vpath::normalize(&args.path)
        )))
    }

    async fn make_dir(&self, path: &str, account: &Account) -> Result<(), DriverError> {
        let path = vpath::normalize(path);
        let (parent, name) = vpath::split(&path);
        self.resolver.file(self, &parent, account).await?;
        self.tree.add_dir(&parent, &name);
        Ok(())
    }

    async fn move_item(&self, src: &str, dst: &str, account: &Account) -> Result<(), DriverError> {
        let dst = vpath::normalize(dst);
        let (dst_parent, dst_name) = vpath::split(&dst);
        let entity = self.resolver.file(self, src, account).await?;
        let target = self.resolver.file(self, &dst_parent, account).await?;
        let target_id = target.id.ok_or(DriverError::PathNotFound)?;
        let item = BatchItem::from_entity(&entity, dst_name);
        self.submitted
            .lock()
            .push(BatchTask::moving(target_id, vec![item]));
        Ok(())
    }

    async fn rename(&self, _src: &str, _dst: &str, _account: &Account) -> Result<(), DriverError> {
        Err(DriverError::NotSupported)
    }

    async fn copy_item(&self, src: &str, dst: &str, account: &Account) -> Result<(), DriverError> {
        let dst = vpath::normalize(dst);
        let (dst_parent, dst_name) = vpath::split(&dst);
        let entity = self.resolver.file(self, src, account).await?;
        let target = self.resolver.file(self, &dst_parent, account).await?;
        let target_id = target.id.ok_or(DriverError::PathNotFound)?;
        let item = BatchItem::from_entity(&entity, dst_name);
        self.submitted
            .lock()
            .push(BatchTask::copying(target_id, vec![item]));
        Ok(())
    }

    async fn delete(&self, path: &str, account: &Account) -> Result<(), DriverError> {
        let entity = self.resolver.file(self, path, account).await?;
        let item = BatchItem::from_entity(&entity, entity.name.clone());
        self.submitted
            .lock()
            .push(BatchTask::deleting(vec![item]));
        Ok(())
    }
}
