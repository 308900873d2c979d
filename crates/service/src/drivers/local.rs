//! Local-disk driver.
//!
//! Addresses entries by path, so it answers single-entry lookups directly
//! with a stat instead of scanning the parent listing. All capability flags
//! are set: content lives on this machine, links are local paths, and the
//! driver sorts its own listings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use common::account::Account;
use common::driver::{
    DownloadLink, Driver, DriverConfig, FileStream, Item, LinkArgs, Lister, RawListing,
};
use common::error::DriverError;
use common::file::{kind_for_name, sort_entities, FileEntity, FileKind};
use common::vpath;

use crate::resolve::Resolver;

const NAME: &str = "local";

/// Raw listing shape for this driver: one record per directory entry.
#[derive(Debug, Clone)]
pub struct LocalEntry {
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
    pub modified: Option<DateTime<Utc>>,
}

pub struct LocalDriver {
    resolver: Arc<Resolver>,
}

impl LocalDriver {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self { resolver }
    }

    fn full_path(&self, path: &str, account: &Account) -> PathBuf {
        let normalized = vpath::normalize(path);
        Path::new(&account.root_folder).join(normalized.trim_start_matches('/'))
    }

    fn entity_from_metadata(
        &self,
        name: &str,
        meta: &std::fs::Metadata,
    ) -> FileEntity {
        let kind = if meta.is_dir() {
            FileKind::Folder
        } else {
            kind_for_name(name)
        };
        FileEntity {
            id: None,
            name: name.to_string(),
            size: if meta.is_dir() { 0 } else { meta.len() },
            kind,
            driver: NAME,
            updated_at: meta.modified().ok().map(DateTime::<Utc>::from),
            thumbnail: None,
        }
    }

    fn copy_recursive<'a>(
        &'a self,
        src: &'a Path,
        dst: &'a Path,
    ) -> futures::future::BoxFuture<'a, Result<(), DriverError>> {
        use futures::FutureExt;
        async move {
            let meta = tokio::fs::metadata(src).await?;
            if meta.is_dir() {
                tokio::fs::create_dir_all(dst).await?;
                let mut entries = tokio::fs::read_dir(src).await?;
                while let Some(entry) = entries.next_entry().await? {
                    let name = entry.file_name();
                    self.copy_recursive(&src.join(&name), &dst.join(&name))
                        .await?;
                }
            } else {
                if let Some(parent) = dst.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::copy(src, dst).await?;
            }
            Ok(())
        }
        .boxed()
    }
}

#[async_trait]
impl Lister for LocalDriver {
    fn config(&self) -> DriverConfig {
        DriverConfig {
            name: NAME,
            only_proxy: true,
            only_local: true,
            no_need_set_link: true,
            local_sort: true,
        }
    }

    async fn stat(
        &self,
        path: &str,
        account: &Account,
    ) -> Result<Option<FileEntity>, DriverError> {
        let full = self.full_path(path, account);
        let meta = tokio::fs::metadata(&full).await?;
        let name = full
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| account.name.clone());
        Ok(Some(self.entity_from_metadata(&name, &meta)))
    }

    async fn list_raw(
        &self,
        _dir: &FileEntity,
        path: &str,
        account: &Account,
    ) -> Result<RawListing, DriverError> {
        let full = self.full_path(path, account);
        let mut raw = Vec::new();
        let mut entries = tokio::fs::read_dir(&full).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            // Hidden files stay hidden.
            if name.starts_with('.') {
                continue;
            }
            let meta = entry.metadata().await?;
            raw.push(LocalEntry {
                name,
                size: if meta.is_dir() { 0 } else { meta.len() },
                is_dir: meta.is_dir(),
                modified: meta.modified().ok().map(DateTime::<Utc>::from),
            });
        }
        Ok(Arc::new(raw))
    }

    fn classify(
        &self,
        raw: &RawListing,
        account: &Account,
    ) -> Result<Vec<FileEntity>, DriverError> {
        let entries = raw
            .downcast_ref::<Vec<LocalEntry>>()
            .ok_or_else(|| DriverError::Vendor("unexpected raw listing shape".to_string()))?;
        let mut files: Vec<FileEntity> = entries
            .iter()
            .map(|entry| FileEntity {
                id: None,
                name: entry.name.clone(),
                size: entry.size,
                kind: if entry.is_dir {
                    FileKind::Folder
                } else {
                    kind_for_name(&entry.name)
                },
                driver: NAME,
                updated_at: entry.modified,
                thumbnail: None,
            })
            .collect();
        // local_sort: ordering is this driver's responsibility.
        sort_entities(&mut files, account.sort_by, account.sort_direction);
        Ok(files)
    }
}

#[async_trait]
impl Driver for LocalDriver {
    fn items(&self) -> Vec<Item> {
        vec![Item::text("root_folder", "root folder path", true)]
    }

    async fn save(&self, account: &mut Account, _old: Option<&Account>) -> Result<(), DriverError> {
        tracing::debug!(account = %account.name, "saving local account");
        match tokio::fs::metadata(&account.root_folder).await {
            Ok(meta) if meta.is_dir() => {
                account.proxy = true;
                account.mark_working();
                Ok(())
            }
            _ => {
                let reason = format!("[{}] is not an existing directory", account.root_folder);
                account.mark_failed(&reason);
                Err(DriverError::AuthFailed(reason))
            }
        }
    }

    async fn file(&self, path: &str, account: &Account) -> Result<FileEntity, DriverError> {
        self.resolver.file(self, path, account).await
    }

    async fn files(&self, path: &str, account: &Account) -> Result<Vec<FileEntity>, DriverError> {
        self.resolver.files(self, path, account).await
    }

    async fn link(&self, args: &LinkArgs, account: &Account) -> Result<DownloadLink, DriverError> {
        let full = self.full_path(&args.path, account);
        let meta = tokio::fs::metadata(&full).await?;
        if meta.is_dir() {
            return Err(DriverError::NotFile);
        }
        Ok(DownloadLink::Local(full))
    }

    async fn make_dir(&self, path: &str, account: &Account) -> Result<(), DriverError> {
        let full = self.full_path(path, account);
        tokio::fs::create_dir_all(&full).await?;
        Ok(())
    }

    async fn move_item(&self, src: &str, dst: &str, account: &Account) -> Result<(), DriverError> {
        let full_src = self.full_path(src, account);
        let full_dst = self.full_path(dst, account);
        tokio::fs::rename(&full_src, &full_dst).await?;
        Ok(())
    }

    async fn rename(&self, src: &str, dst: &str, account: &Account) -> Result<(), DriverError> {
        // Renames stay in place; only the leaf of `dst` is used.
        let src = vpath::normalize(src);
        let dst = vpath::normalize(dst);
        let (_, dst_name) = vpath::split(&dst);
        let target = vpath::join(&vpath::parent_of(&src), &dst_name);
        self.move_item(&src, &target, account).await
    }

    async fn copy_item(&self, src: &str, dst: &str, account: &Account) -> Result<(), DriverError> {
        let full_src = self.full_path(src, account);
        let full_dst = self.full_path(dst, account);
        if let Ok(meta) = tokio::fs::metadata(&full_dst).await {
            // Copying over an existing non-directory is refused rather than
            // silently overwritten.
            if !meta.is_dir() {
                return Err(DriverError::NotSupported);
            }
        }
        self.copy_recursive(&full_src, &full_dst).await
    }

    async fn delete(&self, path: &str, account: &Account) -> Result<(), DriverError> {
        let full = self.full_path(path, account);
        let meta = tokio::fs::metadata(&full).await?;
        if meta.is_dir() {
            tokio::fs::remove_dir_all(&full).await?;
        } else {
            tokio::fs::remove_file(&full).await?;
        }
        Ok(())
    }

    async fn upload(
        &self,
        stream: Option<FileStream>,
        account: &Account,
    ) -> Result<(), DriverError> {
        let mut stream = stream.ok_or(DriverError::EmptyFile)?;
        let parent = self.full_path(&stream.parent_path, account);
        tokio::fs::create_dir_all(&parent).await?;
        let target = parent.join(&stream.name);
        let mut out = tokio::fs::File::create(&target).await?;
        tokio::io::copy(&mut stream.reader, &mut out).await?;
        Ok(())
    }
}
