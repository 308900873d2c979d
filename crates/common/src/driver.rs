use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

use crate::account::Account;
use crate::error::DriverError;
use crate::file::{FileEntity, FileKind};

/// Static capability flags for one driver.
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    pub name: &'static str,
    /// All downloads are routed through this server; never redirect to a
    /// vendor URL.
    pub only_proxy: bool,
    /// Content must be byte-streamed by this server rather than referenced
    /// remotely.
    pub only_local: bool,
    /// Link resolution is a no-op for this driver.
    pub no_need_set_link: bool,
    /// The driver returns listings already sorted; the engine must not
    /// re-sort them.
    pub local_sort: bool,
}

impl DriverConfig {
    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            only_proxy: false,
            only_local: false,
            no_need_set_link: false,
            local_sort: false,
        }
    }
}

/// One field of a driver's account-setup form. Consumed by configuration
/// front ends, not by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ItemKind,
    /// Comma-separated allowed values for selects.
    pub values: &'static str,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Text,
    Select,
    Number,
}

impl Item {
    pub const fn text(name: &'static str, label: &'static str, required: bool) -> Self {
        Self {
            name,
            label,
            kind: ItemKind::Text,
            values: "",
            required,
            description: "",
        }
    }

    pub const fn select(name: &'static str, label: &'static str, values: &'static str) -> Self {
        Self {
            name,
            label,
            kind: ItemKind::Select,
            values,
            required: true,
            description: "",
        }
    }
}

/// Arguments for resolving a download link.
#[derive(Debug, Clone)]
pub struct LinkArgs {
    pub path: String,
}

/// Where the delivery layer sends the client: a remote URL to redirect to,
/// or a local filesystem path to stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadLink {
    Url(String),
    Local(PathBuf),
}

/// An inbound upload: metadata plus the byte stream.
pub struct FileStream {
    pub name: String,
    /// Virtual path of the directory receiving the upload.
    pub parent_path: String,
    pub mime: String,
    pub size: u64,
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl std::fmt::Debug for FileStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStream")
            .field("name", &self.name)
            .field("parent_path", &self.parent_path)
            .field("mime", &self.mime)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// A backend-native directory listing, opaque to the cache.
///
/// Each driver caches whatever shape its vendor API naturally returns and
/// downcasts it back in `classify`.
pub type RawListing = Arc<dyn Any + Send + Sync>;

/// The listing primitives the path resolution engine drives.
///
/// Split out from [`Driver`] so the engine depends only on what it needs:
/// a way to fetch raw children for a resolved directory and a pure
/// classification of raw entries into [`FileEntity`] records.
#[async_trait]
pub trait Lister: Send + Sync {
    fn config(&self) -> DriverConfig;

    /// Synthetic root entry for an account; `"/"` never hits the backend.
    fn root_entry(&self, account: &Account) -> FileEntity {
        FileEntity {
            id: Some(account.root_folder.clone()),
            name: account.name.clone(),
            size: 0,
            kind: FileKind::Folder,
            driver: self.config().name,
            updated_at: account.updated_at,
            thumbnail: None,
        }
    }

    /// Direct single-entry lookup, for backends that have one.
    ///
    /// `Ok(None)` means the driver has no such primitive and the engine
    /// falls back to scanning the parent listing. Drivers that do support it
    /// return `Ok(Some(_))` or `Err(PathNotFound)`.
    async fn stat(
        &self,
        _path: &str,
        _account: &Account,
    ) -> Result<Option<FileEntity>, DriverError> {
        Ok(None)
    }

    /// Fetch the backend-native children of a resolved directory entry.
    ///
    /// `dir` carries the backend identifier for id-addressed backends;
    /// `path` is the normalized virtual path for path-addressed ones.
    async fn list_raw(
        &self,
        dir: &FileEntity,
        path: &str,
        account: &Account,
    ) -> Result<RawListing, DriverError>;

    /// Classify a raw listing into uniform entities.
    ///
    /// Must be pure: the same raw listing always yields the same entities,
    /// since the engine re-classifies on every read, cached or not.
    fn classify(&self, raw: &RawListing, account: &Account)
        -> Result<Vec<FileEntity>, DriverError>;
}

/// The full contract every storage driver implements.
///
/// Path arguments are virtual paths under the account's root. Mutating
/// operations never touch the directory cache; invalidation is the calling
/// layer's responsibility, because only it knows which listings a mutation
/// staled.
#[async_trait]
pub trait Driver: Lister {
    /// Account-setup form declaration.
    fn items(&self) -> Vec<Item>;

    /// Validate and activate an account: perform a login where applicable,
    /// record the outcome in `account.status`, and replace any session state
    /// keyed to `old`. Session refresh is replace-on-success; a failed save
    /// leaves the previous session intact. Idempotent under retry with the
    /// same account.
    async fn save(&self, account: &mut Account, old: Option<&Account>) -> Result<(), DriverError>;

    /// Resolve a single virtual path to metadata.
    async fn file(&self, path: &str, account: &Account) -> Result<FileEntity, DriverError>;

    /// List a directory's direct children, sorted per the account
    /// preference (by the driver itself when `local_sort` is set).
    async fn files(&self, path: &str, account: &Account) -> Result<Vec<FileEntity>, DriverError>;

    /// Resolve a downloadable location for a leaf entry.
    async fn link(&self, args: &LinkArgs, account: &Account)
        -> Result<DownloadLink, DriverError>;

    /// Mutate the headers of an outbound proxied request as the vendor
    /// requires. Side effects only.
    fn proxy(&self, _headers: &mut HeaderMap, _account: &Account) {}

    /// Driver-specific rich preview payload.
    async fn preview(
        &self,
        _path: &str,
        _account: &Account,
    ) -> Result<serde_json::Value, DriverError> {
        Err(DriverError::NotSupported)
    }

    async fn make_dir(&self, path: &str, account: &Account) -> Result<(), DriverError>;

    async fn move_item(&self, src: &str, dst: &str, account: &Account)
        -> Result<(), DriverError>;

    async fn rename(&self, src: &str, dst: &str, account: &Account) -> Result<(), DriverError>;

    async fn copy_item(&self, src: &str, dst: &str, account: &Account)
        -> Result<(), DriverError>;

    async fn delete(&self, path: &str, account: &Account) -> Result<(), DriverError>;

    /// Upload a file stream into the backend. `None` fails with `EmptyFile`
    /// before any backend call.
    async fn upload(
        &self,
        _stream: Option<FileStream>,
        _account: &Account,
    ) -> Result<(), DriverError> {
        Err(DriverError::NotImplemented)
    }
}
