//! Cloud 189 driver.
//!
//! Id-addressed backend whose move/copy/delete are server-side batch tasks:
//! the driver submits a task descriptor and treats the acknowledgment as the
//! result. Task completion on the vendor side is never observed here; the
//! next listing after invalidation may briefly disagree with the eventual
//! vendor state, trading strict consistency for responsiveness.

mod client;
mod types;

pub use client::{Cloud189Client, Method};
pub use types::Cloud189Record;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use http::HeaderMap;

use common::account::Account;
use common::batch::{BatchItem, BatchTask};
use common::driver::{
    DownloadLink, Driver, DriverConfig, FileStream, Item, LinkArgs, Lister, RawListing,
};
use common::error::DriverError;
use common::file::{kind_for_name, FileEntity, FileKind};
use common::vpath;

use crate::resolve::Resolver;

use types::{ApiResponse, DownloadResponse, ListFilesResponse};

const NAME: &str = "189cloud";
const PAGE_SIZE: i64 = 100;
const UPLOAD_URL: &str = "https://hb02.upload.cloud.189.cn/v1/DCIWebUploadAction";

pub struct Cloud189Driver {
    resolver: Arc<Resolver>,
    client: Cloud189Client,
}

impl Cloud189Driver {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self {
            resolver,
            client: Cloud189Client::new(),
        }
    }

    fn parse_time(raw: &Option<String>) -> Option<DateTime<Utc>> {
        raw.as_deref().and_then(|s| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
    }

    fn entity_id(entity: &FileEntity) -> Result<&str, DriverError> {
        entity
            .id
            .as_deref()
            .ok_or_else(|| DriverError::Vendor("entry has no vendor id".to_string()))
    }

    /// Whether paging is finished after a page contributed `page_len`
    /// records. The vendor's `count` field is advisory: it can overstate the
    /// real number of entries, so an empty page always terminates.
    fn listing_complete(fetched: usize, page_len: usize, total: i64) -> bool {
        page_len == 0 || fetched as i64 >= total
    }

    /// Submit one batch task and treat the acknowledgment as the result.
    async fn submit_batch(&self, task: &BatchTask, account: &Account) -> Result<(), DriverError> {
        let task_infos = serde_json::to_string(
            &task
                .items()
                .iter()
                .map(|item| {
                    serde_json::json!({
                        "fileId": item.source_id,
                        "fileName": item.dest_name,
                        "isFolder": if item.is_container { 1 } else { 0 },
                    })
                })
                .collect::<Vec<_>>(),
        )?;
        tracing::debug!(
            account = %account.name,
            kind = task.kind().as_str(),
            items = task.items().len(),
            "submitting batch task"
        );
        let _: ApiResponse = self
            .client
            .request(
                "batch/createBatchTask.action",
                Method::Post,
                &[],
                &[
                    ("type", task.kind().as_str()),
                    ("targetFolderId", task.target_container_id()),
                    ("taskInfos", task_infos.as_str()),
                ],
                account,
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Lister for Cloud189Driver {
    fn config(&self) -> DriverConfig {
        DriverConfig::named(NAME)
    }

    async fn list_raw(
        &self,
        dir: &FileEntity,
        _path: &str,
        account: &Account,
    ) -> Result<RawListing, DriverError> {
        let folder_id = Self::entity_id(dir)?.to_string();
        let mut records: Vec<Cloud189Record> = Vec::new();
        let mut page = 1i64;
        loop {
            let page_str = page.to_string();
            let page_size = PAGE_SIZE.to_string();
            let resp: ListFilesResponse = self
                .client
                .request(
                    "file/listFiles.action",
                    Method::Get,
                    &[
                        ("folderId", folder_id.as_str()),
                        ("pageNum", page_str.as_str()),
                        ("pageSize", page_size.as_str()),
                        ("mediaType", "0"),
                        ("iconOption", "5"),
                        ("orderBy", "filename"),
                        ("descending", "false"),
                    ],
                    &[],
                    account,
                )
                .await?;
            let listing = resp.file_list_a_o.unwrap_or_default();
            let total = listing.count;
            let page_records = listing.into_records();
            let page_len = page_records.len();
            records.extend(page_records);
            if Self::listing_complete(records.len(), page_len, total) {
                break;
            }
            page += 1;
        }
        Ok(Arc::new(records))
    }

    fn classify(
        &self,
        raw: &RawListing,
        _account: &Account,
    ) -> Result<Vec<FileEntity>, DriverError> {
        let records = raw
            .downcast_ref::<Vec<Cloud189Record>>()
            .ok_or_else(|| DriverError::Vendor("unexpected raw listing shape".to_string()))?;
        Ok(records
            .iter()
            .map(|record| FileEntity {
                id: Some(record.id.clone()),
                name: record.name.clone(),
                size: record.size,
                kind: if record.is_folder {
                    FileKind::Folder
                } else {
                    kind_for_name(&record.name)
                },
                driver: NAME,
                updated_at: Self::parse_time(&record.last_op_time),
                thumbnail: record.thumbnail.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl Driver for Cloud189Driver {
    fn items(&self) -> Vec<Item> {
        vec![
            Item {
                description: "account username/phone number",
                ..Item::text("username", "username", true)
            },
            Item {
                description: "account password",
                ..Item::text("password", "password", true)
            },
            Item::text("root_folder", "root folder file id", true),
            Item::select("order_by", "order_by", "name,size,updated_at"),
            Item::select("order_direction", "order_direction", "asc,desc"),
        ]
    }

    async fn save(&self, account: &mut Account, old: Option<&Account>) -> Result<(), DriverError> {
        if let Some(old) = old {
            self.client.drop_session(&old.name);
        }
        match self.client.login(account).await {
            Ok(session_key) => {
                account.drive_id = session_key;
                account.mark_working();
                Ok(())
            }
            Err(err) => {
                account.mark_failed(&err);
                Err(err)
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
        let file = self.file(&args.path, account).await?;
        if file.is_dir() {
            return Err(DriverError::NotFile);
        }
        let file_id = Self::entity_id(&file)?;
        let resp: DownloadResponse = self
            .client
            .request(
                "file/getFileDownloadUrl.action",
                Method::Get,
                &[("fileId", file_id)],
                &[],
                account,
            )
            .await?;
        let url = self.client.follow_download(&resp.file_download_url).await?;
        Ok(DownloadLink::Url(url))
    }

    fn proxy(&self, headers: &mut HeaderMap, _account: &Account) {
        // The CDN rejects browser-originated requests carrying this header.
        headers.remove(http::header::ORIGIN);
    }

    async fn make_dir(&self, path: &str, account: &Account) -> Result<(), DriverError> {
        let path = vpath::normalize(path);
        let (parent, name) = vpath::split(&path);
        let parent_entry = self.file(&parent, account).await?;
        if !parent_entry.is_dir() {
            return Err(DriverError::NotFolder);
        }
        let parent_id = Self::entity_id(&parent_entry)?;
        let _: ApiResponse = self
            .client
            .request(
                "file/createFolder.action",
                Method::Post,
                &[],
                &[("parentFolderId", parent_id), ("folderName", name.as_str())],
                account,
            )
            .await?;
        Ok(())
    }

    async fn move_item(&self, src: &str, dst: &str, account: &Account) -> Result<(), DriverError> {
        let dst = vpath::normalize(dst);
        let (dst_parent, dst_name) = vpath::split(&dst);
        let src_entry = self.file(src, account).await?;
        let dst_parent_entry = self.file(&dst_parent, account).await?;
        let task = BatchTask::moving(
            Self::entity_id(&dst_parent_entry)?,
            vec![BatchItem::from_entity(&src_entry, dst_name)],
        );
        self.submit_batch(&task, account).await
    }

    async fn rename(&self, src: &str, dst: &str, account: &Account) -> Result<(), DriverError> {
        let dst = vpath::normalize(dst);
        let (_, dst_name) = vpath::split(&dst);
        let src_entry = self.file(src, account).await?;
        let src_id = Self::entity_id(&src_entry)?;
        // Folders and files rename through different endpoints.
        let (endpoint, id_key, name_key) = if src_entry.is_dir() {
            ("file/renameFolder.action", "folderId", "destFolderName")
        } else {
            ("file/renameFile.action", "fileId", "destFileName")
        };
        let _: ApiResponse = self
            .client
            .request(
                endpoint,
                Method::Post,
                &[],
                &[(id_key, src_id), (name_key, dst_name.as_str())],
                account,
            )
            .await?;
        Ok(())
    }

    async fn copy_item(&self, src: &str, dst: &str, account: &Account) -> Result<(), DriverError> {
        let dst = vpath::normalize(dst);
        let (dst_parent, dst_name) = vpath::split(&dst);
        let src_entry = self.file(src, account).await?;
        let dst_parent_entry = self.file(&dst_parent, account).await?;
        let task = BatchTask::copying(
            Self::entity_id(&dst_parent_entry)?,
            vec![BatchItem::from_entity(&src_entry, dst_name)],
        );
        self.submit_batch(&task, account).await
    }

    async fn delete(&self, path: &str, account: &Account) -> Result<(), DriverError> {
        let entry = self.file(path, account).await?;
        let name = entry.name.clone();
        let task = BatchTask::deleting(vec![BatchItem::from_entity(&entry, name)]);
        self.submit_batch(&task, account).await
    }

    async fn upload(
        &self,
        stream: Option<FileStream>,
        account: &Account,
    ) -> Result<(), DriverError> {
        let stream = stream.ok_or(DriverError::EmptyFile)?;
        let parent = self.file(&stream.parent_path, account).await?;
        let parent_id = Self::entity_id(&parent)?.to_string();

        // Stream the reader straight into the multipart body.
        let body = reqwest::Body::wrap_stream(tokio_util::io::ReaderStream::new(stream.reader));
        let part = reqwest::multipart::Part::stream_with_length(body, stream.size)
            .file_name(stream.name.clone())
            .mime_str(&stream.mime)
            .map_err(|e| DriverError::Vendor(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("parentId", parent_id)
            .text("sessionKey", account.drive_id.clone())
            .text("opertype", "1")
            .text("fname", stream.name.clone())
            .part("Filedata", part);

        let resp = self
            .client
            .http()
            .post(UPLOAD_URL)
            .multipart(form)
            .send()
            .await?;
        let body: serde_json::Value = resp.json().await?;
        match body.get("MD5").and_then(|v| v.as_str()) {
            Some(md5) if !md5.is_empty() => Ok(()),
            _ => Err(DriverError::Vendor(format!(
                "upload not acknowledged: {}",
                body
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cloud189Driver;

    #[test]
    fn paging_continues_until_the_advertised_count_is_reached() {
        assert!(!Cloud189Driver::listing_complete(100, 100, 200));
        assert!(Cloud189Driver::listing_complete(200, 100, 200));
        assert!(Cloud189Driver::listing_complete(205, 100, 200));
    }

    #[test]
    fn an_empty_page_terminates_paging_despite_an_overstated_count() {
        // The vendor claims 200 entries but the trailing page is empty;
        // without this the page counter would increment forever.
        assert!(Cloud189Driver::listing_complete(150, 0, 200));
    }

    #[test]
    fn an_empty_folder_terminates_on_the_first_page() {
        assert!(Cloud189Driver::listing_complete(0, 0, 0));
    }
}
