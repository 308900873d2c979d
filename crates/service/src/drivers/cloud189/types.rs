//! Wire types for the Cloud 189 open API.

use serde::Deserialize;

/// Unified raw record for one listing entry; the vendor returns folders and
/// files in separate arrays, merged into this shape before caching.
#[derive(Debug, Clone)]
pub struct Cloud189Record {
    pub id: String,
    pub name: String,
    /// Byte size for files; folders carry no size.
    pub size: u64,
    pub is_folder: bool,
    /// Vendor-local timestamp, `YYYY-MM-DD HH:MM:SS`.
    pub last_op_time: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesResponse {
    #[serde(default, alias = "res_code")]
    pub res_code: i64,
    #[serde(default, alias = "res_message")]
    pub res_message: Option<String>,
    #[serde(default)]
    pub file_list_a_o: Option<FileListAo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListAo {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub file_list: Vec<RemoteFile>,
    #[serde(default)]
    pub folder_list: Vec<RemoteFolder>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub last_op_time: Option<String>,
    #[serde(default)]
    pub icon: Option<FileIcon>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFolder {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub last_op_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileIcon {
    #[serde(default)]
    pub small_url: Option<String>,
    #[serde(default)]
    pub large_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    #[serde(default, alias = "res_code")]
    pub res_code: i64,
    #[serde(default, alias = "res_message")]
    pub res_message: Option<String>,
    #[serde(default)]
    pub file_download_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    #[serde(default, alias = "res_code")]
    pub res_code: i64,
    #[serde(default, alias = "res_message")]
    pub res_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[serde(default, alias = "res_code")]
    pub res_code: i64,
    #[serde(default, alias = "res_message")]
    pub res_message: Option<String>,
    #[serde(default)]
    pub session_key: String,
}

impl FileListAo {
    /// Merge the vendor's split folder/file arrays into uniform records.
    pub fn into_records(self) -> Vec<Cloud189Record> {
        let mut records = Vec::with_capacity(self.folder_list.len() + self.file_list.len());
        for folder in self.folder_list {
            records.push(Cloud189Record {
                id: folder.id.to_string(),
                name: folder.name,
                size: 0,
                is_folder: true,
                last_op_time: folder.last_op_time,
                thumbnail: None,
            });
        }
        for file in self.file_list {
            records.push(Cloud189Record {
                id: file.id.to_string(),
                name: file.name,
                size: file.size.max(0) as u64,
                is_folder: false,
                last_op_time: file.last_op_time,
                thumbnail: file.icon.and_then(|icon| icon.small_url.or(icon.large_url)),
            });
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_response_parses_and_merges() {
        let body = r#"{
            "resCode": 0,
            "fileListAO": {
                "count": 2,
                "fileList": [
                    {"id": 11, "name": "a.txt", "size": 10,
                     "lastOpTime": "2021-03-01 09:00:00",
                     "icon": {"smallUrl": "https://thumb/s.png"}}
                ],
                "folderList": [
                    {"id": 7, "name": "sub", "lastOpTime": "2021-03-01 08:00:00"}
                ]
            }
        }"#;
        let resp: ListFilesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.res_code, 0);
        let records = resp.file_list_a_o.unwrap().into_records();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_folder);
        assert_eq!(records[0].id, "7");
        assert_eq!(records[1].name, "a.txt");
        assert_eq!(records[1].size, 10);
        assert_eq!(records[1].thumbnail.as_deref(), Some("https://thumb/s.png"));
    }
}
