use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::{SortBy, SortDirection};

/// Coarse media taxonomy used across every driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Folder,
    Text,
    Image,
    Audio,
    Video,
    Other,
}

/// Uniform metadata record produced by classifying a backend-native entry.
///
/// Entities are a projection: built fresh on every listing or resolution
/// call, never mutated in place, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntity {
    /// Backend-local identifier; absent for path-addressed backends.
    pub id: Option<String>,
    pub name: String,
    /// Size in bytes; 0 for directories.
    pub size: u64,
    pub kind: FileKind,
    /// Name of the owning driver.
    pub driver: &'static str,
    pub updated_at: Option<DateTime<Utc>>,
    pub thumbnail: Option<String>,
}

impl FileEntity {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Folder
    }
}

/// Classify a leaf entry by its file name extension.
///
/// Pure and deterministic: the same name always yields the same kind, so
/// classified views of a cached raw listing stay stable across reads.
pub fn kind_for_name(name: &str) -> FileKind {
    let guess = mime_guess::from_path(name);
    let Some(mime) = guess.first() else {
        return FileKind::Other;
    };
    let top = mime.type_();
    if top == mime_guess::mime::TEXT {
        FileKind::Text
    } else if top == mime_guess::mime::IMAGE {
        FileKind::Image
    } else if top == mime_guess::mime::AUDIO {
        FileKind::Audio
    } else if top == mime_guess::mime::VIDEO {
        FileKind::Video
    } else if top == mime_guess::mime::APPLICATION {
        // Structured text the mime database files under application/*.
        match mime.subtype().as_str() {
            "json" | "xml" | "toml" | "x-sh" | "javascript" | "x-yaml" => FileKind::Text,
            _ => FileKind::Other,
        }
    } else {
        FileKind::Other
    }
}

/// Sort classified entries per the account preference.
///
/// Applied by the resolution engine for drivers that do not declare
/// `local_sort`. Folders are not grouped; ordering is purely by the key.
pub fn sort_entities(entries: &mut [FileEntity], sort_by: SortBy, direction: SortDirection) {
    entries.sort_by(|a, b| {
        let ord = match sort_by {
            SortBy::Name => a.name.cmp(&b.name),
            SortBy::Size => a.size.cmp(&b.size),
            SortBy::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        };
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_by_extension() {
        assert_eq!(kind_for_name("notes.txt"), FileKind::Text);
        assert_eq!(kind_for_name("photo.jpg"), FileKind::Image);
        assert_eq!(kind_for_name("song.mp3"), FileKind::Audio);
        assert_eq!(kind_for_name("clip.mp4"), FileKind::Video);
        assert_eq!(kind_for_name("archive.tar.gz"), FileKind::Other);
        assert_eq!(kind_for_name("config.json"), FileKind::Text);
        assert_eq!(kind_for_name("no_extension"), FileKind::Other);
    }

    #[test]
    fn classification_is_idempotent() {
        for name in ["a.txt", "b.png", "c", "d.mp4"] {
            assert_eq!(kind_for_name(name), kind_for_name(name));
        }
    }

    fn entity(name: &str, size: u64) -> FileEntity {
        FileEntity {
            id: None,
            name: name.to_string(),
            size,
            kind: kind_for_name(name),
            driver: "test",
            updated_at: None,
            thumbnail: None,
        }
    }

    #[test]
    fn sorting_by_name_and_size() {
        let mut entries = vec![entity("b", 1), entity("a", 3), entity("c", 2)];
        sort_entities(&mut entries, SortBy::Name, SortDirection::Asc);
        assert_eq!(entries[0].name, "a");
        sort_entities(&mut entries, SortBy::Size, SortDirection::Desc);
        assert_eq!(entries[0].name, "a");
        assert_eq!(entries[2].name, "b");
    }
}
