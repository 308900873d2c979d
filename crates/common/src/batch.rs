//! Batch mutation protocol for task-based backends.
//!
//! Some vendors execute move/copy/delete as server-side asynchronous tasks.
//! The caller packages one descriptor per operation, submits it over the
//! driver's control channel, and treats the submission acknowledgment as the
//! operation's result. Completion, partial failure, or rollback on the
//! vendor side is not observed by this layer; that gap is deliberate and
//! documented, not something to poll around.

use serde::{Deserialize, Serialize};

use crate::file::FileEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BatchKind {
    Move,
    Copy,
    Delete,
}

impl BatchKind {
    /// Vendor wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchKind::Move => "MOVE",
            BatchKind::Copy => "COPY",
            BatchKind::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub source_id: String,
    pub dest_name: String,
    pub is_container: bool,
}

impl BatchItem {
    /// Build an item from a resolved source entity and its name at the
    /// destination (unchanged for deletes).
    pub fn from_entity(entity: &FileEntity, dest_name: impl Into<String>) -> Self {
        Self {
            source_id: entity.id.clone().unwrap_or_default(),
            dest_name: dest_name.into(),
            is_container: entity.is_dir(),
        }
    }
}

/// One submitted unit of asynchronous mutation work.
///
/// Invariant: every item shares the descriptor's kind and target container.
/// The constructors are the only way to build one, which keeps that holding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchTask {
    kind: BatchKind,
    /// Destination parent identifier; empty for deletes.
    target_container_id: String,
    items: Vec<BatchItem>,
}

impl BatchTask {
    pub fn moving(target_container_id: impl Into<String>, items: Vec<BatchItem>) -> Self {
        Self {
            kind: BatchKind::Move,
            target_container_id: target_container_id.into(),
            items,
        }
    }

    pub fn copying(target_container_id: impl Into<String>, items: Vec<BatchItem>) -> Self {
        Self {
            kind: BatchKind::Copy,
            target_container_id: target_container_id.into(),
            items,
        }
    }

    pub fn deleting(items: Vec<BatchItem>) -> Self {
        Self {
            kind: BatchKind::Delete,
            target_container_id: String::new(),
            items,
        }
    }

    pub fn kind(&self) -> BatchKind {
        self.kind
    }

    pub fn target_container_id(&self) -> &str {
        &self.target_container_id
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{FileEntity, FileKind};

    fn folder(id: &str, name: &str) -> FileEntity {
        FileEntity {
            id: Some(id.to_string()),
            name: name.to_string(),
            size: 0,
            kind: FileKind::Folder,
            driver: "test",
            updated_at: None,
            thumbnail: None,
        }
    }

    #[test]
    fn delete_task_has_empty_target() {
        let task = BatchTask::deleting(vec![BatchItem::from_entity(&folder("42", "sub"), "sub")]);
        assert_eq!(task.kind(), BatchKind::Delete);
        assert_eq!(task.target_container_id(), "");
        assert!(task.items()[0].is_container);
        assert_eq!(task.items()[0].source_id, "42");
    }

    #[test]
    fn kind_wire_form_is_uppercase() {
        assert_eq!(BatchKind::Move.as_str(), "MOVE");
        assert_eq!(
            serde_json::to_string(&BatchKind::Copy).unwrap(),
            "\"COPY\""
        );
    }
}
