//! Tree node types

use serde::{Deserialize, Serialize};

/// Kind of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Folder,
}

/// A file or folder in a scanned tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub path: String,
    /// Size in bytes, 0 for folders
    pub size: u64,
    /// Children of a folder; `None` for files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<FileInfo>>,
}

impl FileInfo {
    pub fn file(name: impl Into<String>, path: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            file_type: FileType::File,
            path: path.into(),
            size,
            items: None,
        }
    }

    pub fn folder(name: impl Into<String>, path: impl Into<String>, items: Vec<FileInfo>) -> Self {
        Self {
            name: name.into(),
            file_type: FileType::Folder,
            path: path.into(),
            size: 0,
            items: Some(items),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.file_type == FileType::Folder
    }

    /// Children of a folder, empty for files
    pub fn children(&self) -> &[FileInfo] {
        self.items.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_serialization_omits_items() {
        let file = FileInfo::file("a.txt", "files/a.txt", 5);

        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(
            value,
            json!({"name": "a.txt", "type": "file", "path": "files/a.txt", "size": 5})
        );
    }

    #[test]
    fn test_empty_folder_keeps_items() {
        let folder = FileInfo::folder("empty", "files/empty", Vec::new());

        let value = serde_json::to_value(&folder).unwrap();
        assert_eq!(value["type"], "folder");
        assert_eq!(value["size"], 0);
        assert_eq!(value["items"], json!([]));
    }

    #[test]
    fn test_nested_tree_deserialization() {
        let json = r#"{
            "name": "files",
            "type": "folder",
            "path": "files",
            "size": 0,
            "items": [
                {"name": "sub", "type": "folder", "path": "files/sub", "size": 0,
                 "items": [{"name": "b.txt", "type": "file", "path": "files/sub/b.txt", "size": 3}]}
            ]
        }"#;

        let root: FileInfo = serde_json::from_str(json).unwrap();
        assert!(root.is_folder());
        let sub = &root.children()[0];
        assert_eq!(sub.name, "sub");
        assert_eq!(sub.children()[0], FileInfo::file("b.txt", "files/sub/b.txt", 3));
        assert!(sub.children()[0].children().is_empty());
    }
}
