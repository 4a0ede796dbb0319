//! Workspace file store: CRUD over a rooted directory tree.
//!
//! All paths are relative to the workspace root; absolute paths and `..`
//! components are rejected so a request can never escape the root.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::GatewayError;

/// One node in the workspace file tree.
#[derive(Debug, Clone, Serialize)]
pub struct FileNode {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
}

pub struct WorkspaceStore {
    root: PathBuf,
}

impl WorkspaceStore {
    /// Open (and create if needed) the workspace at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, GatewayError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path inside the workspace.
    fn resolve(&self, raw: &str) -> Result<PathBuf, GatewayError> {
        let path = Path::new(raw);
        if path.is_absolute() {
            return Err(GatewayError::InvalidRequest(format!(
                "absolute paths are not allowed: '{}'",
                raw
            )));
        }
        for component in path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(GatewayError::InvalidRequest(format!(
                        "path '{}' escapes the workspace",
                        raw
                    )))
                }
            }
        }
        Ok(self.root.join(path))
    }

    /// Recursive listing of the workspace, directories before files,
    /// names alphabetical within each group.
    pub fn file_tree(&self) -> Result<Vec<FileNode>, GatewayError> {
        self.tree_of(&self.root)
    }

    fn tree_of(&self, dir: &Path) -> Result<Vec<FileNode>, GatewayError> {
        let mut nodes = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            let relative = path
                .strip_prefix(&self.root)
                .unwrap_or(&path)
                .to_string_lossy()
                .to_string();

            if path.is_dir() {
                nodes.push(FileNode {
                    name,
                    node_type: "directory",
                    path: relative,
                    children: Some(self.tree_of(&path)?),
                });
            } else {
                nodes.push(FileNode {
                    name,
                    node_type: "file",
                    path: relative,
                    children: None,
                });
            }
        }
        nodes.sort_by(|a, b| {
            (a.node_type == "file", &a.name).cmp(&(b.node_type == "file", &b.name))
        });
        Ok(nodes)
    }

    /// Read a file's contents. `NotFound` if it does not exist.
    pub fn read(&self, raw: &str) -> Result<String, GatewayError> {
        let path = self.resolve(raw)?;
        if !path.exists() {
            return Err(GatewayError::NotFound("File not found".into()));
        }
        Ok(std::fs::read_to_string(&path)?)
    }

    /// Create (or overwrite) a file, creating parent directories as needed.
    pub fn create(&self, raw: &str, content: &str) -> Result<(), GatewayError> {
        let path = self.resolve(raw)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Overwrite an existing file. `NotFound` if it does not exist.
    pub fn update(&self, raw: &str, content: &str) -> Result<(), GatewayError> {
        let path = self.resolve(raw)?;
        if !path.exists() {
            return Err(GatewayError::NotFound("File not found".into()));
        }
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Delete a file. `NotFound` if it does not exist.
    pub fn delete(&self, raw: &str) -> Result<(), GatewayError> {
        let path = self.resolve(raw)?;
        if !path.exists() {
            return Err(GatewayError::NotFound("File not found".into()));
        }
        std::fs::remove_file(&path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_store() -> WorkspaceStore {
        let dir = std::env::temp_dir().join(format!(
            "codeforge-ws-test-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        WorkspaceStore::new(dir).unwrap()
    }

    #[test]
    fn test_create_read_update_delete() {
        let store = temp_store();

        store.create("src/main.py", "print('v1')").unwrap();
        assert_eq!(store.read("src/main.py").unwrap(), "print('v1')");

        store.update("src/main.py", "print('v2')").unwrap();
        assert_eq!(store.read("src/main.py").unwrap(), "print('v2')");

        store.delete("src/main.py").unwrap();
        assert!(matches!(
            store.read("src/main.py").unwrap_err(),
            GatewayError::NotFound(_)
        ));
    }

    #[test]
    fn test_update_and_delete_require_existing_file() {
        let store = temp_store();
        assert!(matches!(
            store.update("missing.txt", "x").unwrap_err(),
            GatewayError::NotFound(_)
        ));
        assert!(matches!(
            store.delete("missing.txt").unwrap_err(),
            GatewayError::NotFound(_)
        ));
    }

    #[test]
    fn test_traversal_rejected() {
        let store = temp_store();
        assert!(store.read("../outside.txt").is_err());
        assert!(store.create("a/../../escape.txt", "x").is_err());
        assert!(store.read("/etc/hostname").is_err());
    }

    #[test]
    fn test_file_tree_sorted_directories_first() {
        let store = temp_store();
        store.create("zebra.txt", "z").unwrap();
        store.create("alpha/nested.txt", "n").unwrap();
        store.create("beta.txt", "b").unwrap();

        let tree = store.file_tree().unwrap();
        let names: Vec<&str> = tree.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta.txt", "zebra.txt"]);

        assert_eq!(tree[0].node_type, "directory");
        let children = tree[0].children.as_ref().unwrap();
        assert_eq!(children[0].name, "nested.txt");
        assert_eq!(children[0].path, Path::new("alpha").join("nested.txt").to_string_lossy());
    }

    #[test]
    fn test_file_node_serialization() {
        let node = FileNode {
            name: "main.py".into(),
            node_type: "file",
            path: "src/main.py".into(),
            children: None,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "file");
        assert!(json.get("children").is_none());
    }
}
