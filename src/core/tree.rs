//! Project file tree
//!
//! The uploaded project is held as a flat arena of nodes with a path index.
//! Hierarchy is expressed through child-id lists on folder nodes and a root
//! list; single-file edits go through the index and touch one node in place.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Handle into the tree's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

/// The kind of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

/// Payload of a file node: text for editable sources, raw bytes for
/// everything else (images, fonts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

/// One file or folder in the uploaded project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    /// Leaf display name
    pub name: String,

    /// Full slash-separated path from the project root; unique across the tree
    pub path: String,

    /// File or folder
    pub kind: NodeKind,

    /// Present exactly for file nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<FileContent>,

    /// Child ids; non-empty only for folders
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
}

impl FileNode {
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    /// Text payload, if this is a text file
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(FileContent::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Binary payload, if this is a binary file
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.content {
            Some(FileContent::Binary(b)) => Some(b),
            _ => None,
        }
    }
}

/// Errors from tree construction and mutation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("a node already exists at path '{0}'")]
    DuplicatePath(String),

    #[error("'{0}' is not a folder")]
    NotAFolder(String),

    #[error("node name must be non-empty and must not contain '/'")]
    InvalidName,
}

/// Flat node store with a path index and derived hierarchy.
#[derive(Debug, Clone, Default)]
pub struct FileTree {
    nodes: Vec<FileNode>,
    index: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of nodes (files and folders)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root-level node ids in insertion order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&FileNode> {
        self.nodes.get(id.0)
    }

    /// Look a node up by its exact path
    pub fn by_path(&self, path: &str) -> Option<&FileNode> {
        self.index.get(path).and_then(|id| self.get(*id))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Add a folder under `parent` (or at the root when `None`).
    pub fn add_folder(&mut self, parent: Option<NodeId>, name: &str) -> Result<NodeId, TreeError> {
        self.add_node(parent, name, NodeKind::Folder, None)
    }

    /// Add a text file under `parent` (or at the root when `None`).
    pub fn add_text_file(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        text: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        self.add_node(
            parent,
            name,
            NodeKind::File,
            Some(FileContent::Text(text.into())),
        )
    }

    /// Add a binary file under `parent` (or at the root when `None`).
    pub fn add_binary_file(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<NodeId, TreeError> {
        self.add_node(
            parent,
            name,
            NodeKind::File,
            Some(FileContent::Binary(bytes)),
        )
    }

    /// Make sure a folder chain exists for every component of `path`,
    /// reusing folders already present. Returns the id of the deepest
    /// folder, or `None` for an empty path.
    pub fn ensure_folder(&mut self, path: &str) -> Result<Option<NodeId>, TreeError> {
        let mut current: Option<NodeId> = None;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            let full = match current.and_then(|id| self.get(id)) {
                Some(node) => format!("{}/{}", node.path, part),
                None => part.to_string(),
            };
            let existing = self.index.get(&full).copied();
            current = Some(match existing {
                Some(id) => match self.get(id) {
                    Some(node) if node.is_folder() => id,
                    _ => return Err(TreeError::NotAFolder(full)),
                },
                None => self.add_folder(current, part)?,
            });
        }
        Ok(current)
    }

    /// Insert a file at a slash-separated path, creating intermediate
    /// folders as needed.
    pub fn insert_file(&mut self, path: &str, content: FileContent) -> Result<NodeId, TreeError> {
        let trimmed = path.trim_matches('/');
        let (dir, name) = match trimmed.rsplit_once('/') {
            Some((dir, name)) => (dir, name),
            None => ("", trimmed),
        };
        let parent = self.ensure_folder(dir)?;
        self.add_node(
            parent,
            name,
            NodeKind::File,
            Some(content),
        )
    }

    /// Replace the text of the file at `path` in place through the index.
    /// Returns false when the path is unknown or does not hold text.
    pub fn set_text(&mut self, path: &str, text: impl Into<String>) -> bool {
        let Some(id) = self.index.get(path).copied() else {
            return false;
        };
        match self.nodes.get_mut(id.0) {
            Some(node) if matches!(node.content, Some(FileContent::Text(_))) => {
                node.content = Some(FileContent::Text(text.into()));
                true
            }
            _ => false,
        }
    }

    /// Depth-first traversal, siblings in insertion order.
    pub fn walk(&self) -> Walk<'_> {
        let mut stack: Vec<NodeId> = self.roots.clone();
        stack.reverse();
        Walk { tree: self, stack }
    }

    fn add_node(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        kind: NodeKind,
        content: Option<FileContent>,
    ) -> Result<NodeId, TreeError> {
        if name.is_empty() || name.contains('/') {
            return Err(TreeError::InvalidName);
        }

        let path = match parent {
            Some(pid) => {
                let pnode = self.get(pid).ok_or(TreeError::InvalidName)?;
                if !pnode.is_folder() {
                    return Err(TreeError::NotAFolder(pnode.path.clone()));
                }
                format!("{}/{}", pnode.path, name)
            }
            None => name.to_string(),
        };

        if self.index.contains_key(&path) {
            return Err(TreeError::DuplicatePath(path));
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(FileNode {
            name: name.to_string(),
            path: path.clone(),
            kind,
            content,
            children: Vec::new(),
        });
        self.index.insert(path, id);

        match parent {
            Some(pid) => {
                if let Some(pnode) = self.nodes.get_mut(pid.0) {
                    pnode.children.push(id);
                }
            }
            None => self.roots.push(id),
        }

        Ok(id)
    }
}

/// Depth-first iterator over tree nodes
pub struct Walk<'a> {
    tree: &'a FileTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a FileNode;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.get(id)?;
        for child in node.children.iter().rev() {
            self.stack.push(*child);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file_at_root() {
        let mut tree = FileTree::new();
        let id = tree.add_text_file(None, "main.tex", "hello").unwrap();
        let node = tree.get(id).unwrap();
        assert_eq!(node.name, "main.tex");
        assert_eq!(node.path, "main.tex");
        assert_eq!(node.kind, NodeKind::File);
        assert_eq!(node.text(), Some("hello"));
        assert!(node.bytes().is_none());
    }

    #[test]
    fn test_child_path_composition() {
        let mut tree = FileTree::new();
        let folder = tree.add_folder(None, "sections").unwrap();
        let id = tree
            .add_text_file(Some(folder), "experience.tex", "")
            .unwrap();
        assert_eq!(tree.get(id).unwrap().path, "sections/experience.tex");
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "main.tex", "a").unwrap();
        let err = tree.add_text_file(None, "main.tex", "b").unwrap_err();
        assert_eq!(err, TreeError::DuplicatePath("main.tex".to_string()));
    }

    #[test]
    fn test_file_cannot_be_parent() {
        let mut tree = FileTree::new();
        let file = tree.add_text_file(None, "main.tex", "a").unwrap();
        let err = tree.add_text_file(Some(file), "child.tex", "b").unwrap_err();
        assert_eq!(err, TreeError::NotAFolder("main.tex".to_string()));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut tree = FileTree::new();
        assert_eq!(
            tree.add_text_file(None, "", "a").unwrap_err(),
            TreeError::InvalidName
        );
        assert_eq!(
            tree.add_text_file(None, "a/b", "a").unwrap_err(),
            TreeError::InvalidName
        );
    }

    #[test]
    fn test_by_path_lookup() {
        let mut tree = FileTree::new();
        let folder = tree.add_folder(None, "img").unwrap();
        tree.add_binary_file(Some(folder), "photo.png", vec![1, 2, 3])
            .unwrap();
        let node = tree.by_path("img/photo.png").unwrap();
        assert_eq!(node.bytes(), Some(&[1u8, 2, 3][..]));
        assert!(tree.by_path("photo.png").is_none());
    }

    #[test]
    fn test_set_text_in_place() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "main.tex", "old").unwrap();
        assert!(tree.set_text("main.tex", "new"));
        assert_eq!(tree.by_path("main.tex").unwrap().text(), Some("new"));
    }

    #[test]
    fn test_set_text_unknown_path() {
        let mut tree = FileTree::new();
        assert!(!tree.set_text("nope.tex", "new"));
    }

    #[test]
    fn test_set_text_rejects_binary_and_folder() {
        let mut tree = FileTree::new();
        tree.add_binary_file(None, "photo.png", vec![0]).unwrap();
        tree.add_folder(None, "sections").unwrap();
        assert!(!tree.set_text("photo.png", "text"));
        assert!(!tree.set_text("sections", "text"));
    }

    #[test]
    fn test_insert_file_creates_folders() {
        let mut tree = FileTree::new();
        tree.insert_file("a/b/c.tex", FileContent::Text("x".into()))
            .unwrap();
        assert!(tree.by_path("a").unwrap().is_folder());
        assert!(tree.by_path("a/b").unwrap().is_folder());
        assert_eq!(tree.by_path("a/b/c.tex").unwrap().text(), Some("x"));
    }

    #[test]
    fn test_ensure_folder_reuses_existing() {
        let mut tree = FileTree::new();
        tree.insert_file("a/one.tex", FileContent::Text(String::new()))
            .unwrap();
        tree.insert_file("a/two.tex", FileContent::Text(String::new()))
            .unwrap();
        let a = tree.by_path("a").unwrap();
        assert_eq!(a.children.len(), 2);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_ensure_folder_conflicts_with_file() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "a", "not a folder").unwrap();
        let err = tree
            .insert_file("a/b.tex", FileContent::Text(String::new()))
            .unwrap_err();
        assert_eq!(err, TreeError::NotAFolder("a".to_string()));
    }

    #[test]
    fn test_walk_depth_first_insertion_order() {
        let mut tree = FileTree::new();
        let a = tree.add_folder(None, "a").unwrap();
        tree.add_text_file(Some(a), "one.tex", "").unwrap();
        tree.add_text_file(Some(a), "two.tex", "").unwrap();
        tree.add_text_file(None, "z.tex", "").unwrap();

        let paths: Vec<_> = tree.walk().map(|n| n.path.clone()).collect();
        assert_eq!(paths, vec!["a", "a/one.tex", "a/two.tex", "z.tex"]);
    }

    #[test]
    fn test_walk_empty_tree() {
        let tree = FileTree::new();
        assert_eq!(tree.walk().count(), 0);
        assert!(tree.is_empty());
    }
}
