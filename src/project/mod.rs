//! Project module - Loading and persisting uploaded projects
//!
//! A project is a tree of markup sources plus assets, loaded wholesale from
//! a zip archive or a directory on disk and replaced wholesale on the next
//! load. Text classification is by extension allow-list; everything else is
//! kept as raw bytes.

pub mod archive;
pub mod dir;

use anyhow::{bail, Result};
use std::path::Path;

use crate::core::tree::{FileNode, FileTree};

/// Extensions decoded as editable text; everything else stays binary.
const TEXT_EXTENSIONS: [&str; 7] = ["tex", "txt", "bib", "cls", "sty", "md", "json"];

/// Whether a file name is classified as text by its extension.
pub fn is_text_name(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => TEXT_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)),
        None => false,
    }
}

/// The loaded tree plus the path of the file currently open for editing and
/// preview. The active path is a lookup key, not ownership.
#[derive(Debug, Clone, Default)]
pub struct ProjectState {
    pub tree: FileTree,
    active: Option<String>,
}

impl ProjectState {
    pub fn new(tree: FileTree) -> Self {
        Self { tree, active: None }
    }

    /// Point the project at `path`. Refused when no node exists there.
    pub fn set_active(&mut self, path: &str) -> bool {
        if self.tree.contains(path) {
            self.active = Some(path.to_string());
            true
        } else {
            false
        }
    }

    pub fn active_path(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_file(&self) -> Option<&FileNode> {
        self.active.as_deref().and_then(|p| self.tree.by_path(p))
    }
}

/// First file (depth-first) whose name ends in `.tex`: the default entry
/// point for flattening and rendering.
pub fn first_tex_file(tree: &FileTree) -> Option<&FileNode> {
    tree.walk()
        .find(|node| node.is_file() && node.name.ends_with(".tex"))
}

/// Load a project tree from a zip archive or a directory.
pub fn load(path: &Path) -> Result<FileTree> {
    if path.is_dir() {
        dir::import(path)
    } else if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    {
        archive::import(path)
    } else {
        bail!(
            "'{}' is neither a directory nor a .zip archive",
            path.display()
        )
    }
}
