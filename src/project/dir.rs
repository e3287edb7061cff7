//! Directory import/export
//!
//! The same tree the archive layer builds, taken from (or written back to)
//! a directory on disk. Entries are walked sorted by file name so sibling
//! order is deterministic across platforms.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::core::tree::{FileContent, FileTree, NodeKind};
use crate::project::is_text_name;

/// Build a file tree from a directory on disk.
pub fn import(root: &Path) -> Result<FileTree> {
    let mut tree = FileTree::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| {
            format!("cannot walk project directory '{}'", root.display())
        })?;
        let rel = entry
            .path()
            .strip_prefix(root)
            .context("walked entry outside the project root")?;
        let rel = rel.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_dir() {
            tree.ensure_folder(&rel)?;
        } else if entry.file_type().is_file() {
            let bytes = fs::read(entry.path())
                .with_context(|| format!("cannot read '{}'", entry.path().display()))?;
            let content = if is_text_name(&rel) {
                FileContent::Text(String::from_utf8_lossy(&bytes).into_owned())
            } else {
                FileContent::Binary(bytes)
            };
            tree.insert_file(&rel, content)?;
        }
    }

    log::debug!("imported {} nodes from '{}'", tree.len(), root.display());
    Ok(tree)
}

/// Write the tree back under `root`, text nodes as text and binary nodes as
/// raw bytes.
pub fn export(tree: &FileTree, root: &Path) -> Result<()> {
    for node in tree.walk() {
        let target = root.join(&node.path);
        match node.kind {
            NodeKind::Folder => {
                fs::create_dir_all(&target)
                    .with_context(|| format!("cannot create folder '{}'", target.display()))?;
            }
            NodeKind::File => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("cannot create folder '{}'", parent.display())
                    })?;
                }
                match &node.content {
                    Some(FileContent::Text(text)) => fs::write(&target, text),
                    Some(FileContent::Binary(bytes)) => fs::write(&target, bytes),
                    None => Ok(()),
                }
                .with_context(|| format!("cannot write '{}'", target.display()))?;
            }
        }
    }
    Ok(())
}
