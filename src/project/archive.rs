//! Zip archive import/export
//!
//! The archive is the upload/download format: every entry contributes nodes
//! along its path, text entries are decoded (lossily) by the extension
//! allow-list, and export reproduces the same folder structure. A malformed
//! archive fails the load as a whole; no partial tree is produced.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::core::tree::{FileContent, FileTree, NodeKind};
use crate::project::is_text_name;

/// Normalize a zip entry name to a clean slash-separated tree path. Empty,
/// dot and dot-dot components are dropped.
fn sanitize_entry_name(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw
        .split('/')
        .filter(|p| !p.is_empty() && *p != "." && *p != "..")
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Extract a zip archive into a file tree.
pub fn import(path: &Path) -> Result<FileTree> {
    let file =
        File::open(path).with_context(|| format!("cannot open '{}'", path.display()))?;
    let mut zip = ZipArchive::new(file)
        .with_context(|| format!("'{}' is not a valid zip archive", path.display()))?;

    let mut tree = FileTree::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).context("corrupt zip entry")?;
        let Some(name) = sanitize_entry_name(entry.name()) else {
            log::warn!("skipping zip entry with unusable name: {:?}", entry.name());
            continue;
        };

        if entry.is_dir() {
            tree.ensure_folder(&name)?;
            continue;
        }
        if tree.contains(&name) {
            log::warn!("skipping duplicate zip entry: {name}");
            continue;
        }

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .with_context(|| format!("cannot read zip entry '{name}'"))?;

        let leaf = name.rsplit('/').next().unwrap_or(&name);
        let content = if is_text_name(leaf) {
            FileContent::Text(String::from_utf8_lossy(&bytes).into_owned())
        } else {
            FileContent::Binary(bytes)
        };
        tree.insert_file(&name, content)?;
    }

    log::debug!(
        "imported {} nodes from '{}'",
        tree.len(),
        path.display()
    );
    Ok(tree)
}

/// Write the tree to a zip archive at `out`, preserving folder structure.
pub fn export(tree: &FileTree, out: &Path) -> Result<()> {
    let file =
        File::create(out).with_context(|| format!("cannot create '{}'", out.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();

    for node in tree.walk() {
        match node.kind {
            NodeKind::Folder => {
                zip.add_directory(node.path.as_str(), options)
                    .with_context(|| format!("cannot add folder '{}'", node.path))?;
            }
            NodeKind::File => {
                zip.start_file(node.path.as_str(), options)
                    .with_context(|| format!("cannot add file '{}'", node.path))?;
                match &node.content {
                    Some(FileContent::Text(text)) => zip.write_all(text.as_bytes()),
                    Some(FileContent::Binary(bytes)) => zip.write_all(bytes),
                    None => Ok(()),
                }
                .with_context(|| format!("cannot write '{}'", node.path))?;
            }
        }
    }

    zip.finish().context("cannot finalize zip archive")?;
    Ok(())
}
