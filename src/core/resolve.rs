//! File reference resolution
//!
//! Include directives and asset references name files loosely: sometimes a
//! bare name, sometimes a partial path, sometimes with the directory prefix
//! of the authoring machine. Resolution keeps only the final path segment
//! and takes the first tree node that matches.

use crate::core::tree::{FileNode, FileTree};

/// Strip any directory prefix (slash or backslash separated), keeping the
/// final path segment.
fn bare_name(reference: &str) -> &str {
    let trimmed = reference.trim();
    trimmed
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(trimmed)
}

/// Find the node a loose `reference` points at.
///
/// The tree is searched depth-first with siblings in insertion order; the
/// first match wins. A node matches when its name equals the bare reference,
/// its path ends with `/` + the bare reference, or its path equals the raw
/// reference verbatim.
pub fn resolve<'a>(tree: &'a FileTree, reference: &str) -> Option<&'a FileNode> {
    let bare = bare_name(reference);
    let suffix = format!("/{bare}");
    tree.walk()
        .find(|node| node.name == bare || node.path.ends_with(&suffix) || node.path == reference)
}
