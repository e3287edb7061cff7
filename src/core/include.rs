//! Cross-file include resolution
//!
//! Expands `\input{...}` and `\include{...}` directives into one flattened
//! source text. A reference is tried verbatim and with the default source
//! extensions appended; the first variant that resolves to a text node is
//! spliced in recursively. Unresolvable references become empty text: a
//! missing include is absent content, not an error.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::core::resolve::resolve;
use crate::core::tree::{FileNode, FileTree};

/// Extensions tried, in order, after the bare reference
const INCLUDE_EXTENSIONS: [&str; 3] = [".tex", ".cls", ".sty"];

/// Both directive spellings are treated identically
static INCLUDE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(input|include)\{(.+?)\}").expect("Invalid INCLUDE_RE regex"));

/// Flatten `entry` into a single text with every include expanded.
///
/// Cycles are cut by a visited set keyed by resolved node path, scoped to the
/// chain of ancestors currently being expanded: a self- or mutually-inclusive
/// file flattens to an empty substitution at the cyclic reference, while a
/// file legitimately included twice along different branches is expanded both
/// times.
pub fn flatten(tree: &FileTree, entry: &FileNode) -> String {
    let mut visited = HashSet::new();
    visited.insert(entry.path.clone());
    flatten_text(tree, entry.text().unwrap_or_default(), &mut visited)
}

fn flatten_text(tree: &FileTree, text: &str, visited: &mut HashSet<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in INCLUDE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let reference = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
        out.push_str(&text[last..whole.start()]);
        out.push_str(&expand(tree, reference, visited));
        last = whole.end();
    }
    out.push_str(&text[last..]);
    out
}

fn expand(tree: &FileTree, reference: &str, visited: &mut HashSet<String>) -> String {
    let mut variants = vec![reference.to_string()];
    for ext in INCLUDE_EXTENSIONS {
        variants.push(format!("{reference}{ext}"));
    }

    for variant in &variants {
        let Some(node) = resolve(tree, variant) else {
            continue;
        };
        let Some(content) = node.text() else {
            continue;
        };
        if visited.contains(&node.path) {
            // Cyclic include: substitute absent content.
            return String::new();
        }
        visited.insert(node.path.clone());
        let expanded = flatten_text(tree, content, visited);
        visited.remove(&node.path);
        return expanded;
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry<'a>(tree: &'a FileTree, path: &str) -> &'a FileNode {
        tree.by_path(path).expect("entry node")
    }

    #[test]
    fn test_flatten_no_includes() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "main.tex", "plain body").unwrap();
        assert_eq!(flatten(&tree, entry(&tree, "main.tex")), "plain body");
    }

    #[test]
    fn test_flatten_substitutes_included_content() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "main.tex", "before \\input{part} after")
            .unwrap();
        tree.add_text_file(None, "part.tex", "MIDDLE").unwrap();
        assert_eq!(
            flatten(&tree, entry(&tree, "main.tex")),
            "before MIDDLE after"
        );
    }

    #[test]
    fn test_flatten_include_spelling() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "main.tex", "\\include{part}").unwrap();
        tree.add_text_file(None, "part.tex", "X").unwrap();
        assert_eq!(flatten(&tree, entry(&tree, "main.tex")), "X");
    }

    #[test]
    fn test_flatten_recursive_includes() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "main.tex", "\\input{a}").unwrap();
        tree.add_text_file(None, "a.tex", "A(\\input{b})").unwrap();
        tree.add_text_file(None, "b.tex", "B").unwrap();
        assert_eq!(flatten(&tree, entry(&tree, "main.tex")), "A(B)");
    }

    #[test]
    fn test_flatten_extension_variants() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "main.tex", "\\input{custom}\\input{style}")
            .unwrap();
        tree.add_text_file(None, "custom.cls", "CLS").unwrap();
        tree.add_text_file(None, "style.sty", "STY").unwrap();
        assert_eq!(flatten(&tree, entry(&tree, "main.tex")), "CLSSTY");
    }

    #[test]
    fn test_flatten_missing_include_drops_silently() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "main.tex", "left \\input{missing} right")
            .unwrap();
        assert_eq!(flatten(&tree, entry(&tree, "main.tex")), "left  right");
    }

    #[test]
    fn test_flatten_self_include_terminates() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "main.tex", "start \\input{main.tex} end")
            .unwrap();
        assert_eq!(flatten(&tree, entry(&tree, "main.tex")), "start  end");
    }

    #[test]
    fn test_flatten_mutual_cycle_terminates() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "a.tex", "A[\\input{b}]").unwrap();
        tree.add_text_file(None, "b.tex", "B[\\input{a}]").unwrap();
        assert_eq!(flatten(&tree, entry(&tree, "a.tex")), "A[B[]]");
    }

    #[test]
    fn test_flatten_repeated_include_is_expanded_twice() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "main.tex", "\\input{boiler}+\\input{boiler}")
            .unwrap();
        tree.add_text_file(None, "boiler.tex", "B").unwrap();
        assert_eq!(flatten(&tree, entry(&tree, "main.tex")), "B+B");
    }

    #[test]
    fn test_flatten_skips_binary_match() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "main.tex", "\\input{part}").unwrap();
        // A binary node shadowing the bare name; the .tex variant still wins.
        tree.add_binary_file(None, "part", vec![0, 1]).unwrap();
        tree.add_text_file(None, "part.tex", "TEXT").unwrap();
        assert_eq!(flatten(&tree, entry(&tree, "main.tex")), "TEXT");
    }

    #[test]
    fn test_flatten_trims_reference() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "main.tex", "\\input{ part }").unwrap();
        tree.add_text_file(None, "part.tex", "P").unwrap();
        assert_eq!(flatten(&tree, entry(&tree, "main.tex")), "P");
    }

    #[test]
    fn test_flatten_binary_entry_is_empty() {
        let mut tree = FileTree::new();
        tree.add_binary_file(None, "blob.bin", vec![1, 2]).unwrap();
        assert_eq!(flatten(&tree, entry(&tree, "blob.bin")), "");
    }
}
