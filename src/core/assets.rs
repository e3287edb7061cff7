//! Inline image assets
//!
//! Replaces `\includegraphics` directives with self-contained `<img>`
//! elements carrying a base64 data URI, so the preview needs no file server.
//! Must run before the transpiler passes remove the directive syntax.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::resolve::resolve;
use crate::core::tree::FileTree;

static GRAPHICS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\includegraphics(?:\[[^\]]*\])?\{(.+?)\}").expect("Invalid GRAPHICS_RE regex")
});

/// Mime type by extension sniffing: PNG is recognized, any other binary
/// payload is assumed JPEG.
fn mime_for(name: &str) -> &'static str {
    if name.to_ascii_lowercase().ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// Replace every image directive with an inline `<img>` element, or empty
/// text when the reference does not resolve to binary content.
pub fn inline_images(text: &str, tree: &FileTree) -> String {
    GRAPHICS_RE
        .replace_all(text, |caps: &regex::Captures| {
            let reference = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            match resolve(tree, reference).and_then(|node| node.bytes().map(|b| (node, b))) {
                Some((node, bytes)) => {
                    let encoded = STANDARD.encode(bytes);
                    format!(
                        "<img src=\"data:{};base64,{}\" class=\"inline-photo\" />",
                        mime_for(&node.name),
                        encoded
                    )
                }
                None => String::new(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_png_data_uri() {
        let mut tree = FileTree::new();
        let bytes = vec![0x89, 0x50, 0x4E, 0x47];
        tree.add_binary_file(None, "photo.png", bytes.clone()).unwrap();

        let out = inline_images("\\includegraphics[width=1in]{photo.png}", &tree);
        let expected = format!(
            "<img src=\"data:image/png;base64,{}\" class=\"inline-photo\" />",
            STANDARD.encode(&bytes)
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn test_inline_jpeg_fallback_mime() {
        let mut tree = FileTree::new();
        tree.add_binary_file(None, "photo.jpg", vec![0xFF, 0xD8]).unwrap();

        let out = inline_images("\\includegraphics[scale=0.5]{photo.jpg}", &tree);
        assert!(out.contains("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_inline_without_options_bracket() {
        let mut tree = FileTree::new();
        tree.add_binary_file(None, "photo.png", vec![1]).unwrap();
        let out = inline_images("\\includegraphics{photo.png}", &tree);
        assert!(out.starts_with("<img src=\"data:image/png;base64,"));
    }

    #[test]
    fn test_unresolved_reference_becomes_empty() {
        let tree = FileTree::new();
        let out = inline_images("a \\includegraphics[w]{missing.png} b", &tree);
        assert_eq!(out, "a  b");
    }

    #[test]
    fn test_text_node_becomes_empty() {
        let mut tree = FileTree::new();
        tree.add_text_file(None, "photo.png", "not really an image")
            .unwrap();
        let out = inline_images("\\includegraphics[w]{photo.png}", &tree);
        assert_eq!(out, "");
    }

    #[test]
    fn test_surrounding_text_preserved() {
        let mut tree = FileTree::new();
        tree.add_binary_file(None, "p.png", vec![9]).unwrap();
        let out = inline_images("before \\includegraphics[h]{p.png} after", &tree);
        assert!(out.starts_with("before <img"));
        assert!(out.ends_with(" after"));
    }

    #[test]
    fn test_uppercase_png_extension() {
        let mut tree = FileTree::new();
        tree.add_binary_file(None, "PHOTO.PNG", vec![1]).unwrap();
        let out = inline_images("\\includegraphics{PHOTO.PNG}", &tree);
        assert!(out.contains("data:image/png"));
    }
}
