//! Preview rendering
//!
//! Drives the pipeline for one entry file and wraps the resulting fragment
//! in a self-contained HTML page: embedded stylesheet, a print trigger for
//! export, and a placeholder sheet when the fragment is empty.

use crate::core::assets::inline_images;
use crate::core::include::flatten;
use crate::core::transpile::transpile;
use crate::core::tree::{FileNode, FileTree};

/// Transient view over the project for one preview computation. Holds no
/// state of its own; rebuilt whenever the entry file or the tree changes.
pub struct RenderContext<'a> {
    main: &'a FileNode,
    files: &'a FileTree,
}

impl<'a> RenderContext<'a> {
    pub fn new(files: &'a FileTree, main: &'a FileNode) -> Self {
        Self { main, files }
    }

    /// Produce the display-markup fragment for the entry file:
    /// include resolution, then image inlining, then the transpiler passes.
    pub fn fragment(&self) -> String {
        let flattened = flatten(self.files, self.main);
        let inlined = inline_images(&flattened, self.files);
        transpile(&inlined)
    }

    /// Produce the complete standalone preview page.
    pub fn page(&self) -> String {
        render_page(&self.fragment())
    }
}

const PAGE_STYLE: &str = r#"
  body { margin: 0; background: #e5e5e5; font-family: Georgia, 'Times New Roman', serif; }
  .toolbar { position: sticky; top: 0; display: flex; justify-content: flex-end;
             padding: 10px 16px; background: #fff; border-bottom: 1px solid #d4d4d4; }
  .toolbar button { font-size: 13px; padding: 6px 14px; border: none; border-radius: 4px;
                    background: #2563eb; color: #fff; cursor: pointer; }
  .sheet { width: 210mm; min-height: 297mm; margin: 16px auto; padding: 12mm;
           background: #fff; box-shadow: 0 4px 18px rgba(0,0,0,0.25); box-sizing: border-box;
           color: #111; font-size: 13.5px; line-height: 1.25; }
  .resume-body h1, .resume-body h2 { font-family: Helvetica, Arial, sans-serif; }
  .resume-body .name-huge { font-size: 30px; font-weight: 800; margin: 0 0 4px; }
  .resume-body .name-large { font-size: 24px; font-weight: 700; margin: 0 0 4px; }
  .resume-body .headline { font-size: 20px; font-weight: 700; margin: 0; }
  .resume-body .section-title { font-size: 13px; font-weight: 700; text-transform: uppercase;
                                letter-spacing: 0.12em; border-bottom: 2px solid #1f2937;
                                margin: 22px 0 8px; }
  .resume-body .entry-head { display: flex; justify-content: space-between;
                             margin-top: 14px; font-weight: 700; line-height: 1; }
  .resume-body .entry-date, .resume-body .entry-tech { font-size: 11px; font-weight: 600; color: #6b7280; }
  .resume-body .entry-sub { display: flex; justify-content: space-between;
                            font-style: italic; font-size: 11px; color: #4b5563; margin-bottom: 4px; }
  .resume-body .item-list { list-style: disc; margin: 4px 0 10px; padding-left: 18px; }
  .resume-body .item { margin-bottom: 2px; padding-left: 2px; }
  .resume-body .small-caps { font-variant: small-caps; }
  .resume-body strong { font-weight: 700; color: #000; }
  .resume-body .link { color: #1d4ed8; text-decoration: underline; }
  .resume-body .icon { color: #9ca3af; display: inline-block; margin-right: 4px; }
  .resume-body .inline-photo { height: 96px; width: auto; object-fit: contain;
                               display: block; margin: 0 auto; }
  .resume-body br + br { display: block; content: ""; margin-top: 5px; }
  .placeholder { display: flex; flex-direction: column; align-items: center; justify-content: center;
                 height: 200mm; color: #d1d5db; font-style: italic;
                 border: 2px dashed #d1d5db; border-radius: 12px; }
  .placeholder-title { font-size: 20px; font-weight: 700; margin-bottom: 6px; }
  @media print {
    body { background: #fff; }
    .toolbar { display: none; }
    .sheet { margin: 0; box-shadow: none; }
  }
  @page { size: A4; margin: 10mm; }
"#;

/// Wrap a display-markup fragment into a complete HTML document. A blank
/// fragment gets the placeholder sheet instead of an empty page.
pub fn render_page(fragment: &str) -> String {
    let body = if fragment.trim().is_empty() {
        "<div class=\"placeholder\">\
         <p class=\"placeholder-title\">Visualizer ready</p>\
         <p>Render a .tex entry file to see the preview</p>\
         </div>"
            .to_string()
    } else {
        format!("<div class=\"resume-body\">{fragment}</div>")
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\"/>\n\
         <title>Resume preview</title>\n<style>{PAGE_STYLE}</style>\n</head>\n<body>\n\
         <div class=\"toolbar\"><button onclick=\"window.print()\">Print / Save as PDF</button></div>\n\
         <div class=\"sheet\">{body}</div>\n\
         </body>\n</html>\n"
    )
}
