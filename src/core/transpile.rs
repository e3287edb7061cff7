//! Markup-to-display transpiler
//!
//! A linear pipeline of total, order-sensitive rewrite passes that degrades
//! LaTeX-dialect source into a small, safe display-markup vocabulary. There
//! is no parse tree: each pass is a pattern-match-and-substitute over the
//! previous pass's output. Known resume macros are converted structurally,
//! known formatting commands are mapped to display elements, and everything
//! unrecognized is purged by the closing catch-all passes, so the output
//! never carries raw command syntax.

use once_cell::sync::Lazy;
use regex::Regex;

// Body extraction
static DOC_BODY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\\begin\{document\}(.*)\\end\{document\}").expect("Invalid DOC_BODY_RE regex")
});

// Preamble and layout noise
static MAKEAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\\makeatletter.*?\\makeatother").expect("Invalid MAKEAT_RE regex")
});
static COMMAND_DEF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(new|renew|provide)command\*?\{[^}]+\}(\[[^\]]*\])?\{[^}]*\}")
        .expect("Invalid COMMAND_DEF_RE regex")
});
static DEF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\def\\[a-zA-Z@]+[^{]*\{[^}]*\}").expect("Invalid DEF_RE regex"));
static SET_LENGTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(set|addto)length\{[^}]+\}\{[^}]+\}").expect("Invalid SET_LENGTH_RE regex")
});
static SPACING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[vh]space\*?\{-?[^}]+\}").expect("Invalid SPACING_RE regex"));
static COLOR_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Black(RGB|CMYK)[a-z]?,\s*[a-z0-9]+,\s*[a-z0-9]+(\s*\}\s*Xr\s*@)?")
        .expect("Invalid COLOR_TOKEN_RE regex")
});
static COLUMN_SPEC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9.]*[lcr]@\{[^}]*\}").expect("Invalid COLUMN_SPEC_RE regex"));
static COLUMN_PAIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9.]+[lcr]@[lcr]").expect("Invalid COLUMN_PAIR_RE regex"));
static LEFT_MARGIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)leftmargin\s*=\s*[0-9.]+[a-z]+").expect("Invalid LEFT_MARGIN_RE regex"));
static LABEL_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)label\s*=\s*[^,}]*").expect("Invalid LABEL_PARAM_RE regex"));
static BRACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\}\}\}+").expect("Invalid BRACE_RUN_RE regex"));
static NUMERIC_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^-?\d+\.?\d*[ \t]*$").expect("Invalid NUMERIC_LINE_RE regex"));

// Generic environment delimiters
static ENV_BEGIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\begin\{[a-zA-Z*]+\}(\[[^\]]*\])?(\{[^}]*\})?(\{[^}]*\})?(\{[^}]*\})?")
        .expect("Invalid ENV_BEGIN_RE regex")
});
static ENV_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\end\{[a-zA-Z*]+\}").expect("Invalid ENV_END_RE regex"));

// Bracket/brace debris left behind by stripped layout
static OPT_BRACKET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]{1,20}\]").expect("Invalid OPT_BRACKET_RE regex"));
static STRUCT_BRACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[lcr|@{}*()0-9.\\ ]{1,30}\}").expect("Invalid STRUCT_BRACE_RE regex"));

// Domain macros
static SUBHEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\resumeSubheading\s*\{(.+?)\}\s*\{(.+?)\}\s*\{(.+?)\}\s*\{(.+?)\}")
        .expect("Invalid SUBHEADING_RE regex")
});
static PROJECT_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\resumeProjectHeading\s*\{(.+?)\}\s*\{(.+?)\}")
        .expect("Invalid PROJECT_HEADING_RE regex")
});
static SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\section\{(.+?)\}").expect("Invalid SECTION_RE regex"));

// Inline formatting
static SMALL_CAPS_BARE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\scshape\s+([^{}\\]+)").expect("Invalid SMALL_CAPS_BARE_RE regex"));
static SMALL_CAPS_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\\scshape\s+([^}]+)\}").expect("Invalid SMALL_CAPS_GROUP_RE regex"));
// Bold tolerates one level of embedded braced markup so nested formatting
// like \textbf{a \textit{b} c} keeps its grouping.
static BOLD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\\textbf\{([^{}]*(?:\{[^{}]*\}[^{}]*)*)\}").expect("Invalid BOLD_RE regex")
});
static ITALIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\textit\{(.+?)\}").expect("Invalid ITALIC_RE regex"));
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\Huge\s+([^{}\\]+)").expect("Invalid TITLE_RE regex"));
static SUBTITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\huge\s+([^{}\\]+)").expect("Invalid SUBTITLE_RE regex"));
static HEADLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\Large\s+([^{}\\]+)").expect("Invalid HEADLINE_RE regex"));

// Lists
static ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\item\b").expect("Invalid ITEM_RE regex"));
static ITEM_AFTER_LIST_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"</ul>\s*</li><li class="item">"#).expect("Invalid ITEM_AFTER_LIST_END_RE regex")
});
static EMPTY_TRAILING_ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<li class="item">\s*</ul>"#).expect("Invalid EMPTY_TRAILING_ITEM_RE regex")
});
static ORPHAN_LEADING_CLOSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<ul class="item-list">\s*</li>"#).expect("Invalid ORPHAN_LEADING_CLOSE_RE regex")
});

// Remaining inline substitutions
static ICON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\seticon\{.+?\}\{(.+?)\}").expect("Invalid ICON_RE regex"));
static HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\href\{.+?\}\{(.+?)\}").expect("Invalid HREF_RE regex"));
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\url\{(.+?)\}").expect("Invalid URL_RE regex"));
static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\\\").expect("Invalid LINE_BREAK_RE regex"));
static QUAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\quad").expect("Invalid QUAD_RE regex"));
static REF_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\d").expect("Invalid REF_MARKER_RE regex"));

// Residual command purge
static PARAGRAPH_CMD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(par|noindent|ignorespaces|unskip)\b").expect("Invalid PARAGRAPH_CMD_RE regex")
});
static AT_CMD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\@\w+").expect("Invalid AT_CMD_RE regex"));
static RESUME_CMD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(resumeItem|resumeSubItem|resumeSubSubheading|resumeSubHeadingListStart|resumeSubHeadingListEnd)\b")
        .expect("Invalid RESUME_CMD_RE regex")
});
static LIST_ENV_CMD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(itemize|enumerate|description|trivlist)\b").expect("Invalid LIST_ENV_CMD_RE regex")
});
static SKIP_CMD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(smallskip|medskip|bigskip|vfill|hfill|linebreak|newline|pagebreak)\b")
        .expect("Invalid SKIP_CMD_RE regex")
});
static SIZE_CMD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(tiny|scriptsize|footnotesize|small|normalsize|large|LARGE)\b")
        .expect("Invalid SIZE_CMD_RE regex")
});
static ALIGN_CMD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(centering|raggedright|raggedleft|center|flushleft|flushright)\b")
        .expect("Invalid ALIGN_CMD_RE regex")
});
static FONT_CMD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(rm|sf|tt|bf|it|sl|sc|textrm|textsf|texttt)\b").expect("Invalid FONT_CMD_RE regex")
});
static DECORATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(underline|emph|textsc|textnormal|textup|textsl)\{([^}]+)\}")
        .expect("Invalid DECORATION_RE regex")
});
static TABLE_CMD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\(hline|cline|multicolumn|multirow)\b").expect("Invalid TABLE_CMD_RE regex")
});
static UNKNOWN_WITH_ARG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[a-zA-Z]+\*?\{[^}]*\}").expect("Invalid UNKNOWN_WITH_ARG_RE regex"));
static UNKNOWN_BARE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[a-zA-Z@]+\*?").expect("Invalid UNKNOWN_BARE_RE regex"));

// Group peeling and whitespace
static BRACE_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}\\]*)\}").expect("Invalid BRACE_GROUP_RE regex"));
static BRACKET_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]\\]*)\]").expect("Invalid BRACKET_GROUP_RE regex"));
static BREAK_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:<br/?>\s*){3,}").expect("Invalid BREAK_RUN_RE regex"));

/// Number of unwrap iterations for nested brace/bracket groups. Bounded to
/// guarantee termination; nesting deeper than this survives as literal text.
const PEEL_PASSES: usize = 8;

/// Run the full pipeline: any text in, display-markup fragment out.
pub fn transpile(source: &str) -> String {
    let text = strip_comments(source);
    let body = extract_body(&text).to_string();
    let body = strip_noise(&body);
    let body = strip_environments(&body);
    let body = strip_bracket_debris(&body);
    let body = convert_resume_macros(&body);
    let body = convert_sections(&body);
    let body = convert_formatting(&body);
    let body = convert_lists(&body);
    let body = convert_inline(&body);
    let body = purge_commands(&body);
    let body = peel_groups(&body);
    normalize_whitespace(&body)
}

/// Drop everything from an unescaped `%` to the end of its line.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut cut = line.len();
        let mut prev = ' ';
        for (pos, ch) in line.char_indices() {
            if ch == '%' && prev != '\\' {
                cut = pos;
                break;
            }
            prev = ch;
        }
        out.push_str(&line[..cut]);
    }
    out
}

/// Keep only the span between the document-body delimiters; fall back to the
/// whole text when the delimiters are absent.
fn extract_body(text: &str) -> &str {
    match DOC_BODY_RE.captures(text).and_then(|c| c.get(1)) {
        Some(body) => body.as_str(),
        None => text,
    }
}

/// Strip definition plumbing and layout tokens that carry no renderable
/// content.
fn strip_noise(body: &str) -> String {
    let body = MAKEAT_RE.replace_all(body, "");
    let body = COMMAND_DEF_RE.replace_all(&body, "");
    let body = DEF_RE.replace_all(&body, "");
    let body = SET_LENGTH_RE.replace_all(&body, "");
    let body = SPACING_RE.replace_all(&body, "");
    let body = COLOR_TOKEN_RE.replace_all(&body, "");
    let body = COLUMN_SPEC_RE.replace_all(&body, "");
    let body = COLUMN_PAIR_RE.replace_all(&body, "");
    let body = LEFT_MARGIN_RE.replace_all(&body, "");
    let body = LABEL_PARAM_RE.replace_all(&body, "");
    let body = body.replace("\\$", "");
    let body = BRACE_RUN_RE.replace_all(&body, "");
    NUMERIC_LINE_RE.replace_all(&body, "").into_owned()
}

/// Remove generic environment delimiters with their argument lists. Lossy:
/// an environment whose meaning depended on its arguments degrades to plain
/// flowed text.
fn strip_environments(body: &str) -> String {
    let body = ENV_BEGIN_RE.replace_all(body, "");
    ENV_END_RE.replace_all(&body, "").into_owned()
}

/// Drop small optional brackets and short structural brace groups.
fn strip_bracket_debris(body: &str) -> String {
    let body = OPT_BRACKET_RE.replace_all(body, "");
    STRUCT_BRACE_RE.replace_all(&body, "").into_owned()
}

/// Convert the resume entry macros into structured rows. Runs before the
/// generic formatting passes so the argument braces are not mistaken for
/// noise.
fn convert_resume_macros(body: &str) -> String {
    let body = SUBHEADING_RE.replace_all(
        body,
        "<div class=\"entry-head\"><span>$1</span><span class=\"entry-date\">$2</span></div>\
         <div class=\"entry-sub\"><span>$3</span><span>$4</span></div>",
    );
    PROJECT_HEADING_RE
        .replace_all(
            &body,
            "<div class=\"entry-head\"><span>$1</span><span class=\"entry-tech\">$2</span></div>",
        )
        .into_owned()
}

fn convert_sections(body: &str) -> String {
    SECTION_RE
        .replace_all(body, "<h2 class=\"section-title\">$1</h2>")
        .into_owned()
}

/// Inline formatting: small caps, bold, italic and the three display
/// heading sizes.
fn convert_formatting(body: &str) -> String {
    let body = SMALL_CAPS_BARE_RE.replace_all(body, "<span class=\"small-caps\">$1</span>");
    let body = SMALL_CAPS_GROUP_RE.replace_all(&body, "<span class=\"small-caps\">$1</span>");
    let body = BOLD_RE.replace_all(&body, "<strong>$1</strong>");
    let body = ITALIC_RE.replace_all(&body, "<em>$1</em>");
    let body = TITLE_RE.replace_all(&body, "<h1 class=\"name-huge\">$1</h1>");
    let body = SUBTITLE_RE.replace_all(&body, "<h1 class=\"name-large\">$1</h1>");
    HEADLINE_RE
        .replace_all(&body, "<h2 class=\"headline\">$1</h2>")
        .into_owned()
}

/// Convert the list container pair and item separators, then clean up the
/// wrapping artifacts the plain substitution leaves behind.
fn convert_lists(body: &str) -> String {
    let body = body.replace("\\resumeItemListStart", "<ul class=\"item-list\">");
    let body = body.replace("\\resumeItemListEnd", "</ul>");
    let body = ITEM_RE.replace_all(&body, "</li><li class=\"item\">");
    let body = ITEM_AFTER_LIST_END_RE.replace_all(&body, "</ul>");
    let body = EMPTY_TRAILING_ITEM_RE.replace_all(&body, "</ul>");
    ORPHAN_LEADING_CLOSE_RE
        .replace_all(&body, "<ul class=\"item-list\">")
        .into_owned()
}

/// Icon, hyperlink, line-break and escaped-character substitutions.
fn convert_inline(body: &str) -> String {
    let body = ICON_RE.replace_all(body, "<span class=\"icon\">\u{25B6}</span>$1");
    let body = HREF_RE.replace_all(&body, "<span class=\"link\">$1</span>");
    let body = URL_RE.replace_all(&body, "<span class=\"link\">$1</span>");
    let body = LINE_BREAK_RE.replace_all(&body, "<br/>");
    let body = replace_escapes(&body);
    let body = QUAD_RE.replace_all(&body, "&nbsp;&nbsp;");
    REF_MARKER_RE.replace_all(&body, "").into_owned()
}

/// Single scan handling the ampersand family: `\&` becomes a literal
/// (entity-encoded) ampersand, `\_` a literal underscore, and any bare `&`
/// degrades to a space. Runs before `\quad` emits `&nbsp;` so entities
/// produced by the pipeline survive.
fn replace_escapes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.peek() {
                Some('&') => {
                    chars.next();
                    out.push_str("&amp;");
                }
                Some('_') => {
                    chars.next();
                    out.push('_');
                }
                _ => out.push('\\'),
            },
            '&' => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}

/// Delete known no-argument commands, keep the bare text of known
/// decorations, then purge whatever command syntax is left.
fn purge_commands(body: &str) -> String {
    let body = PARAGRAPH_CMD_RE.replace_all(body, "");
    let body = AT_CMD_RE.replace_all(&body, "");
    let body = RESUME_CMD_RE.replace_all(&body, "");
    let body = LIST_ENV_CMD_RE.replace_all(&body, "");
    let body = SKIP_CMD_RE.replace_all(&body, "");
    let body = SIZE_CMD_RE.replace_all(&body, "");
    let body = ALIGN_CMD_RE.replace_all(&body, "");
    let body = FONT_CMD_RE.replace_all(&body, "");
    let body = DECORATION_RE.replace_all(&body, "$2");
    let body = TABLE_CMD_RE.replace_all(&body, "");
    let body = UNKNOWN_WITH_ARG_RE.replace_all(&body, "");
    let body = UNKNOWN_BARE_RE.replace_all(&body, "");
    body.replace('\\', "")
}

/// Unwrap one level of non-nested brace/bracket groups per pass. A fixed
/// number of passes approximates recursive descent for the shallow nesting
/// typical of this input.
fn peel_groups(body: &str) -> String {
    let mut body = body.to_string();
    for _ in 0..PEEL_PASSES {
        body = BRACE_GROUP_RE.replace_all(&body, "$1").into_owned();
        body = BRACKET_GROUP_RE.replace_all(&body, "$1").into_owned();
    }
    body
}

/// Trim the fragment and collapse runs of three or more line breaks to two.
fn normalize_whitespace(body: &str) -> String {
    BREAK_RUN_RE
        .replace_all(body.trim(), "<br/><br/>")
        .into_owned()
}
