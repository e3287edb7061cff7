//! Golden tests for texpeek
//!
//! Render the bundled sample project and verify the output shape stays
//! stable: converted structures present, includes spliced, and no raw
//! command syntax leaked into the fragment.

use assert_cmd::Command;
use std::path::PathBuf;

/// Get the path to the fixtures directory
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get the path to the sample project
fn sample_project() -> PathBuf {
    fixtures_dir().join("sample_project")
}

/// Create a command for running the texpeek binary
fn texpeek_cmd() -> Command {
    let mut cmd = Command::cargo_bin("texpeek").expect("Failed to find texpeek binary");
    cmd.env("NO_COLOR", "1");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let assert = cmd.assert().success();
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

fn render_fragment() -> String {
    let mut cmd = texpeek_cmd();
    cmd.arg("--project")
        .arg(sample_project())
        .arg("render")
        .arg("--fragment");
    stdout_of(&mut cmd)
}

#[test]
fn golden_fragment_has_converted_structures() {
    let fragment = render_fragment();

    assert!(fragment.contains("<h1 class=\"name-huge\">Jane Doe</h1>"));
    assert!(fragment.contains("<span class=\"small-caps\">Platform Engineer</span>"));
    assert!(fragment.contains("<h2 class=\"section-title\">Experience</h2>"));
    assert!(fragment.contains("<h2 class=\"section-title\">Skills</h2>"));
    assert!(fragment.contains(
        "<div class=\"entry-head\"><span>Acme Corp</span>\
         <span class=\"entry-date\">2021 -- Present</span></div>"
    ));
    assert!(fragment.contains("<strong>Rust</strong>"));
    assert!(fragment.contains("<span class=\"link\">janedoe.dev</span>"));
}

#[test]
fn golden_fragment_list_is_well_formed() {
    let fragment = render_fragment();

    assert_eq!(fragment.matches("<ul class=\"item-list\">").count(), 1);
    assert_eq!(fragment.matches("<li class=\"item\">").count(), 2);
    assert_eq!(fragment.matches("</ul>").count(), 1);
}

#[test]
fn golden_fragment_leaks_no_command_syntax() {
    let fragment = render_fragment();

    assert!(!fragment.contains('\\'), "backslash leaked: {fragment}");
    assert!(!fragment.contains("\\begin"));
    assert!(!fragment.contains("resumeSubheading"));
    assert!(!fragment.contains("documentclass"));
}

#[test]
fn golden_fragment_handles_escapes() {
    let fragment = render_fragment();

    // \& survives as an entity, \_ as a literal underscore, \% as a percent.
    assert!(fragment.contains("Rust &amp; distributed systems"));
    assert!(fragment.contains("jane_doe@example.com"));
    assert!(fragment.contains("40%"));
}

#[test]
fn golden_flatten_splices_class_and_sections() {
    let mut cmd = texpeek_cmd();
    cmd.arg("--project").arg(sample_project()).arg("flatten");
    let flattened = stdout_of(&mut cmd);

    // Class plumbing spliced at \input{resume}.
    assert!(flattened.contains("\\setlength{\\parindent}{0pt}"));
    // Section file spliced at \input{sections/experience}.
    assert!(flattened.contains("\\resumeSubheading{Acme Corp}"));
    // No inclusion directives remain.
    assert!(!flattened.contains("\\input"));
}

#[test]
fn golden_tree_shows_hierarchy() {
    let mut cmd = texpeek_cmd();
    cmd.arg("--project").arg(sample_project()).arg("tree");
    let tree = stdout_of(&mut cmd);

    assert!(tree.contains("main.tex"));
    assert!(tree.contains("resume.cls"));
    assert!(tree.contains("sections/"));
    assert!(tree.contains("experience.tex"));
}
