//! texpeek - preview LaTeX resume projects as HTML
//!
//! texpeek provides:
//! - Project loading from zip archives or directories
//! - Recursive include flattening with cycle protection
//! - Image inlining as base64 data URIs
//! - A staged, best-effort markup-to-display transpiler
//! - AI-assisted content refinement against a job description

use anyhow::Result;
use clap::Parser;

mod ai;
mod cli;
mod core;
mod project;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
