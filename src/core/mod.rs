//! Core module - The markup-to-preview pipeline
//!
//! This module provides:
//! - The project file tree (flat arena with a path index)
//! - Loose file-reference resolution
//! - Cross-file include flattening with cycle protection
//! - Inline image assets as base64 data URIs
//! - The staged markup-to-display transpiler
//! - Preview page rendering

pub mod assets;
pub mod include;
pub mod preview;
pub mod resolve;
pub mod transpile;
pub mod tree;
