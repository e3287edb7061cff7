//! AI-assisted content refinement
//!
//! One refinement interaction ships every markup source file to a language
//! model together with a job description and gets back full-file
//! replacements plus explanations. The client is an explicitly constructed,
//! injectable value so tests can substitute a fake. Suggestions touch the
//! tree only on explicit application, matched by exact path.

pub mod client;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

use crate::core::tree::FileTree;

/// One source file shipped to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

/// A full-file replacement proposed by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub file_path: String,
    pub refined_content: String,
    pub explanation: String,
}

/// The model's complete answer to one refinement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResponse {
    pub general_advice: String,
    pub suggestions: Vec<Suggestion>,
}

/// Refinement failures, distinct by cause. A malformed model answer is not
/// a network failure and is reported as such.
#[derive(Error, Debug)]
pub enum RefineError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned an error: {0}")]
    Api(String),

    #[error("empty response from the model")]
    EmptyResponse,

    #[error("response was not valid refinement JSON: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

/// Boxed future type alias used by [`RefineClient`] to keep the trait
/// dyn-compatible.
pub type RefineFuture<'a> =
    Pin<Box<dyn Future<Output = Result<AiResponse, RefineError>> + Send + 'a>>;

/// Sends refinement requests to a language model.
pub trait RefineClient: Send + Sync {
    /// Ask for refined replacements of `files`, targeting `job_description`.
    fn refine(&self, files: &[SourceFile], job_description: &str) -> RefineFuture<'_>;
}

/// Collect every markup source file as a `{path, content}` pair.
pub fn collect_sources(tree: &FileTree) -> Vec<SourceFile> {
    tree.walk()
        .filter(|node| node.is_file() && node.name.ends_with(".tex"))
        .filter_map(|node| {
            node.text().map(|content| SourceFile {
                path: node.path.clone(),
                content: content.to_string(),
            })
        })
        .collect()
}

/// Run one refinement interaction over the project's sources.
pub async fn refine_project(
    client: &dyn RefineClient,
    tree: &FileTree,
    job_description: &str,
) -> Result<AiResponse, RefineError> {
    let files = collect_sources(tree);
    log::debug!("sending {} source files for refinement", files.len());
    client.refine(&files, job_description).await
}

/// Apply suggestions to the tree in place. Suggestions whose path matches no
/// text node are skipped. Returns the paths actually updated.
pub fn apply_suggestions(tree: &mut FileTree, response: &AiResponse) -> Vec<String> {
    let mut applied = Vec::new();
    for suggestion in &response.suggestions {
        if tree.set_text(&suggestion.file_path, suggestion.refined_content.clone()) {
            applied.push(suggestion.file_path.clone());
        } else {
            log::warn!(
                "skipping refinement suggestion for unknown path '{}'",
                suggestion.file_path
            );
        }
    }
    applied
}
