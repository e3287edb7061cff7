//! Gemini-backed refinement client
//!
//! Talks to the generative-language REST API with a JSON response schema so
//! the model answers in the refinement wire format directly.

use serde_json::{json, Value};

use crate::ai::{AiResponse, RefineClient, RefineError, RefineFuture, SourceFile};

/// Default API endpoint
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model identifier
const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

const PROMPT_RULES: &str = "\
You are an expert Resume Optimizer and LaTeX specialist. \
I will provide you with a list of LaTeX files representing my resume and a Job Description (JD). \
Your task is to refine the LaTeX content in these files to better align with the JD.

STRICT FORMATTING RULES:
1. PROPER INDENTATION: Always use consistent indentation (2 spaces) for environments like \\begin{itemize} ... \\end{itemize}.
2. LINE BREAKS: Ensure each \\item is on its own line.
3. NO CLUTTER: Do not add unnecessary comments or meta-text inside the LaTeX content.
4. PRESERVE STRUCTURE: Keep custom commands like \\resumeSubheading, \\resumeItem, etc., exactly as defined in the source, but update their arguments to reflect the JD.
5. CLEAN OUTPUT: The output should be ready to compile. Ensure all braces { } are balanced and special characters (like &, %, _) are properly escaped if they are part of the text content.
6. SPACING: Ensure there is a blank line between major sections or high-level environments for readability.

CONTENT GUIDELINES:
1. Focus on keywords and impact. Use strong action verbs.
2. Align project descriptions and work experience bullet points directly with the requirements of the JD.
3. If a section is already perfect, do not change it.
4. Provide the FULL content for any file that requires a change.";

/// API client for the refinement endpoint. Construct explicitly with a key;
/// model and endpoint are overridable.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a new `GeminiClient`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Override the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API endpoint. Intended for test doubles.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sends one refinement request and decodes the structured answer.
    async fn send(&self, prompt: String) -> Result<AiResponse, RefineError> {
        log::debug!("requesting refinement from model {}", self.model);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": response_schema(),
                },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(RefineError::Api(error_text));
        }

        let payload: Value = response.json().await?;
        if let Some(error) = payload.get("error") {
            return Err(RefineError::Api(error.to_string()));
        }

        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("");
        if text.trim().is_empty() {
            return Err(RefineError::EmptyResponse);
        }

        log::debug!("refinement response: {} bytes", text.len());
        Ok(serde_json::from_str(text)?)
    }
}

impl RefineClient for GeminiClient {
    fn refine(&self, files: &[SourceFile], job_description: &str) -> RefineFuture<'_> {
        let prompt = build_prompt(files, job_description);
        Box::pin(async move { self.send(prompt).await })
    }
}

/// The schema the model is asked to answer with.
fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "generalAdvice": {
                "type": "STRING",
                "description": "A summary of what changes were made and why based on the JD."
            },
            "suggestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "filePath": {
                            "type": "STRING",
                            "description": "The path of the file to update."
                        },
                        "refinedContent": {
                            "type": "STRING",
                            "description": "The full updated LaTeX content for this file."
                        },
                        "explanation": {
                            "type": "STRING",
                            "description": "Why this change was made."
                        }
                    },
                    "required": ["filePath", "refinedContent", "explanation"]
                }
            }
        },
        "required": ["generalAdvice", "suggestions"]
    })
}

/// Assemble the full prompt: rules, job description, then every source file
/// delimited by a path marker.
pub fn build_prompt(files: &[SourceFile], job_description: &str) -> String {
    let sources = files
        .iter()
        .map(|f| format!("--- FILE: {} ---\n{}", f.path, f.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{PROMPT_RULES}\n\nJOB DESCRIPTION:\n{job_description}\n\nRESUME FILES:\n{sources}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_files() -> Vec<SourceFile> {
        vec![
            SourceFile {
                path: "main.tex".to_string(),
                content: "\\section{Skills}".to_string(),
            },
            SourceFile {
                path: "sections/experience.tex".to_string(),
                content: "exp".to_string(),
            },
        ]
    }

    #[test]
    fn test_build_prompt_contains_job_and_files() {
        let prompt = build_prompt(&sample_files(), "Senior Rust Engineer");
        assert!(prompt.contains("JOB DESCRIPTION:\nSenior Rust Engineer"));
        assert!(prompt.contains("--- FILE: main.tex ---"));
        assert!(prompt.contains("--- FILE: sections/experience.tex ---"));
        assert!(prompt.contains("\\section{Skills}"));
    }

    #[test]
    fn test_build_prompt_empty_project() {
        let prompt = build_prompt(&[], "JD");
        assert!(prompt.contains("RESUME FILES:"));
        assert!(prompt.ends_with("RESUME FILES:\n"));
    }

    #[test]
    fn test_response_schema_requires_both_fields() {
        let schema = response_schema();
        let required: Vec<_> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, vec!["generalAdvice", "suggestions"]);
    }

    #[test]
    fn test_client_builder_overrides() {
        let client = GeminiClient::new("key")
            .with_model("other-model")
            .with_base_url("http://localhost:9");
        assert_eq!(client.model, "other-model");
        assert_eq!(client.base_url, "http://localhost:9");
    }
}
