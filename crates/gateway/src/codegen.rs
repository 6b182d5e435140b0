//! Code generation and analysis endpoints.
//!
//! Both are prompt templates over the chat pipeline: they build a
//! `ChatRequest` aimed at a local model and go through the same worker
//! pool and deadline as `/api/chat`, so saturation and timeouts behave
//! identically across all three endpoints.

use {
    axum::{Json, extract::State},
    serde::Deserialize,
    serde_json::{Value, json},
    tracing::debug,
};

use portico_providers::{ChatMessage, ChatRequest};

use crate::{chat::run_offloaded, error::ApiError, state::AppState};

fn default_language() -> String {
    "python".into()
}

// ── Code generation ──

#[derive(Deserialize)]
pub struct CodeGenRequest {
    pub prompt: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default = "default_optimize_for")]
    pub optimize_for: String,
}

fn default_optimize_for() -> String {
    "performance".into()
}

fn codegen_prompt(req: &CodeGenRequest) -> String {
    let hint = match req.optimize_for.as_str() {
        "performance" => "Generate high-performance code that exploits multi-core hardware.\n\n",
        "memory" => "Generate memory-efficient code.\n\n",
        _ => "",
    };
    let context = req
        .context
        .as_deref()
        .map(|c| format!("Context: {c}\n\n"))
        .unwrap_or_default();
    format!(
        "{hint}Generate {} code for the following requirement:\n{}\n\n{context}\
         Requirements:\n\
         1. Return only code, no explanations\n\
         2. The code must be complete and runnable\n\
         3. Add comments where needed",
        req.language, req.prompt,
    )
}

/// Model choice follows the request's wording: anything mentioning code
/// structure goes to the code-tuned model.
fn codegen_model(prompt: &str) -> &'static str {
    if prompt.to_lowercase().contains("code") {
        "ollama-codellama"
    } else {
        "ollama-llama2"
    }
}

pub async fn generate_code(
    State(state): State<AppState>,
    Json(request): Json<CodeGenRequest>,
) -> Result<Json<Value>, ApiError> {
    debug!(language = %request.language, "code generation request");
    let chat = ChatRequest {
        messages: vec![ChatMessage {
            role: "user".into(),
            content: codegen_prompt(&request),
        }],
        model: codegen_model(&request.prompt).into(),
        temperature: 0.3,
        max_tokens: 4000,
    };
    let response = run_offloaded(&state, chat).await?;
    Ok(Json(json!({ "code": response.content })))
}

// ── Performance analysis ──

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn analysis_prompt(req: &AnalyzeRequest) -> String {
    format!(
        "Analyze the performance characteristics of the following {language} code \
         and suggest optimizations:\n\n\
         ```{language}\n{code}\n```\n\n\
         Cover:\n\
         1. Computational complexity\n\
         2. Memory usage patterns\n\
         3. Parallelization potential",
        language = req.language,
        code = req.code,
    )
}

pub async fn analyze_performance(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Value>, ApiError> {
    debug!(language = %request.language, "performance analysis request");
    let chat = ChatRequest {
        messages: vec![ChatMessage {
            role: "user".into(),
            content: analysis_prompt(&request),
        }],
        model: "ollama-llama2".into(),
        temperature: 0.2,
        max_tokens: 4000,
    };
    let response = run_offloaded(&state, chat).await?;
    Ok(Json(json!({ "analysis": response.content })))
}
