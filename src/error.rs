//! Error types for the graph retrieval agent

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Core Pipeline Errors
    // =============================

    /// The planner's output could not be parsed into a step list. Fatal to
    /// the run; the raw model output is kept so the failure is inspectable.
    #[error("Plan parse error: {reason} | raw={raw}")]
    PlanParse { raw: String, reason: String },

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Graph backend error: {0}")]
    GraphBackend(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
