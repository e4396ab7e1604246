//! Core data models for the graph retrieval agent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

//
// ================= Graph Data =================
//

/// A typed, identified node retrieved from the knowledge graph.
///
/// Two entities sharing an `id` are the same logical entity; the result
/// accumulator merges them (first discovery wins) before results are
/// returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

/// A typed connection between two entities.
///
/// `from_id`/`to_id` are weak references: they may dangle when the entity
/// they point at was dropped by a later dedup pass. Relationships are never
/// deduplicated — the same edge rediscovered on a later hop may carry
/// different evidence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
    pub label: String,
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

/// Entities and relationships returned by one graph query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphResultSet {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

//
// ================= Plan =================
//

/// One step of a multi-hop retrieval plan. Produced once by the planner,
/// immutable afterwards, consumed once by the executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalStep {
    #[serde(default)]
    pub step_number: u32,
    pub description: String,
    /// Query sketch to be refined into an executable openCypher query.
    #[serde(default)]
    pub cypher_hint: String,
    /// Node labels this step is expected to surface.
    #[serde(default)]
    pub expected_entities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalPlan {
    /// Free-text rationale for the overall retrieval strategy.
    pub strategy: String,
    pub steps: Vec<RetrievalStep>,
}

//
// ================= Hop Outcome =================
//

/// Record of one executed step. Appended in execution order, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HopOutcome {
    pub step_number: u32,
    pub description: String,
    /// Concrete query issued for this hop; empty when generation failed
    /// before anything reached the backend.
    pub cypher_query: String,
    pub reasoning: String,
    pub entities_found: usize,
    pub relationships_found: usize,
    pub error: Option<String>,
}

//
// ================= Analysis =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Completeness {
    Complete,
    Partial,
    Incomplete,
}

impl Completeness {
    /// Lenient mapping from model output. Anything unrecognized counts as
    /// incomplete.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "complete" => Completeness::Complete,
            "partial" => Completeness::Partial,
            _ => Completeness::Incomplete,
        }
    }
}

impl fmt::Display for Completeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Completeness::Complete => "complete",
            Completeness::Partial => "partial",
            Completeness::Incomplete => "incomplete",
        };
        write!(f, "{}", s)
    }
}

/// Verdict over the accumulated evidence for one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub answer: String,
    pub completeness: Completeness,
    pub missing_info: String,
}

//
// ================= Retrieval Result =================
//

/// Terminal record of one orchestrated multi-hop run. Always returned fully
/// populated: planning, hop, and analysis failures land in `error` (and the
/// per-hop error fields), never as a propagated fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub run_id: Uuid,
    /// The original question.
    pub query: String,
    /// Consolidated reasoning narrative across planning, hops, and analysis.
    pub reasoning: String,
    pub hops: Vec<HopOutcome>,
    /// Deduplicated entities, in order of first discovery.
    pub final_nodes: Vec<Entity>,
    /// All discovered relationships, duplicates included.
    pub final_edges: Vec<Relationship>,
    /// Concrete queries issued, in hop order.
    pub cypher_queries: Vec<String>,
    pub analysis: Option<AnalysisReport>,
    /// Start-to-finish wall-clock seconds.
    pub execution_time: f64,
    pub created_at: DateTime<Utc>,
    pub error: Option<String>,
}

//
// ================= Single-shot Translation =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Standard,
    Temporal,
}

/// Result of one single-shot NL → Cypher translation. Errors are embedded
/// so callers always get the timing and the original question back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CypherGenResult {
    pub query: String,
    pub cypher_query: String,
    pub reasoning: String,
    pub query_kind: QueryKind,
    pub time_context: Option<String>,
    pub execution_time: f64,
    pub error: Option<String>,
}

//
// ================= Entity Extraction =================
//

/// Structured records extracted from report text, shaped for graph
/// ingestion. Record kinds absent from the text stay empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionRecords {
    #[serde(default)]
    pub companies: Vec<Value>,
    #[serde(default)]
    pub people: Vec<Value>,
    #[serde(default)]
    pub ratings: Vec<Value>,
    #[serde(default)]
    pub transactions: Vec<Value>,
    #[serde(default)]
    pub employments: Vec<Value>,
    #[serde(default)]
    pub regulatory_events: Vec<Value>,
}

impl ExtractionRecords {
    pub fn total(&self) -> usize {
        self.companies.len()
            + self.people.len()
            + self.ratings.len()
            + self.transactions.len()
            + self.employments.len()
            + self.regulatory_events.len()
    }
}
