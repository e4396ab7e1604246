//! Financial Knowledge-Graph Agent
//!
//! Turns natural-language questions about a financial knowledge graph into
//! openCypher queries and orchestrates multi-hop retrieval:
//! - Decomposes complex questions into ordered retrieval steps
//! - Executes each step against the graph backend, threading accumulated
//!   results forward as context for the next query
//! - Accumulates and deduplicates discovered entities, then analyzes the
//!   evidence against the original question
//! - Also provides single-shot NL → Cypher translation and entity extraction
//!
//! RETRIEVAL LOOP:
//! QUESTION → PLAN → EXECUTE HOPS → ACCUMULATE → ANALYZE → RESULT

pub mod accumulator;
pub mod agent;
pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod executor;
pub mod extraction;
pub mod graph;
pub mod inference;
pub mod models;
pub mod planner;
pub mod schema;
pub mod translator;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use schema::SchemaContext;
