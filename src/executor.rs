//! Step executor
//!
//! Turns one retrieval step into a concrete openCypher query (conditioned
//! on everything accumulated so far), runs it against the graph backend,
//! and records the outcome. A failed step is captured in its hop record and
//! the run keeps going with whatever was accumulated before it.

use crate::accumulator::ResultAccumulator;
use crate::error::AgentError;
use crate::graph::GraphQueryPort;
use crate::inference::{FieldSpec, InferencePort, TaskSpec};
use crate::models::{GraphResultSet, HopOutcome, RetrievalStep};
use crate::schema::SchemaContext;
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

const HOP_QUERY_TASK: TaskSpec = TaskSpec {
    name: "hop_cypher_generation",
    instructions: "Convert one retrieval step into a precise openCypher query. Use MATCH, RETURN, WHERE, ORDER BY, LIMIT clauses. Always return specific properties explicitly instead of whole node objects, e.g. \"RETURN c.id, c.name, c.sector\" instead of \"RETURN c\". When the accumulated results name concrete entities, anchor the query on them.",
    outputs: &[
        FieldSpec {
            name: "cypher_query",
            desc: "openCypher query retrieving this step's slice of the knowledge graph",
        },
        FieldSpec {
            name: "reasoning",
            desc: "Brief explanation of how the query maps to the graph structure",
        },
    ],
};

/// One executed hop: its record plus whatever the backend returned.
pub struct StepOutcome {
    pub hop: HopOutcome,
    pub results: GraphResultSet,
}

pub struct StepExecutor {
    inference: Arc<dyn InferencePort>,
    graph: Arc<dyn GraphQueryPort>,
    schema: SchemaContext,
}

impl StepExecutor {
    pub fn new(
        inference: Arc<dyn InferencePort>,
        graph: Arc<dyn GraphQueryPort>,
        schema: SchemaContext,
    ) -> Self {
        Self {
            inference,
            graph,
            schema,
        }
    }

    /// Execute one step. Failures in generation or execution are folded
    /// into the hop record — this never aborts the caller's loop.
    pub async fn execute_step(
        &self,
        step: &RetrievalStep,
        accumulated: &ResultAccumulator,
    ) -> StepOutcome {
        let start = Instant::now();
        debug!(
            step = step.step_number,
            description = %step.description,
            "Executing retrieval step"
        );

        let (cypher, reasoning) = match self.generate_query(step, accumulated).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(step = step.step_number, error = %e, "Query generation failed");
                return failed_outcome(step, String::new(), String::new(), &e);
            }
        };

        match self.graph.execute(&cypher).await {
            Ok(results) => {
                debug!(
                    step = step.step_number,
                    entities = results.entities.len(),
                    relationships = results.relationships.len(),
                    elapsed = ?start.elapsed(),
                    "Step complete"
                );

                StepOutcome {
                    hop: HopOutcome {
                        step_number: step.step_number,
                        description: step.description.clone(),
                        cypher_query: cypher,
                        reasoning,
                        entities_found: results.entities.len(),
                        relationships_found: results.relationships.len(),
                        error: None,
                    },
                    results,
                }
            }
            Err(e) => {
                warn!(step = step.step_number, error = %e, "Query execution failed");
                failed_outcome(step, cypher, reasoning, &e)
            }
        }
    }

    async fn generate_query(
        &self,
        step: &RetrievalStep,
        accumulated: &ResultAccumulator,
    ) -> Result<(String, String)> {
        let outputs = self
            .inference
            .infer(
                &HOP_QUERY_TASK,
                &[
                    ("step_description", step.description.clone()),
                    ("cypher_hint", step.cypher_hint.clone()),
                    ("expected_entities", step.expected_entities.join(", ")),
                    ("schema_context", self.schema.as_str().to_string()),
                    ("accumulated_results", accumulated.context_summary()?),
                ],
            )
            .await?;

        let cypher = outputs.require("cypher_query")?.trim().to_string();
        if cypher.is_empty() {
            return Err(AgentError::Inference(
                "generated an empty query".to_string(),
            ));
        }
        let reasoning = outputs.get("reasoning").unwrap_or("").to_string();

        Ok((cypher, reasoning))
    }
}

/// Hop record for a step that failed: error set, zero counts. The query is
/// kept when it was generated before the failure.
fn failed_outcome(
    step: &RetrievalStep,
    cypher: String,
    reasoning: String,
    error: &AgentError,
) -> StepOutcome {
    StepOutcome {
        hop: HopOutcome {
            step_number: step.step_number,
            description: step.description.clone(),
            cypher_query: cypher,
            reasoning,
            entities_found: 0,
            relationships_found: 0,
            error: Some(error.to_string()),
        },
        results: GraphResultSet::default(),
    }
}
