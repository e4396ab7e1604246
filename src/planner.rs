//! Hop planner
//!
//! Decomposes a complex question into an ordered sequence of retrieval
//! steps. The model must return the step list as JSON: output that fails to
//! parse at all is a fatal planning error carrying the raw payload, while a
//! payload that parses but is not a list of steps degrades to an empty plan
//! (zero hops run, the overall call still proceeds to analysis).

use crate::error::AgentError;
use crate::inference::{strip_code_fences, FieldSpec, InferencePort, TaskSpec};
use crate::models::{RetrievalPlan, RetrievalStep};
use crate::schema::SchemaContext;
use crate::Result;
use std::sync::Arc;
use tracing::debug;

const PLAN_TASK: TaskSpec = TaskSpec {
    name: "multi_hop_plan",
    instructions: "Break a complex question about a financial knowledge graph into a short sequence of retrieval steps. Each step retrieves one slice of the graph; later steps may build on entities found by earlier ones. Two to four steps are usually enough.",
    outputs: &[
        FieldSpec {
            name: "strategy",
            desc: "Brief rationale for the overall retrieval strategy",
        },
        FieldSpec {
            name: "steps",
            desc: "JSON array of steps, each an object with step_number (integer), description, cypher_hint (query sketch), and expected_entities (array of node labels)",
        },
    ],
};

pub struct HopPlanner {
    inference: Arc<dyn InferencePort>,
    schema: SchemaContext,
}

impl HopPlanner {
    pub fn new(inference: Arc<dyn InferencePort>, schema: SchemaContext) -> Self {
        Self { inference, schema }
    }

    pub async fn build_plan(&self, question: &str) -> Result<RetrievalPlan> {
        let outputs = self
            .inference
            .infer(
                &PLAN_TASK,
                &[
                    ("question", question.to_string()),
                    ("schema_context", self.schema.as_str().to_string()),
                ],
            )
            .await?;

        let strategy = outputs.get("strategy").unwrap_or("").to_string();

        let raw_steps = outputs.get("steps").ok_or_else(|| AgentError::PlanParse {
            raw: String::new(),
            reason: "planner output had no 'steps' field".to_string(),
        })?;

        let steps = parse_plan_steps(raw_steps)?;

        debug!(step_count = steps.len(), "Plan built");

        Ok(RetrievalPlan { strategy, steps })
    }
}

/// Parse the planner's step payload.
///
/// - Unparseable JSON is fatal; the raw payload rides along in the error.
/// - A non-array payload, or an array whose elements are not step-shaped,
///   yields an empty plan.
pub(crate) fn parse_plan_steps(raw: &str) -> Result<Vec<RetrievalStep>> {
    let cleaned = strip_code_fences(raw);

    let value: serde_json::Value =
        serde_json::from_str(cleaned).map_err(|e| AgentError::PlanParse {
            raw: raw.to_string(),
            reason: format!("steps payload is not valid JSON: {}", e),
        })?;

    let Some(items) = value.as_array() else {
        return Ok(Vec::new());
    };

    let mut steps: Vec<RetrievalStep> = items
        .iter()
        .filter_map(|item| serde_json::from_value::<RetrievalStep>(item.clone()).ok())
        .collect();

    // Steps missing an explicit number take their list position.
    for (i, step) in steps.iter_mut().enumerate() {
        if step.step_number == 0 {
            step.step_number = i as u32 + 1;
        }
    }
    steps.sort_by_key(|s| s.step_number);

    Ok(steps)
}
