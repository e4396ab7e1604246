//! Entity extraction from report text
//!
//! Produces records shaped for graph ingestion: companies, people, ratings,
//! transactions, employments, and regulatory events.

use crate::error::AgentError;
use crate::inference::{strip_code_fences, FieldSpec, InferencePort, TaskSpec};
use crate::models::ExtractionRecords;
use crate::schema::SchemaContext;
use crate::Result;
use std::sync::Arc;
use tracing::info;

const NER_TASK: TaskSpec = TaskSpec {
    name: "entity_extraction",
    instructions: "Extract named entities from company report text and structure them for knowledge-graph ingestion. Extract the companies, people, ratings, transactions, employments, and regulatory events mentioned in the text, shaped according to the schema. Leave out record kinds with no mentions.",
    outputs: &[FieldSpec {
        name: "extracted_entities",
        desc: "JSON object with arrays: companies, people, ratings, transactions, employments, regulatory_events",
    }],
};

pub struct EntityExtractor {
    inference: Arc<dyn InferencePort>,
    schema: SchemaContext,
}

impl EntityExtractor {
    pub fn new(inference: Arc<dyn InferencePort>, schema: SchemaContext) -> Self {
        Self { inference, schema }
    }

    pub async fn extract(&self, text: &str) -> Result<ExtractionRecords> {
        let outputs = self
            .inference
            .infer(
                &NER_TASK,
                &[
                    ("text", text.to_string()),
                    ("schema_context", self.schema.as_str().to_string()),
                ],
            )
            .await?;

        let raw = outputs.require("extracted_entities")?;
        let cleaned = strip_code_fences(raw);

        let records: ExtractionRecords = serde_json::from_str(cleaned).map_err(|e| {
            AgentError::Inference(format!("malformed extraction payload: {} | raw={}", e, raw))
        })?;

        info!(total = records.total(), "Extraction complete");
        Ok(records)
    }
}
