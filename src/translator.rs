//! Single-shot natural-language to Cypher translation
//!
//! One call per question, no multi-hop state. Temporal questions are routed
//! to a time-aware prompt with an extracted time context.

use crate::inference::{FieldSpec, InferencePort, TaskSpec};
use crate::models::{CypherGenResult, QueryKind};
use crate::schema::SchemaContext;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

const CYPHER_TASK: TaskSpec = TaskSpec {
    name: "cypher_generation",
    instructions: "Convert a natural language question about financial entities into a precise openCypher query for the knowledge graph. Use MATCH, RETURN, WHERE, ORDER BY, LIMIT clauses, and always return specific properties explicitly instead of whole node objects. Use toLower() for case-insensitive text comparisons.",
    outputs: &[
        FieldSpec {
            name: "cypher_query",
            desc: "openCypher query that retrieves the requested information",
        },
        FieldSpec {
            name: "reasoning",
            desc: "Brief explanation of how the query maps to the graph structure",
        },
    ],
};

const TEMPORAL_CYPHER_TASK: TaskSpec = TaskSpec {
    name: "temporal_cypher_generation",
    instructions: "Convert a temporal financial question into a time-aware openCypher query. Handle time ranges, temporal relationships, historical comparisons, and event sequences with proper date filtering.",
    outputs: &[
        FieldSpec {
            name: "cypher_query",
            desc: "Time-aware openCypher query with proper temporal filtering",
        },
        FieldSpec {
            name: "temporal_reasoning",
            desc: "Explanation of the temporal logic and filtering approach",
        },
    ],
};

/// Static keyword list — zero allocation
const TEMPORAL_KEYWORDS: &[&str] = &[
    // Generic time words
    "when", "time", "date", "year", "month", "quarter",
    // Range markers
    "since", "before", "after", "during", "between", "until",
    // Recency
    "recent", "latest", "last", "past", "current",
    // Concrete years
    "2020", "2021", "2022", "2023", "2024", "2025",
];

pub struct CypherTranslator {
    inference: Arc<dyn InferencePort>,
    schema: SchemaContext,
}

impl CypherTranslator {
    pub fn new(inference: Arc<dyn InferencePort>, schema: SchemaContext) -> Self {
        Self { inference, schema }
    }

    /// Translate one question. Failures are embedded in the result record
    /// so callers always get the timing and the original question back.
    pub async fn translate(&self, question: &str) -> CypherGenResult {
        let start = Instant::now();

        let temporal = is_temporal_query(question);
        let query_kind = if temporal {
            QueryKind::Temporal
        } else {
            QueryKind::Standard
        };
        let time_context = temporal.then(|| extract_time_context(question));

        debug!(?query_kind, "Generating Cypher query");

        let outcome = if temporal {
            self.inference
                .infer(
                    &TEMPORAL_CYPHER_TASK,
                    &[
                        ("natural_query", question.to_string()),
                        ("time_context", time_context.clone().unwrap_or_default()),
                        ("schema_context", self.schema.as_str().to_string()),
                    ],
                )
                .await
                .and_then(|outputs| {
                    Ok((
                        outputs.require("cypher_query")?.to_string(),
                        outputs.get("temporal_reasoning").unwrap_or("").to_string(),
                    ))
                })
        } else {
            self.inference
                .infer(
                    &CYPHER_TASK,
                    &[
                        ("natural_query", question.to_string()),
                        ("schema_context", self.schema.as_str().to_string()),
                    ],
                )
                .await
                .and_then(|outputs| {
                    Ok((
                        outputs.require("cypher_query")?.to_string(),
                        outputs.get("reasoning").unwrap_or("").to_string(),
                    ))
                })
        };

        match outcome {
            Ok((cypher_query, reasoning)) => CypherGenResult {
                query: question.to_string(),
                cypher_query,
                reasoning,
                query_kind,
                time_context,
                execution_time: start.elapsed().as_secs_f64(),
                error: None,
            },
            Err(e) => {
                warn!(error = %e, "Cypher generation failed");
                CypherGenResult {
                    query: question.to_string(),
                    cypher_query: String::new(),
                    reasoning: format!("Error during Cypher generation: {}", e),
                    query_kind,
                    time_context,
                    execution_time: start.elapsed().as_secs_f64(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn is_temporal_query(question: &str) -> bool {
    let lowered = question.to_lowercase();
    TEMPORAL_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Pull rough temporal phrases out of the question for the prompt.
fn extract_time_context(question: &str) -> String {
    let lowered = question.to_lowercase();
    let mut phrases = Vec::new();

    for year in ["2020", "2021", "2022", "2023", "2024", "2025"] {
        if lowered.contains(year) {
            phrases.push(format!("year {}", year));
        }
    }
    if lowered.contains("last quarter") {
        phrases.push("last quarter".to_string());
    }
    if lowered.contains("since") {
        phrases.push("since specified date".to_string());
    }
    if lowered.contains("recent") || lowered.contains("latest") {
        phrases.push("recent/latest events".to_string());
    }

    if phrases.is_empty() {
        "general temporal context".to_string()
    } else {
        phrases.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{InferenceOutputs, MockInference};

    #[test]
    fn test_temporal_detection() {
        let temporal_cases = vec![
            "What mergers happened in 2023?",
            "Find companies with rating downgrades since 2024",
            "Show me recent regulatory fines",
        ];
        for case in temporal_cases {
            assert!(is_temporal_query(case), "expected temporal: {}", case);
        }

        assert!(!is_temporal_query(
            "Show me all companies in the financial services sector"
        ));
    }

    #[test]
    fn test_time_context_extraction() {
        let context = extract_time_context("What mergers happened in 2023?");
        assert!(context.contains("year 2023"));

        let context = extract_time_context("Anything happening during earnings season?");
        assert_eq!(context, "general temporal context");
    }

    #[tokio::test]
    async fn test_standard_translation() {
        let mock = MockInference::new();
        mock.push(Ok(InferenceOutputs::new()
            .with(
                "cypher_query",
                "MATCH (c:Company) WHERE toLower(c.sector) = 'banking' RETURN c.id, c.name",
            )
            .with("reasoning", "filter companies by sector")));

        let translator = CypherTranslator::new(Arc::new(mock), SchemaContext::default());
        let result = translator
            .translate("Show me all companies in the banking sector")
            .await;

        assert!(result.error.is_none());
        assert_eq!(result.query_kind, QueryKind::Standard);
        assert!(result.time_context.is_none());
        assert!(result.cypher_query.contains("banking"));
    }

    #[tokio::test]
    async fn test_temporal_translation_carries_time_context() {
        let mock = MockInference::new();
        mock.push(Ok(InferenceOutputs::new()
            .with(
                "cypher_query",
                "MATCH (c:Company)-[:PARTICIPATES_IN]->(t:Transaction) WHERE t.announced_date >= '2023-01-01' RETURN c.name, t.value",
            )
            .with("temporal_reasoning", "restrict transactions to 2023")));

        let translator = CypherTranslator::new(Arc::new(mock), SchemaContext::default());
        let result = translator.translate("What mergers happened in 2023?").await;

        assert_eq!(result.query_kind, QueryKind::Temporal);
        assert_eq!(result.time_context.as_deref(), Some("year 2023"));
        assert!(result.reasoning.contains("2023"));
    }

    #[tokio::test]
    async fn test_failure_is_embedded_in_result() {
        // Empty script: the inference call fails.
        let translator =
            CypherTranslator::new(Arc::new(MockInference::new()), SchemaContext::default());
        let result = translator.translate("Show me all companies").await;

        assert!(result.error.is_some());
        assert!(result.cypher_query.is_empty());
        assert_eq!(result.query, "Show me all companies");
    }
}
