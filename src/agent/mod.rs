//! Multi-hop retrieval orchestrator
//!
//! QUESTION → PLAN → EXECUTE HOPS → ACCUMULATE → ANALYZE → RESULT
//!
//! Every call returns a fully-formed RetrievalResult: planning failures,
//! per-hop failures, and analysis failures all land in structured fields
//! rather than propagating to the caller. One call owns its plan, hop
//! records, and accumulated sets — nothing survives across calls.

use crate::accumulator::ResultAccumulator;
use crate::analyzer::ResultAnalyzer;
use crate::error::AgentError;
use crate::executor::StepExecutor;
use crate::graph::GraphQueryPort;
use crate::inference::InferencePort;
use crate::models::RetrievalResult;
use crate::planner::HopPlanner;
use crate::schema::SchemaContext;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct MultiHopAgent {
    planner: HopPlanner,
    executor: StepExecutor,
    analyzer: ResultAnalyzer,
    default_max_hops: usize,
}

impl MultiHopAgent {
    pub fn new(
        inference: Arc<dyn InferencePort>,
        graph: Arc<dyn GraphQueryPort>,
        schema: SchemaContext,
        default_max_hops: usize,
    ) -> Self {
        Self {
            planner: HopPlanner::new(inference.clone(), schema.clone()),
            executor: StepExecutor::new(inference.clone(), graph, schema),
            analyzer: ResultAnalyzer::new(inference),
            default_max_hops,
        }
    }

    /// Run one multi-hop retrieval. `max_hops` bounds how many plan steps
    /// execute — steps beyond it are discarded, not deferred. `None` uses
    /// the configured default; zero is clamped to one.
    pub async fn run(&self, question: &str, max_hops: Option<usize>) -> RetrievalResult {
        let started = Instant::now();
        let run_id = Uuid::new_v4();
        let max_hops = max_hops.unwrap_or(self.default_max_hops).max(1);

        info!(%run_id, question, max_hops, "Multi-hop retrieval starting");

        let mut narrative: Vec<String> = Vec::new();

        // === PLAN ===
        let plan = match self.planner.build_plan(question).await {
            Ok(plan) => plan,
            Err(e) => {
                warn!(%run_id, error = %e, "Planning failed; no steps executed");
                return failed_result(run_id, question, started, e);
            }
        };

        debug!(
            %run_id,
            steps = plan.steps.len(),
            elapsed = ?started.elapsed(),
            "Planning complete"
        );

        if !plan.strategy.is_empty() {
            narrative.push(format!("Strategy: {}", plan.strategy));
        }
        if plan.steps.len() > max_hops {
            debug!(
                %run_id,
                discarded = plan.steps.len() - max_hops,
                "Plan longer than max_hops; extra steps discarded"
            );
        }

        // === EXECUTE ===
        let mut accumulator = ResultAccumulator::new();
        let mut hops = Vec::new();
        let mut cypher_queries = Vec::new();

        for step in plan.steps.iter().take(max_hops) {
            let outcome = self.executor.execute_step(step, &accumulator).await;

            if !outcome.hop.cypher_query.is_empty() {
                cypher_queries.push(outcome.hop.cypher_query.clone());
            }
            narrative.push(match &outcome.hop.error {
                Some(err) => format!("Hop {} failed: {}", outcome.hop.step_number, err),
                None => format!(
                    "Hop {} ({}): {} entities, {} relationships",
                    outcome.hop.step_number,
                    outcome.hop.description,
                    outcome.hop.entities_found,
                    outcome.hop.relationships_found
                ),
            });

            accumulator.absorb(outcome.results);
            hops.push(outcome.hop);
        }

        debug!(
            %run_id,
            hops = hops.len(),
            elapsed = ?started.elapsed(),
            "Execution complete"
        );

        // === ANALYZE ===
        let (final_nodes, final_edges) = accumulator.finish();

        let (analysis, error) = match self
            .analyzer
            .analyze(question, &final_nodes, &final_edges)
            .await
        {
            Ok(report) => {
                narrative.push(format!("Answer ({}): {}", report.completeness, report.answer));
                (Some(report), None)
            }
            Err(e) => {
                warn!(%run_id, error = %e, "Analysis failed; returning partial result");
                (None, Some(e.to_string()))
            }
        };

        debug!(%run_id, elapsed = ?started.elapsed(), "Analysis complete");
        info!(
            %run_id,
            nodes = final_nodes.len(),
            edges = final_edges.len(),
            "Multi-hop retrieval finished"
        );

        RetrievalResult {
            run_id,
            query: question.to_string(),
            reasoning: narrative.join("\n"),
            hops,
            final_nodes,
            final_edges,
            cypher_queries,
            analysis,
            execution_time: started.elapsed().as_secs_f64(),
            created_at: Utc::now(),
            error,
        }
    }
}

/// Terminal result for a run that died during planning: zero hops, empty
/// sets, error populated.
fn failed_result(
    run_id: Uuid,
    question: &str,
    started: Instant,
    error: AgentError,
) -> RetrievalResult {
    RetrievalResult {
        run_id,
        query: question.to_string(),
        reasoning: "Planning failed before any retrieval step was executed.".to_string(),
        hops: Vec::new(),
        final_nodes: Vec::new(),
        final_edges: Vec::new(),
        cypher_queries: Vec::new(),
        analysis: None,
        execution_time: started.elapsed().as_secs_f64(),
        created_at: Utc::now(),
        error: Some(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MockGraphBackend;
    use crate::inference::{InferenceOutputs, MockInference};
    use crate::models::{Completeness, Entity, GraphResultSet, Relationship};
    use std::collections::HashMap;

    fn entity(id: &str, label: &str, name: &str) -> Entity {
        let mut properties = HashMap::new();
        properties.insert(
            "name".to_string(),
            serde_json::Value::String(name.to_string()),
        );
        Entity {
            id: id.to_string(),
            label: label.to_string(),
            properties,
        }
    }

    fn employment_edge(id: &str, person: &str, company: &str) -> Relationship {
        Relationship {
            id: id.to_string(),
            from_id: person.to_string(),
            to_id: company.to_string(),
            label: "EMPLOYED_BY".to_string(),
            properties: HashMap::new(),
        }
    }

    fn plan_response(steps: &str) -> InferenceOutputs {
        InferenceOutputs::new()
            .with("strategy", "companies first, then their executives")
            .with("steps", steps)
    }

    fn hop_response(cypher: &str) -> InferenceOutputs {
        InferenceOutputs::new()
            .with("cypher_query", cypher)
            .with("reasoning", "maps directly onto the schema")
    }

    fn analysis_response(completeness: &str) -> InferenceOutputs {
        InferenceOutputs::new()
            .with("answer", "Acme Corp employs Jane Doe as chief executive.")
            .with("completeness", completeness)
            .with("missing_info", "")
    }

    const TWO_STEP_PLAN: &str = r#"[
        {"step_number": 1, "description": "find companies", "expected_entities": ["Company"]},
        {"step_number": 2, "description": "find executives via employment relationship", "expected_entities": ["Person"]}
    ]"#;

    fn agent(inference: MockInference, graph: Arc<MockGraphBackend>) -> MultiHopAgent {
        MultiHopAgent::new(Arc::new(inference), graph, SchemaContext::default(), 3)
    }

    #[tokio::test]
    async fn test_two_hop_scenario_accumulates_and_deduplicates() {
        let inference = MockInference::new();
        inference.push(Ok(plan_response(TWO_STEP_PLAN)));
        inference.push(Ok(hop_response("MATCH (c:Company) RETURN c.id, c.name")));
        inference.push(Ok(hop_response(
            "MATCH (p:Person)-[e:EMPLOYED_BY]->(c:Company) RETURN p.id, p.name",
        )));
        inference.push(Ok(analysis_response("complete")));

        let graph = Arc::new(MockGraphBackend::new());
        graph.push(Ok(GraphResultSet {
            entities: vec![entity("c1", "Company", "Acme Corp")],
            relationships: vec![],
        }));
        graph.push(Ok(GraphResultSet {
            entities: vec![entity("p1", "Person", "Jane Doe")],
            relationships: vec![employment_edge("e1", "p1", "c1")],
        }));

        let result = agent(inference, graph)
            .run("Find companies and their executives", None)
            .await;

        assert!(result.error.is_none());
        assert_eq!(result.hops.len(), 2);
        assert!(result.hops.iter().all(|h| h.error.is_none()));
        assert_eq!(result.final_nodes.len(), 2);
        assert_eq!(result.final_edges.len(), 1);
        assert_eq!(result.cypher_queries.len(), 2);
        assert_eq!(
            result.analysis.as_ref().unwrap().completeness,
            Completeness::Complete
        );
        assert!(result.execution_time >= 0.0);
    }

    #[tokio::test]
    async fn test_failing_hop_does_not_stop_later_hops() {
        let inference = MockInference::new();
        inference.push(Ok(plan_response(TWO_STEP_PLAN)));
        inference.push(Ok(hop_response("MATCH (c:Company) RETURN c.id")));
        inference.push(Ok(hop_response("MATCH (p:Person) RETURN p.id, p.name")));
        inference.push(Ok(analysis_response("partial")));

        let graph = Arc::new(MockGraphBackend::new());
        graph.push(Err(AgentError::GraphBackend("timeout".to_string())));
        graph.push(Ok(GraphResultSet {
            entities: vec![entity("p1", "Person", "Jane Doe")],
            relationships: vec![],
        }));

        let result = agent(inference, graph)
            .run("Find companies and their executives", None)
            .await;

        assert_eq!(result.hops.len(), 2);
        assert!(result.hops[0].error.is_some());
        assert_eq!(result.hops[0].entities_found, 0);
        assert_eq!(result.hops[0].relationships_found, 0);
        assert!(result.hops[1].error.is_none());
        assert_eq!(result.final_nodes.len(), 1);
        assert_eq!(
            result.analysis.as_ref().unwrap().completeness,
            Completeness::Partial
        );
    }

    #[tokio::test]
    async fn test_plan_parse_failure_executes_nothing() {
        let inference = MockInference::new();
        inference.push(Ok(InferenceOutputs::new()
            .with("strategy", "???")
            .with("steps", "these are not your steps")));

        let graph = Arc::new(MockGraphBackend::new());
        let result = agent(inference, graph.clone())
            .run("Find companies and their executives", None)
            .await;

        assert!(result.error.is_some());
        assert!(result.hops.is_empty());
        assert!(result.final_nodes.is_empty());
        assert!(result.cypher_queries.is_empty());
        assert_eq!(graph.calls(), 0);
    }

    #[tokio::test]
    async fn test_max_hops_truncates_long_plan() {
        let inference = MockInference::new();
        inference.push(Ok(plan_response(
            r#"[
                {"step_number": 1, "description": "first"},
                {"step_number": 2, "description": "second"},
                {"step_number": 3, "description": "third"}
            ]"#,
        )));
        inference.push(Ok(hop_response("MATCH (c:Company) RETURN c.id")));
        inference.push(Ok(analysis_response("partial")));

        let graph = Arc::new(MockGraphBackend::new());
        graph.push(Ok(GraphResultSet {
            entities: vec![entity("c1", "Company", "Acme Corp")],
            relationships: vec![],
        }));

        let result = agent(inference, graph.clone())
            .run("Find companies", Some(1))
            .await;

        assert_eq!(result.hops.len(), 1);
        assert_eq!(result.cypher_queries.len(), 1);
        assert_eq!(graph.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_list_plan_payload_runs_zero_hops_without_error() {
        let inference = MockInference::new();
        inference.push(Ok(InferenceOutputs::new()
            .with("strategy", "nothing to decompose")
            .with("steps", r#"{"note": "not a list"}"#)));
        // No further script entries: analysis of empty evidence must not
        // touch the inference port.

        let graph = Arc::new(MockGraphBackend::new());
        let result = agent(inference, graph.clone()).run("Find companies", None).await;

        assert!(result.error.is_none());
        assert!(result.hops.is_empty());
        assert_eq!(graph.calls(), 0);
        let analysis = result.analysis.unwrap();
        assert_eq!(analysis.completeness, Completeness::Incomplete);
        assert!(!analysis.missing_info.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_entities_merge_but_edges_repeat() {
        let inference = MockInference::new();
        inference.push(Ok(plan_response(TWO_STEP_PLAN)));
        inference.push(Ok(hop_response("MATCH (c:Company) RETURN c.id")));
        inference.push(Ok(hop_response("MATCH (c:Company) RETURN c.id")));
        inference.push(Ok(analysis_response("complete")));

        let rediscovered = GraphResultSet {
            entities: vec![entity("c1", "Company", "Acme Corp")],
            relationships: vec![employment_edge("e1", "p1", "c1")],
        };
        let graph = Arc::new(MockGraphBackend::new());
        graph.push(Ok(rediscovered.clone()));
        graph.push(Ok(rediscovered));

        let result = agent(inference, graph).run("Find companies", None).await;

        assert_eq!(result.final_nodes.len(), 1);
        assert_eq!(result.final_edges.len(), 2);
    }

    #[tokio::test]
    async fn test_analysis_failure_keeps_partial_data() {
        let inference = MockInference::new();
        inference.push(Ok(plan_response(
            r#"[{"step_number": 1, "description": "find companies"}]"#,
        )));
        inference.push(Ok(hop_response("MATCH (c:Company) RETURN c.id")));
        // Script exhausted before analysis: the analyze call fails.

        let graph = Arc::new(MockGraphBackend::new());
        graph.push(Ok(GraphResultSet {
            entities: vec![entity("c1", "Company", "Acme Corp")],
            relationships: vec![],
        }));

        let result = agent(inference, graph).run("Find companies", None).await;

        assert!(result.error.is_some());
        assert!(result.analysis.is_none());
        assert_eq!(result.hops.len(), 1);
        assert_eq!(result.final_nodes.len(), 1);
    }
}
