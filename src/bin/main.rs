use financial_graph_agent::{
    agent::MultiHopAgent,
    graph::MockGraphBackend,
    inference::{InferenceOutputs, MockInference},
    models::{Entity, GraphResultSet, Relationship},
    schema::SchemaContext,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("Financial Graph Agent - demo run");

    // Scripted ports keep the demo runnable without credentials or a live
    // graph backend.
    let inference = MockInference::new();
    inference.push(Ok(InferenceOutputs::new()
        .with(
            "strategy",
            "Find the companies first, then walk employment edges to their executives.",
        )
        .with(
            "steps",
            r#"[
                {"step_number": 1, "description": "Find technology companies", "cypher_hint": "MATCH (c:Company)", "expected_entities": ["Company"]},
                {"step_number": 2, "description": "Find executives employed by those companies", "cypher_hint": "MATCH (p:Person)-[:EMPLOYED_BY]->(c:Company)", "expected_entities": ["Person"]}
            ]"#,
        )));
    inference.push(Ok(InferenceOutputs::new()
        .with(
            "cypher_query",
            "MATCH (c:Company) WHERE toLower(c.sector) = 'technology' RETURN c.id, c.name, c.sector",
        )
        .with("reasoning", "Company nodes filtered by sector.")));
    inference.push(Ok(InferenceOutputs::new()
        .with(
            "cypher_query",
            "MATCH (p:Person)-[e:EMPLOYED_BY]->(c:Company {id: 'c1'}) RETURN p.id, p.name, e.position",
        )
        .with("reasoning", "Walk employment edges from the company found in step 1.")));
    inference.push(Ok(InferenceOutputs::new()
        .with("answer", "Acme Corp's chief executive is Jane Doe.")
        .with("completeness", "complete")
        .with("missing_info", "")));

    let graph = MockGraphBackend::new();
    graph.push(Ok(GraphResultSet {
        entities: vec![Entity {
            id: "c1".to_string(),
            label: "Company".to_string(),
            properties: props(&[("name", "Acme Corp"), ("sector", "Technology")]),
        }],
        relationships: vec![],
    }));
    graph.push(Ok(GraphResultSet {
        entities: vec![Entity {
            id: "p1".to_string(),
            label: "Person".to_string(),
            properties: props(&[("name", "Jane Doe"), ("title", "CEO")]),
        }],
        relationships: vec![Relationship {
            id: "e1".to_string(),
            from_id: "p1".to_string(),
            to_id: "c1".to_string(),
            label: "EMPLOYED_BY".to_string(),
            properties: HashMap::new(),
        }],
    }));

    let agent = MultiHopAgent::new(
        Arc::new(inference),
        Arc::new(graph),
        SchemaContext::default(),
        3,
    );

    info!("Running multi-hop retrieval");

    let result = agent
        .run("Find technology companies and their executives", None)
        .await;

    println!("\n=== RETRIEVAL RESULT ===");
    println!("Run ID: {}", result.run_id);
    println!("Hops executed: {}", result.hops.len());
    println!(
        "Entities: {} | Relationships: {}",
        result.final_nodes.len(),
        result.final_edges.len()
    );
    println!("Execution time: {:.3}s", result.execution_time);
    if let Some(analysis) = &result.analysis {
        println!("Completeness: {}", analysis.completeness);
        println!("Answer: {}", analysis.answer);
    }
    if let Some(error) = &result.error {
        println!("Error: {}", error);
    }
    println!("\nReasoning:");
    for line in result.reasoning.lines() {
        println!("  {}", line);
    }

    Ok(())
}

fn props(pairs: &[(&str, &str)]) -> HashMap<String, serde_json::Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        .collect()
}
