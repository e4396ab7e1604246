use financial_graph_agent::{
    agent::MultiHopAgent,
    api::{start_server, ApiState},
    config::AgentConfig,
    extraction::EntityExtractor,
    graph::{GraphQueryPort, HttpGraphClient},
    inference::{InferencePort, OpenRouterClient},
    schema::SchemaContext,
    translator::CypherTranslator,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = AgentConfig::from_env()?;

    let port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;

    info!("Financial Graph Agent - API Server");
    info!("Port: {}", port);
    info!("Model: {}", config.model);
    info!("Graph backend: {}", config.graph_base_url);

    // Create components
    let inference: Arc<dyn InferencePort> = Arc::new(OpenRouterClient::new(&config));
    let graph: Arc<dyn GraphQueryPort> = Arc::new(HttpGraphClient::new(&config.graph_base_url));
    let schema = SchemaContext::default();

    let state = ApiState {
        agent: Arc::new(MultiHopAgent::new(
            inference.clone(),
            graph.clone(),
            schema.clone(),
            config.default_max_hops,
        )),
        translator: Arc::new(CypherTranslator::new(inference.clone(), schema.clone())),
        extractor: Arc::new(EntityExtractor::new(inference, schema)),
        graph,
    };

    info!("Agent initialized");
    info!("Starting API server...");

    start_server(state, port).await
}
