//! Benchmark binary.
//!
//! Takes no arguments: connects to the three local backends, runs one
//! benchmark pass, and prints three millisecond durations to stdout in the
//! order graph (Neo4j), relational (MySQL), document-graph (ArangoDB).

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use treebench::{
    ArangoAdapter, ArangoConfig, BenchmarkRunner, MySqlAdapter, MySqlConfig, Neo4jAdapter,
    Neo4jConfig, StorageAdapter,
};

/// Depth of the generated tree and of the benchmark query.
const TREE_DEPTH: u32 = 2;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "treebench=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut adapters: Vec<Box<dyn StorageAdapter>> = vec![
        Box::new(Neo4jAdapter::new(Neo4jConfig::default())),
        Box::new(MySqlAdapter::new(MySqlConfig::default())),
        Box::new(ArangoAdapter::new(ArangoConfig::default())),
    ];

    for adapter in &mut adapters {
        tracing::info!(backend = adapter.name(), "connecting");
        adapter.init().await?;
        tracing::info!(backend = adapter.name(), "initialized");
    }

    let mut runner = BenchmarkRunner::new(adapters, TREE_DEPTH);
    let mut rng = StdRng::from_entropy();
    let results = runner.run(&mut rng).await?;

    for result in &results {
        println!("{}", result.elapsed.as_millis());
    }

    Ok(())
}
