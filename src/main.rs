//! # ragdiff CLI
//!
//! Command-line interface for the comparison harness, with subcommands for
//! each stage of the benchmark:
//!
//! - `lightrag`: run the question set through a LightRAG API server
//! - `graphrag`: run the question set through the GraphRAG CLI
//! - `compare`: run both engines and write a combined results file
//! - `load-graph`: bulk-load GraphRAG output tables into Neo4j

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ragdiff::graph_store::GraphStore;
use ragdiff::graphrag::GraphRagRunner;
use ragdiff::lightrag::LightRagRunner;
use ragdiff::questions::QUESTIONS;
use ragdiff::report::{self, CompareResults};

#[derive(Parser)]
#[command(author, version, about = "Compare LightRAG and GraphRAG retrieval over a fixed question set", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the question set through a LightRAG API server
    Lightrag(LightragArgs),

    /// Run the question set through the GraphRAG CLI
    Graphrag(GraphragArgs),

    /// Run both engines and write a combined comparison file
    Compare(CompareArgs),

    /// Load GraphRAG output tables into Neo4j
    LoadGraph(LoadGraphArgs),
}

#[derive(Args, Debug)]
struct LightragArgs {
    /// Base URL of the LightRAG API server
    #[arg(long, env = "LIGHTRAG_URL", default_value = "http://localhost:9621")]
    url: String,

    /// Directory results are written to
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,
}

#[derive(Args, Debug)]
struct GraphragArgs {
    /// Root of the indexed GraphRAG project
    #[arg(long, default_value = "microsoft-graphrag")]
    root: PathBuf,

    /// GraphRAG CLI program to invoke
    #[arg(long, default_value = "graphrag")]
    program: String,

    /// Directory results are written to
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Base URL of the LightRAG API server
    #[arg(long, env = "LIGHTRAG_URL", default_value = "http://localhost:9621")]
    url: String,

    /// Root of the indexed GraphRAG project
    #[arg(long, default_value = "microsoft-graphrag")]
    root: PathBuf,

    /// GraphRAG CLI program to invoke
    #[arg(long, default_value = "graphrag")]
    program: String,

    /// Directory results are written to
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,
}

#[derive(Args, Debug)]
struct LoadGraphArgs {
    /// GraphRAG output directory containing the exported CSV tables
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Neo4j connection URI
    #[arg(long, env = "NEO4J_URI", default_value = "bolt://localhost:7687")]
    uri: String,

    /// Neo4j user
    #[arg(long, env = "NEO4J_USER", default_value = "neo4j")]
    user: String,

    /// Neo4j password
    #[arg(long, env = "NEO4J_PASSWORD")]
    password: String,

    /// Delete all existing graph data before loading
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lightrag(args) => lightrag_command(args).await?,
        Commands::Graphrag(args) => graphrag_command(args).await?,
        Commands::Compare(args) => compare_command(args).await?,
        Commands::LoadGraph(args) => load_graph_command(args).await?,
    }

    Ok(())
}

async fn lightrag_command(args: LightragArgs) -> anyhow::Result<()> {
    let runner = LightRagRunner::new(args.url);
    let results = runner.run(&QUESTIONS).await;

    report::save_json(&args.results_dir, "lightrag_results.json", &results)?;
    report::log_summary("lightrag", &results);
    Ok(())
}

async fn graphrag_command(args: GraphragArgs) -> anyhow::Result<()> {
    let runner = GraphRagRunner::new(args.root).with_program(args.program);
    let results = runner.run(&QUESTIONS).await;

    report::save_json(&args.results_dir, "graphrag_results.json", &results)?;
    report::log_summary("graphrag", &results);
    Ok(())
}

async fn compare_command(args: CompareArgs) -> anyhow::Result<()> {
    info!("Comparing GraphRAG and LightRAG over {} questions", QUESTIONS.len());

    let lightrag = LightRagRunner::new(args.url).run(&QUESTIONS).await;
    let graphrag = GraphRagRunner::new(args.root)
        .with_program(args.program)
        .run(&QUESTIONS)
        .await;

    let results = CompareResults { lightrag, graphrag };
    let file_name = report::timestamped_name("compare_results");
    report::save_json(&args.results_dir, &file_name, &results)?;

    report::log_summary("lightrag", &results.lightrag);
    report::log_summary("graphrag", &results.graphrag);
    Ok(())
}

async fn load_graph_command(args: LoadGraphArgs) -> anyhow::Result<()> {
    let store = GraphStore::new(&args.uri, &args.user, &args.password).await?;

    if args.clear {
        store.clear().await?;
    }

    let summary = store.load_all(&args.output_dir).await?;
    info!(
        entities = summary.entities,
        relationships = summary.relationships,
        communities = summary.communities,
        "graph load complete"
    );
    Ok(())
}
