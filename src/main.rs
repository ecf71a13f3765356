use anyhow::{Context, Result};
use chem_agent::agent::{Agent, Runner, tools};
use chem_agent::chem;
use chem_agent::config::Config;
use chem_agent::llm::LlmClient;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "chem-agent",
    about = "Cheminformatics assistant: an LLM agent with SMILES, molecular weight and logP tools"
)]
struct Cli {
    /// API key for the model endpoint [default: $OPENAI_API_KEY, then "ollama"]
    #[arg(long, alias = "api_key")]
    api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API [default: http://localhost:11434/v1]
    #[arg(long, alias = "base_url")]
    base_url: Option<String>,

    /// Model id [default: gpt-oss:20b]
    #[arg(long)]
    model: Option<String>,

    /// Path to config file (optional)
    #[arg(short, long, default_value = "chem-agent.toml")]
    config: PathBuf,

    /// Query to run. Repeat for several; defaults to the built-in queries
    #[arg(short, long = "query")]
    queries: Vec<String>,

    /// Maximum model calls per query [default: 10]
    #[arg(long)]
    max_turns: Option<u32>,

    /// Verify the model is served by the endpoint before running queries
    #[arg(long)]
    check_model: bool,

    /// Run the tools locally on one SMILES string, without a model
    #[arg(long, value_name = "SMILES")]
    describe: Option<String>,
}

impl Cli {
    /// CLI flags win over the config file and the environment.
    fn apply(self, config: &mut Config) {
        config.llm.api_key_override = self.api_key;
        if let Some(url) = self.base_url {
            config.llm.base_url = url;
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(max_turns) = self.max_turns {
            config.agent.max_turns = max_turns;
        }
        if !self.queries.is_empty() {
            config.queries = self.queries;
        }
    }
}

fn describe(smiles: &str) {
    let outcomes: [tools::ToolOutcome; 3] = [
        Ok::<_, tools::ToolError>(tools::validate_smiles(smiles)).into(),
        tools::calculate_molecular_weight(smiles).into(),
        tools::calculate_logp(smiles).into(),
    ];
    for outcome in &outcomes {
        println!("{}", outcome.content);
    }
    if let Ok(mol) = chem::parse(smiles) {
        println!("Formula: {}", chem::molecular_formula(&mol));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("chem_agent=info")),
        )
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Some(smiles) = &cli.describe {
        describe(smiles);
        return Ok(());
    }

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let check_model = cli.check_model;
    cli.apply(&mut config);
    config.validate()?;

    let client = LlmClient::from_config(&config.llm)?;
    info!(model = %client.model(), base_url = %client.base_url(), "using model endpoint");
    if check_model {
        client.ensure_model_available().await?;
    }

    let agent = Agent::from_config(&config.agent, client);
    for query in &config.queries {
        let result = Runner::run(&agent, query, config.agent.max_turns)
            .await
            .with_context(|| format!("query failed: {query}"))?;
        println!("Query: {query}");
        println!("Result: {}", result.final_output);
        println!();
    }

    Ok(())
}
