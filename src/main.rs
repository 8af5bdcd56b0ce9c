//! tool-agent CLI entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tool_agent::agent::{callback::TracingCallback, strategy::Strategy, traits::AgentRunner, types::Agent};
use tool_agent::config::{Provider, Secrets, Settings, OPENAI_API_KEY};
use tool_agent::llm::{
    huggingface::{self, HuggingFaceEndpoint},
    ollama::{self, ModelOptions, Ollama},
    openai::{self, CompletionOptions, OpenAI},
    traits::LLM,
};
use tool_agent::tools::{builtin::TOOL_NAMES, load_tools};

#[derive(Parser)]
#[command(name = "tool-agent", version, about = "Ask questions to an LLM agent that can call tools")]
struct Cli {
    /// Settings file (TOML).
    #[arg(short, long, global = true, default_value = "tool-agent.toml")]
    config: PathBuf,

    /// dotenv file holding OPENAI_API_KEY / HUGGINGFACEHUB_API_TOKEN.
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a research question.
    Ask {
        question: String,

        /// Comma-separated tool names; overrides the settings file.
        #[arg(long, value_delimiter = ',')]
        tools: Option<Vec<String>>,

        /// `zero-shot-react` or `plan-and-solve`.
        #[arg(long)]
        strategy: Option<Strategy>,

        #[arg(long)]
        provider: Option<Provider>,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// List the built-in tools.
    Tools,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tool_agent={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut settings = Settings::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // Export secrets before the runtime starts any worker threads.
    let secrets = Secrets::from_env_file(&cli.env_file)
        .with_context(|| format!("reading {}", cli.env_file.display()))?;
    let exported = secrets.apply();
    tracing::debug!("exported secrets: {:?}", exported);

    match cli.command {
        Commands::Tools => {
            let tools = load_tools(&TOOL_NAMES, &settings.tools)?;
            for tool in tools {
                println!("{:<12} {}", tool.name(), tool.description());
            }
            Ok(())
        }
        Commands::Ask { question, tools, strategy, provider, model, max_iterations } => {
            if let Some(tools) = tools {
                settings.agent.tools = tools;
            }
            if let Some(strategy) = strategy {
                settings.agent.strategy = strategy.to_string();
            }
            if let Some(provider) = provider {
                settings.llm.provider = provider;
            }
            if model.is_some() {
                settings.llm.model = model;
            }
            if let Some(max) = max_iterations {
                settings.agent.max_iterations = max;
            }
            settings.validate()?;

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(ask(&question, &settings, &secrets))
        }
    }
}

fn build_llm(settings: &Settings, secrets: &Secrets) -> Result<Arc<dyn LLM>> {
    let llm = &settings.llm;
    let model: Arc<dyn LLM> = match llm.provider {
        Provider::OpenAI => {
            let Some(key) = secrets.openai_api_key() else {
                bail!("{} is not set (add it to your env file)", OPENAI_API_KEY);
            };
            Arc::new(OpenAI::with_api_key(key).with_options(CompletionOptions {
                model: llm.model.clone().unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
                max_tokens: llm.max_tokens,
                temperature: llm.temperature,
                user: None,
            }))
        }
        Provider::Ollama => {
            let mut ollama = Ollama::default()
                .with_model(llm.model.clone().unwrap_or_else(|| ollama::DEFAULT_MODEL.to_string()));
            if let Some(t) = llm.temperature {
                ollama = ollama.with_options(ModelOptions::default().temperature(t));
            }
            Arc::new(ollama)
        }
        Provider::HuggingFace => {
            let repo = llm.model.clone().unwrap_or_else(|| huggingface::DEFAULT_REPO_ID.to_string());
            let mut endpoint = HuggingFaceEndpoint::new(repo);
            if let Some(token) = secrets.huggingface_token() {
                endpoint = endpoint.with_token(token);
            }
            if let Some(max) = llm.max_tokens {
                endpoint = endpoint.with_max_new_tokens(max);
            }
            if let Some(t) = llm.temperature {
                endpoint = endpoint.with_temperature(t);
            }
            Arc::new(endpoint)
        }
    };
    Ok(model)
}

async fn ask(question: &str, settings: &Settings, secrets: &Secrets) -> Result<()> {
    let llm = build_llm(settings, secrets)?;
    let tools = load_tools(&settings.agent.tools, &settings.tools)?;

    let mut agent = Agent::new(
        format!("{}-agent", settings.llm.provider),
        llm,
        Some(settings.agent.max_iterations),
    )
    .with_strategy(settings.strategy()?)
    .with_callback(Arc::new(TracingCallback));
    agent.register_tools(tools)?;
    if let Some(prompt) = &settings.agent.system_prompt {
        agent.set_system_prompt(prompt.clone());
    }

    let result = agent.call_llm(question).await?;
    for step in &result.steps {
        println!("> {}({})", step.tool, step.args);
    }
    println!("{}", result.generation);
    eprintln!(
        "[{} iteration(s), tokens: prompt={} completion={} total={}]",
        result.iterations,
        result.tokens.prompt_tokens,
        result.tokens.completion_tokens,
        result.tokens.total_tokens
    );
    Ok(())
}
