use tool_agent::{
    tool,
    llm::ollama::Ollama,
    agent::{
        types::Agent,
        traits::AgentRunner,
        strategy::Strategy,
    },
    tools::builtin::CalculatorTool,
};
use std::sync::Arc;

// Use the proc-macro attribute to generate the Tool implementation
#[tool(
    name = "get_weather",
    description = "Get weather for a given city",
    params(city = "City name, e.g. 'San Francisco'")
)]
fn get_weather(city: String) -> String {
    format!("It's always sunny in {}!", city)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Adjust model name to one available in your Ollama server.
    let ollama = Ollama::default().with_model("qwen3:8b");
    let llm: Arc<dyn tool_agent::llm::traits::LLM> = Arc::new(ollama);

    let mut agent = Agent::new("ollama-qwen3", llm, Some(5)).with_strategy(Strategy::ZeroShotReact);
    agent
        .register_tool(None, Arc::new(GetWeatherTool))?
        .register_tool(None, Arc::new(CalculatorTool::default().with_error_handling(true)))?;

    agent.set_system_prompt("You are a weather assistant. Use the tools or answer directly.");

    // Should make the model request the `get_weather` tool.
    let prompt = "What's the weather in Beijing?";

    match agent.call_llm(prompt).await {
        Ok(res) => {
            for step in &res.steps {
                println!("tool {} -> {}", step.tool, step.observation);
            }
            println!("generation: {}", res.generation);
        }
        Err(e) => eprintln!("agent error: {}", e),
    }
    Ok(())
}
