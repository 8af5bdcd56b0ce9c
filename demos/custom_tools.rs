//! The three ways to define a tool, driven by a scripted model so it runs offline.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tool_agent::prelude::*;
use tool_agent::llm::fake::FakeLLM;

// 1. attribute on a function
#[tool(
    description = "Look up things online.",
    params(query = "should be a search query"),
    return_direct = true
)]
fn search(query: String) -> String {
    format!("LangChain: {}", query)
}

// 2. a dedicated type
struct CustomSearchTool;

#[async_trait::async_trait]
impl Tool for CustomSearchTool {
    fn name(&self) -> &str {
        "custom_search"
    }

    fn description(&self) -> &str {
        "useful for when you need to answer questions about current events"
    }

    fn args(&self) -> Vec<ArgSchema> {
        vec![ArgSchema::string("query", "should be a search query")]
    }

    fn handle_error(&self) -> ErrorHandling {
        ErrorHandling::Message
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let query = input["query"].as_str().unwrap_or_default();
        if query.is_empty() {
            return Err(ToolError::execution(self.name(), "The search tool1 is not available."));
        }
        Ok(format!("Results for {}", query))
    }
}

// 3. built from a closure
#[derive(Deserialize)]
struct CalculatorInput {
    a: i64,
    b: i64,
}

fn multiply_tool() -> Result<StructuredTool, ToolError> {
    StructuredTool::from_typed_fn("Calculator", "multiply numbers", |p: CalculatorInput| {
        Ok((p.a * p.b).to_string())
    })
    .arg(ArgSchema::new("a", "integer", "first number"))
    .arg(ArgSchema::new("b", "integer", "second number"))
    .build()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(SearchTool),
        Arc::new(CustomSearchTool),
        Arc::new(multiply_tool()?),
    ];
    for tool in &tools {
        let schema = tool.schema();
        println!("{} (return_direct={}): {}", schema.name, schema.return_direct, schema.description);
        println!("  args: {}", schema.parameters());
    }

    let call = |name: &str, args: Value| json!({ "tool_calls": [{ "name": name, "args": args }] }).to_string();
    let llm = Arc::new(FakeLLM::new([
        call("Calculator", json!({ "a": 2, "b": 3 })),
        call("custom_search", json!({ "query": "" })),
        "2 times 3 is 6; the news search was unavailable.".to_string(),
    ]));

    let mut agent = Agent::new("demo", llm, Some(5)).with_callback(Arc::new(TracingCallback));
    agent.register_tools(tools)?;

    let result = agent.call_llm("What is 2 times 3, and what's in the news?").await?;
    for step in &result.steps {
        println!("{}({}) -> {}", step.tool, step.args, step.observation);
    }
    println!("{}", result.generation);
    Ok(())
}
