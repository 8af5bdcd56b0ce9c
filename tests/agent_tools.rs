//! Drives the public API the way a downstream crate would.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tool_agent::agent::error::AgentError;
use tool_agent::llm::fake::FakeLLM;
use tool_agent::prelude::*;
use tool_agent::tools::builtin::CalculatorTool;

#[tool(
    name = "lookup",
    description = "Look up things online.",
    params(query = "should be a search query")
)]
fn lookup(query: String) -> Result<String, String> {
    if query.is_empty() {
        Err("The search tool1 is not available.".to_string())
    } else {
        Ok(format!("LangChain: {}", query))
    }
}

#[tool(
    description = "Reply to the user and stop.",
    params(text = "final reply"),
    return_direct = true
)]
async fn reply(text: String) -> String {
    text.to_uppercase()
}

fn call(name: &str, args: Value) -> String {
    json!({ "tool_calls": [{ "name": name, "args": args }] }).to_string()
}

#[derive(Default)]
struct Events(Mutex<Vec<String>>);

impl AgentCallback for Events {
    fn on_tool_start(&self, tool: &str, _args: &Value) {
        self.0.lock().unwrap().push(format!("start:{}", tool));
    }
    fn on_tool_error(&self, tool: &str, _error: &ToolError) {
        self.0.lock().unwrap().push(format!("error:{}", tool));
    }
    fn on_agent_finish(&self, _result: &AgentResult) {
        self.0.lock().unwrap().push("finish".to_string());
    }
}

#[tokio::test]
async fn macro_tool_is_usable_from_another_crate() {
    let schema = LookupTool.schema();
    assert_eq!(schema.name, "lookup");
    assert_eq!(schema.args, vec![ArgSchema::string("query", "should be a search query")]);
    assert_eq!(schema.parameters()["required"], json!(["query"]));

    assert_eq!(LookupTool.invoke(json!("rust")).await.unwrap(), "LangChain: rust");
    let err = LookupTool.invoke(json!({ "query": "" })).await.unwrap_err();
    assert!(matches!(
        err,
        ToolError::ExecutionError { ref name, ref reason }
            if name == "lookup" && reason == "The search tool1 is not available."
    ));
}

#[tokio::test]
async fn propagated_tool_failure_stops_the_run() {
    let llm = Arc::new(FakeLLM::new([call("lookup", json!({ "query": "" }))]));
    let events = Arc::new(Events::default());
    let mut agent = Agent::new("it", llm, Some(3)).with_callback(events.clone());
    agent.register_tool(None, Arc::new(LookupTool)).unwrap();

    let err = agent.call_llm("news?").await.unwrap_err();
    assert!(matches!(
        err,
        AgentError::ToolExecutionError(ToolError::ExecutionError { .. })
    ));
    assert_eq!(*events.0.lock().unwrap(), vec!["start:lookup", "error:lookup"]);
}

#[tokio::test]
async fn tools_chain_until_a_direct_return() {
    let llm = Arc::new(FakeLLM::new([
        call("calculator", json!({ "expression": "6 * 7" })),
        call("reply", json!({ "text": "the answer is 42" })),
        "never reached".to_string(),
    ]));
    let mut agent = Agent::new("it", llm.clone(), Some(5));
    agent
        .register_tool(None, Arc::new(CalculatorTool::default()))
        .unwrap()
        .register_tool(None, Arc::new(ReplyTool))
        .unwrap();

    let result = agent.call_llm("what is 6 times 7?").await.unwrap();
    assert_eq!(result.generation, "THE ANSWER IS 42");
    assert_eq!(result.iterations, 2);
    assert_eq!(result.steps[0].observation, "42");
    assert_eq!(llm.remaining(), 1);
}
