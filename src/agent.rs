use std::collections::HashMap;
use std::sync::Arc;
use crate::llm::traits::LLM;
use crate::message::Message;
use crate::tools::{
    traits::{validate_descriptor, Tool},
    schema::ToolSchema,
    error::ToolError,
};
use serde_json::json;
use tracing::{debug, warn};


pub mod types;
pub mod error;
pub mod traits;
pub mod strategy;
pub mod memory;
pub mod callback;

use traits::AgentRunner;
use types::{Agent,AgentResult,AgentExecuteResult,AgentStep};
use error::AgentError;
use callback::AgentCallback;
use memory::ChatMemory;
use strategy::Strategy;

pub const DEFAULT_MAX_ITERATIONS: usize = 15;


impl Agent {
    /// Create a new Agent with the provided name and LLM. Tools start empty.
    pub fn new(name: impl Into<String>, llm: Arc<dyn LLM>, max_iterations: Option<usize>) -> Self {
        Self {
            name: name.into(),
            llm,
            tools: HashMap::new(),
            memory: ChatMemory::new(),
            system_prompt: None,
            strategy: Strategy::default(),
            callbacks: Vec::new(),
            max_iterations: max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
        }
    }

    /// Register a tool under the given name, or under its own name when `name` is `None`.
    /// Replaces any existing tool with the same name. Returns &mut Self for chaining.
    pub fn register_tool(&mut self, name: Option<&str>, tool: Arc<dyn Tool>) -> Result<&mut Self, AgentError> {
        validate_descriptor(tool.as_ref()).map_err(AgentError::InvalidTool)?;
        let name = name.unwrap_or_else(|| tool.name()).to_string();
        if name.trim().is_empty() {
            return Err(AgentError::InvalidTool(ToolError::InvalidDescriptor(
                "tool registered under an empty name".into(),
            )));
        }
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!("agent {}: tool {} replaced", self.name, name);
        }
        Ok(self)
    }

    /// Register each tool under its own name.
    pub fn register_tools(&mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Result<&mut Self, AgentError> {
        for tool in tools {
            self.register_tool(None, tool)?;
        }
        Ok(self)
    }

    /// Change the maximum iterations for the agent's decision process.
    pub fn change_max_iterations(&mut self, max_iterations: usize) {
        self.max_iterations = max_iterations;
    }

    /// Look up a tool by name.
    pub fn get_tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Descriptors of every registered tool, sorted by name.
    pub fn tool_schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .iter()
            .map(|(name, tool)| ToolSchema {
                name: name.clone(),
                ..tool.schema()
            })
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Set or replace the agent's system prompt.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = Some(prompt.into());
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_memory(mut self, memory: ChatMemory) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_callback(mut self, callback: Arc<dyn AgentCallback>) -> Self {
        self.callbacks.push(callback);
        self
    }

    // generate system prompt
    pub fn generate_system_prompt(&self) -> Vec<Message> {
        let mut msgs = Vec::new();
        if let Some(prompt) = self.system_prompt.as_ref() {
            msgs.push(Message::system(prompt.clone()));
        }
        msgs.push(Message::system(self.strategy.instructions()));
        if !self.tools.is_empty() {
            let example = json!({
                "tool_calls": [
                    {
                        "name": "tool_name",
                        "args": {
                            "param1": "value1",
                            "param2": "value2"
                        }
                    }
                ]
            });
            msgs.push(Message::developer(format!(
                "I also provide some tools for you to choose from. If you want to call a tool, \
                 please include the following JSON format in your response: {}\n\n\
                 IMPORTANT: After you have completed the task by calling all necessary tools, you MUST \
                 return a final response WITHOUT any tool_calls. Simply provide a summary or \
                 confirmation message to indicate completion. Do NOT continue calling tools after \
                 the task is done.",
                example
            )));
        }
        msgs
    }

    // one system message per tool, describing its arguments as JSON Schema
    pub fn generate_tools_prompt(&self) -> Vec<Message> {
        self.tool_schemas()
            .into_iter()
            .map(|schema| {
                Message::system(
                    json!({
                        "name": schema.name,
                        "description": schema.description,
                        "parameters": schema.parameters(),
                    })
                    .to_string(),
                )
            })
            .collect()
    }

    fn notify(&self, f: impl Fn(&dyn AgentCallback)) {
        for cb in &self.callbacks {
            f(cb.as_ref());
        }
    }

    fn finish(&self, prompt: &str, result: AgentResult) -> AgentResult {
        self.memory.add_exchange(prompt, result.generation.clone());
        self.notify(|cb| cb.on_agent_finish(&result));
        result
    }
}



#[async_trait::async_trait]
impl AgentRunner for Agent {
    async fn call_llm(&self, prompt: &str) -> AgentExecuteResult {
        // Build a sequence of messages so LLM implementations that support
        // system/user roles can consume them properly.
        let mut msgs: Vec<Message> = self.generate_system_prompt();
        msgs.extend(self.generate_tools_prompt());
        msgs.extend(self.memory.messages());
        msgs.push(Message::user(prompt));
        let mut result = AgentResult::default();
        // Main loop: call LLM, check for tool calls, execute tools, repeat.
        while result.iterations < self.max_iterations {
            let res = self.llm.generate(&msgs).await?;
            result.tokens += res.tokens;
            result.iterations += 1;
            debug!("agent {} iteration {}", self.name, result.iterations);
            self.notify(|cb| cb.on_llm_end(result.iterations, &res));

            if res.tool_calls.is_empty() {
                result.generation = res.generation;
                return Ok(self.finish(prompt, result));
            }

            msgs.push(Message::assistant(res.generation));
            for call_info in res.tool_calls {
                let name = call_info.name;
                let tool_impl = self
                    .tools
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| AgentError::ToolNotFound(name.clone()))?;

                self.notify(|cb| cb.on_tool_start(&name, &call_info.args));
                let observation = match tool_impl.invoke(call_info.args.clone()).await {
                    Ok(output) => output,
                    Err(e) => {
                        self.notify(|cb| cb.on_tool_error(&name, &e));
                        return Err(e.into());
                    }
                };
                self.notify(|cb| cb.on_tool_end(&name, &observation));

                result.steps.push(AgentStep {
                    tool: name.clone(),
                    args: call_info.args,
                    observation: observation.clone(),
                });

                if tool_impl.return_direct() {
                    result.generation = observation;
                    return Ok(self.finish(prompt, result));
                }
                msgs.push(Message::tool_res(
                    &name,
                    format!("Tool {} returned: {}", name, observation),
                ));
            }
        }
        Err(AgentError::MaxIterationsExceeded(self.max_iterations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use serde_json::{json, Value};
    use crate::llm::fake::FakeLLM;
    use crate::message::MessageRole;
    use crate::tools::{ArgSchema, ErrorHandling, StructuredTool};
    use crate::tools::builtin::CalculatorTool;

    fn call(name: &str, args: Value) -> String {
        json!({ "tool_calls": [ { "name": name, "args": args } ] }).to_string()
    }

    fn agent_with(llm: Arc<FakeLLM>, tools: Vec<Arc<dyn Tool>>) -> Agent {
        let mut agent = Agent::new("test", llm, Some(5));
        agent.register_tools(tools).unwrap();
        agent
    }

    fn flaky(handling: ErrorHandling, return_direct: bool) -> Arc<dyn Tool> {
        Arc::new(
            StructuredTool::from_fn("search", "Search for recent news", |_| {
                Err(ToolError::execution("search", "service unavailable"))
            })
            .arg(ArgSchema::string("query", "search query"))
            .handle_error(handling)
            .return_direct(return_direct)
            .build()
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn answers_directly_without_tools() {
        let llm = Arc::new(FakeLLM::new(["Paris."]));
        let agent = agent_with(llm.clone(), vec![]);
        let res = agent.call_llm("Capital of France?").await.unwrap();
        assert_eq!(res.generation, "Paris.");
        assert_eq!(res.iterations, 1);
        assert!(res.steps.is_empty());
        // no tools registered, so no protocol message
        assert!(llm.calls()[0].iter().all(|m| m.role != MessageRole::Developer));
    }

    #[tokio::test]
    async fn feeds_tool_output_back_to_the_model() {
        let llm = Arc::new(FakeLLM::new([
            call("calculator", json!({ "expression": "2 + 2" })),
            "The answer is 4.".to_string(),
        ]));
        let agent = agent_with(llm.clone(), vec![Arc::new(CalculatorTool::default())]);

        let res = agent.call_llm("What is 2 + 2?").await.unwrap();
        assert_eq!(res.generation, "The answer is 4.");
        assert_eq!(res.iterations, 2);
        assert_eq!(res.tokens.total_tokens, 30);
        assert_eq!(
            res.steps,
            vec![AgentStep {
                tool: "calculator".into(),
                args: json!({ "expression": "2 + 2" }),
                observation: "4".into(),
            }]
        );
        let second = &llm.calls()[1];
        let last = second.last().unwrap();
        assert_eq!(last.role, MessageRole::ToolResponse);
        assert_eq!(last.content, "Tool calculator returned: 4");
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let llm = Arc::new(FakeLLM::new([call("python_repl", json!({}))]));
        let agent = agent_with(llm, vec![]);
        let err = agent.call_llm("run code").await.unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(name) if name == "python_repl"));
    }

    #[tokio::test]
    async fn unhandled_tool_failure_stops_the_run() {
        let llm = Arc::new(FakeLLM::new([call("search", json!({ "query": "x" })), "unused".into()]));
        let agent = agent_with(llm.clone(), vec![flaky(ErrorHandling::Propagate, false)]);
        let err = agent.call_llm("news?").await.unwrap_err();
        assert!(matches!(err, AgentError::ToolExecutionError(ToolError::ExecutionError { .. })));
        assert_eq!(llm.remaining(), 1);
        assert!(agent.memory.is_empty());
    }

    #[tokio::test]
    async fn handled_tool_failure_becomes_an_observation() {
        let llm = Arc::new(FakeLLM::new([
            call("search", json!({ "query": "x" })),
            "I could not search, sorry.".to_string(),
        ]));
        let agent = agent_with(llm.clone(), vec![flaky(ErrorHandling::Message, false)]);
        let res = agent.call_llm("news?").await.unwrap();
        assert_eq!(res.generation, "I could not search, sorry.");
        assert_eq!(res.steps[0].observation, "service unavailable");
    }

    #[tokio::test]
    async fn return_direct_tool_ends_the_run() {
        let llm = Arc::new(FakeLLM::new([call("search", json!("x")), "unused".to_string()]));
        let agent = agent_with(llm.clone(), vec![flaky(ErrorHandling::from("no results"), true)]);
        let res = agent.call_llm("news?").await.unwrap();
        assert_eq!(res.generation, "no results");
        assert_eq!(res.iterations, 1);
        assert_eq!(llm.remaining(), 1);
    }

    #[tokio::test]
    async fn stops_after_max_iterations() {
        let looping: Vec<String> = (0..3).map(|_| call("calculator", json!("1+1"))).collect();
        let llm = Arc::new(FakeLLM::new(looping));
        let mut agent = agent_with(llm, vec![Arc::new(CalculatorTool::default())]);
        agent.change_max_iterations(2);
        let err = agent.call_llm("loop").await.unwrap_err();
        assert!(matches!(err, AgentError::MaxIterationsExceeded(2)));
    }

    #[test]
    fn rejects_invalid_descriptors() {
        let tool = StructuredTool::from_fn("echo", "Echo", |v| Ok(v.to_string()))
            .build()
            .unwrap();
        let tool: Arc<dyn Tool> = Arc::new(tool);
        let mut agent = Agent::new("test", Arc::new(FakeLLM::default()), None);
        assert!(agent.register_tool(Some(" "), tool.clone()).is_err());
        agent.register_tool(Some("repeat"), tool).unwrap();
        assert_eq!(agent.get_tool("repeat").unwrap().name(), "echo");
        assert_eq!(agent.tool_schemas()[0].name, "repeat");

        struct Blank;
        #[async_trait::async_trait]
        impl Tool for Blank {
            fn name(&self) -> &str { "blank" }
            fn description(&self) -> &str { "" }
            async fn run(&self, _input: Value) -> Result<String, ToolError> { Ok(String::new()) }
        }
        let err = agent.register_tool(None, Arc::new(Blank)).err().unwrap();
        assert!(matches!(err, AgentError::InvalidTool(ToolError::InvalidDescriptor(_))));
    }

    #[tokio::test]
    async fn memory_is_replayed_and_can_be_cleared() {
        let llm = Arc::new(FakeLLM::new(["Hi Ada.", "Your name is Ada.", "I don't know."]));
        let agent = agent_with(llm.clone(), vec![]);
        agent.call_llm("I'm Ada.").await.unwrap();
        agent.call_llm("What's my name?").await.unwrap();
        let second = &llm.calls()[1];
        assert!(second.contains(&Message::user("I'm Ada.")));
        assert!(second.contains(&Message::assistant("Hi Ada.")));

        agent.memory.clear();
        agent.call_llm("What's my name?").await.unwrap();
        assert!(!llm.calls()[2].contains(&Message::user("I'm Ada.")));
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl AgentCallback for Recorder {
        fn on_tool_start(&self, tool: &str, _args: &Value) {
            self.0.lock().unwrap().push(format!("start:{}", tool));
        }
        fn on_tool_end(&self, tool: &str, output: &str) {
            self.0.lock().unwrap().push(format!("end:{}:{}", tool, output));
        }
        fn on_agent_finish(&self, result: &AgentResult) {
            self.0.lock().unwrap().push(format!("finish:{}", result.generation));
        }
    }

    #[tokio::test]
    async fn callbacks_observe_each_step() {
        let recorder = Arc::new(Recorder::default());
        let llm = Arc::new(FakeLLM::new([call("calculator", json!("6*7")), "42".to_string()]));
        let agent = agent_with(llm, vec![Arc::new(CalculatorTool::default())])
            .with_callback(recorder.clone());
        agent.call_llm("6 times 7?").await.unwrap();
        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["start:calculator", "end:calculator:42", "finish:42"]
        );
    }

    #[test]
    fn prompt_lists_strategy_and_sorted_tools() {
        let agent = agent_with(
            Arc::new(FakeLLM::default()),
            vec![Arc::new(CalculatorTool::default()), flaky(ErrorHandling::Propagate, false)],
        )
        .with_strategy(Strategy::PlanAndSolve);
        let names: Vec<String> = agent.tool_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["calculator", "search"]);

        let system = agent.generate_system_prompt();
        assert_eq!(system[0].content, Strategy::PlanAndSolve.instructions());
        assert_eq!(system[1].role, MessageRole::Developer);

        let tools = agent.generate_tools_prompt();
        let search: Value = serde_json::from_str(&tools[1].content).unwrap();
        assert_eq!(search["parameters"]["required"], json!(["query"]));
    }
}
