//! Build a [`Tool`] from a closure instead of a dedicated type.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ErrorHandling, ToolError};
use super::schema::ArgSchema;
use super::traits::{validate_descriptor, Tool};

type ToolFn = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<String, ToolError>> + Send + Sync>;

pub struct StructuredTool {
    name: String,
    description: String,
    args: Vec<ArgSchema>,
    return_direct: bool,
    handle_error: ErrorHandling,
    func: ToolFn,
}

impl StructuredTool {
    /// Wrap a synchronous function taking the raw argument object.
    pub fn from_fn<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        f: F,
    ) -> StructuredToolBuilder
    where
        F: Fn(Value) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        StructuredToolBuilder::new(
            name.into(),
            description.into(),
            Arc::new(move |input| {
                let f = Arc::clone(&f);
                async move { f(input) }.boxed()
            }),
        )
    }

    /// Wrap a synchronous function whose argument object deserializes into `P`.
    pub fn from_typed_fn<P, F>(
        name: impl Into<String>,
        description: impl Into<String>,
        f: F,
    ) -> StructuredToolBuilder
    where
        P: DeserializeOwned + Send + 'static,
        F: Fn(P) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self::from_fn(name, description, move |input| {
            let params: P = serde_json::from_value(input)
                .map_err(|e| ToolError::ParamsNotMatched(e.to_string()))?;
            f(params)
        })
    }

    /// Wrap an async function taking the raw argument object.
    pub fn from_async_fn<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        f: F,
    ) -> StructuredToolBuilder
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        StructuredToolBuilder::new(
            name.into(),
            description.into(),
            Arc::new(move |input| f(input).boxed()),
        )
    }
}

impl fmt::Debug for StructuredTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("args", &self.args)
            .field("return_direct", &self.return_direct)
            .field("handle_error", &self.handle_error)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Tool for StructuredTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn args(&self) -> Vec<ArgSchema> {
        self.args.clone()
    }

    fn return_direct(&self) -> bool {
        self.return_direct
    }

    fn handle_error(&self) -> ErrorHandling {
        self.handle_error.clone()
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        (self.func)(input).await
    }
}

#[must_use]
pub struct StructuredToolBuilder {
    tool: StructuredTool,
}

impl StructuredToolBuilder {
    fn new(name: String, description: String, func: ToolFn) -> Self {
        Self {
            tool: StructuredTool {
                name,
                description,
                args: Vec::new(),
                return_direct: false,
                handle_error: ErrorHandling::Propagate,
                func,
            },
        }
    }

    pub fn arg(mut self, arg: ArgSchema) -> Self {
        self.tool.args.push(arg);
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = ArgSchema>) -> Self {
        self.tool.args.extend(args);
        self
    }

    pub fn return_direct(mut self, return_direct: bool) -> Self {
        self.tool.return_direct = return_direct;
        self
    }

    pub fn handle_error(mut self, handling: impl Into<ErrorHandling>) -> Self {
        self.tool.handle_error = handling.into();
        self
    }

    /// Finish the tool, rejecting descriptors with an empty name or
    /// description or with undocumented arguments.
    pub fn build(self) -> Result<StructuredTool, ToolError> {
        validate_descriptor(&self.tool)?;
        Ok(self.tool)
    }
}
