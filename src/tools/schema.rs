use serde::{Serialize, Deserialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSchema {
    pub name: String,
    pub arg_type: String,
    pub description: String,
    pub required: bool,
}

impl ArgSchema {
    /// A required argument of JSON type `arg_type`.
    pub fn new(
        name: impl Into<String>,
        arg_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            arg_type: arg_type.into(),
            description: description.into(),
            required: true,
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, "string", description)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// Introspection view of a tool, also what the model is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub args: Vec<ArgSchema>,
    #[serde(default)]
    pub return_direct: bool,
}

impl ToolSchema {
    /// The arguments as a JSON-Schema object.
    pub fn parameters(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for arg in &self.args {
            properties.insert(
                arg.name.clone(),
                json!({ "type": arg.arg_type, "description": arg.description }),
            );
            if arg.required {
                required.push(Value::String(arg.name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_lists_required_args_only() {
        let schema = ToolSchema {
            name: "search".into(),
            description: "Search the web".into(),
            args: vec![
                ArgSchema::string("query", "What to look for"),
                ArgSchema::new("limit", "integer", "Max results").optional(),
            ],
            return_direct: false,
        };
        let params = schema.parameters();
        assert_eq!(params["type"], "object");
        assert_eq!(params["properties"]["limit"]["type"], "integer");
        assert_eq!(params["required"], json!(["query"]));
    }
}
