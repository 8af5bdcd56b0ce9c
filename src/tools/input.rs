//! Shaping and checking tool input before it reaches a tool body.

use serde_json::{Map, Value};

use super::error::ToolError;
use super::schema::ArgSchema;

/// Turn the single input value a caller hands over into the argument object a
/// tool body expects.
///
/// `null` becomes `{}`. A bare scalar is wrapped as `{ arg: value }` when the
/// tool has exactly one argument, or exactly one required argument. Anything
/// else is passed through.
pub fn normalize(args: &[ArgSchema], input: Value) -> Value {
    match input {
        Value::Null => Value::Object(Map::new()),
        Value::Object(_) => input,
        scalar => match scalar_target(args) {
            Some(arg) => {
                let mut map = Map::new();
                map.insert(arg.name.clone(), scalar);
                Value::Object(map)
            }
            None => scalar,
        },
    }
}

fn scalar_target(args: &[ArgSchema]) -> Option<&ArgSchema> {
    if let [only] = args {
        return Some(only);
    }
    let mut required = args.iter().filter(|a| a.required);
    match (required.next(), required.next()) {
        (Some(arg), None) => Some(arg),
        _ => None,
    }
}

/// Check that every required argument is present and not `null`.
pub fn validate(tool: &str, args: &[ArgSchema], input: &Value) -> Result<(), ToolError> {
    if args.is_empty() {
        return Ok(());
    }
    let obj = input.as_object().ok_or_else(|| {
        ToolError::ParamsNotMatched(format!("{} expects an object of arguments", tool))
    })?;
    let missing: Vec<&str> = args
        .iter()
        .filter(|a| a.required && obj.get(&a.name).is_none_or(Value::is_null))
        .map(|a| a.name.as_str())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ToolError::ParamsNotMatched(format!(
            "{} missing required argument(s): {}",
            tool,
            missing.join(", ")
        )))
    }
}
