//! `{variable}` prompt templates.

use std::collections::HashMap;

use super::error::LLMError;
use super::LLMResult;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text(String),
    Var(String),
}

/// A prompt with `{name}` placeholders. `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    parts: Vec<Part>,
}

impl PromptTemplate {
    pub fn from_template(template: impl Into<String>) -> LLMResult<Self> {
        let template = template.into();
        let parts = parse(&template)?;
        Ok(Self { template, parts })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in order of first appearance.
    pub fn input_variables(&self) -> Vec<&str> {
        let mut vars: Vec<&str> = Vec::new();
        for part in &self.parts {
            if let Part::Var(name) = part {
                if !vars.contains(&name.as_str()) {
                    vars.push(name);
                }
            }
        }
        vars
    }

    pub fn format<K, V>(&self, values: &HashMap<K, V>) -> LLMResult<String>
    where
        K: std::borrow::Borrow<str> + std::hash::Hash + Eq,
        V: AsRef<str>,
    {
        let mut out = String::with_capacity(self.template.len());
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Var(name) => {
                    let value = values
                        .get(name.as_str())
                        .ok_or_else(|| LLMError::MissingVariable(name.clone()))?;
                    out.push_str(value.as_ref());
                }
            }
        }
        Ok(out)
    }

    /// Format from `(name, value)` pairs.
    pub fn format_with(&self, values: &[(&str, &str)]) -> LLMResult<String> {
        let map: HashMap<&str, &str> = values.iter().copied().collect();
        self.format(&map)
    }
}

fn parse(template: &str) -> LLMResult<Vec<Part>> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                text.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                text.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => {
                            return Err(LLMError::InvalidTemplate(format!(
                                "unclosed placeholder {{{}",
                                name
                            )));
                        }
                    }
                }
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(LLMError::InvalidTemplate("empty placeholder".into()));
                }
                if !text.is_empty() {
                    parts.push(Part::Text(std::mem::take(&mut text)));
                }
                parts.push(Part::Var(name));
            }
            other => text.push(other),
        }
    }
    if !text.is_empty() {
        parts.push(Part::Text(text));
    }
    Ok(parts)
}
