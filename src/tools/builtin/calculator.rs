//! Arithmetic expression evaluator exposed as a tool.

use serde_json::Value;

use crate::tools::{ArgSchema, ErrorHandling, Tool, ToolError};

const NAME: &str = "calculator";
/// Nesting allowed for parentheses, unary signs and chained powers.
const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Default)]
pub struct CalculatorTool {
    handle_error: ErrorHandling,
}

impl CalculatorTool {
    pub fn with_error_handling(mut self, handling: impl Into<ErrorHandling>) -> Self {
        self.handle_error = handling.into();
        self
    }
}

#[async_trait::async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Useful for when you need to answer questions about math. \
         Input is a single arithmetic expression using + - * / % ^ and parentheses."
    }

    fn args(&self) -> Vec<ArgSchema> {
        vec![ArgSchema::string("expression", "Arithmetic expression, e.g. '37593 * 67'")]
    }

    fn handle_error(&self) -> ErrorHandling {
        self.handle_error.clone()
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let expr = match &input["expression"] {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return Err(ToolError::ParamsNotMatched("expression must be a string".into())),
        };
        let value = evaluate(&expr).map_err(|reason| ToolError::execution(NAME, reason))?;
        Ok(format_number(value))
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    Op(char),
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() || c == ',' || c == '_' => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut num = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        num.push(d);
                        chars.next();
                    } else if d == ',' || d == '_' {
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n = num.parse::<f64>().map_err(|_| format!("invalid number '{}'", num))?;
                tokens.push(Token::Num(n));
            }
            '+' | '-' | '*' | '/' | '%' | '^' => {
                chars.next();
                // accept `**` as power
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::Op('^'));
                } else {
                    tokens.push(Token::Op(c));
                }
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn descend(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err("expression nested too deeply".into());
        }
        Ok(())
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.peek();
        self.pos += 1;
        tok
    }

    fn expr(&mut self) -> Result<f64, String> {
        let mut acc = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            self.next();
            let rhs = self.term()?;
            acc = if op == '+' { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, String> {
        let mut acc = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek() {
            self.next();
            let rhs = self.unary()?;
            if op != '*' && rhs == 0.0 {
                return Err("division by zero".into());
            }
            acc = match op {
                '*' => acc * rhs,
                '/' => acc / rhs,
                _ => acc % rhs,
            };
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<f64, String> {
        match self.peek() {
            Some(Token::Op(sign @ ('-' | '+'))) => {
                self.next();
                self.descend()?;
                let value = self.unary()?;
                self.depth -= 1;
                Ok(if sign == '-' { -value } else { value })
            }
            _ => self.power(),
        }
    }

    // `^` binds tighter than unary minus on its left and is right-associative.
    fn power(&mut self) -> Result<f64, String> {
        let base = self.primary()?;
        if let Some(Token::Op('^')) = self.peek() {
            self.next();
            self.descend()?;
            let exp = self.unary()?;
            self.depth -= 1;
            return Ok(base.powf(exp));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, String> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                self.descend()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err("missing closing parenthesis".into()),
                }
            }
            Some(tok) => Err(format!("unexpected token {:?}", tok)),
            None => Err("unexpected end of expression".into()),
        }
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expr: &str) -> Result<f64, String> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err("empty expression".into());
    }
    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let value = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(format!("unexpected trailing input at token {}", parser.pos + 1));
    }
    if !value.is_finite() {
        return Err("result is not a finite number".into());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn respects_precedence_and_associativity() {
        assert_eq!(evaluate("2 + 3 * 4").unwrap(), 14.0);
        assert_eq!(evaluate("(2 + 3) * 4").unwrap(), 20.0);
        assert_eq!(evaluate("2 ^ 3 ^ 2").unwrap(), 512.0);
        assert_eq!(evaluate("-2 ^ 2").unwrap(), -4.0);
        assert_eq!(evaluate("2 ** -1").unwrap(), 0.5);
        assert_eq!(evaluate("10 % 4 - 7 / 2").unwrap(), -1.5);
        assert_eq!(evaluate("1,000 * 3").unwrap(), 3000.0);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(evaluate("").is_err());
        assert!(evaluate("1 / 0").is_err());
        assert!(evaluate("(1 + 2").is_err());
        assert!(evaluate("2 3").is_err());
        assert!(evaluate("sqrt(4)").is_err());
    }

    #[test]
    fn deep_nesting_is_an_error_not_a_crash() {
        let parens = format!("{}1{}", "(".repeat(3000), ")".repeat(3000));
        assert_eq!(evaluate(&parens).unwrap_err(), "expression nested too deeply");
        let signs = format!("{}1", "-".repeat(3000));
        assert_eq!(evaluate(&signs).unwrap_err(), "expression nested too deeply");
        let powers = format!("1{}", "^1".repeat(3000));
        assert_eq!(evaluate(&powers).unwrap_err(), "expression nested too deeply");

        let ok = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(evaluate(&ok).unwrap(), 1.0);
        assert_eq!(evaluate("--2 ^ 2").unwrap(), 4.0);
    }

    #[tokio::test]
    async fn tool_formats_integers_without_fraction() {
        let tool = CalculatorTool::default();
        assert_eq!(tool.invoke(json!("37593 * 67")).await.unwrap(), "2518731");
        assert_eq!(tool.invoke(json!({ "expression": "1 / 4" })).await.unwrap(), "0.25");
    }

    #[tokio::test]
    async fn failures_follow_error_handling() {
        let err = CalculatorTool::default().invoke(json!("1 / 0")).await.unwrap_err();
        assert!(err.is_recoverable());

        let tool = CalculatorTool::default().with_error_handling(true);
        assert_eq!(tool.invoke(json!("1 / 0")).await.unwrap(), "division by zero");
    }
}
