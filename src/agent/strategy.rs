use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Reasoning style the agent asks the model to follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Decide the next action from the tool descriptions alone, one step at a time.
    #[default]
    ZeroShotReact,
    /// Write a step-by-step plan first, then carry it out.
    PlanAndSolve,
}

impl Strategy {
    pub fn instructions(&self) -> &'static str {
        match self {
            Strategy::ZeroShotReact => {
                "Answer the question as best you can. Think about what to do next, \
                 then either call one of the tools or give the final answer. Use the \
                 tool results you receive to decide the following step."
            }
            Strategy::PlanAndSolve => {
                "First understand the problem and devise a numbered plan of steps to \
                 solve it. Then carry out the plan step by step, calling tools where a \
                 step needs them. When every step is done, give the final answer."
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::ZeroShotReact => f.write_str("zero-shot-react"),
            Strategy::PlanAndSolve => f.write_str("plan-and-solve"),
        }
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero-shot-react" | "zero_shot_react" | "react" => Ok(Strategy::ZeroShotReact),
            "plan-and-solve" | "plan_and_solve" => Ok(Strategy::PlanAndSolve),
            other => Err(ConfigError::InvalidConfig(format!("unknown strategy: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_names() {
        for s in [Strategy::ZeroShotReact, Strategy::PlanAndSolve] {
            assert_eq!(s.to_string().parse::<Strategy>().unwrap(), s);
        }
        assert!("chain-of-thought".parse::<Strategy>().is_err());
    }

    #[test]
    fn plan_and_solve_asks_for_a_plan() {
        assert!(Strategy::PlanAndSolve.instructions().contains("plan"));
    }
}
