pub mod llm;
pub mod tools;
pub mod agent;
pub mod message;
pub mod config;
pub mod error;
pub mod prelude;

// Lets the `#[tool]` expansion name this crate by its absolute path from inside
// the library as well as from downstream crates.
extern crate self as tool_agent;

// re-export the proc-macro attribute for convenient use: `use tool_agent::tool;` or `#[tool_agent::tool(...)]`
pub use tool_agent_macros::tool;

// Crates referenced by `#[tool]` expansions.
#[doc(hidden)]
pub use async_trait;
#[doc(hidden)]
pub use serde;
#[doc(hidden)]
pub use serde_json;

pub use error::{Error, Result};
