pub mod error;
pub mod traits;
pub mod schema;
pub mod input;
pub mod structured;
pub mod builtin;

pub use error::{ErrorHandling, ToolError};
pub use schema::{ArgSchema, ToolSchema};
pub use structured::{StructuredTool, StructuredToolBuilder};
pub use traits::{validate_descriptor, Tool};
pub use builtin::load_tools;
