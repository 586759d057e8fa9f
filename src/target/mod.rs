pub mod types;
pub mod validate;

pub use types::{Bounds, TargetConnection, TargetNode, TargetWorkflow};
pub use validate::{ValidationError, validate_target};
