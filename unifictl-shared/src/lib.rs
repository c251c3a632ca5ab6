//! unifictl shared code
//!
//! Error types and constants used by both the orchestration library
//! (`unifictl`) and the command-line front end (`unifictl-cli`).

pub mod constants;
pub mod errors;

pub use errors::{ControllerError, ControllerResult};
