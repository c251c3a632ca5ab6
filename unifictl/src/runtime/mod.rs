//! Runtime configuration: options, version pins and resource naming.

pub mod options;
pub mod types;
pub mod version;

pub use options::ControllerOptions;
pub use types::{ResourceNames, ServerPrefix};
pub use version::VersionPins;
