//! Back-end capability contract and provider plumbing.
//!
//! - [`Backend`]: what every analysis back-end must implement.
//! - [`registry`]: identity → provider factory table consulted on activation.
//! - [`command`]: a provider that drives an external executable.

use std::path::Path;

use crate::error::BackendError;
use crate::models::{Chunk, Options};

pub mod command;
pub mod registry;

pub use command::{CommandBackend, CommandConfig};
pub use registry::{BackendFactory, BackendRegistry};

/// An activated analysis back-end.
///
/// Results and chunks are opaque JSON documents to the router.
pub trait Backend: Send + Sync {
    fn analyze(&self, path: &Path, options: &Options) -> Result<serde_json::Value, BackendError>;

    fn chunk(
        &self,
        path: &Path,
        prior: &serde_json::Value,
        strategy: &str,
        options: &Options,
    ) -> Result<Vec<Chunk>, BackendError>;
}
