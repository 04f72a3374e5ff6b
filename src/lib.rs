//! `docroute`: pick the analysis back-end for a document and drive it.
//!
//! # Flow
//! 1. Classify the file by suffix or explicit hint ([`routing`]).
//! 2. Activate the routed back-end on first use ([`orchestrator`]), resolving
//!    it through the provider table ([`backend::BackendRegistry`]).
//! 3. Delegate analysis or chunking and wrap failures in [`RouteError`].
//!
//! Providers are usually built from [`config::Config`], which maps every
//! identity to an external executable ([`backend::CommandBackend`]).

pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod routing;

pub use backend::{Backend, BackendRegistry};
pub use error::{BackendError, RouteError};
pub use models::{BackendId, BackendInfo, Chunk, ClassificationResult, Options, RoutingInfo};
pub use orchestrator::{Orchestrator, DEFAULT_STRATEGY};
