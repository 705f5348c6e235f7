//! Client for the Kubernetes Container Runtime Interface (CRI).
//!
//! The exporter only issues read-only calls against the runtime and image
//! services. [`RuntimeAgent`] is the seam the collector is written against;
//! [`CriAgent`] implements it over a gRPC channel.
mod agent;
mod error;

pub use agent::{CriAgent, RuntimeAgent};
pub use error::{Call, Error, Result};
