//! `worksite` - Construction-site security registry
//!
//! This library provides the in-memory registry of sites and incidents, the
//! statistics computed over it, and the HTTP API that serves both to the
//! security dashboard.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod registry;
pub mod server;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{Incident, IncidentPatch, NewIncident, NewSite, Site};
pub use registry::{Registry, RegistryDefaults, SharedRegistry, Stats};
