//! Server module for building the HTTP application
//!
//! `ServerBuilder` registers the company, invoice and industry resources,
//! health routes, the request timeout, and the trace and CORS layers.

pub mod builder;
pub mod entity_registry;
pub mod middleware;
pub mod state;

pub use builder::ServerBuilder;
pub use entity_registry::{EntityDescriptor, EntityRegistry};
pub use state::AppState;
