//! Registry of resource descriptors and the routes they contribute

use axum::Router;
use std::collections::BTreeMap;

/// Describes how to build the routes for one resource
///
/// Each resource (company, invoice, industry) implements this trait and
/// carries the state its handlers need.
pub trait EntityDescriptor: Send + Sync {
    /// The entity type name (singular, e.g., "invoice")
    fn entity_type(&self) -> &str;

    /// The plural form, also the route prefix (e.g., "invoices")
    fn plural(&self) -> &str;

    /// Build the routes for this resource, with state already applied
    fn build_routes(&self) -> Router;
}

/// Registry for all resources served by the application
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: BTreeMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any with the same entity type
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        if self.descriptors.insert(entity_type.clone(), descriptor).is_some() {
            tracing::warn!(entity_type = %entity_type, "Replaced existing entity descriptor");
        }
    }

    /// Merge the routes of every registered resource
    pub fn build_routes(&self) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                tracing::debug!(
                    entity_type = descriptor.entity_type(),
                    prefix = descriptor.plural(),
                    "Registering routes"
                );
                router.merge(descriptor.build_routes())
            })
    }

    /// Registered entity types, in name order
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }
}
