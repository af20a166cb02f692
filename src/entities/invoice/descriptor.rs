//! Entity descriptor for Invoice

use super::{create_invoice, delete_invoice, get_invoice, list_invoices, update_invoice};
use crate::server::{AppState, EntityDescriptor};
use axum::{Router, routing::get};

/// Descriptor for the Invoice resource
pub struct InvoiceDescriptor {
    pub state: AppState,
}

impl InvoiceDescriptor {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl EntityDescriptor for InvoiceDescriptor {
    fn entity_type(&self) -> &str {
        "invoice"
    }

    fn plural(&self) -> &str {
        "invoices"
    }

    fn build_routes(&self) -> Router {
        Router::new()
            .route("/invoices", get(list_invoices).post(create_invoice))
            .route(
                "/invoices/{id}",
                get(get_invoice).put(update_invoice).delete(delete_invoice),
            )
            .with_state(self.state.clone())
    }
}
