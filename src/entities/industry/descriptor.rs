//! Entity descriptor for Industry

use super::{associate_company, create_industry, list_industries};
use crate::server::{AppState, EntityDescriptor};
use axum::{
    Router,
    routing::{get, post},
};

/// Descriptor for the Industry resource
pub struct IndustryDescriptor {
    pub state: AppState,
}

impl IndustryDescriptor {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl EntityDescriptor for IndustryDescriptor {
    fn entity_type(&self) -> &str {
        "industry"
    }

    fn plural(&self) -> &str {
        "industries"
    }

    fn build_routes(&self) -> Router {
        Router::new()
            .route("/industries", get(list_industries).post(create_industry))
            .route("/industries/{ind_code}/companies", post(associate_company))
            .with_state(self.state.clone())
    }
}
