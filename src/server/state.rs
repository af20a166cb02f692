//! Shared state handed to every resource handler

use crate::core::payment::PaidDatePolicy;
use crate::core::store::Store;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

/// Application state shared by the company, invoice and industry routes
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub paid_date_policy: PaidDatePolicy,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, paid_date_policy: PaidDatePolicy) -> Self {
        Self {
            store,
            paid_date_policy,
        }
    }

    /// Current date in UTC, used for `add_date` and `paid_date`
    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
