//! # BizTime
//!
//! An HTTP API for companies, the invoices billed to them, and the
//! industries they operate in.
//!
//! ## Features
//!
//! - **Companies**: CRUD keyed by a slug of the company name
//! - **Invoices**: CRUD with an explicit Unpaid/Paid state machine
//! - **Industries**: label → company codes view and company association
//! - **Pluggable storage**: PostgreSQL via sqlx, or an in-memory store
//! - **Uniform errors**: every failure renders one JSON error envelope
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use biztime::prelude::*;
//!
//! let app = ServerBuilder::new()
//!     .with_store(InMemoryStore::new())
//!     .build()?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        Association, BizError, BizResult, Company, CompanyChanges, CompanyDetail,
        CompanyStore, CompanySummary, Industry, IndustryCompanies, IndustryStore, Invoice,
        InvoiceDetail, InvoiceStore, InvoiceUpdate, NewInvoice, PaidDatePolicy, PaymentState,
        Store, slug::slugify, validation::Validated,
    };

    // === Storage ===
    pub use crate::storage::InMemoryStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresStore;

    // === Config ===
    pub use crate::config::{AppConfig, DatabaseConfig, StorageBackend};

    // === Server ===
    pub use crate::server::{AppState, EntityDescriptor, EntityRegistry, ServerBuilder};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::{
        Router,
        extract::{Path, State},
        routing::{delete, get, post, put},
    };
}
