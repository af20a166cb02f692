//! Typed error handling for the BizTime API
//!
//! Every handler returns [`BizResult`], so a failure anywhere between the
//! request extractor and the persistence gateway ends up rendered as the same
//! JSON envelope:
//!
//! ```json
//! { "error": { "message": "company 'acme' not found", "status": 404, "code": "ENTITY_NOT_FOUND" } }
//! ```
//!
//! # Error Categories
//!
//! - [`EntityError`]: lookups and uniqueness of companies, invoices, industries
//! - [`AssociationError`]: industry/company association failures
//! - [`ValidationError`]: missing or malformed input
//! - [`StorageError`]: failures reported by the persistence gateway
//! - [`RequestError`]: malformed paths, timeouts, unknown routes
//! - [`ConfigError`]: configuration loading
//!
//! # Example
//!
//! ```rust,ignore
//! use biztime::prelude::*;
//!
//! async fn find(store: &dyn Store, code: &str) -> BizResult<CompanyDetail> {
//!     store
//!         .get_company(code)
//!         .await?
//!         .ok_or_else(|| EntityError::not_found("company", code).into())
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for the BizTime API
#[derive(Debug, Error)]
pub enum BizError {
    /// Entity lookups and uniqueness
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Industry/company association errors
    #[error(transparent)]
    Association(#[from] AssociationError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persistence gateway errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// HTTP/Request errors
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Anything that should not happen in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error envelope returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Body of the error envelope
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable error message
    pub message: String,
    /// HTTP status code, repeated for clients that only see the body
    pub status: u16,
    /// Error code for programmatic handling
    pub code: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl BizError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            BizError::Entity(e) => e.status_code(),
            BizError::Association(e) => e.status_code(),
            BizError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BizError::Validation(e) => e.status_code(),
            BizError::Storage(e) => e.status_code(),
            BizError::Request(e) => e.status_code(),
            BizError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            BizError::Entity(e) => e.error_code(),
            BizError::Association(e) => e.error_code(),
            BizError::Config(_) => "CONFIG_ERROR",
            BizError::Validation(e) => e.error_code(),
            BizError::Storage(e) => e.error_code(),
            BizError::Request(e) => e.error_code(),
            BizError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error envelope
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorBody {
                message: self.to_string(),
                status: self.status_code().as_u16(),
                code: self.error_code().to_string(),
                details: self.details(),
            },
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            BizError::Entity(EntityError::NotFound { entity_type, id })
            | BizError::Entity(EntityError::AlreadyExists { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id
                }))
            }
            BizError::Association(AssociationError::AlreadyExists { ind_code, comp_code }) => {
                Some(serde_json::json!({
                    "ind_code": ind_code,
                    "comp_code": comp_code
                }))
            }
            BizError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            BizError::Storage(StorageError::ConstraintViolation {
                kind,
                constraint: Some(constraint),
                ..
            }) => Some(serde_json::json!({
                "constraint": constraint,
                "kind": kind.as_str()
            })),
            _ => None,
        }
    }
}

impl IntoResponse for BizError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to entity lookups
#[derive(Debug, Error)]
pub enum EntityError {
    /// Entity was not found
    #[error("{entity_type} '{id}' not found")]
    NotFound { entity_type: String, id: String },

    /// An entity with the same key already exists
    #[error("{entity_type} '{id}' already exists")]
    AlreadyExists { entity_type: String, id: String },
}

impl EntityError {
    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        EntityError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn already_exists(entity_type: &str, id: impl ToString) -> Self {
        EntityError::AlreadyExists {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::AlreadyExists { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::AlreadyExists { .. } => "ENTITY_ALREADY_EXISTS",
        }
    }
}

// =============================================================================
// Association Errors
// =============================================================================

/// Errors related to the industry/company association
#[derive(Debug, Error)]
pub enum AssociationError {
    /// The pair is already associated
    #[error("company '{comp_code}' is already associated with industry '{ind_code}'")]
    AlreadyExists { ind_code: String, comp_code: String },

    /// The insert returned no row
    #[error("Error creating association")]
    NotCreated { ind_code: String, comp_code: String },
}

impl AssociationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AssociationError::AlreadyExists { .. } => StatusCode::CONFLICT,
            AssociationError::NotCreated { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AssociationError::AlreadyExists { .. } => "ASSOCIATION_ALREADY_EXISTS",
            AssociationError::NotCreated { .. } => "ASSOCIATION_NOT_CREATED",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse config{}: {message}", .file.as_ref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Single field validation error
    #[error("Validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    #[error("Validation errors: {}", .0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect::<Vec<_>>().join(", "))]
    FieldErrors(Vec<FieldValidationError>),

    /// Request body is not valid JSON (or has the wrong shape)
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    /// Required field is absent
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// `paid` was neither true nor false
    #[error("paid value must be true or false (got '{value}')")]
    InvalidPaid { value: String },

    /// Invoice update carried neither `amt` nor `paid`
    #[error("update must include amt or paid")]
    EmptyUpdate,
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ValidationError::InvalidJson { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
            ValidationError::MissingField { .. } => "MISSING_FIELD",
            ValidationError::InvalidPaid { .. } => "INVALID_PAID_VALUE",
            ValidationError::EmptyUpdate => "EMPTY_UPDATE",
            ValidationError::FieldError { .. } | ValidationError::FieldErrors(_) => {
                "VALIDATION_ERROR"
            }
        }
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| FieldValidationError {
                    field: field.to_string(),
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for BizError {
    fn from(errors: validator::ValidationErrors) -> Self {
        BizError::Validation(errors.into())
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Kind of integrity constraint rejected by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    ForeignKey,
    Unique,
    NotNull,
    Check,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::ForeignKey => "foreign_key",
            ConstraintKind::Unique => "unique",
            ConstraintKind::NotNull => "not_null",
            ConstraintKind::Check => "check",
        }
    }
}

/// Errors reported by the persistence gateway
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection or pool error
    #[error("Failed to connect to {backend}: {message}")]
    ConnectionError { backend: String, message: String },

    /// Query execution error
    #[error("Query error: {message}")]
    QueryError { message: String },

    /// Transaction error
    #[error("Transaction error: {message}")]
    TransactionError { message: String },

    /// The store rejected a write because of an integrity constraint
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        kind: ConstraintKind,
        constraint: Option<String>,
        message: String,
    },

    /// Schema migration failed
    #[error("Migration failed: {message}")]
    MigrationError { message: String },
}

impl StorageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::ConstraintViolation {
                kind: ConstraintKind::Unique,
                ..
            } => StatusCode::CONFLICT,
            StorageError::ConstraintViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::ConnectionError { .. } => "STORAGE_UNAVAILABLE",
            StorageError::QueryError { .. } => "STORAGE_ERROR",
            StorageError::TransactionError { .. } => "STORAGE_TRANSACTION_ERROR",
            StorageError::ConstraintViolation { .. } => "CONSTRAINT_VIOLATION",
            StorageError::MigrationError { .. } => "STORAGE_MIGRATION_ERROR",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Error)]
pub enum RequestError {
    /// Path parameter is not a valid identifier
    #[error("Invalid {entity_type} id: '{value}'")]
    InvalidId { entity_type: String, value: String },

    /// No route matches the request
    #[error("No route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    /// The request did not complete in time
    #[error("Request timed out")]
    Timeout,
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            RequestError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            RequestError::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidId { .. } => "INVALID_ID",
            RequestError::RouteNotFound { .. } => "ROUTE_NOT_FOUND",
            RequestError::Timeout => "REQUEST_TIMEOUT",
        }
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for BizError {
    fn from(err: serde_json::Error) -> Self {
        BizError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for BizError {
    fn from(err: std::io::Error) -> Self {
        BizError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for BizError {
    fn from(err: serde_yaml::Error) -> Self {
        BizError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for BizError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => {
                let kind = match db.kind() {
                    sqlx::error::ErrorKind::UniqueViolation => Some(ConstraintKind::Unique),
                    sqlx::error::ErrorKind::ForeignKeyViolation => {
                        Some(ConstraintKind::ForeignKey)
                    }
                    sqlx::error::ErrorKind::NotNullViolation => Some(ConstraintKind::NotNull),
                    sqlx::error::ErrorKind::CheckViolation => Some(ConstraintKind::Check),
                    _ => None,
                };
                match kind {
                    Some(kind) => StorageError::ConstraintViolation {
                        kind,
                        constraint: db.constraint().map(str::to_string),
                        message: db.message().to_string(),
                    }
                    .into(),
                    None => StorageError::QueryError {
                        message: db.message().to_string(),
                    }
                    .into(),
                }
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StorageError::ConnectionError {
                backend: "PostgreSQL".to_string(),
                message: err.to_string(),
            }
            .into(),
            _ => StorageError::QueryError {
                message: err.to_string(),
            }
            .into(),
        }
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::migrate::MigrateError> for BizError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        BizError::Storage(StorageError::MigrationError {
            message: err.to_string(),
        })
    }
}

/// Convert from anyhow::Error for bootstrap code paths
impl From<anyhow::Error> for BizError {
    fn from(err: anyhow::Error) -> Self {
        BizError::Internal(err.to_string())
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for BizTime operations
pub type BizResult<T> = Result<T, BizError>;

// =============================================================================
// Tests
// =============================================================================
