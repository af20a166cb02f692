//! Invoice request payloads
//!
//! `amt` and `paid` arrive as raw JSON values; `core::payment` decides what
//! they mean so that a number and a numeric string are both accepted.

use crate::core::validation::validators::not_blank;
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// Body of `POST /invoices`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    #[validate(
        required(message = "comp_code is required"),
        custom(function = "not_blank")
    )]
    pub comp_code: Option<String>,

    #[validate(required(message = "amt is required"))]
    pub amt: Option<Value>,
}

/// Body of `PUT /invoices/{id}`; at least one field must be present
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateInvoiceRequest {
    pub amt: Option<Value>,
    pub paid: Option<Value>,
}
