//! Company request payloads

use crate::core::validation::validators::{not_blank, sluggable};
use serde::Deserialize;
use validator::Validate;

/// Body of `POST /companies`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(
        required(message = "name is required"),
        custom(function = "not_blank"),
        custom(function = "sluggable")
    )]
    pub name: Option<String>,

    pub description: Option<String>,
}

/// Body of `PUT /companies/{code}`; replaces both fields
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(required(message = "name is required"), custom(function = "not_blank"))]
    pub name: Option<String>,

    pub description: Option<String>,
}
