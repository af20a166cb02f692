//! Industry request payloads

use crate::core::validation::validators::{not_blank, sluggable};
use serde::Deserialize;
use validator::Validate;

/// Body of `POST /industries`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIndustryRequest {
    #[validate(
        required(message = "industry is required"),
        custom(function = "not_blank"),
        custom(function = "sluggable")
    )]
    pub industry: Option<String>,
}

/// Body of `POST /industries/{ind_code}/companies`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssociateCompanyRequest {
    #[validate(
        required(message = "comp_code is required"),
        custom(function = "not_blank")
    )]
    pub comp_code: Option<String>,
}
