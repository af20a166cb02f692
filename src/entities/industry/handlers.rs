//! Industry HTTP handlers

use super::model::{AssociateCompanyRequest, CreateIndustryRequest};
use crate::core::error::{AssociationError, BizResult, ValidationError};
use crate::core::model::Industry;
use crate::core::slug::slugify;
use crate::core::validation::Validated;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};

/// Company codes grouped by industry label
pub async fn list_industries(State(state): State<AppState>) -> BizResult<Json<Value>> {
    let industries = state.store.list_industries().await?;
    Ok(Json(json!({ "industries": industries })))
}

pub async fn create_industry(
    State(state): State<AppState>,
    Validated(payload): Validated<CreateIndustryRequest>,
) -> BizResult<(StatusCode, Json<Value>)> {
    let label = payload
        .industry
        .map(|i| i.trim().to_string())
        .ok_or_else(|| ValidationError::MissingField {
            field: "industry".to_string(),
        })?;

    let industry = state
        .store
        .create_industry(Industry {
            code: slugify(&label),
            industry: label,
        })
        .await?;
    tracing::info!(code = %industry.code, "Created industry");

    Ok((StatusCode::CREATED, Json(json!({ "industry": industry }))))
}

pub async fn associate_company(
    State(state): State<AppState>,
    Path(ind_code): Path<String>,
    Validated(payload): Validated<AssociateCompanyRequest>,
) -> BizResult<(StatusCode, Json<Value>)> {
    let comp_code = payload
        .comp_code
        .map(|c| c.trim().to_string())
        .ok_or_else(|| ValidationError::MissingField {
            field: "comp_code".to_string(),
        })?;

    let association = state
        .store
        .associate(&ind_code, &comp_code)
        .await?
        .ok_or_else(|| AssociationError::NotCreated {
            ind_code: ind_code.clone(),
            comp_code: comp_code.clone(),
        })?;
    tracing::info!(
        ind_code = %association.ind_code,
        comp_code = %association.comp_code,
        "Associated company with industry"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!(
                "Associated {} with {}",
                association.comp_code, association.ind_code
            )
        })),
    ))
}
