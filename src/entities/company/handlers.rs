//! Company HTTP handlers

use super::model::{CreateCompanyRequest, UpdateCompanyRequest};
use crate::core::error::{BizResult, EntityError, ValidationError};
use crate::core::model::{Company, CompanyChanges};
use crate::core::slug::slugify;
use crate::core::validation::Validated;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};

fn required(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    value
        .map(|v| v.trim().to_string())
        .ok_or_else(|| ValidationError::MissingField {
            field: field.to_string(),
        })
}

pub async fn list_companies(State(state): State<AppState>) -> BizResult<Json<Value>> {
    let companies = state.store.list_companies().await?;
    Ok(Json(json!({ "companies": companies })))
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> BizResult<Json<Value>> {
    let company = state
        .store
        .get_company(&code)
        .await?
        .ok_or_else(|| EntityError::not_found("company", &code))?;
    Ok(Json(json!({ "company": company })))
}

pub async fn create_company(
    State(state): State<AppState>,
    Validated(payload): Validated<CreateCompanyRequest>,
) -> BizResult<(StatusCode, Json<Value>)> {
    let name = required(payload.name, "name")?;
    let company = Company {
        code: slugify(&name),
        name,
        description: payload.description,
    };

    let company = state.store.create_company(company).await?;
    tracing::info!(code = %company.code, "Created company");

    Ok((StatusCode::CREATED, Json(json!({ "company": company }))))
}

pub async fn update_company(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Validated(payload): Validated<UpdateCompanyRequest>,
) -> BizResult<Json<Value>> {
    let changes = CompanyChanges {
        name: required(payload.name, "name")?,
        description: payload.description,
    };

    let company = state
        .store
        .update_company(&code, changes)
        .await?
        .ok_or_else(|| EntityError::not_found("company", &code))?;
    tracing::info!(code = %company.code, "Updated company");

    Ok(Json(json!({ "company": company })))
}

/// Succeeds whether or not the company existed
pub async fn delete_company(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> BizResult<Json<Value>> {
    if state.store.delete_company(&code).await? {
        tracing::info!(code = %code, "Deleted company");
    } else {
        tracing::debug!(code = %code, "Delete matched no company");
    }
    Ok(Json(json!({ "msg": "DELETED" })))
}
