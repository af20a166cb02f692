//! Invoice HTTP handlers

use super::model::{CreateInvoiceRequest, UpdateInvoiceRequest};
use crate::core::error::{BizResult, EntityError, RequestError, ValidationError};
use crate::core::model::{Invoice, NewInvoice};
use crate::core::payment::{InvoiceUpdate, parse_amount};
use crate::core::validation::Validated;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};

fn parse_id(id: &str) -> Result<i32, RequestError> {
    id.trim().parse::<i32>().map_err(|_| RequestError::InvalidId {
        entity_type: "invoice".to_string(),
        value: id.to_string(),
    })
}

pub async fn list_invoices(State(state): State<AppState>) -> BizResult<Json<Value>> {
    let invoices = state.store.list_invoices().await?;
    Ok(Json(json!({ "invoices": invoices })))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> BizResult<Json<Value>> {
    let id = parse_id(&id)?;
    let invoice = state
        .store
        .get_invoice(id)
        .await?
        .ok_or_else(|| EntityError::not_found("invoice", id))?;
    Ok(Json(json!({ "invoice": invoice })))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Validated(payload): Validated<CreateInvoiceRequest>,
) -> BizResult<(StatusCode, Json<Value>)> {
    let comp_code = payload
        .comp_code
        .map(|c| c.trim().to_string())
        .ok_or_else(|| ValidationError::MissingField {
            field: "comp_code".to_string(),
        })?;
    let amt = payload
        .amt
        .as_ref()
        .map(parse_amount)
        .transpose()?
        .ok_or_else(|| ValidationError::MissingField {
            field: "amt".to_string(),
        })?;

    let invoice = state
        .store
        .create_invoice(NewInvoice {
            comp_code,
            amt,
            add_date: state.today(),
        })
        .await?;
    tracing::info!(invoice_id = invoice.id, comp_code = %invoice.comp_code, "Created invoice");

    Ok((StatusCode::CREATED, Json(json!({ "invoice": invoice }))))
}

/// Change `amt` and/or the payment state of an invoice
///
/// The body is checked before the store is touched, so an invalid `paid`
/// value or an empty update leaves the row as it was.
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Validated(payload): Validated<UpdateInvoiceRequest>,
) -> BizResult<Json<Value>> {
    let id = parse_id(&id)?;
    let update = InvoiceUpdate::parse(payload.amt.as_ref(), payload.paid.as_ref())?;

    let today = state.today();
    let policy = state.paid_date_policy;
    let apply = |current: &Invoice| update.apply(current, today, policy);

    let invoice = state
        .store
        .update_invoice(id, &apply)
        .await?
        .ok_or_else(|| EntityError::not_found("invoice", id))?;
    tracing::info!(
        invoice_id = invoice.id,
        paid = invoice.payment.is_paid(),
        "Updated invoice"
    );

    Ok(Json(json!({ "invoice": invoice })))
}

/// Succeeds whether or not the invoice existed
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> BizResult<Json<Value>> {
    let id = parse_id(&id)?;
    if state.store.delete_invoice(id).await? {
        tracing::info!(invoice_id = id, "Deleted invoice");
    } else {
        tracing::debug!(invoice_id = id, "Delete matched no invoice");
    }
    Ok(Json(json!({ "status": "DELETED" })))
}
