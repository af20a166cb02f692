//! Domain records exchanged between handlers and the persistence gateway

use crate::core::payment::PaymentState;
use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A company row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Company {
    /// Slug of the name at creation time; never changes
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

/// Listing shape of a company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct CompanySummary {
    pub code: String,
    pub name: String,
}

impl From<&Company> for CompanySummary {
    fn from(company: &Company) -> Self {
        Self {
            code: company.code.clone(),
            name: company.name.clone(),
        }
    }
}

/// A company with the ids of its invoices and the codes of its industries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub invoices: Vec<i32>,
    pub industries: Vec<String>,
}

/// Replacement values for a company update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyChanges {
    pub name: String,
    pub description: Option<String>,
}

/// An invoice row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i32,
    pub comp_code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amt: Decimal,
    pub add_date: NaiveDate,
    #[serde(flatten)]
    pub payment: PaymentState,
}

/// An invoice with its company embedded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub company: Company,
}

/// Values for a new invoice; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub comp_code: String,
    pub amt: Decimal,
    pub add_date: NaiveDate,
}

/// An industry row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Industry {
    pub code: String,
    pub industry: String,
}

/// An industry/company association row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Association {
    pub ind_code: String,
    pub comp_code: String,
}

/// Industry label → company codes, in label order
pub type IndustryCompanies = IndexMap<String, Vec<String>>;
