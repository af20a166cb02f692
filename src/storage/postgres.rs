//! PostgreSQL storage backend using sqlx.
//!
//! Provides [`PostgresStore`], backed by a PostgreSQL database via
//! `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag (on by default).
//!
//! # Schema
//!
//! Tables are created by the migrations under `migrations/`, applied with
//! [`PostgresStore::migrate`]. Integrity rules (foreign keys, the amount
//! check, cascading deletes) live in the schema; this module only issues
//! parameterized statements and maps rows.

use crate::config::DatabaseConfig;
use crate::core::error::{AssociationError, BizError, BizResult, EntityError};
use crate::core::model::{
    Association, Company, CompanyChanges, CompanyDetail, CompanySummary, Industry,
    IndustryCompanies, Invoice, InvoiceDetail, NewInvoice,
};
use crate::core::payment::PaymentState;
use crate::core::store::{CompanyStore, IndustryStore, InvoiceStore, InvoiceUpdateFn, Store};
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::TryStreamExt;
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

const INVOICE_COLUMNS: &str = "id, comp_code, amt, paid, add_date, paid_date";

/// Raw `invoices` row; payment columns are folded into [`PaymentState`]
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: i32,
    comp_code: String,
    amt: Decimal,
    paid: bool,
    add_date: NaiveDate,
    paid_date: Option<NaiveDate>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = BizError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let payment = PaymentState::from_columns(row.paid, row.paid_date).ok_or_else(|| {
            BizError::Internal(format!(
                "invoice {} has inconsistent payment columns (paid={}, paid_date={:?})",
                row.id, row.paid, row.paid_date
            ))
        })?;
        Ok(Invoice {
            id: row.id,
            comp_code: row.comp_code,
            amt: row.amt,
            add_date: row.add_date,
            payment,
        })
    }
}

/// Store backed by PostgreSQL
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store over an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a bounded connection pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> BizResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        tracing::info!(
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(Self::new(pool))
    }

    /// Apply pending migrations (idempotent)
    pub async fn migrate(&self) -> BizResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// The underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CompanyStore for PostgresStore {
    async fn list_companies(&self) -> BizResult<Vec<CompanySummary>> {
        let companies = sqlx::query_as::<_, CompanySummary>(
            "SELECT code, name FROM companies ORDER BY code COLLATE \"C\"",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    async fn get_company(&self, code: &str) -> BizResult<Option<CompanyDetail>> {
        let mut tx = self.pool.begin().await?;

        let company = sqlx::query_as::<_, Company>(
            "SELECT code, name, description FROM companies WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(company) = company else {
            tx.commit().await?;
            return Ok(None);
        };

        let invoices: Vec<i32> =
            sqlx::query_scalar("SELECT id FROM invoices WHERE comp_code = $1 ORDER BY id")
                .bind(code)
                .fetch_all(&mut *tx)
                .await?;

        let industries: Vec<String> = sqlx::query_scalar(
            "SELECT ind_code FROM industries_companies WHERE comp_code = $1 ORDER BY ind_code COLLATE \"C\"",
        )
        .bind(code)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(CompanyDetail {
            company,
            invoices,
            industries,
        }))
    }

    async fn create_company(&self, company: Company) -> BizResult<Company> {
        let code = company.code.clone();
        sqlx::query_as::<_, Company>(
            "INSERT INTO companies (code, name, description) VALUES ($1, $2, $3) \
             RETURNING code, name, description",
        )
        .bind(&company.code)
        .bind(&company.name)
        .bind(&company.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_as(e, || EntityError::already_exists("company", &code).into()))
    }

    async fn update_company(
        &self,
        code: &str,
        changes: CompanyChanges,
    ) -> BizResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(
            "UPDATE companies SET name = $1, description = $2 WHERE code = $3 \
             RETURNING code, name, description",
        )
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    async fn delete_company(&self, code: &str) -> BizResult<bool> {
        let result = sqlx::query("DELETE FROM companies WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl InvoiceStore for PostgresStore {
    async fn list_invoices(&self) -> BizResult<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Invoice::try_from).collect()
    }

    async fn get_invoice(&self, id: i32) -> BizResult<Option<InvoiceDetail>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.commit().await?;
            return Ok(None);
        };

        let company = sqlx::query_as::<_, Company>(
            "SELECT code, name, description FROM companies WHERE code = $1",
        )
        .bind(&row.comp_code)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(InvoiceDetail {
            invoice: row.try_into()?,
            company,
        }))
    }

    async fn create_invoice(&self, new: NewInvoice) -> BizResult<Invoice> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "INSERT INTO invoices (comp_code, amt, add_date) VALUES ($1, $2, $3) \
             RETURNING {INVOICE_COLUMNS}"
        ))
        .bind(&new.comp_code)
        .bind(new.amt)
        .bind(new.add_date)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn update_invoice(
        &self,
        id: i32,
        update: InvoiceUpdateFn<'_>,
    ) -> BizResult<Option<Invoice>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        let current = Invoice::try_from(row)?;
        let next = update(&current);

        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "UPDATE invoices SET amt = $1, paid = $2, paid_date = $3 WHERE id = $4 \
             RETURNING {INVOICE_COLUMNS}"
        ))
        .bind(next.amt)
        .bind(next.payment.is_paid())
        .bind(next.payment.paid_date())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row.try_into()?))
    }

    async fn delete_invoice(&self, id: i32) -> BizResult<bool> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl IndustryStore for PostgresStore {
    async fn list_industries(&self) -> BizResult<IndustryCompanies> {
        let mut grouped = sqlx::query_as::<_, (String, Option<String>)>(
            "SELECT i.industry, ic.comp_code \
             FROM industries AS i \
             LEFT JOIN industries_companies AS ic ON i.code = ic.ind_code",
        )
        .fetch(&self.pool)
        .try_fold(
            IndustryCompanies::new(),
            |mut grouped, (industry, comp_code)| async move {
                let companies = grouped.entry(industry).or_default();
                if let Some(code) = comp_code {
                    companies.push(code);
                }
                Ok(grouped)
            },
        )
        .await?;

        // Byte order, not the database collation
        grouped.sort_keys();
        for companies in grouped.values_mut() {
            companies.sort();
        }
        Ok(grouped)
    }

    async fn create_industry(&self, industry: Industry) -> BizResult<Industry> {
        let code = industry.code.clone();
        sqlx::query_as::<_, Industry>(
            "INSERT INTO industries (code, industry) VALUES ($1, $2) RETURNING code, industry",
        )
        .bind(&industry.code)
        .bind(&industry.industry)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_as(e, || EntityError::already_exists("industry", &code).into()))
    }

    async fn associate(&self, ind_code: &str, comp_code: &str) -> BizResult<Option<Association>> {
        sqlx::query_as::<_, Association>(
            "INSERT INTO industries_companies (ind_code, comp_code) VALUES ($1, $2) \
             RETURNING ind_code, comp_code",
        )
        .bind(ind_code)
        .bind(comp_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            unique_as(e, || {
                AssociationError::AlreadyExists {
                    ind_code: ind_code.to_string(),
                    comp_code: comp_code.to_string(),
                }
                .into()
            })
        })
    }
}

impl Store for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// Replace a unique violation with a domain error, classify anything else
fn unique_as(err: sqlx::Error, conflict: impl FnOnce() -> BizError) -> BizError {
    let is_unique = matches!(
        &err,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    );
    if is_unique {
        conflict()
    } else {
        BizError::from(err)
    }
}
