//! Persistence gateway traits
//!
//! Implementations run parameterized statements against a store and hand back
//! rows; they own no business rules. Integrity failures come back as
//! [`BizError`](crate::core::error::BizError) values so handlers can pass
//! them straight through.

use crate::core::error::BizResult;
use crate::core::model::{
    Association, Company, CompanyChanges, CompanyDetail, CompanySummary, Industry,
    IndustryCompanies, Invoice, InvoiceDetail, NewInvoice,
};
use async_trait::async_trait;

/// Pure update applied to an invoice while its row is locked
pub type InvoiceUpdateFn<'a> = &'a (dyn Fn(&Invoice) -> Invoice + Send + Sync);

/// Gateway for the `companies` table
#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// List all companies
    async fn list_companies(&self) -> BizResult<Vec<CompanySummary>>;

    /// Get a company with its invoice ids and industry codes
    async fn get_company(&self, code: &str) -> BizResult<Option<CompanyDetail>>;

    /// Insert a company. A taken code is an `EntityError::AlreadyExists`.
    async fn create_company(&self, company: Company) -> BizResult<Company>;

    /// Replace name and description; `None` when no company has `code`
    async fn update_company(&self, code: &str, changes: CompanyChanges)
    -> BizResult<Option<Company>>;

    /// Delete a company, returning whether a row was removed
    async fn delete_company(&self, code: &str) -> BizResult<bool>;
}

/// Gateway for the `invoices` table
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// List all invoices
    async fn list_invoices(&self) -> BizResult<Vec<Invoice>>;

    /// Get an invoice joined with its company
    async fn get_invoice(&self, id: i32) -> BizResult<Option<InvoiceDetail>>;

    /// Insert an unpaid invoice
    async fn create_invoice(&self, invoice: NewInvoice) -> BizResult<Invoice>;

    /// Read, transform and write back an invoice atomically.
    ///
    /// `None` when no invoice has `id`.
    async fn update_invoice(&self, id: i32, update: InvoiceUpdateFn<'_>)
    -> BizResult<Option<Invoice>>;

    /// Delete an invoice, returning whether a row was removed
    async fn delete_invoice(&self, id: i32) -> BizResult<bool>;
}

/// Gateway for `industries` and `industries_companies`
#[async_trait]
pub trait IndustryStore: Send + Sync {
    /// Company codes grouped by industry label, industries without companies included
    async fn list_industries(&self) -> BizResult<IndustryCompanies>;

    /// Insert an industry. A taken code is an `EntityError::AlreadyExists`.
    async fn create_industry(&self, industry: Industry) -> BizResult<Industry>;

    /// Associate a company with an industry.
    ///
    /// `None` when the insert produced no row.
    async fn associate(&self, ind_code: &str, comp_code: &str) -> BizResult<Option<Association>>;
}

/// Everything the HTTP layer needs from storage
pub trait Store: CompanyStore + InvoiceStore + IndustryStore {
    /// Backend name used in logs
    fn backend(&self) -> &'static str;
}
