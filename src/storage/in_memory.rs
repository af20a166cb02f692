//! In-memory implementation of the store traits for testing and development
//!
//! Mirrors the PostgreSQL schema's integrity rules: primary keys, foreign
//! keys with `ON DELETE CASCADE`, and the positive-amount check. Violations
//! come back as the same error values the PostgreSQL backend produces.

use crate::core::error::{
    AssociationError, BizError, BizResult, ConstraintKind, EntityError, StorageError,
};
use crate::core::model::{
    Association, Company, CompanyChanges, CompanyDetail, CompanySummary, Industry,
    IndustryCompanies, Invoice, InvoiceDetail, NewInvoice,
};
use crate::core::payment::PaymentState;
use crate::core::store::{CompanyStore, IndustryStore, InvoiceStore, InvoiceUpdateFn, Store};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    companies: BTreeMap<String, Company>,
    invoices: BTreeMap<i32, Invoice>,
    industries: BTreeMap<String, Industry>,
    /// (ind_code, comp_code)
    associations: BTreeSet<(String, String)>,
    last_invoice_id: i32,
}

/// In-memory store implementation
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> BizResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| BizError::Internal(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> BizResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| BizError::Internal(format!("Failed to acquire write lock: {}", e)))
    }
}

fn foreign_key_violation(table: &str, column: &str, value: &str, parent: &str) -> BizError {
    StorageError::ConstraintViolation {
        kind: ConstraintKind::ForeignKey,
        constraint: Some(format!("{}_{}_fkey", table, column)),
        message: format!(
            "insert or update on table \"{}\" violates foreign key constraint: key ({})=({}) is not present in table \"{}\"",
            table, column, value, parent
        ),
    }
    .into()
}

fn check_amount(amt: Decimal) -> BizResult<()> {
    if amt <= Decimal::ZERO {
        return Err(StorageError::ConstraintViolation {
            kind: ConstraintKind::Check,
            constraint: Some("invoices_amt_positive".to_string()),
            message: "new row for relation \"invoices\" violates check constraint".to_string(),
        }
        .into());
    }
    Ok(())
}

#[async_trait]
impl CompanyStore for InMemoryStore {
    async fn list_companies(&self) -> BizResult<Vec<CompanySummary>> {
        let tables = self.read()?;
        Ok(tables.companies.values().map(CompanySummary::from).collect())
    }

    async fn get_company(&self, code: &str) -> BizResult<Option<CompanyDetail>> {
        let tables = self.read()?;
        let Some(company) = tables.companies.get(code) else {
            return Ok(None);
        };

        let invoices = tables
            .invoices
            .values()
            .filter(|inv| inv.comp_code == code)
            .map(|inv| inv.id)
            .collect();
        let industries = tables
            .associations
            .iter()
            .filter(|(_, comp)| comp == code)
            .map(|(ind, _)| ind.clone())
            .collect();

        Ok(Some(CompanyDetail {
            company: company.clone(),
            invoices,
            industries,
        }))
    }

    async fn create_company(&self, company: Company) -> BizResult<Company> {
        let mut tables = self.write()?;
        if tables.companies.contains_key(&company.code) {
            return Err(EntityError::already_exists("company", &company.code).into());
        }
        tables
            .companies
            .insert(company.code.clone(), company.clone());
        Ok(company)
    }

    async fn update_company(
        &self,
        code: &str,
        changes: CompanyChanges,
    ) -> BizResult<Option<Company>> {
        let mut tables = self.write()?;
        Ok(tables.companies.get_mut(code).map(|company| {
            company.name = changes.name;
            company.description = changes.description;
            company.clone()
        }))
    }

    async fn delete_company(&self, code: &str) -> BizResult<bool> {
        let mut tables = self.write()?;
        if tables.companies.remove(code).is_none() {
            return Ok(false);
        }
        tables.invoices.retain(|_, inv| inv.comp_code != code);
        tables.associations.retain(|(_, comp)| comp != code);
        Ok(true)
    }
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn list_invoices(&self) -> BizResult<Vec<Invoice>> {
        let tables = self.read()?;
        Ok(tables.invoices.values().cloned().collect())
    }

    async fn get_invoice(&self, id: i32) -> BizResult<Option<InvoiceDetail>> {
        let tables = self.read()?;
        let Some(invoice) = tables.invoices.get(&id) else {
            return Ok(None);
        };
        let company = tables.companies.get(&invoice.comp_code).cloned().ok_or_else(|| {
            BizError::Internal(format!(
                "invoice {} references missing company '{}'",
                id, invoice.comp_code
            ))
        })?;

        Ok(Some(InvoiceDetail {
            invoice: invoice.clone(),
            company,
        }))
    }

    async fn create_invoice(&self, new: NewInvoice) -> BizResult<Invoice> {
        let mut tables = self.write()?;
        if !tables.companies.contains_key(&new.comp_code) {
            return Err(foreign_key_violation(
                "invoices",
                "comp_code",
                &new.comp_code,
                "companies",
            ));
        }
        check_amount(new.amt)?;

        tables.last_invoice_id += 1;
        let invoice = Invoice {
            id: tables.last_invoice_id,
            comp_code: new.comp_code,
            amt: new.amt.round_dp(2),
            add_date: new.add_date,
            payment: PaymentState::Unpaid,
        };
        tables.invoices.insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    async fn update_invoice(
        &self,
        id: i32,
        update: InvoiceUpdateFn<'_>,
    ) -> BizResult<Option<Invoice>> {
        // The write guard is held across read, transform and store.
        let mut tables = self.write()?;
        let Some(current) = tables.invoices.get(&id) else {
            return Ok(None);
        };

        let mut updated = update(current);
        check_amount(updated.amt)?;
        updated.amt = updated.amt.round_dp(2);
        tables.invoices.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_invoice(&self, id: i32) -> BizResult<bool> {
        let mut tables = self.write()?;
        Ok(tables.invoices.remove(&id).is_some())
    }
}

#[async_trait]
impl IndustryStore for InMemoryStore {
    async fn list_industries(&self) -> BizResult<IndustryCompanies> {
        let tables = self.read()?;

        let mut industries: Vec<&Industry> = tables.industries.values().collect();
        industries.sort_by(|a, b| a.industry.cmp(&b.industry).then(a.code.cmp(&b.code)));

        let mut grouped = IndustryCompanies::new();
        for industry in industries {
            let companies = grouped.entry(industry.industry.clone()).or_default();
            companies.extend(
                tables
                    .associations
                    .iter()
                    .filter(|(ind, _)| *ind == industry.code)
                    .map(|(_, comp)| comp.clone()),
            );
        }
        for companies in grouped.values_mut() {
            companies.sort();
        }
        Ok(grouped)
    }

    async fn create_industry(&self, industry: Industry) -> BizResult<Industry> {
        let mut tables = self.write()?;
        if tables.industries.contains_key(&industry.code) {
            return Err(EntityError::already_exists("industry", &industry.code).into());
        }
        tables
            .industries
            .insert(industry.code.clone(), industry.clone());
        Ok(industry)
    }

    async fn associate(&self, ind_code: &str, comp_code: &str) -> BizResult<Option<Association>> {
        let mut tables = self.write()?;
        if !tables.industries.contains_key(ind_code) {
            return Err(foreign_key_violation(
                "industries_companies",
                "ind_code",
                ind_code,
                "industries",
            ));
        }
        if !tables.companies.contains_key(comp_code) {
            return Err(foreign_key_violation(
                "industries_companies",
                "comp_code",
                comp_code,
                "companies",
            ));
        }

        let inserted = tables
            .associations
            .insert((ind_code.to_string(), comp_code.to_string()));
        if !inserted {
            return Err(AssociationError::AlreadyExists {
                ind_code: ind_code.to_string(),
                comp_code: comp_code.to_string(),
            }
            .into());
        }

        Ok(Some(Association {
            ind_code: ind_code.to_string(),
            comp_code: comp_code.to_string(),
        }))
    }
}

impl Store for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }
}
