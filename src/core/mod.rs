//! Core module containing the domain model, errors and gateway traits

pub mod error;
pub mod model;
pub mod payment;
pub mod slug;
pub mod store;
pub mod validation;

pub use error::{BizError, BizResult};
pub use model::{
    Association, Company, CompanyChanges, CompanyDetail, CompanySummary, Industry,
    IndustryCompanies, Invoice, InvoiceDetail, NewInvoice,
};
pub use payment::{InvoiceUpdate, PaidDatePolicy, PaymentState};
pub use store::{CompanyStore, IndustryStore, InvoiceStore, Store};
