//! HTTP resources: companies, invoices and industries
//!
//! Each resource has a `model` module with its request payloads, a
//! `handlers` module and a `descriptor` that registers its routes.

pub mod company;
pub mod industry;
pub mod invoice;

pub use company::CompanyDescriptor;
pub use industry::IndustryDescriptor;
pub use invoice::InvoiceDescriptor;
