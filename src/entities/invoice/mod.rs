//! Invoice resource

pub mod descriptor;
pub mod handlers;
pub mod model;

pub use descriptor::InvoiceDescriptor;
pub use handlers::*;
pub use model::{CreateInvoiceRequest, UpdateInvoiceRequest};
