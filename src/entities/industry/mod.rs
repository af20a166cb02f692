//! Industry resource and the industry/company association

pub mod descriptor;
pub mod handlers;
pub mod model;

pub use descriptor::IndustryDescriptor;
pub use handlers::*;
pub use model::{AssociateCompanyRequest, CreateIndustryRequest};
