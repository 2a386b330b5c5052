//! Purchase Accounting Service: bills, returns, advances, and aging

pub mod advances;
pub mod aging;
pub mod service;

pub use aging::SupplierAgingReport;
pub use service::{AdvanceRequest, PurchaseService};
