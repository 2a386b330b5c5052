//! # Bookkeeping Core
//!
//! A double-entry bookkeeping and GST-reporting engine:
//!
//! - **Balance Service**: cached current balances plus audit-grade historical
//!   balances reconstructed by journal replay, and trial balance verification
//! - **Purchase Accounting**: purchase bills and returns as canonical
//!   transactions, the supplier advance lifecycle with FIFO allocation, and
//!   supplier aging reports
//! - **Tax Compliance**: GSTR-1 invoice classification, GSTR-3B summary
//!   liability, and cross-reconciliation of the two within tolerance
//! - **Storage abstraction**: trait-based record store and an injected
//!   Transaction Poster contract, so the core is store- and poster-agnostic
//!
//! ## Quick Start
//!
//! ```rust
//! use bookkeeping_core::{BalanceService, MemoryStore};
//!
//! let service = BalanceService::new(MemoryStore::new());
//! // calculate_balance(ledger_id, None) returns the cached balance;
//! // passing a date replays the journal instead.
//! ```

pub mod balance;
pub mod purchases;
pub mod tax;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use balance::{BalanceService, TrialBalanceReport};
pub use purchases::{AdvanceRequest, PurchaseService, SupplierAgingReport};
pub use tax::*;
pub use traits::*;
pub use types::*;
pub use utils::{MemoryPoster, MemoryStore, PosterAccounts};
