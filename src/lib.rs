//! # Reconcile Core
//!
//! A batch reconciliation library matching a payment-gateway export against
//! an internal registration/session ledger and producing one categorized
//! financial report.
//!
//! ## Features
//!
//! - **Program resolution**: resolves one canonical program label and
//!   session date per gateway transaction from the ledger lines sharing its
//!   payment reference
//! - **Category classification**: first-match code/category lookup against a
//!   reference table with reproducible tie-breaking
//! - **Consistency checking**: verifies matched amounts net to zero, flags
//!   anomalies without ever aborting the batch, reports refunds as
//!   explicitly unverified
//! - **Ordered reporting**: one row per transaction, stable-sorted by
//!   session date, handed verbatim to an export collaborator
//! - **Parallel batch execution**: per-transaction fan-out with exact
//!   progress notifications and cooperative cancellation
//! - **Source abstraction**: I/O-agnostic design with trait-based input and
//!   export collaborators
//!
//! ## Quick Start
//!
//! ```rust
//! use reconcile_core::{
//!     CodeEntry, DateWindow, GatewayTransaction, LedgerLine, ReconciliationEngine,
//! };
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let window = DateWindow::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
//! )?;
//! let transactions = vec![GatewayTransaction::new(
//!     "pi_1".to_string(),
//!     NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
//!     BigDecimal::from(100),
//!     BigDecimal::from(3),
//!     BigDecimal::from(0),
//! )];
//! let lines: Vec<LedgerLine> = vec![];
//! let codes: Vec<CodeEntry> = vec![];
//!
//! let report = ReconciliationEngine::new().reconcile(&transactions, &lines, &codes, &window)?;
//! assert_eq!(report.rows.len(), 1);
//! # Ok::<(), reconcile_core::ReconError>(())
//! ```

pub mod codebook;
pub mod reconciliation;
pub mod report;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use codebook::*;
pub use reconciliation::checker::*;
pub use reconciliation::matcher::*;
pub use reconciliation::{CancellationFlag, ReconciliationEngine, Reconciler};
pub use report::*;
pub use traits::*;
pub use types::*;
