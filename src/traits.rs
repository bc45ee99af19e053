//! Traits for collaborator abstraction and extensibility

use async_trait::async_trait;

use crate::report::ReconciliationReport;
use crate::types::*;

/// Input-side collaborator supplying already-parsed tabular data
///
/// The core performs no file or network access itself; whatever reads and
/// type-coerces the gateway export, the session ledger, and the reference
/// table implements this trait (CSV files, spreadsheets, a database, an
/// in-memory fixture for tests).
#[async_trait]
pub trait ReconciliationSource: Send + Sync {
    /// Load the gateway transaction export
    async fn gateway_transactions(&self) -> ReconResult<Vec<GatewayTransaction>>;

    /// Load the internal session ledger lines
    async fn ledger_lines(&self) -> ReconResult<Vec<LedgerLine>>;

    /// Load the category/code reference table
    ///
    /// A failure here is the one batch-fatal data condition: no program can
    /// resolve to a category without the table, so the run stops before any
    /// matching begins.
    async fn code_entries(&self) -> ReconResult<Vec<CodeEntry>>;
}

/// Output-side collaborator consuming the finished report
///
/// The engine hands over the ordered rows and consistency results verbatim;
/// serialization format, sheet naming, and file placement are the
/// exporter's business.
#[async_trait]
pub trait ReportExporter: Send + Sync {
    /// Persist or transmit a finished reconciliation report
    async fn export(&mut self, report: &ReconciliationReport) -> ReconResult<()>;
}

/// Per-transaction progress hook
///
/// Invoked exactly once per processed transaction with a monotonically
/// increasing completed count and the eligible total. There is no ordering
/// guarantee relative to other transactions' notifications; implementations
/// must be safe to call from multiple worker threads.
pub trait ProgressObserver: Send + Sync {
    /// Called after one transaction has been fully reconciled
    fn on_transaction(&self, completed: usize, total: usize);
}

/// Default observer that discards progress notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_transaction(&self, _completed: usize, _total: usize) {}
}
