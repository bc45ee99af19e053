//! Report row assembly and batch finalization

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reconciliation::checker::{Anomaly, ConsistencyResult, ConsistencyStatus};
use crate::reconciliation::matcher::ProgramResolution;
use crate::types::{DateWindow, GatewayTransaction, ReconciledRow};

/// Output-column configuration
///
/// The gateway transaction date was present in some historical report
/// layouts and absent in others; one flag replaces those parallel variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Carry the raw gateway `created_date` on every row
    pub include_transaction_date: bool,
}

/// Assembles output rows and orders the finished table
///
/// Pure assembly: all lookup and verification logic happens before a row
/// reaches the builder.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    options: ReportOptions,
}

impl ReportBuilder {
    /// Create a builder with the given column options
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Assemble one output row from a transaction and its resolution
    pub fn build_row(
        &self,
        transaction: &GatewayTransaction,
        resolution: &ProgramResolution,
        category: Option<String>,
        category_code: Option<String>,
    ) -> ReconciledRow {
        ReconciledRow {
            session_date: resolution.session_date,
            category,
            program: resolution.program.clone(),
            category_code,
            amount: transaction.amount.clone(),
            fee: transaction.fee.clone(),
            amount_after_fees: transaction.amount_after_fees(),
            payment_ref: transaction.id.clone(),
            transaction_date: self
                .options
                .include_transaction_date
                .then_some(transaction.created_date),
        }
    }

    /// Order the finished table by session date ascending
    ///
    /// The sort is stable, so rows sharing a session date keep their input
    /// order. Rows without a session date sort last; that placement is a
    /// deliberate policy, not inherited null behavior.
    pub fn finalize(&self, mut rows: Vec<ReconciledRow>) -> Vec<ReconciledRow> {
        rows.sort_by_key(|row| (row.session_date.is_none(), row.session_date));
        rows
    }
}

/// Aggregate counts over one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Eligible transactions processed
    pub transactions: usize,
    /// Transactions whose lines netted to zero with a settlement present
    pub verified: usize,
    /// Transactions with at least one netting anomaly
    pub flagged: usize,
    /// Refunded transactions, skipped by the netting check
    pub refunds_unverified: usize,
    /// Rows emitted without a resolved program
    pub unresolved_programs: usize,
    /// Total findings across all transactions
    pub anomalies: usize,
}

impl ReportSummary {
    /// Tally a finished batch
    pub fn summarize(rows: &[ReconciledRow], results: &[ConsistencyResult]) -> Self {
        let mut verified = 0;
        let mut flagged = 0;
        let mut refunds_unverified = 0;
        let mut anomalies = 0;

        for result in results {
            match result.status {
                ConsistencyStatus::Verified => verified += 1,
                ConsistencyStatus::Flagged => flagged += 1,
                ConsistencyStatus::RefundUnverified { .. } => refunds_unverified += 1,
            }
            anomalies += result.anomalies.len();
        }

        Self {
            transactions: rows.len(),
            verified,
            flagged,
            refunds_unverified,
            unresolved_programs: rows.iter().filter(|row| row.program.is_none()).count(),
            anomalies,
        }
    }
}

/// The finished artifact handed to the export collaborator
///
/// Rows are ordered; consistency results keep processing order. The report
/// chooses no file format; serialization belongs to the exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Identity of this run
    pub run_id: Uuid,
    /// When the report was assembled (UTC)
    pub generated_at: NaiveDateTime,
    /// The date window the batch was filtered to
    pub window: DateWindow,
    /// Ordered output rows, one per eligible transaction
    pub rows: Vec<ReconciledRow>,
    /// Per-transaction consistency verdicts and findings
    pub consistency: Vec<ConsistencyResult>,
    /// Aggregate counts
    pub summary: ReportSummary,
}

impl ReconciliationReport {
    /// All findings across the batch, flattened for anomaly-report consumers
    pub fn anomalies(&self) -> impl Iterator<Item = &Anomaly> {
        self.consistency.iter().flat_map(|r| r.anomalies.iter())
    }
}
