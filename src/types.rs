//! Core types and data structures for the reconciliation system

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Settlement state of a gateway transaction as reported by the export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Payment completed and settled
    Succeeded,
    /// Payment still in flight at export time
    Pending,
    /// Payment failed; never enters the reconciliation pass
    Failed,
}

/// One captured/settled payment event from the gateway export
///
/// Immutable once loaded. Rows without a payment reference are dropped by
/// the I/O collaborator before they reach the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayTransaction {
    /// Unique payment reference correlating ledger lines to this transaction
    pub id: String,
    /// Date the gateway recorded the payment
    pub created_date: NaiveDate,
    /// Gross captured amount
    pub amount: BigDecimal,
    /// Gateway processing fee
    pub fee: BigDecimal,
    /// Amount refunded back to the payer; non-zero skips the netting check
    pub amount_refunded: BigDecimal,
    /// Whether the payment was actually captured
    pub captured: bool,
    /// Settlement state at export time
    pub status: TransactionStatus,
}

impl GatewayTransaction {
    /// Create a captured, succeeded transaction
    pub fn new(
        id: String,
        created_date: NaiveDate,
        amount: BigDecimal,
        fee: BigDecimal,
        amount_refunded: BigDecimal,
    ) -> Self {
        Self {
            id,
            created_date,
            amount,
            fee,
            amount_refunded,
            captured: true,
            status: TransactionStatus::Succeeded,
        }
    }

    /// Whether this transaction belongs in a reconciliation report at all
    ///
    /// Uncaptured and failed payments are excluded before matching begins.
    pub fn is_reportable(&self) -> bool {
        self.captured && self.status != TransactionStatus::Failed
    }

    /// Net amount the gateway pays out for this transaction
    pub fn amount_after_fees(&self) -> BigDecimal {
        &self.amount - &self.fee
    }
}

/// One internal ledger entry
///
/// `payment_ref` is a foreign key to [`GatewayTransaction::id`] and is not
/// unique; zero or more lines exist per payment reference. The `amount` is
/// kept as the raw currency text from the ledger export and only coerced to
/// a decimal inside the consistency check, so one malformed value downgrades
/// a single line instead of failing the load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Payment reference shared with the gateway transaction
    pub payment_ref: String,
    /// Free-text program label; may carry trailing whitespace or U+00A0
    pub program: String,
    /// Session date of the purchased program, when the ledger recorded one
    pub session_date: Option<NaiveDate>,
    /// Signed amount as raw currency text, gateway-fee-exclusive
    pub amount: String,
}

impl LedgerLine {
    /// Create a new ledger line
    pub fn new(
        payment_ref: String,
        program: String,
        session_date: Option<NaiveDate>,
        amount: String,
    ) -> Self {
        Self {
            payment_ref,
            program,
            session_date,
            amount,
        }
    }
}

/// One row of the category/code reference table
///
/// A missing `code` or `category` groups the program under the `None` key of
/// the respective index rather than discarding the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeEntry {
    /// Canonical program label
    pub program: String,
    /// Category code assigned to the program
    pub code: Option<String>,
    /// Reporting category assigned to the program
    pub category: Option<String>,
}

impl CodeEntry {
    /// Create a new reference-table entry
    pub fn new(program: String, code: Option<String>, category: Option<String>) -> Self {
        Self {
            program,
            code,
            category,
        }
    }
}

/// One reconciled output row, exactly one per eligible gateway transaction
///
/// `None` program/category/code is a valid terminal state for transactions
/// whose ledger lines could not resolve a program or whose program has no
/// reference-table entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRow {
    /// Session date resolved from the matched ledger lines
    pub session_date: Option<NaiveDate>,
    /// Reporting category looked up for the resolved program
    pub category: Option<String>,
    /// Resolved program label, or the ambiguity sentinel
    pub program: Option<String>,
    /// Category code looked up for the resolved program
    pub category_code: Option<String>,
    /// Gross gateway amount
    pub amount: BigDecimal,
    /// Gateway fee
    pub fee: BigDecimal,
    /// Always `amount - fee`, exact
    pub amount_after_fees: BigDecimal,
    /// The gateway transaction this row traces to
    pub payment_ref: String,
    /// Raw gateway transaction date, carried only when the report asks for it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<NaiveDate>,
}

/// Inclusive date range used to pre-filter gateway transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Create a window; fails when `start` is after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> ReconResult<Self> {
        if start > end {
            return Err(ReconError::InvalidDateWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day of the window
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether a date falls inside the window, bounds included
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Errors that can occur in the reconciliation system
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    #[error("Code table unavailable: {0}")]
    CodeTableUnavailable(String),
    #[error("Source error: {0}")]
    Source(String),
    #[error("Export error: {0}")]
    Export(String),
    #[error("Invalid date window: start {start} is after end {end}")]
    InvalidDateWindow { start: NaiveDate, end: NaiveDate },
    #[error("Malformed amount: {0:?}")]
    MalformedAmount(String),
    #[error("Reconciliation cancelled")]
    Cancelled,
}

/// Result type for reconciliation operations
pub type ReconResult<T> = Result<T, ReconError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reportable_filtering() {
        let mut txn = GatewayTransaction::new(
            "pi_1".to_string(),
            date(2024, 1, 10),
            BigDecimal::from(100),
            BigDecimal::from(3),
            BigDecimal::from(0),
        );
        assert!(txn.is_reportable());

        txn.captured = false;
        assert!(!txn.is_reportable());

        txn.captured = true;
        txn.status = TransactionStatus::Failed;
        assert!(!txn.is_reportable());
    }

    #[test]
    fn test_amount_after_fees() {
        let txn = GatewayTransaction::new(
            "pi_1".to_string(),
            date(2024, 1, 10),
            BigDecimal::from(100),
            BigDecimal::from(3),
            BigDecimal::from(0),
        );
        assert_eq!(txn.amount_after_fees(), BigDecimal::from(97));
    }

    #[test]
    fn test_date_window_bounds() {
        let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(window.contains(date(2024, 1, 1)));
        assert!(window.contains(date(2024, 1, 31)));
        assert!(!window.contains(date(2024, 2, 1)));
        assert!(!window.contains(date(2023, 12, 31)));
    }

    #[test]
    fn test_date_window_rejects_inverted_range() {
        let result = DateWindow::new(date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(result, Err(ReconError::InvalidDateWindow { .. })));
    }
}
