//! In-memory input source for testing and development

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::traits::ReconciliationSource;
use crate::types::*;

/// In-memory [`ReconciliationSource`] implementation
///
/// Holds the three input tables behind shared locks so tests and demos can
/// stage data without touching files. The code table can be removed to
/// exercise the batch-fatal unavailable-table path.
#[derive(Debug, Clone)]
pub struct MemorySource {
    transactions: Arc<RwLock<Vec<GatewayTransaction>>>,
    lines: Arc<RwLock<Vec<LedgerLine>>>,
    entries: Arc<RwLock<Option<Vec<CodeEntry>>>>,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    /// Create an empty source with an empty (but present) code table
    pub fn new() -> Self {
        Self {
            transactions: Arc::new(RwLock::new(Vec::new())),
            lines: Arc::new(RwLock::new(Vec::new())),
            entries: Arc::new(RwLock::new(Some(Vec::new()))),
        }
    }

    /// Create a source pre-loaded with all three tables
    pub fn with_data(
        transactions: Vec<GatewayTransaction>,
        lines: Vec<LedgerLine>,
        entries: Vec<CodeEntry>,
    ) -> Self {
        Self {
            transactions: Arc::new(RwLock::new(transactions)),
            lines: Arc::new(RwLock::new(lines)),
            entries: Arc::new(RwLock::new(Some(entries))),
        }
    }

    /// Stage a gateway transaction
    pub fn push_transaction(&self, transaction: GatewayTransaction) {
        self.transactions.write().unwrap().push(transaction);
    }

    /// Stage a ledger line
    pub fn push_line(&self, line: LedgerLine) {
        self.lines.write().unwrap().push(line);
    }

    /// Stage a reference-table entry
    pub fn push_entry(&self, entry: CodeEntry) {
        let mut guard = self.entries.write().unwrap();
        match guard.as_mut() {
            Some(entries) => entries.push(entry),
            None => *guard = Some(vec![entry]),
        }
    }

    /// Drop the code table entirely, simulating an unreadable reference file
    pub fn remove_code_table(&self) {
        *self.entries.write().unwrap() = None;
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.transactions.write().unwrap().clear();
        self.lines.write().unwrap().clear();
        *self.entries.write().unwrap() = Some(Vec::new());
    }
}

#[async_trait]
impl ReconciliationSource for MemorySource {
    async fn gateway_transactions(&self) -> ReconResult<Vec<GatewayTransaction>> {
        Ok(self.transactions.read().unwrap().clone())
    }

    async fn ledger_lines(&self) -> ReconResult<Vec<LedgerLine>> {
        Ok(self.lines.read().unwrap().clone())
    }

    async fn code_entries(&self) -> ReconResult<Vec<CodeEntry>> {
        self.entries
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| ReconError::Source("code table not loaded".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_staged_data_round_trips() {
        let source = MemorySource::new();
        source.push_transaction(GatewayTransaction::new(
            "pi_1".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            BigDecimal::from(100),
            BigDecimal::from(3),
            BigDecimal::from(0),
        ));
        source.push_line(LedgerLine::new(
            "pi_1".to_string(),
            "Yoga Class".to_string(),
            None,
            "100.00".to_string(),
        ));
        source.push_entry(CodeEntry::new(
            "Yoga Class".to_string(),
            Some("A1".to_string()),
            Some("Fitness".to_string()),
        ));

        assert_eq!(source.gateway_transactions().await.unwrap().len(), 1);
        assert_eq!(source.ledger_lines().await.unwrap().len(), 1);
        assert_eq!(source.code_entries().await.unwrap().len(), 1);

        source.clear();
        assert!(source.gateway_transactions().await.unwrap().is_empty());
        assert!(source.code_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_removed_code_table_errors() {
        let source = MemorySource::new();
        source.remove_code_table();

        assert!(matches!(
            source.code_entries().await,
            Err(ReconError::Source(_))
        ));
    }
}
