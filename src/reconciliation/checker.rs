//! Financial consistency verification per gateway transaction

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::reconciliation::matcher::is_settlement_line;
use crate::types::{GatewayTransaction, LedgerLine};
use crate::utils::cleaning::parse_currency_amount;

/// Kinds of per-transaction findings
///
/// Anomalies are reported, never fatal; a flagged transaction still emits
/// its report row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnomalyKind {
    /// Matched ledger-line amounts did not net to zero
    AmountMismatch {
        /// The non-zero net the lines summed to
        net: BigDecimal,
    },
    /// No settlement line was found among the matched ledger lines
    MissingSettlementLine,
    /// A ledger-line amount could not be coerced to a decimal; the line was
    /// excluded from the netting sum
    MalformedAmount {
        /// The raw amount text that failed coercion
        value: String,
    },
    /// The payment reference carried more than one distinct program label
    AmbiguousProgram,
    /// A resolved program appears in neither the code nor the category index
    LookupMiss {
        /// The program that missed
        program: String,
    },
}

/// One finding attached to a transaction's consistency result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    /// The transaction the finding belongs to
    pub payment_ref: String,
    /// What was found
    pub kind: AnomalyKind,
}

/// Outcome of the netting check for one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConsistencyStatus {
    /// Lines netted to zero and a settlement line was present
    Verified,
    /// The netting check found at least one anomaly
    Flagged,
    /// The transaction was refunded; the check was skipped entirely and the
    /// transaction is reported as explicitly unverified
    RefundUnverified {
        /// Amount the gateway refunded
        amount_refunded: BigDecimal,
    },
}

/// Consistency verdict for one gateway transaction
///
/// `status` reflects the financial netting check alone. The engine may
/// append informational anomalies (ambiguous program, lookup miss) without
/// changing the status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyResult {
    /// The transaction this verdict belongs to
    pub payment_ref: String,
    /// Netting-check outcome
    pub status: ConsistencyStatus,
    /// All findings recorded for the transaction
    pub anomalies: Vec<Anomaly>,
}

/// Verify that matched ledger-line amounts are consistent with the
/// transaction
///
/// For a non-refunded transaction every line amount is coerced from its raw
/// currency text and the results are summed; the sum must be exactly zero
/// (the ledger records both the purchase and the payment application). A
/// line whose amount fails coercion is recorded as [`AnomalyKind::MalformedAmount`]
/// and drops out of the sum rather than aborting. The absence of any
/// settlement line is recorded as well.
///
/// A refunded transaction skips the check entirely: refund reconciliation is
/// a known gap, reported as [`ConsistencyStatus::RefundUnverified`] instead
/// of being silently mishandled.
pub fn verify(transaction: &GatewayTransaction, lines: &[&LedgerLine]) -> ConsistencyResult {
    if transaction.amount_refunded != BigDecimal::from(0) {
        return ConsistencyResult {
            payment_ref: transaction.id.clone(),
            status: ConsistencyStatus::RefundUnverified {
                amount_refunded: transaction.amount_refunded.clone(),
            },
            anomalies: Vec::new(),
        };
    }

    let mut anomalies = Vec::new();
    let mut net = BigDecimal::from(0);

    for line in lines {
        match parse_currency_amount(&line.amount) {
            Ok(value) => net += value,
            Err(_) => anomalies.push(Anomaly {
                payment_ref: transaction.id.clone(),
                kind: AnomalyKind::MalformedAmount {
                    value: line.amount.clone(),
                },
            }),
        }
    }

    if net != BigDecimal::from(0) {
        anomalies.push(Anomaly {
            payment_ref: transaction.id.clone(),
            kind: AnomalyKind::AmountMismatch { net },
        });
    }

    if !lines.iter().any(|line| is_settlement_line(line)) {
        anomalies.push(Anomaly {
            payment_ref: transaction.id.clone(),
            kind: AnomalyKind::MissingSettlementLine,
        });
    }

    let status = if anomalies.is_empty() {
        ConsistencyStatus::Verified
    } else {
        ConsistencyStatus::Flagged
    };

    ConsistencyResult {
        payment_ref: transaction.id.clone(),
        status,
        anomalies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::matcher::SETTLEMENT_LABEL;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn txn(refunded: i32) -> GatewayTransaction {
        GatewayTransaction::new(
            "pi_1".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            BigDecimal::from(100),
            BigDecimal::from(3),
            BigDecimal::from(refunded),
        )
    }

    fn line(program: &str, amount: &str) -> LedgerLine {
        LedgerLine::new("pi_1".to_string(), program.to_string(), None, amount.to_string())
    }

    #[test]
    fn test_zero_net_with_settlement_verifies() {
        let settlement = line(SETTLEMENT_LABEL, "-100.00");
        let content = line("Yoga Class", "100.00");
        let result = verify(&txn(0), &[&settlement, &content]);

        assert_eq!(result.status, ConsistencyStatus::Verified);
        assert!(result.anomalies.is_empty());
    }

    #[test]
    fn test_nonzero_net_flags_mismatch() {
        let settlement = line(SETTLEMENT_LABEL, "-100.00");
        let content = line("Yoga Class", "105.00");
        let result = verify(&txn(0), &[&settlement, &content]);

        assert_eq!(result.status, ConsistencyStatus::Flagged);
        assert_eq!(result.anomalies.len(), 1);
        assert_eq!(
            result.anomalies[0].kind,
            AnomalyKind::AmountMismatch {
                net: BigDecimal::from_str("5.00").unwrap()
            }
        );
    }

    #[test]
    fn test_currency_formatting_is_coerced() {
        let settlement = line(SETTLEMENT_LABEL, "-$1,234.50");
        let content = line("Gala Dinner", "$1,234.50");
        let result = verify(&txn(0), &[&settlement, &content]);

        assert_eq!(result.status, ConsistencyStatus::Verified);
    }

    #[test]
    fn test_malformed_amount_downgrades_one_line() {
        let settlement = line(SETTLEMENT_LABEL, "-100.00");
        let good = line("Yoga Class", "100.00");
        let bad = line("Yoga Class", "n/a");
        let result = verify(&txn(0), &[&settlement, &good, &bad]);

        // The malformed line is excluded from the sum, so the rest still
        // nets to zero; only the coercion failure is reported.
        assert_eq!(result.status, ConsistencyStatus::Flagged);
        assert_eq!(result.anomalies.len(), 1);
        assert_eq!(
            result.anomalies[0].kind,
            AnomalyKind::MalformedAmount {
                value: "n/a".to_string()
            }
        );
    }

    #[test]
    fn test_missing_settlement_line_flagged() {
        let a = line("Yoga Class", "50.00");
        let b = line("Yoga Class", "-50.00");
        let result = verify(&txn(0), &[&a, &b]);

        assert_eq!(result.status, ConsistencyStatus::Flagged);
        assert_eq!(result.anomalies.len(), 1);
        assert_eq!(result.anomalies[0].kind, AnomalyKind::MissingSettlementLine);
    }

    #[test]
    fn test_no_lines_reports_missing_settlement_only() {
        let result = verify(&txn(0), &[]);

        assert_eq!(result.status, ConsistencyStatus::Flagged);
        assert_eq!(result.anomalies.len(), 1);
        assert_eq!(result.anomalies[0].kind, AnomalyKind::MissingSettlementLine);
    }

    #[test]
    fn test_refund_skips_check() {
        let content = line("Yoga Class", "999.00");
        let result = verify(&txn(40), &[&content]);

        assert_eq!(
            result.status,
            ConsistencyStatus::RefundUnverified {
                amount_refunded: BigDecimal::from(40)
            }
        );
        assert!(result.anomalies.is_empty());
    }
}
