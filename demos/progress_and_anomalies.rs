//! Progress reporting and anomaly inspection example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;
use std::sync::Arc;

use reconcile_core::utils::MemorySource;
use reconcile_core::{
    CodeEntry, ConsistencyStatus, DateWindow, GatewayTransaction, LedgerLine, ProgressObserver,
    ReconciliationEngine, Reconciler, ReportOptions, SETTLEMENT_LABEL,
};

/// Observer standing in for a progress-bar widget
struct ConsoleProgress;

impl ProgressObserver for ConsoleProgress {
    fn on_transaction(&self, completed: usize, total: usize) {
        println!("  ⏳ {completed}/{total} transactions reconciled");
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Reconcile Core - Progress & Anomalies Example\n");

    let source = MemorySource::new();

    // A clean transaction.
    source.push_transaction(GatewayTransaction::new(
        "pi_clean".to_string(),
        date(2024, 1, 8),
        BigDecimal::from_str("45.00")?,
        BigDecimal::from_str("1.60")?,
        BigDecimal::from(0),
    ));
    source.push_line(LedgerLine::new(
        "pi_clean".to_string(),
        SETTLEMENT_LABEL.to_string(),
        None,
        "-45.00".to_string(),
    ));
    source.push_line(LedgerLine::new(
        "pi_clean".to_string(),
        "Choir Rehearsal".to_string(),
        Some(date(2024, 1, 15)),
        "45.00".to_string(),
    ));

    // A transaction whose ledger lines do not net to zero.
    source.push_transaction(GatewayTransaction::new(
        "pi_short".to_string(),
        date(2024, 1, 9),
        BigDecimal::from_str("45.00")?,
        BigDecimal::from_str("1.60")?,
        BigDecimal::from(0),
    ));
    source.push_line(LedgerLine::new(
        "pi_short".to_string(),
        SETTLEMENT_LABEL.to_string(),
        None,
        "-45.00".to_string(),
    ));
    source.push_line(LedgerLine::new(
        "pi_short".to_string(),
        "Choir Rehearsal".to_string(),
        Some(date(2024, 1, 15)),
        "50.00".to_string(),
    ));

    // A refunded transaction: the netting check is skipped by design.
    let mut refunded = GatewayTransaction::new(
        "pi_refund".to_string(),
        date(2024, 1, 10),
        BigDecimal::from_str("45.00")?,
        BigDecimal::from_str("1.60")?,
        BigDecimal::from(0),
    );
    refunded.amount_refunded = BigDecimal::from_str("45.00")?;
    source.push_transaction(refunded);

    source.push_entry(CodeEntry::new(
        "Choir Rehearsal".to_string(),
        Some("C3".to_string()),
        Some("Music".to_string()),
    ));

    let engine = ReconciliationEngine::new()
        .with_options(ReportOptions {
            include_transaction_date: true,
        })
        .with_progress(Arc::new(ConsoleProgress));

    println!("⚙️  Reconciling with progress reporting:");
    let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 31))?;
    let report = Reconciler::with_engine(source, engine).run(&window).await?;

    println!("\n🚩 Consistency results:");
    for result in &report.consistency {
        let status = match &result.status {
            ConsistencyStatus::Verified => "verified".to_string(),
            ConsistencyStatus::Flagged => "flagged".to_string(),
            ConsistencyStatus::RefundUnverified { amount_refunded } => {
                format!("refund of {amount_refunded} - not verified")
            }
        };
        println!("  {} → {}", result.payment_ref, status);
        for anomaly in &result.anomalies {
            println!("      ⚠️  {:?}", anomaly.kind);
        }
    }

    println!(
        "\n📊 {} verified, {} flagged, {} refunds unverified, {} findings total",
        report.summary.verified,
        report.summary.flagged,
        report.summary.refunds_unverified,
        report.summary.anomalies
    );

    Ok(())
}
