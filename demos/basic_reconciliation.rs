//! Basic reconciliation usage example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;

use reconcile_core::utils::MemorySource;
use reconcile_core::{
    CodeEntry, DateWindow, GatewayTransaction, LedgerLine, Reconciler, SETTLEMENT_LABEL,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Reconcile Core - Basic Reconciliation Example\n");

    // 1. Stage the three input tables the I/O layer would normally parse
    println!("📥 Staging gateway export, session ledger, and code table...");
    let source = MemorySource::new();

    source.push_transaction(GatewayTransaction::new(
        "pi_1001".to_string(),
        date(2024, 1, 10),
        BigDecimal::from_str("100.00")?,
        BigDecimal::from_str("3.20")?,
        BigDecimal::from(0),
    ));
    source.push_transaction(GatewayTransaction::new(
        "pi_1002".to_string(),
        date(2024, 1, 12),
        BigDecimal::from_str("60.00")?,
        BigDecimal::from_str("2.10")?,
        BigDecimal::from(0),
    ));

    // Each payment reference carries a settlement entry and a content entry.
    source.push_line(LedgerLine::new(
        "pi_1001".to_string(),
        SETTLEMENT_LABEL.to_string(),
        None,
        "-$100.00".to_string(),
    ));
    source.push_line(LedgerLine::new(
        "pi_1001".to_string(),
        "Yoga Class".to_string(),
        Some(date(2024, 2, 5)),
        "$100.00".to_string(),
    ));
    source.push_line(LedgerLine::new(
        "pi_1002".to_string(),
        SETTLEMENT_LABEL.to_string(),
        None,
        "-$60.00".to_string(),
    ));
    source.push_line(LedgerLine::new(
        "pi_1002".to_string(),
        "Pottery Workshop".to_string(),
        Some(date(2024, 1, 20)),
        "$60.00".to_string(),
    ));

    source.push_entry(CodeEntry::new(
        "Yoga Class".to_string(),
        Some("A1".to_string()),
        Some("Fitness".to_string()),
    ));
    source.push_entry(CodeEntry::new(
        "Pottery Workshop".to_string(),
        Some("B2".to_string()),
        Some("Arts".to_string()),
    ));
    println!("  ✓ 2 transactions, 4 ledger lines, 2 reference entries\n");

    // 2. Run the batch over January
    println!("⚙️  Reconciling January 2024...");
    let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 31))?;
    let report = Reconciler::new(source).run(&window).await?;
    println!("  ✓ Run {} finished\n", report.run_id);

    // 3. Print the ordered report
    println!("📋 Reconciled rows (ordered by session date):");
    for row in &report.rows {
        println!(
            "  {} | {} | {} ({}) | net {}",
            row.session_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "----------".to_string()),
            row.payment_ref,
            row.program.as_deref().unwrap_or("<unresolved>"),
            row.category_code.as_deref().unwrap_or("-"),
            row.amount_after_fees,
        );
    }

    println!(
        "\n📊 Summary: {} transactions, {} verified, {} flagged",
        report.summary.transactions, report.summary.verified, report.summary.flagged
    );

    Ok(())
}
