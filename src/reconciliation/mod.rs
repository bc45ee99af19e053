//! Reconciliation engine matching gateway exports against session ledgers
//!
//! The engine runs one batch pass: filter the gateway export to the eligible
//! window, resolve each transaction's program from its matched ledger lines,
//! classify it through the [`CodeBook`], verify financial consistency, and
//! assemble the ordered report. Per-transaction work is pure and fans out
//! across worker threads.

pub mod checker;
pub mod matcher;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::codebook::CodeBook;
use crate::report::{ReconciliationReport, ReportBuilder, ReportOptions, ReportSummary};
use crate::traits::{NoopProgress, ProgressObserver, ReconciliationSource, ReportExporter};
use crate::types::*;

use checker::{Anomaly, AnomalyKind, ConsistencyResult};
use matcher::ProgramResolution;

/// Cooperative cancellation handle shared between a caller and a running
/// batch
///
/// Workers check the flag between transactions. Once tripped, the run
/// terminates with [`ReconError::Cancelled`] rather than producing a
/// silently truncated report.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create a new, untripped flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the batch holding this flag
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The batch reconciliation engine
///
/// Holds the run configuration: output-column options, a progress observer
/// notified once per processed transaction, a cancellation flag, and the
/// worker-thread count for the fan-out.
pub struct ReconciliationEngine {
    options: ReportOptions,
    progress: Arc<dyn ProgressObserver>,
    cancel: CancellationFlag,
    worker_count: usize,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconciliationEngine {
    /// Create an engine with default options and no progress reporting
    pub fn new() -> Self {
        Self {
            options: ReportOptions::default(),
            progress: Arc::new(NoopProgress),
            cancel: CancellationFlag::new(),
            worker_count: thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
        }
    }

    /// Set the output-column options
    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    /// Attach a progress observer
    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    /// Attach a cancellation flag; callers keep a clone to trip it
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Override the number of worker threads used for the fan-out
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count.max(1);
        self
    }

    /// Run one reconciliation batch over fully materialized inputs
    ///
    /// Transactions are filtered to the eligible set (captured, not failed,
    /// created inside `window`), matched against the ledger lines sharing
    /// their payment reference, and reconciled independently. Output rows
    /// are ordered by session date; re-running on identical inputs yields
    /// identical row order and content.
    pub fn reconcile(
        &self,
        transactions: &[GatewayTransaction],
        ledger_lines: &[LedgerLine],
        code_entries: &[CodeEntry],
        window: &DateWindow,
    ) -> ReconResult<ReconciliationReport> {
        let codebook = CodeBook::build(code_entries);
        let builder = ReportBuilder::new(self.options);

        let eligible: Vec<&GatewayTransaction> = transactions
            .iter()
            .filter(|txn| txn.is_reportable() && window.contains(txn.created_date))
            .collect();

        let mut index: HashMap<&str, Vec<&LedgerLine>> = HashMap::new();
        for line in ledger_lines {
            index.entry(line.payment_ref.as_str()).or_default().push(line);
        }

        let total = eligible.len();
        let completed = AtomicUsize::new(0);
        let mut outcomes: Vec<(ReconciledRow, ConsistencyResult)> = Vec::with_capacity(total);

        if total > 0 {
            let workers = self.worker_count.min(total);
            let chunk_size = total.div_ceil(workers);

            // Contiguous chunks, joined in spawn order, keep the eligible
            // input order intact.
            let chunk_results = thread::scope(|scope| {
                let handles: Vec<_> = eligible
                    .chunks(chunk_size)
                    .map(|chunk| {
                        let index = &index;
                        let codebook = &codebook;
                        let builder = &builder;
                        let completed = &completed;
                        scope.spawn(move || {
                            self.process_chunk(chunk, index, codebook, builder, completed, total)
                        })
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|handle| handle.join().expect("reconciliation worker panicked"))
                    .collect::<Vec<_>>()
            });

            for chunk in chunk_results {
                outcomes.extend(chunk?);
            }
        }

        let (rows, consistency): (Vec<_>, Vec<_>) = outcomes.into_iter().unzip();
        let summary = ReportSummary::summarize(&rows, &consistency);

        Ok(ReconciliationReport {
            run_id: uuid::Uuid::new_v4(),
            generated_at: chrono::Utc::now().naive_utc(),
            window: *window,
            rows: builder.finalize(rows),
            consistency,
            summary,
        })
    }

    fn process_chunk(
        &self,
        transactions: &[&GatewayTransaction],
        index: &HashMap<&str, Vec<&LedgerLine>>,
        codebook: &CodeBook,
        builder: &ReportBuilder,
        completed: &AtomicUsize,
        total: usize,
    ) -> ReconResult<Vec<(ReconciledRow, ConsistencyResult)>> {
        let mut outcomes = Vec::with_capacity(transactions.len());

        for txn in transactions {
            if self.cancel.is_cancelled() {
                return Err(ReconError::Cancelled);
            }

            let lines = index.get(txn.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            outcomes.push(self.process_transaction(txn, lines, codebook, builder));

            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            self.progress.on_transaction(done, total);
        }

        Ok(outcomes)
    }

    fn process_transaction(
        &self,
        transaction: &GatewayTransaction,
        lines: &[&LedgerLine],
        codebook: &CodeBook,
        builder: &ReportBuilder,
    ) -> (ReconciledRow, ConsistencyResult) {
        let resolution = matcher::resolve_program(lines);
        let mut result = checker::verify(transaction, lines);

        let (category, category_code) = match resolution.program.as_deref() {
            Some(program) => (
                codebook.category_for(program).map(str::to_string),
                codebook.code_for(program).map(str::to_string),
            ),
            None => (None, None),
        };

        self.note_resolution_findings(&resolution, &category, &category_code, &mut result);

        let row = builder.build_row(transaction, &resolution, category, category_code);
        (row, result)
    }

    /// Append informational findings the netting check cannot see
    ///
    /// These never flip a `Verified` status; the status tracks the financial
    /// check alone.
    fn note_resolution_findings(
        &self,
        resolution: &ProgramResolution,
        category: &Option<String>,
        category_code: &Option<String>,
        result: &mut ConsistencyResult,
    ) {
        if resolution.ambiguous {
            result.anomalies.push(Anomaly {
                payment_ref: result.payment_ref.clone(),
                kind: AnomalyKind::AmbiguousProgram,
            });
        } else if let Some(program) = &resolution.program {
            if category.is_none() && category_code.is_none() {
                result.anomalies.push(Anomaly {
                    payment_ref: result.payment_ref.clone(),
                    kind: AnomalyKind::LookupMiss {
                        program: program.clone(),
                    },
                });
            }
        }
    }
}

/// High-level orchestrator tying an input source to the engine
///
/// Loads the three tables from the source, runs the batch, and optionally
/// hands the finished report to an exporter. The reference table is loaded
/// first: its absence is the one batch-fatal data failure and is surfaced
/// before any matching begins.
pub struct Reconciler<S: ReconciliationSource> {
    source: S,
    engine: ReconciliationEngine,
}

impl<S: ReconciliationSource> Reconciler<S> {
    /// Create a reconciler with a default engine
    pub fn new(source: S) -> Self {
        Self {
            source,
            engine: ReconciliationEngine::new(),
        }
    }

    /// Create a reconciler around a configured engine
    pub fn with_engine(source: S, engine: ReconciliationEngine) -> Self {
        Self { source, engine }
    }

    /// Load inputs and run one reconciliation batch
    pub async fn run(&self, window: &DateWindow) -> ReconResult<ReconciliationReport> {
        let code_entries = self
            .source
            .code_entries()
            .await
            .map_err(|e| ReconError::CodeTableUnavailable(e.to_string()))?;
        let transactions = self.source.gateway_transactions().await?;
        let ledger_lines = self.source.ledger_lines().await?;

        self.engine
            .reconcile(&transactions, &ledger_lines, &code_entries, window)
    }

    /// Run one batch and hand the report to an exporter
    pub async fn run_and_export<E: ReportExporter>(
        &self,
        window: &DateWindow,
        exporter: &mut E,
    ) -> ReconResult<ReconciliationReport> {
        let report = self.run(window).await?;
        exporter.export(&report).await?;
        Ok(report)
    }
}
