//! Program and session-date resolution for one payment reference

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::LedgerLine;
use crate::utils::cleaning::normalize_program_label;

/// Ledger label marking the payment-application entry rather than the
/// purchased item
pub const SETTLEMENT_LABEL: &str = "Payment (Thank you)";

/// Sentinel program emitted when a payment reference carries two or more
/// distinct content labels
///
/// A category/code lookup against this sentinel yields `None` unless the
/// reference table literally contains it; callers must not treat it as a
/// real, lookup-eligible program.
pub const MULTIPLE_PROGRAMS_LABEL: &str = "More than one unique program";

/// Outcome of resolving the ledger lines matched to one gateway transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramResolution {
    /// Resolved program label, the ambiguity sentinel, or `None` when the
    /// reference had no content lines
    pub program: Option<String>,
    /// Session date taken from the first content line
    pub session_date: Option<NaiveDate>,
    /// Whether the ambiguity sentinel fired
    pub ambiguous: bool,
}

impl ProgramResolution {
    fn unresolved() -> Self {
        Self {
            program: None,
            session_date: None,
            ambiguous: false,
        }
    }
}

/// Whether a ledger line is the settlement entry for its payment
pub fn is_settlement_line(line: &LedgerLine) -> bool {
    normalize_program_label(&line.program) == SETTLEMENT_LABEL
}

/// Resolve the canonical program and session date for one payment reference
///
/// `lines` must be exactly the ledger lines sharing a single payment
/// reference. Settlement lines are set aside; the content lines decide the
/// outcome:
///
/// - no content lines: `(None, None)`, a pure settlement artifact
/// - one distinct content label: that label is the program
/// - two or more distinct labels: the [`MULTIPLE_PROGRAMS_LABEL`] sentinel
///
/// The session date always comes from the first content line, sentinel case
/// included. Labels are compared after normalization, so trailing whitespace
/// and non-breaking spaces never split a program into two.
///
/// Pure function over the given slice; safe to run per-transaction in
/// parallel.
pub fn resolve_program(lines: &[&LedgerLine]) -> ProgramResolution {
    let content: Vec<&LedgerLine> = lines
        .iter()
        .copied()
        .filter(|line| !is_settlement_line(line))
        .collect();

    let Some(first) = content.first() else {
        return ProgramResolution::unresolved();
    };
    let session_date = first.session_date;

    let mut distinct: Vec<String> = Vec::new();
    for line in &content {
        let label = normalize_program_label(&line.program);
        if !distinct.contains(&label) {
            distinct.push(label);
        }
    }

    if distinct.len() == 1 {
        ProgramResolution {
            program: Some(distinct.remove(0)),
            session_date,
            ambiguous: false,
        }
    } else {
        ProgramResolution {
            program: Some(MULTIPLE_PROGRAMS_LABEL.to_string()),
            session_date,
            ambiguous: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn line(program: &str, session_date: Option<NaiveDate>, amount: &str) -> LedgerLine {
        LedgerLine::new(
            "pi_1".to_string(),
            program.to_string(),
            session_date,
            amount.to_string(),
        )
    }

    #[test]
    fn test_single_program_with_settlement() {
        let settlement = line(SETTLEMENT_LABEL, None, "-100.00");
        let content = line("Yoga Class", Some(date(2024, 1, 5)), "100.00");
        let resolution = resolve_program(&[&settlement, &content]);

        assert_eq!(resolution.program.as_deref(), Some("Yoga Class"));
        assert_eq!(resolution.session_date, Some(date(2024, 1, 5)));
        assert!(!resolution.ambiguous);
    }

    #[test]
    fn test_settlement_only_is_unresolved() {
        let settlement = line(SETTLEMENT_LABEL, None, "-25.00");
        let resolution = resolve_program(&[&settlement]);

        assert_eq!(resolution.program, None);
        assert_eq!(resolution.session_date, None);
        assert!(!resolution.ambiguous);
    }

    #[test]
    fn test_no_lines_is_unresolved() {
        let resolution = resolve_program(&[]);
        assert_eq!(resolution.program, None);
        assert_eq!(resolution.session_date, None);
    }

    #[test]
    fn test_multiple_distinct_programs_yield_sentinel() {
        let settlement = line(SETTLEMENT_LABEL, None, "-150.00");
        let a = line("Yoga Class", Some(date(2024, 1, 5)), "50.00");
        let b = line("Pottery Workshop", Some(date(2024, 1, 6)), "50.00");
        let c = line("Choir Rehearsal", Some(date(2024, 1, 7)), "50.00");
        let resolution = resolve_program(&[&settlement, &a, &b, &c]);

        assert_eq!(resolution.program.as_deref(), Some(MULTIPLE_PROGRAMS_LABEL));
        assert_eq!(resolution.session_date, Some(date(2024, 1, 5)));
        assert!(resolution.ambiguous);
    }

    #[test]
    fn test_repeated_label_counts_once() {
        // Two installments of the same program are one distinct label.
        let settlement = line(SETTLEMENT_LABEL, None, "-200.00");
        let first = line("Yoga Class", Some(date(2024, 1, 5)), "100.00");
        let second = line("Yoga Class", Some(date(2024, 1, 12)), "100.00");
        let resolution = resolve_program(&[&settlement, &first, &second]);

        assert_eq!(resolution.program.as_deref(), Some("Yoga Class"));
        assert_eq!(resolution.session_date, Some(date(2024, 1, 5)));
        assert!(!resolution.ambiguous);
    }

    #[test]
    fn test_whitespace_variants_collapse_to_one_label() {
        let settlement = line("Payment (Thank you)   ", None, "-80.00");
        let a = line("Yoga Class ", Some(date(2024, 2, 1)), "40.00");
        let b = line("Yoga\u{a0}Class", Some(date(2024, 2, 8)), "40.00");
        let resolution = resolve_program(&[&settlement, &a, &b]);

        assert_eq!(resolution.program.as_deref(), Some("Yoga Class"));
        assert!(!resolution.ambiguous);
    }

    #[test]
    fn test_two_line_case_matches_general_rule() {
        // Historically a fast path: exactly two lines, one of them the
        // settlement entry. Must be indistinguishable from the general
        // single-distinct-label outcome.
        let settlement = line(SETTLEMENT_LABEL, None, "-60.00");
        let content = line("Pottery Workshop", Some(date(2024, 3, 2)), "60.00");

        let fast = resolve_program(&[&settlement, &content]);
        let general = resolve_program(&[&content]);

        assert_eq!(fast.program, general.program);
        assert_eq!(fast.session_date, general.session_date);
        assert_eq!(fast.ambiguous, general.ambiguous);
    }

    #[test]
    fn test_content_without_settlement_still_resolves() {
        let content = line("Choir Rehearsal", Some(date(2024, 4, 1)), "30.00");
        let resolution = resolve_program(&[&content]);

        assert_eq!(resolution.program.as_deref(), Some("Choir Rehearsal"));
        assert_eq!(resolution.session_date, Some(date(2024, 4, 1)));
    }
}
