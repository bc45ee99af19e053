//! Input-scrubbing helpers shared by the matcher, codebook, and checker

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::types::{ReconError, ReconResult};

/// Normalize a free-text program label for comparison
///
/// Ledger exports carry U+00A0 non-breaking spaces and trailing whitespace
/// on otherwise identical labels. Both the matcher and the codebook compare
/// labels only after this pass, so the two sides can never disagree.
pub fn normalize_program_label(label: &str) -> String {
    label.replace('\u{a0}', " ").trim_end().to_string()
}

/// Coerce raw currency text to a decimal
///
/// Strips the dollar sign and thousands separators, trims, and parses the
/// residue. Fails with [`ReconError::MalformedAmount`] when what remains is
/// not numeric; callers downgrade that to a per-line anomaly.
pub fn parse_currency_amount(raw: &str) -> ReconResult<BigDecimal> {
    let cleaned = raw.replace(['$', ','], "");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Err(ReconError::MalformedAmount(raw.to_string()));
    }

    BigDecimal::from_str(cleaned).map_err(|_| ReconError::MalformedAmount(raw.to_string()))
}
