//! Category/code reference table and its lookup indices

use serde::{Deserialize, Serialize};

use crate::types::CodeEntry;
use crate::utils::cleaning::normalize_program_label;

/// One group of an index: a key and the normalized program labels under it
///
/// The key is `None` when the reference table left the code or category cell
/// blank; such groups are kept and observable rather than discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeGroup {
    /// Code or category value, `None` for blank cells
    pub key: Option<String>,
    /// Normalized program labels grouped under the key
    pub programs: Vec<String>,
}

/// Lookup indices built once from the reference table
///
/// Two indices are kept: `code -> [program]` and `category -> [program]`,
/// both in first-appearance order of their keys. Lookups scan in table order
/// and return the first key whose label list contains the program, so when
/// ambiguous reference data lists one program under several keys the first
/// match wins. That tie-break is deterministic and documented, not a
/// canonical choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBook {
    code_index: Vec<CodeGroup>,
    category_index: Vec<CodeGroup>,
}

impl CodeBook {
    /// Build the indices from reference-table entries
    ///
    /// Every program label is normalized (U+00A0 replaced by a plain space,
    /// trailing whitespace trimmed) before grouping, so later comparisons
    /// against matcher output are consistent. No entry is skipped for
    /// malformed values.
    pub fn build(entries: &[CodeEntry]) -> Self {
        let mut code_index: Vec<CodeGroup> = Vec::new();
        let mut category_index: Vec<CodeGroup> = Vec::new();

        for entry in entries {
            let program = normalize_program_label(&entry.program);
            push_grouped(&mut code_index, entry.code.clone(), program.clone());
            push_grouped(&mut category_index, entry.category.clone(), program);
        }

        Self {
            code_index,
            category_index,
        }
    }

    /// Category code for a normalized program label, first match wins
    pub fn code_for(&self, program: &str) -> Option<&str> {
        lookup(&self.code_index, program)
    }

    /// Reporting category for a normalized program label, first match wins
    pub fn category_for(&self, program: &str) -> Option<&str> {
        lookup(&self.category_index, program)
    }

    /// Iterate the code index groups in table order
    pub fn code_groups(&self) -> impl Iterator<Item = &CodeGroup> {
        self.code_index.iter()
    }

    /// Iterate the category index groups in table order
    pub fn category_groups(&self) -> impl Iterator<Item = &CodeGroup> {
        self.category_index.iter()
    }
}

fn push_grouped(index: &mut Vec<CodeGroup>, key: Option<String>, program: String) {
    match index.iter_mut().find(|group| group.key == key) {
        Some(group) => group.programs.push(program),
        None => index.push(CodeGroup {
            key,
            programs: vec![program],
        }),
    }
}

/// First key in table order whose label list contains the program
///
/// Returns `None` both on a genuine miss and when the program grouped under
/// a blank key; neither case is an error.
fn lookup<'a>(index: &'a [CodeGroup], program: &str) -> Option<&'a str> {
    index
        .iter()
        .find(|group| group.programs.iter().any(|p| p == program))
        .and_then(|group| group.key.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(program: &str, code: &str, category: &str) -> CodeEntry {
        CodeEntry::new(
            program.to_string(),
            Some(code.to_string()),
            Some(category.to_string()),
        )
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let book = CodeBook::build(&[
            entry("Yoga Class", "A1", "Fitness"),
            entry("Pottery Workshop", "B2", "Arts"),
        ]);

        assert_eq!(book.code_for("Yoga Class"), Some("A1"));
        assert_eq!(book.category_for("Yoga Class"), Some("Fitness"));
        assert_eq!(book.code_for("Nonexistent"), None);
        assert_eq!(book.category_for("Nonexistent"), None);
    }

    #[test]
    fn test_labels_normalized_at_build() {
        let book = CodeBook::build(&[
            entry("Yoga Class   ", "A1", "Fitness"),
            entry("Pottery\u{a0}Workshop", "B2", "Arts"),
        ]);

        assert_eq!(book.code_for("Yoga Class"), Some("A1"));
        assert_eq!(book.code_for("Pottery Workshop"), Some("B2"));
    }

    #[test]
    fn test_first_match_tie_break() {
        // Ambiguous reference data: one program under two codes. The first
        // key in table order wins, reproducibly.
        let book = CodeBook::build(&[
            entry("Yoga Class", "A1", "Fitness"),
            entry("Yoga Class", "Z9", "Wellness"),
        ]);

        assert_eq!(book.code_for("Yoga Class"), Some("A1"));
        assert_eq!(book.category_for("Yoga Class"), Some("Fitness"));
    }

    #[test]
    fn test_blank_key_grouped_not_discarded() {
        let book = CodeBook::build(&[CodeEntry::new("Orphan Program".to_string(), None, None)]);

        // Lookup resolves to nothing, but the group is observable.
        assert_eq!(book.code_for("Orphan Program"), None);
        let blank: Vec<_> = book.code_groups().filter(|g| g.key.is_none()).collect();
        assert_eq!(blank.len(), 1);
        assert_eq!(blank[0].programs, vec!["Orphan Program".to_string()]);
    }

    #[test]
    fn test_shared_code_groups_labels_together() {
        let book = CodeBook::build(&[
            entry("Yoga Class", "A1", "Fitness"),
            entry("Pilates", "A1", "Fitness"),
        ]);

        let group = book
            .code_groups()
            .find(|g| g.key.as_deref() == Some("A1"))
            .unwrap();
        assert_eq!(group.programs.len(), 2);
        assert_eq!(book.code_for("Pilates"), Some("A1"));
    }

    #[test]
    fn test_empty_table_yields_no_matches() {
        let book = CodeBook::build(&[]);
        assert_eq!(book.code_for("Anything"), None);
        assert_eq!(book.category_groups().count(), 0);
    }
}
