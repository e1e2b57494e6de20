//! Turns raw tabular rows into [`Transaction`] records.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::Transaction;
use crate::resolver::ColumnRoles;

const DECORATION_MARKER: &str = "****";
const SUMMARY_MARKER: &str = "STATEMENT SUMMARY";

/// A raw row as read from a spreadsheet or CSV; `None` is an empty cell.
pub type RawRow = Vec<Option<String>>;

/// Star-filled separator rows between statement sections.
pub fn is_decoration_row(marker_cell: &str) -> bool {
    marker_cell.contains(DECORATION_MARKER)
}

/// The trailing balance summary; nothing at or after it is a transaction.
pub fn is_statement_summary(marker_cell: &str) -> bool {
    marker_cell.contains(SUMMARY_MARKER)
}

/// When the statement-summary marker ends row consumption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FooterPolicy {
    /// Stop at the first summary marker.
    #[default]
    Unconditional,
    /// Stop only once a decoration row has been skipped; earlier summary
    /// markers are skipped like decoration.
    AfterDecoration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Record(Transaction),
    Skip,
    Terminate,
}

/// Stateful row normalizer for a single document.
pub struct RowNormalizer<'a> {
    roles: &'a ColumnRoles,
    policy: FooterPolicy,
    seen_decoration: bool,
}

impl<'a> RowNormalizer<'a> {
    pub fn new(roles: &'a ColumnRoles, policy: FooterPolicy) -> Self {
        Self {
            roles,
            policy,
            seen_decoration: false,
        }
    }

    pub fn normalize(&mut self, row: &[Option<String>]) -> RowOutcome {
        let marker = cell(row, Some(self.roles.sentinel_column())).unwrap_or_default();
        if is_decoration_row(marker) {
            self.seen_decoration = true;
            return RowOutcome::Skip;
        }
        let narration = cell(row, Some(self.roles.narration)).unwrap_or_default();
        // Footer text sometimes spills out of the date column into the
        // narration cell.
        if is_statement_summary(marker) || is_statement_summary(narration) {
            return match self.policy {
                FooterPolicy::Unconditional => RowOutcome::Terminate,
                FooterPolicy::AfterDecoration if self.seen_decoration => RowOutcome::Terminate,
                FooterPolicy::AfterDecoration => RowOutcome::Skip,
            };
        }

        let date = cell(row, self.roles.date.or(Some(0)))
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("NA")
            .to_string();

        RowOutcome::Record(Transaction {
            date,
            narration: narration.to_string(),
            withdrawal: amount_cell(row, self.roles.withdrawal),
            deposit: amount_cell(row, self.roles.deposit),
            balance: None,
        })
    }
}

fn cell(row: &[Option<String>], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| row.get(i)).and_then(|c| c.as_deref())
}

fn amount_cell(row: &[Option<String>], idx: Option<usize>) -> f64 {
    match cell(row, idx) {
        Some(raw) if !raw.trim().is_empty() => {
            let value = parse_amount(raw);
            if value == 0.0 && !looks_like_zero(raw) {
                warn!(cell = raw, "unparsable amount treated as zero");
            }
            value
        }
        _ => 0.0,
    }
}

fn looks_like_zero(raw: &str) -> bool {
    raw.trim().replace(',', "").parse::<f64>() == Ok(0.0)
}

/// Parse a locale-formatted amount such as `1,000.00`.
///
/// Anything that does not parse to a finite number is zero.
pub fn parse_amount(raw: &str) -> f64 {
    let s = raw.replace(',', "");
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Normalize every row of a document, honouring skip and terminate signals.
pub fn normalize_rows(rows: &[RawRow], roles: &ColumnRoles, policy: FooterPolicy) -> Vec<Transaction> {
    let mut normalizer = RowNormalizer::new(roles, policy);
    let mut transactions = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        match normalizer.normalize(row) {
            RowOutcome::Record(txn) => transactions.push(txn),
            RowOutcome::Skip => debug!(row = idx, "skipped sentinel row"),
            RowOutcome::Terminate => {
                debug!(row = idx, "statement summary reached");
                break;
            }
        }
    }
    transactions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> ColumnRoles {
        ColumnRoles {
            narration: 1,
            withdrawal: Some(2),
            deposit: Some(3),
            date: Some(0),
        }
    }

    fn row(cells: &[&str]) -> RawRow {
        cells
            .iter()
            .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
            .collect()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), 1234.56);
        assert_eq!(parse_amount("  42.50  "), 42.5);
        assert_eq!(parse_amount("-10"), -10.0);
        assert_eq!(parse_amount("0"), 0.0);
        assert_eq!(parse_amount("not_a_number"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
    }

    #[test]
    fn test_parse_amount_rejects_non_finite() {
        assert_eq!(parse_amount("NaN"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
    }

    #[test]
    fn test_normalizes_regular_row() {
        let roles = roles();
        let mut n = RowNormalizer::new(&roles, FooterPolicy::Unconditional);
        let outcome = n.normalize(&row(&["01/01/25", "UPI-Petrol Pump", "1,000.00", ""]));
        assert_eq!(
            outcome,
            RowOutcome::Record(Transaction::new("01/01/25", "UPI-Petrol Pump", 1000.0, 0.0))
        );
    }

    #[test]
    fn test_missing_cells_become_defaults() {
        let roles = roles();
        let mut n = RowNormalizer::new(&roles, FooterPolicy::Unconditional);
        let RowOutcome::Record(txn) = n.normalize(&row(&["", "", "abc"])) else {
            panic!("expected a record");
        };
        assert_eq!(txn.date, "NA");
        assert_eq!(txn.narration, "");
        assert_eq!(txn.withdrawal, 0.0);
        assert_eq!(txn.deposit, 0.0);
    }

    #[test]
    fn test_decoration_row_is_skipped() {
        let roles = roles();
        let mut n = RowNormalizer::new(&roles, FooterPolicy::Unconditional);
        assert_eq!(n.normalize(&row(&["********"])), RowOutcome::Skip);
    }

    #[test]
    fn test_summary_terminates_unconditionally() {
        let roles = roles();
        let mut n = RowNormalizer::new(&roles, FooterPolicy::Unconditional);
        assert_eq!(
            n.normalize(&row(&["STATEMENT SUMMARY  :-", "x"])),
            RowOutcome::Terminate
        );
    }

    #[test]
    fn test_summary_marker_in_narration_terminates() {
        let roles = roles();
        let mut n = RowNormalizer::new(&roles, FooterPolicy::Unconditional);
        assert_eq!(
            n.normalize(&row(&["02/01/25", "STATEMENT SUMMARY  :-"])),
            RowOutcome::Terminate
        );
    }

    #[test]
    fn test_after_decoration_policy_needs_prior_decoration() {
        let roles = roles();
        let mut n = RowNormalizer::new(&roles, FooterPolicy::AfterDecoration);
        assert_eq!(n.normalize(&row(&["STATEMENT SUMMARY"])), RowOutcome::Skip);
        assert_eq!(n.normalize(&row(&["****"])), RowOutcome::Skip);
        assert_eq!(n.normalize(&row(&["STATEMENT SUMMARY"])), RowOutcome::Terminate);
    }

    #[test]
    fn test_sentinel_falls_back_to_first_column() {
        let roles = ColumnRoles {
            narration: 1,
            withdrawal: None,
            deposit: None,
            date: None,
        };
        let mut n = RowNormalizer::new(&roles, FooterPolicy::Unconditional);
        assert_eq!(n.normalize(&row(&["**** page 2", "x"])), RowOutcome::Skip);
        let RowOutcome::Record(txn) = n.normalize(&row(&["03/02/2025", "NEFT-ACME"])) else {
            panic!("expected a record");
        };
        assert_eq!(txn.date, "03/02/2025");
    }

    #[test]
    fn test_normalize_rows_stops_at_summary() {
        let rows = vec![
            row(&["01/01/25", "UPI-Petrol Pump", "1,000.00", ""]),
            row(&["****"]),
            row(&["02/01/25", "ATM", "200", ""]),
            row(&["STATEMENT SUMMARY  :-"]),
            row(&["03/01/25", "NEFT-LATE", "", "50"]),
        ];
        let txns = normalize_rows(&rows, &roles(), FooterPolicy::Unconditional);
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[1].narration, "ATM");
    }
}
