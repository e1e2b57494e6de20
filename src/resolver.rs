//! Infers which statement columns hold the date, narration and amounts.
//!
//! Statement exports rarely agree on header wording, so roles are matched by
//! keyword containment on the case-folded header rather than by exact name.

use tracing::info;

use crate::error::{Result, StmtError};

const NARRATION_KEYWORDS: &[&str] = &["narration", "description", "particulars", "details"];
const WITHDRAWAL_KEYWORDS: &[&str] = &["withdrawal", "debit"];
const DEPOSIT_KEYWORDS: &[&str] = &["deposit", "credit"];
const DATE_KEYWORDS: &[&str] = &["date"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Narration,
    Withdrawal,
    Deposit,
    Date,
}

/// Roles in the order a header is tested against them. First hit wins.
const ROLE_PRIORITY: &[(Role, &[&str])] = &[
    (Role::Narration, NARRATION_KEYWORDS),
    (Role::Withdrawal, WITHDRAWAL_KEYWORDS),
    (Role::Deposit, DEPOSIT_KEYWORDS),
    (Role::Date, DATE_KEYWORDS),
];

/// Column indices for each resolved role. Narration is mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoles {
    pub narration: usize,
    pub withdrawal: Option<usize>,
    pub deposit: Option<usize>,
    pub date: Option<usize>,
}

impl ColumnRoles {
    /// Column read for footer and decoration markers.
    pub fn sentinel_column(&self) -> usize {
        self.date.unwrap_or(0)
    }
}

pub fn classify_header(header: &str) -> Option<Role> {
    let lower = header.to_lowercase();
    ROLE_PRIORITY
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(role, _)| *role)
}

/// Resolve roles for a header row.
///
/// When several headers match the same amount or narration role the last
/// one wins. The first date column is kept.
pub fn resolve_roles(headers: &[String]) -> Result<ColumnRoles> {
    let mut narration = None;
    let mut withdrawal = None;
    let mut deposit = None;
    let mut date = None;

    for (idx, header) in headers.iter().enumerate() {
        match classify_header(header) {
            Some(Role::Narration) => narration = Some(idx),
            Some(Role::Withdrawal) => withdrawal = Some(idx),
            Some(Role::Deposit) => deposit = Some(idx),
            Some(Role::Date) => {
                // Keep the posting date; "Value Date" columns follow it.
                if date.is_none() {
                    date = Some(idx);
                }
            }
            None => {}
        }
    }

    let Some(narration) = narration else {
        return Err(StmtError::UnresolvableSchema {
            columns: headers.to_vec(),
        });
    };

    let name = |idx: Option<usize>| idx.map(|i| headers[i].as_str()).unwrap_or("-");
    info!(
        narration = headers[narration].as_str(),
        withdrawal = name(withdrawal),
        deposit = name(deposit),
        date = name(date),
        "identified columns"
    );

    Ok(ColumnRoles {
        narration,
        withdrawal,
        deposit,
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolves_typical_statement_headers() {
        let roles = resolve_roles(&headers(&[
            "Date",
            "Narration",
            "Chq./Ref.No.",
            "Value Dt",
            "Withdrawal Amt.",
            "Deposit Amt.",
            "Closing Balance",
        ]))
        .unwrap();
        assert_eq!(roles.date, Some(0));
        assert_eq!(roles.narration, 1);
        assert_eq!(roles.withdrawal, Some(4));
        assert_eq!(roles.deposit, Some(5));
    }

    #[test]
    fn test_header_matching_is_case_insensitive() {
        let roles = resolve_roles(&headers(&["TXN DATE", "PARTICULARS", "DEBIT", "CREDIT"])).unwrap();
        assert_eq!(roles.narration, 1);
        assert_eq!(roles.withdrawal, Some(2));
        assert_eq!(roles.deposit, Some(3));
        assert_eq!(roles.date, Some(0));
    }

    #[test]
    fn test_narration_outranks_other_roles() {
        // "Debit description" contains keywords for two roles.
        assert_eq!(classify_header("Debit description"), Some(Role::Narration));
        assert_eq!(classify_header("Credit date"), Some(Role::Deposit));
        assert_eq!(classify_header("Balance"), None);
    }

    #[test]
    fn test_missing_amount_roles_are_absent() {
        let roles = resolve_roles(&headers(&["Details"])).unwrap();
        assert_eq!(roles.narration, 0);
        assert_eq!(roles.withdrawal, None);
        assert_eq!(roles.deposit, None);
        assert_eq!(roles.date, None);
        assert_eq!(roles.sentinel_column(), 0);
    }

    #[test]
    fn test_no_narration_column_is_unresolvable() {
        let err = resolve_roles(&headers(&["Date", "Withdrawal", "Deposit"])).unwrap_err();
        match err {
            StmtError::UnresolvableSchema { columns } => assert_eq!(columns.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
