//! Transaction extraction from the plain text of a PDF account statement.
//!
//! Statement PDFs carry no table markup, so a transaction is whatever line
//! fits the fixed positional layout:
//!
//! ```text
//! DD/MM/YY  NARRATION  REF(16 digits)  DD/MM/YY  [WITHDRAWAL] [DEPOSIT] BALANCE
//! ```
//!
//! Between the value date and the balance there are zero, one or two amount
//! slots. Two slots are positional. A lone slot is the deposit, unless it is
//! the `-` placeholder, which leaves both sides at zero.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::{Result, StmtError};
use crate::models::Transaction;
use crate::normalizer::parse_amount;

const HEADER_TOKEN: &str = "From";
const DASH: &str = "-";

fn transaction_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^(\d{2}/\d{2}/\d{2})\s+",
            r"([A-Za-z0-9\-\s\.]+?)\s+",
            r"(\d{16})\s+",
            r"(\d{2}/\d{2}/\d{2})",
            r"((?:\s+(?:[0-9,]+\.?\d*|-)){0,2})",
            r"\s+([0-9,]+\.?\d*)$",
        ))
        .expect("transaction line regex")
    })
}

/// A statement line that matched the transaction layout.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementLine {
    pub date: String,
    pub narration: String,
    pub reference: String,
    pub value_date: String,
    pub withdrawal: f64,
    pub deposit: f64,
    pub balance: f64,
}

impl From<StatementLine> for Transaction {
    fn from(line: StatementLine) -> Self {
        Transaction {
            date: line.date,
            narration: line.narration,
            withdrawal: line.withdrawal,
            deposit: line.deposit,
            balance: Some(line.balance),
        }
    }
}

fn slot_amount(token: &str) -> f64 {
    if token == DASH {
        0.0
    } else {
        parse_amount(token)
    }
}

/// Parse one line of page text. Non-transaction lines yield `None`.
pub fn parse_line(line: &str) -> Option<StatementLine> {
    let line = line.trim();
    if line.contains(HEADER_TOKEN) {
        return None;
    }
    let caps = transaction_line_re().captures(line)?;

    let slots: Vec<&str> = caps
        .get(5)
        .map(|m| m.as_str().split_whitespace().collect())
        .unwrap_or_default();
    let (withdrawal, deposit) = match slots.as_slice() {
        [] => (0.0, 0.0),
        [single] => (0.0, slot_amount(single)),
        [w, d] => (slot_amount(w), slot_amount(d)),
        _ => return None,
    };

    Some(StatementLine {
        date: caps[1].to_string(),
        narration: caps[2].trim().to_string(),
        reference: caps[3].to_string(),
        value_date: caps[4].to_string(),
        withdrawal,
        deposit,
        balance: parse_amount(&caps[6]),
    })
}

/// Extract the transactions of a single page.
pub fn extract_page(page_text: &str) -> Vec<Transaction> {
    page_text
        .lines()
        .filter_map(|line| match parse_line(line) {
            Some(parsed) => {
                debug!(
                    reference = parsed.reference.as_str(),
                    value_date = parsed.value_date.as_str(),
                    "transaction line"
                );
                Some(Transaction::from(parsed))
            }
            None => {
                if !line.trim().is_empty() {
                    debug!(line, "not a transaction line");
                }
                None
            }
        })
        .collect()
}

/// Extract transactions across all pages; a document with none is an error.
pub fn extract_document<S: AsRef<str>>(pages: &[S]) -> Result<Vec<Transaction>> {
    let transactions: Vec<Transaction> = pages
        .iter()
        .flat_map(|page| extract_page(page.as_ref()))
        .collect();
    if transactions.is_empty() {
        return Err(StmtError::NoTransactions);
    }
    info!(
        pages = pages.len(),
        transactions = transactions.len(),
        closing_balance = ?transactions.last().and_then(|t| t.balance),
        "extracted PDF transactions"
    );
    Ok(transactions)
}

/// Page texts of a PDF file, split on form feeds.
#[cfg(feature = "pdf")]
pub fn read_pages(path: &Path) -> Result<Vec<String>> {
    let full_text = pdf_extract::extract_text(path).map_err(|e| StmtError::Pdf(e.to_string()))?;
    Ok(full_text
        .split('\u{000C}')
        .filter(|page| !page.trim().is_empty())
        .map(|page| page.to_string())
        .collect())
}

#[cfg(not(feature = "pdf"))]
pub fn read_pages(path: &Path) -> Result<Vec<String>> {
    Err(StmtError::UnsupportedFormat(format!(
        "{} (built without PDF support)",
        path.display()
    )))
}
