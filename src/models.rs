/// One ledger entry, produced by either the tabular or the PDF path.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Raw statement date (`DD/MM/YY` or `DD/MM/YYYY`), or `"NA"`.
    pub date: String,
    pub narration: String,
    pub withdrawal: f64,
    pub deposit: f64,
    /// Running balance; only PDF statements carry one.
    pub balance: Option<f64>,
}

#[cfg(test)]
impl Transaction {
    pub fn new(date: impl Into<String>, narration: impl Into<String>, withdrawal: f64, deposit: f64) -> Self {
        Self {
            date: date.into(),
            narration: narration.into(),
            withdrawal,
            deposit,
            balance: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbbreviationEntry {
    pub description: String,
    pub category: String,
}

/// Result of matching a narration against the abbreviation dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub tag: String,
    pub description: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTransaction {
    pub transaction: Transaction,
    pub classification: Classification,
}
