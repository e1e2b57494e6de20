use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::ClassifiedTransaction;

/// How transactions are grouped into summary rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingMode {
    /// Last three characters of the narration, upper-cased.
    #[default]
    Suffix,
    /// Matched abbreviation, or `Other`.
    Tag,
    /// One row per narration, date and tag.
    Detailed,
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Upper-cased last three characters, or `None` for narrations too short
/// to carry a suffix.
pub fn suffix_key(narration: &str) -> Option<String> {
    let chars: Vec<char> = narration.chars().collect();
    if chars.len() < 3 {
        return None;
    }
    let suffix: String = chars[chars.len() - 3..].iter().collect();
    Some(suffix.to_uppercase())
}

pub fn detailed_key(narration: &str, date: &str, tag: &str) -> String {
    format!("{} - {} - {}", narration.replace('-', "_"), date, tag)
}

// ---------------------------------------------------------------------------
// Append-only accumulation (suffix and tag modes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct GroupAccumulator {
    withdrawals: Vec<f64>,
    deposits: Vec<f64>,
}

impl GroupAccumulator {
    pub fn record(&mut self, withdrawal: f64, deposit: f64) {
        if withdrawal > 0.0 {
            self.withdrawals.push(withdrawal);
        }
        if deposit > 0.0 {
            self.deposits.push(deposit);
        }
    }

    fn finish(self, key: String) -> GroupSummary {
        let total_withdrawal: f64 = self.withdrawals.iter().sum();
        let total_deposit: f64 = self.deposits.iter().sum();
        GroupSummary {
            key,
            total_withdrawal,
            total_deposit,
            net: total_deposit - total_withdrawal,
            count: self.withdrawals.len() + self.deposits.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub key: String,
    pub total_withdrawal: f64,
    pub total_deposit: f64,
    pub net: f64,
    pub count: usize,
}

/// Group by narration suffix. Rows come back in byte order of the key.
pub fn group_by_suffix(txns: &[ClassifiedTransaction]) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<String, GroupAccumulator> = BTreeMap::new();
    for ct in txns {
        let txn = &ct.transaction;
        let Some(key) = suffix_key(&txn.narration) else {
            debug!(narration = txn.narration.as_str(), "narration too short to group");
            continue;
        };
        groups.entry(key).or_default().record(txn.withdrawal, txn.deposit);
    }
    groups.into_iter().map(|(key, acc)| acc.finish(key)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagSummary {
    pub totals: GroupSummary,
    pub description: String,
    pub category: String,
}

/// Group by matched abbreviation.
pub fn group_by_tag(txns: &[ClassifiedTransaction]) -> Vec<TagSummary> {
    let mut groups: BTreeMap<String, (GroupAccumulator, String, String)> = BTreeMap::new();
    for ct in txns {
        let c = &ct.classification;
        let (acc, _, _) = groups
            .entry(c.tag.clone())
            .or_insert_with(|| (GroupAccumulator::default(), c.description.clone(), c.category.clone()));
        acc.record(ct.transaction.withdrawal, ct.transaction.deposit);
    }
    groups
        .into_iter()
        .map(|(key, (acc, description, category))| TagSummary {
            totals: acc.finish(key),
            description,
            category,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Detailed mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DetailedRow {
    pub key: String,
    pub date: String,
    pub narration: String,
    pub tag: String,
    pub description: String,
    pub category: String,
    pub withdrawal: f64,
}

/// One row per composite key. A later transaction with the same key replaces
/// the earlier one. Rows are ordered by the raw date string.
pub fn group_detailed(txns: &[ClassifiedTransaction]) -> Vec<DetailedRow> {
    let mut groups: BTreeMap<String, DetailedRow> = BTreeMap::new();
    for ct in txns {
        let txn = &ct.transaction;
        let c = &ct.classification;
        let key = detailed_key(&txn.narration, &txn.date, &c.tag);
        let row = DetailedRow {
            key: key.clone(),
            date: txn.date.clone(),
            narration: txn.narration.clone(),
            tag: c.tag.clone(),
            description: c.description.clone(),
            category: c.category.clone(),
            withdrawal: txn.withdrawal,
        };
        if groups.insert(key, row).is_some() {
            debug!(narration = txn.narration.as_str(), date = txn.date.as_str(), "replaced duplicate detailed entry");
        }
    }
    let mut rows: Vec<DetailedRow> = groups.into_values().collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date));
    rows
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Suffix(Vec<GroupSummary>),
    Tag(Vec<TagSummary>),
    Detailed(Vec<DetailedRow>),
}

impl Report {
    pub fn build(mode: GroupingMode, txns: &[ClassifiedTransaction]) -> Self {
        match mode {
            GroupingMode::Suffix => Self::Suffix(group_by_suffix(txns)),
            GroupingMode::Tag => Self::Tag(group_by_tag(txns)),
            GroupingMode::Detailed => Self::Detailed(group_detailed(txns)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Suffix(rows) => rows.len(),
            Self::Tag(rows) => rows.len(),
            Self::Detailed(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
