use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StmtError};
use crate::models::{AbbreviationEntry, Classification, ClassifiedTransaction, Transaction};

pub const OTHER_TAG: &str = "Other";
pub const NOT_AVAILABLE: &str = "NA";

const BUILTIN_ABBREVIATIONS: &[(&str, &str, &str)] = &[
    ("TIF Rent", "Tiffin", "Tiffin"),
    ("Ext LB", "External Labour", "External Labour"),
    ("Petrol", "Petrol", "Transport"),
    ("ptr", "Petrol", "Transport"),
    ("Tif Ptr", "Tiffin", "Tiffin"),
    ("Adv", "Pinu", "Transport"),
    ("Pinu", "Pinu", "Transport"),
    ("Bike", "Bike", "Transport"),
    ("Bharat", "Bharat", "Bharat"),
    ("Weed ptr", "Weed Petrol", "Weed"),
    ("Weed", "Weed", "Weed"),
    ("wd", "Weed", "Weed"),
    ("Tif", "Tiffin", "Tiffin"),
    ("Gas", "Gas", "Transport"),
    ("Plants", "Plants", "Plants"),
    ("Seeds", "Seeds", "Seeds"),
    ("Help", "Helper", "Helper"),
    ("Helper", "Helper", "Helper"),
    ("Nanu", "Nanu", "Nanu"),
    ("Suresh", "Suresh", "Suresh"),
    ("Jeev", "Jeevamrut", "Fertilizer"),
    ("Tempo Ptr", "Tempo Petrol", "Transport"),
];

/// On-disk form of one dictionary entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbbreviationRecord {
    pub abbreviation: String,
    pub description: String,
    pub category: String,
}

/// Ordered abbreviation dictionary. Entry order is the match order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbbreviationMap {
    entries: Vec<(String, AbbreviationEntry)>,
}

impl AbbreviationMap {
    pub fn new(entries: Vec<(String, AbbreviationEntry)>) -> Self {
        Self { entries }
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_ABBREVIATIONS
                .iter()
                .map(|(abbr, description, category)| {
                    (
                        abbr.to_string(),
                        AbbreviationEntry {
                            description: description.to_string(),
                            category: category.to_string(),
                        },
                    )
                })
                .collect(),
        )
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<AbbreviationRecord> =
            serde_json::from_str(json).map_err(|e| StmtError::Abbreviations(e.to_string()))?;
        if let Some(blank) = records.iter().position(|r| r.abbreviation.is_empty()) {
            return Err(StmtError::Abbreviations(format!(
                "entry {} has an empty abbreviation",
                blank + 1
            )));
        }
        Ok(Self::new(
            records
                .into_iter()
                .map(|r| {
                    (
                        r.abbreviation,
                        AbbreviationEntry {
                            description: r.description,
                            category: r.category,
                        },
                    )
                })
                .collect(),
        ))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        let records: Vec<AbbreviationRecord> = self
            .entries
            .iter()
            .map(|(abbr, entry)| AbbreviationRecord {
                abbreviation: abbr.clone(),
                description: entry.description.clone(),
                category: entry.category.clone(),
            })
            .collect();
        serde_json::to_string_pretty(&records).map_err(|e| StmtError::Abbreviations(e.to_string()))
    }

    pub fn get(&self, abbreviation: &str) -> Option<&AbbreviationEntry> {
        self.entries
            .iter()
            .find(|(abbr, _)| abbr == abbreviation)
            .map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AbbreviationEntry)> {
        self.entries.iter().map(|(abbr, entry)| (abbr.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// First-match narration classifier over an immutable dictionary.
///
/// Entries are tried in declaration order and the first abbreviation found
/// anywhere in the narration (ignoring case) wins, so an early short key
/// shadows any later key that contains it.
pub struct Classifier {
    map: AbbreviationMap,
    needles: Vec<String>,
}

impl Classifier {
    pub fn new(map: AbbreviationMap) -> Self {
        let needles = map.iter().map(|(abbr, _)| abbr.to_lowercase()).collect();
        Self { map, needles }
    }

    /// The abbreviation that matches `narration`, if any.
    pub fn matched_key(&self, narration: &str) -> Option<&str> {
        let haystack = narration.to_lowercase();
        self.needles
            .iter()
            .position(|needle| haystack.contains(needle.as_str()))
            .map(|idx| self.map.entries[idx].0.as_str())
    }

    pub fn classify(&self, narration: &str) -> Classification {
        match self.matched_key(narration) {
            Some(key) => {
                let entry = self.map.get(key);
                Classification {
                    tag: key.to_string(),
                    description: entry
                        .map(|e| e.description.clone())
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                    category: entry
                        .map(|e| e.category.clone())
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                }
            }
            None => Classification {
                tag: OTHER_TAG.to_string(),
                description: NOT_AVAILABLE.to_string(),
                category: NOT_AVAILABLE.to_string(),
            },
        }
    }

    pub fn classify_all(&self, transactions: Vec<Transaction>) -> Vec<ClassifiedTransaction> {
        transactions
            .into_iter()
            .map(|transaction| ClassifiedTransaction {
                classification: self.classify(&transaction.narration),
                transaction,
            })
            .collect()
    }
}
