use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::error::Result;
use crate::reports::{DetailedRow, GroupSummary, Report, TagSummary};

pub const SHEET_NAME: &str = "Grouped_Transactions";
const MAX_COLUMN_WIDTH: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Count(usize),
}

impl Value {
    fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Count(c) => c.to_string(),
        }
    }
}

/// A report flattened to header plus cells, ready for any writer.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Value>>,
}

fn totals_cells(g: &GroupSummary) -> [Value; 4] {
    [
        Value::Number(g.total_withdrawal),
        Value::Number(g.total_deposit),
        Value::Number(g.net),
        Value::Count(g.count),
    ]
}

fn suffix_row(g: &GroupSummary) -> Vec<Value> {
    let mut row = vec![Value::Text(g.key.clone())];
    row.extend(totals_cells(g));
    row
}

fn tag_row(t: &TagSummary) -> Vec<Value> {
    let mut row = vec![
        Value::Text(t.totals.key.clone()),
        Value::Text(t.description.clone()),
        Value::Text(t.category.clone()),
    ];
    row.extend(totals_cells(&t.totals));
    row
}

fn detailed_row(d: &DetailedRow) -> Vec<Value> {
    vec![
        Value::Text(d.date.clone()),
        Value::Text(d.narration.clone()),
        Value::Text(d.tag.clone()),
        Value::Text(d.description.clone()),
        Value::Text(d.category.clone()),
        Value::Number(d.withdrawal),
    ]
}

impl SummaryTable {
    pub fn from_report(report: &Report) -> Self {
        match report {
            Report::Suffix(groups) => Self {
                headers: vec![
                    "Narration_Suffix",
                    "Total_Withdrawal",
                    "Total_Deposit",
                    "Net_Amount",
                    "Transaction_Count",
                ],
                rows: groups.iter().map(suffix_row).collect(),
            },
            Report::Tag(groups) => Self {
                headers: vec![
                    "Abbreviation",
                    "Description",
                    "Category",
                    "Total_Withdrawal",
                    "Total_Deposit",
                    "Net_Amount",
                    "Transaction_Count",
                ],
                rows: groups.iter().map(tag_row).collect(),
            },
            Report::Detailed(rows) => Self {
                headers: vec!["Date", "Narration", "Tag", "Description", "Category", "Withdrawal"],
                rows: rows.iter().map(detailed_row).collect(),
            },
        }
    }

    /// Content width of each column plus padding, capped at 50.
    pub fn column_widths(&self) -> Vec<usize> {
        (0..self.headers.len())
            .map(|col| {
                let longest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|v| v.display().chars().count())
                    .chain(std::iter::once(self.headers[col].chars().count()))
                    .max()
                    .unwrap_or(0);
                (longest + 2).min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }
}

pub fn write_xlsx(table: &SummaryTable, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in table.headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (r, row) in table.rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            let col = col as u16;
            match value {
                Value::Text(s) => sheet.write_string(r, col, s.as_str())?,
                Value::Number(n) => sheet.write_number(r, col, *n)?,
                Value::Count(c) => sheet.write_number(r, col, *c as f64)?,
            };
        }
    }
    for (col, width) in table.column_widths().into_iter().enumerate() {
        sheet.set_column_width(col as u16, width as f64)?;
    }

    workbook.save(path)?;
    Ok(())
}

pub fn write_csv(table: &SummaryTable, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(Value::display))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the table, choosing CSV or a workbook by the output extension.
pub fn write_summary(table: &SummaryTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let is_csv = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        write_csv(table, path)
    } else {
        write_xlsx(table, path)
    }
}
