use std::path::Path;

use calamine::{Data, Reader};
use tracing::{info, warn};

use crate::error::{Result, StmtError};
use crate::models::Transaction;
use crate::normalizer::{normalize_rows, FooterPolicy, RawRow};
use crate::pdf;
use crate::resolver::resolve_roles;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Render an Excel serial date as `DD/MM/YYYY`, the statement's own format.
pub fn excel_serial_to_date(serial: f64) -> String {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    // Out-of-range serials keep their numeric text.
    chrono::NaiveDate::from_ymd_opt(1899, 12, 30)
        .zip(chrono::Duration::try_days(serial as i64))
        .and_then(|(base, days)| base.checked_add_signed(days))
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| serial.to_string())
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    };
    Some(text)
}

fn csv_cell(field: &str) -> Option<String> {
    if field.trim().is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

// ---------------------------------------------------------------------------
// Source kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Spreadsheet,
    Csv,
    Pdf,
}

impl SourceKind {
    pub fn from_path(file_path: &Path) -> Result<Self> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Spreadsheet),
            "csv" => Ok(Self::Csv),
            "pdf" => Ok(Self::Pdf),
            _ => Err(StmtError::UnsupportedFormat(file_path.display().to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }
}

// ---------------------------------------------------------------------------
// Tabular documents
// ---------------------------------------------------------------------------

/// A header row plus the candidate transaction rows beneath it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl Table {
    /// Split physical rows into header and data after dropping `skip_rows`
    /// letterhead rows. Fully blank data rows are discarded.
    pub fn from_rows(mut physical: Vec<RawRow>, skip_rows: usize) -> Self {
        if physical.len() <= skip_rows {
            return Self::default();
        }
        let mut rest = physical.split_off(skip_rows);
        let header = rest.remove(0);
        let headers = header
            .into_iter()
            .map(|c| c.map(|s| s.trim().to_string()).unwrap_or_default())
            .collect();
        let rows = rest
            .into_iter()
            .filter(|row| row.iter().any(|c| c.as_deref().is_some_and(|s| !s.trim().is_empty())))
            .collect();
        Self { headers, rows }
    }
}

pub fn read_spreadsheet(file_path: &Path, skip_rows: usize) -> Result<Table> {
    let mut workbook = calamine::open_workbook_auto(file_path)?;
    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(StmtError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&first_sheet)?;

    // The range starts at the first used cell; leading blank rows still
    // count toward the letterhead.
    let leading_blank = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let leading_cols = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let physical: Vec<RawRow> = range
        .rows()
        .map(|row| {
            std::iter::repeat(None)
                .take(leading_cols)
                .chain(row.iter().map(cell_text))
                .collect()
        })
        .collect();
    Ok(Table::from_rows(physical, skip_rows.saturating_sub(leading_blank)))
}

pub fn read_csv(file_path: &Path, skip_rows: usize) -> Result<Table> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    // The reader drops empty lines, so letterhead is counted by source line.
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if line as usize > skip_rows {
            rows.push(record.iter().map(csv_cell).collect());
        }
    }
    Ok(Table::from_rows(rows, 0))
}

/// Resolve column roles and normalize every row of a table.
pub fn table_transactions(table: &Table, policy: FooterPolicy) -> Result<Vec<Transaction>> {
    let roles = resolve_roles(&table.headers)?;
    Ok(normalize_rows(&table.rows, &roles, policy))
}

// ---------------------------------------------------------------------------
// read_statement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub skip_rows: usize,
    pub footer_policy: FooterPolicy,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            skip_rows: 20,
            footer_policy: FooterPolicy::default(),
        }
    }
}

pub fn read_statement(file_path: &Path, options: &ImportOptions) -> Result<Vec<Transaction>> {
    let kind = SourceKind::from_path(file_path)?;
    let transactions = match kind {
        SourceKind::Spreadsheet => {
            table_transactions(&read_spreadsheet(file_path, options.skip_rows)?, options.footer_policy)?
        }
        SourceKind::Csv => {
            table_transactions(&read_csv(file_path, options.skip_rows)?, options.footer_policy)?
        }
        SourceKind::Pdf => pdf::extract_document(&pdf::read_pages(file_path)?)?,
    };
    if transactions.is_empty() {
        warn!(file = %file_path.display(), "statement contains no transaction rows");
    }
    info!(
        file = %file_path.display(),
        kind = kind.name(),
        transactions = transactions.len(),
        "statement loaded"
    );
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn letterhead(lines: usize) -> String {
        let mut content = String::new();
        for i in 0..lines {
            content.push_str(&format!("Letterhead line {i},,,\n"));
        }
        content
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), "10/01/2025");
    }

    #[test]
    fn test_excel_serial_out_of_range_keeps_number() {
        assert_eq!(excel_serial_to_date(1e300), 1e300_f64.to_string());
        assert_eq!(excel_serial_to_date(-1e12), (-1e12_f64).to_string());
    }

    #[test]
    fn test_source_kind_from_extension() {
        assert_eq!(SourceKind::from_path(Path::new("a.XLSX")).unwrap(), SourceKind::Spreadsheet);
        assert_eq!(SourceKind::from_path(Path::new("a.csv")).unwrap(), SourceKind::Csv);
        assert_eq!(SourceKind::from_path(Path::new("a.pdf")).unwrap(), SourceKind::Pdf);
        assert!(matches!(
            SourceKind::from_path(Path::new("a.txt")),
            Err(StmtError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_table_skips_letterhead_and_blank_rows() {
        let physical = vec![
            vec![Some("Bank".to_string())],
            vec![Some("Date".to_string()), Some("Narration".to_string())],
            vec![None, None],
            vec![Some("01/01/25".to_string()), Some("ATM".to_string())],
        ];
        let table = Table::from_rows(physical, 1);
        assert_eq!(table.headers, vec!["Date", "Narration"]);
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_table_shorter_than_letterhead_is_empty() {
        let table = Table::from_rows(vec![vec![Some("x".to_string())]], 20);
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_read_csv_statement() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stmt.csv");
        let mut content = letterhead(20);
        content.push_str("Date,Narration,Withdrawal Amt.,Deposit Amt.\n");
        content.push_str("01/01/25,UPI-Petrol Pump,\"1,000.00\",\n");
        content.push_str(",,,\n");
        content.push_str("02/01/25,NEFT-SALARY,,\"25,000.00\"\n");
        content.push_str("****************,,,\n");
        content.push_str("STATEMENT SUMMARY  :-,,,\n");
        content.push_str("Opening Balance,Dr Count,,\n");
        std::fs::write(&path, content).unwrap();

        let txns = read_statement(&path, &ImportOptions::default()).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].withdrawal, 1000.0);
        assert_eq!(txns[1].deposit, 25000.0);
    }

    #[test]
    fn test_csv_letterhead_counts_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stmt.csv");
        std::fs::write(
            &path,
            "HDFC BANK\n\nDate,Narration,Withdrawal\n01/01/25,UPI-ABC,5\n",
        )
        .unwrap();

        let table = read_csv(&path, 2).unwrap();
        assert_eq!(table.headers, vec!["Date", "Narration", "Withdrawal"]);
        assert_eq!(table.rows.len(), 1);

        let options = ImportOptions {
            skip_rows: 2,
            ..Default::default()
        };
        let txns = read_statement(&path, &options).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].narration, "UPI-ABC");
        assert_eq!(txns[0].withdrawal, 5.0);
    }

    #[test]
    fn test_csv_without_narration_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stmt.csv");
        std::fs::write(&path, "Date,Amount\n01/01/25,5\n").unwrap();
        let options = ImportOptions {
            skip_rows: 0,
            ..Default::default()
        };
        assert!(matches!(
            read_statement(&path, &options),
            Err(StmtError::UnresolvableSchema { .. })
        ));
    }

    /// Single-page PDF showing `text` in Helvetica.
    #[cfg(feature = "pdf")]
    fn pdf_with_text(text: &str) -> Vec<u8> {
        let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }
        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        out
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_pdf_without_transaction_lines_is_no_transactions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stmt.pdf");
        std::fs::write(&path, pdf_with_text("Statement of account")).unwrap();

        let err = read_statement(&path, &ImportOptions::default()).unwrap_err();
        assert!(matches!(err, StmtError::NoTransactions), "got {err:?}");
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_unreadable_pdf_is_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, "not a pdf").unwrap();

        let err = read_statement(&path, &ImportOptions::default()).unwrap_err();
        assert!(matches!(err, StmtError::Pdf(_)), "got {err:?}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_statement(&dir.path().join("missing.csv"), &ImportOptions::default()).unwrap_err();
        assert!(matches!(err, StmtError::Io(_)));
    }

    #[test]
    fn test_read_spreadsheet_counts_leading_blank_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stmt.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        // Rows 0-1 left blank, letterhead text on rows 2-4.
        for row in 2..5u32 {
            sheet.write_string(row, 0, "HDFC BANK Ltd.").unwrap();
        }
        let header_row = 5u32;
        for (col, name) in ["Date", "Narration", "Withdrawal Amt.", "Deposit Amt."].iter().enumerate() {
            sheet.write_string(header_row, col as u16, *name).unwrap();
        }
        sheet.write_string(6, 0, "01/01/25").unwrap();
        sheet.write_string(6, 1, "UPI-Weed ptr").unwrap();
        sheet.write_number(6, 2, 350.0).unwrap();
        sheet.write_string(7, 0, "02/01/25").unwrap();
        sheet.write_string(7, 1, "NEFT-REFUND").unwrap();
        sheet.write_string(7, 3, "1,200.50").unwrap();
        workbook.save(&path).unwrap();

        let table = read_spreadsheet(&path, 5).unwrap();
        assert_eq!(table.headers[1], "Narration");
        assert_eq!(table.rows.len(), 2);

        let options = ImportOptions {
            skip_rows: 5,
            ..Default::default()
        };
        let txns = read_statement(&path, &options).unwrap();
        assert_eq!(txns[0].narration, "UPI-Weed ptr");
        assert_eq!(txns[0].withdrawal, 350.0);
        assert_eq!(txns[1].deposit, 1200.5);
    }
}
