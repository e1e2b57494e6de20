use thiserror::Error;

#[derive(Error, Debug)]
pub enum StmtError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Workbook write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Could not find a narration column. Available columns: {}", .columns.join(", "))]
    UnresolvableSchema { columns: Vec<String> },

    #[error("No transactions found. Please check the statement format.")]
    NoTransactions,

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Workbook has no worksheets")]
    EmptyWorkbook,

    #[error("Abbreviation dictionary error: {0}")]
    Abbreviations(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, StmtError>;
