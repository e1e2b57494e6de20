pub mod abbreviations;
pub mod classify;
pub mod group;
pub mod init;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::normalizer::FooterPolicy;
use crate::reports::GroupingMode;

#[derive(Parser)]
#[command(
    name = "stmtgroup",
    about = "Group and classify bank statement transactions into a summary spreadsheet."
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read a statement (XLSX/XLS/ODS/CSV/PDF), group its transactions and write a summary.
    Group(GroupArgs),
    /// Show how narrations are classified by the abbreviation dictionary.
    Classify {
        /// Narration text(s) to classify
        #[arg(required = true)]
        narrations: Vec<String>,
        /// Abbreviation dictionary file (JSON)
        #[arg(long)]
        abbreviations: Option<String>,
    },
    /// List the active abbreviation dictionary in match order.
    Abbreviations {
        /// Abbreviation dictionary file (JSON)
        #[arg(long)]
        abbreviations: Option<String>,
    },
    /// Write default settings and an editable copy of the built-in dictionary.
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
pub struct GroupArgs {
    /// Statement file to read
    pub file: String,
    /// Grouping mode (default from settings: suffix)
    #[arg(long, value_enum)]
    pub mode: Option<GroupingMode>,
    /// Output path; `.csv` writes CSV, anything else a workbook
    /// (default: Grouped_<name>.xlsx next to the input)
    #[arg(long, short)]
    pub output: Option<String>,
    /// Letterhead rows to skip above the header of tabular statements
    #[arg(long = "skip-rows")]
    pub skip_rows: Option<usize>,
    /// Abbreviation dictionary file (JSON)
    #[arg(long)]
    pub abbreviations: Option<String>,
    /// When the statement-summary marker stops reading
    #[arg(long = "footer-policy", value_enum)]
    pub footer_policy: Option<FooterPolicy>,
}
