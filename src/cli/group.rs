use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{Cell, Table};
use tracing::{debug, info, warn};

use crate::categorizer::Classifier;
use crate::cli::GroupArgs;
use crate::error::Result;
use crate::export::{write_summary, SummaryTable};
use crate::fmt::amount;
use crate::importer::{read_statement, ImportOptions};
use crate::models::ClassifiedTransaction;
use crate::reports::{GroupingMode, Report};
use crate::settings::{load_abbreviations, load_settings};

/// `Grouped_<stem>.xlsx` beside the input file.
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "statement".to_string());
    input.with_file_name(format!("Grouped_{stem}.xlsx"))
}

/// Read, classify and aggregate one statement.
pub fn summarize(
    file_path: &Path,
    options: &ImportOptions,
    classifier: &Classifier,
    mode: GroupingMode,
) -> Result<(Vec<ClassifiedTransaction>, Report)> {
    let transactions = read_statement(file_path, options)?;
    let classified = classifier.classify_all(transactions);
    let report = Report::build(mode, &classified);
    if report.is_empty() {
        warn!(file = %file_path.display(), ?mode, "nothing to group");
    } else {
        info!(groups = report.len(), ?mode, "transactions grouped");
    }
    if let Report::Suffix(groups) = &report {
        for g in groups.iter().take(5) {
            debug!(key = g.key.as_str(), count = g.count, "sample group");
        }
    }
    Ok((classified, report))
}

pub fn run(args: GroupArgs) -> Result<()> {
    let settings = load_settings();
    let options = ImportOptions {
        skip_rows: args.skip_rows.unwrap_or(settings.skip_rows),
        footer_policy: args.footer_policy.unwrap_or(settings.footer_policy),
    };
    let mode = args.mode.unwrap_or(settings.mode);
    let classifier = Classifier::new(load_abbreviations(&settings, args.abbreviations.as_deref())?);

    let file_path = PathBuf::from(&args.file);
    let (classified, report) = summarize(&file_path, &options, &classifier, mode)?;

    let output = args
        .output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output(&file_path));
    let table = SummaryTable::from_report(&report);
    write_summary(&table, &output)?;
    info!(output = %output.display(), "summary written");

    print_report(&report);
    println!(
        "{} transactions, {} groups",
        classified.len(),
        report.len()
    );
    println!("Wrote {}", output.display());
    Ok(())
}

fn net_cell(net: f64) -> Cell {
    if net >= 0.0 {
        Cell::new(amount(net).green())
    } else {
        Cell::new(amount(net).red())
    }
}

fn print_report(report: &Report) {
    let mut table = Table::new();
    match report {
        Report::Suffix(groups) => {
            table.set_header(vec!["Suffix", "Withdrawal", "Deposit", "Net", "Count"]);
            for g in groups {
                table.add_row(vec![
                    Cell::new(&g.key),
                    Cell::new(amount(g.total_withdrawal)),
                    Cell::new(amount(g.total_deposit)),
                    net_cell(g.net),
                    Cell::new(g.count),
                ]);
            }
        }
        Report::Tag(groups) => {
            table.set_header(vec![
                "Abbreviation",
                "Description",
                "Category",
                "Withdrawal",
                "Deposit",
                "Net",
                "Count",
            ]);
            for t in groups {
                table.add_row(vec![
                    Cell::new(&t.totals.key),
                    Cell::new(&t.description),
                    Cell::new(&t.category),
                    Cell::new(amount(t.totals.total_withdrawal)),
                    Cell::new(amount(t.totals.total_deposit)),
                    net_cell(t.totals.net),
                    Cell::new(t.totals.count),
                ]);
            }
        }
        Report::Detailed(rows) => {
            table.set_header(vec!["Date", "Narration", "Tag", "Description", "Category", "Withdrawal"]);
            for d in rows {
                table.add_row(vec![
                    Cell::new(&d.date),
                    Cell::new(&d.narration),
                    Cell::new(&d.tag),
                    Cell::new(&d.description),
                    Cell::new(&d.category),
                    Cell::new(amount(d.withdrawal)),
                ]);
            }
        }
    }
    println!("{}\n{table}", "Grouped Transactions".bold());
}
