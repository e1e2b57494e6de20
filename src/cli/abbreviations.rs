use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::settings::{load_abbreviations, load_settings};

pub fn list(abbreviations: Option<&str>) -> Result<()> {
    let map = load_abbreviations(&load_settings(), abbreviations)?;

    let mut table = Table::new();
    table.set_header(vec!["#", "Abbreviation", "Description", "Category"]);
    for (i, (abbr, entry)) in map.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(abbr),
            Cell::new(&entry.description),
            Cell::new(&entry.category),
        ]);
    }
    println!("Abbreviations (first match wins)\n{table}");
    Ok(())
}
