use comfy_table::{Cell, Table};

use crate::categorizer::Classifier;
use crate::error::Result;
use crate::settings::{load_abbreviations, load_settings};

pub fn run(narrations: &[String], abbreviations: Option<&str>) -> Result<()> {
    let map = load_abbreviations(&load_settings(), abbreviations)?;
    let classifier = Classifier::new(map);

    let mut table = Table::new();
    table.set_header(vec!["Narration", "Tag", "Description", "Category"]);
    for narration in narrations {
        let c = classifier.classify(narration);
        table.add_row(vec![
            Cell::new(narration),
            Cell::new(c.tag),
            Cell::new(c.description),
            Cell::new(c.category),
        ]);
    }
    println!("{table}");
    Ok(())
}
