//! Rules command implementation.

use normgate_layout::{rule_table, RULE_VERSION};
use serde_json::json;

use crate::output::{format_json, format_table_row, print_table_header};

const COLUMNS: [(&str, usize); 3] = [("CODE", 24), ("RULE_ID", 16), ("DESCRIPTION", 60)];

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let table = rule_table()?;

    if json {
        let rules: Vec<_> = table.iter().map(|entry| &entry.rule).collect();
        println!(
            "{}",
            format_json(&json!({ "version": RULE_VERSION, "rules": rules }))
        );
        return Ok(());
    }

    print_table_header(&COLUMNS);
    for entry in table {
        let rule = &entry.rule;
        let code = rule.code().to_string();
        let cells = [code.as_str(), rule.rule_id().short(16), rule.description()];
        println!("{}", format_table_row(&cells, &COLUMNS));
    }
    println!("\n{} rules, version {}", table.len(), RULE_VERSION);
    Ok(())
}
