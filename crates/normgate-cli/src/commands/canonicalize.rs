//! Canonicalize command implementation.

use normgate_canonical::{default_canonicalizer, hash_bytes};
use serde_json::Value;
use std::io::{self, Read};

use crate::output::format_json;

pub fn run(input: Option<String>, report: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Read JSON from file or stdin
    let json_str = if let Some(path) = input {
        std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read file {}: {}", path, e))?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let value: Value =
        serde_json::from_str(&json_str).map_err(|e| format!("Invalid JSON: {}", e))?;

    let result = match default_canonicalizer().canonicalize_with_report(&value) {
        Ok(result) => result,
        Err((e, hygiene)) => {
            if report {
                eprintln!("{}", format_json(&serde_json::to_value(&hygiene)?));
            }
            return Err(format!("Canonicalization failed: {}", e).into());
        }
    };

    println!("{}", String::from_utf8_lossy(&result.bytes));
    println!("sha256: {}", hash_bytes(&result.bytes));
    if report {
        println!("{}", format_json(&serde_json::to_value(&result.report)?));
    }
    Ok(())
}
