//! Simple ETL example demonstrating the etl-pipeline crate.
//!
//! This example extracts rows from an inline CSV document, converts the
//! amounts to cents, skips malformed rows and prints the result to stdout,
//! committing every two rows.
//!
//! Run with: RUST_LOG=etl_pipeline=debug cargo run --example simple_etl

use etl_pipeline::etl::{Decision, EtlError, EtlTool, Key, Pairs};
use etl_pipeline::extractor::{CsvExtractor, CsvOptionsBuilder};
use etl_pipeline::loader::FileLoader;
use serde_json::Value;
use std::error::Error;
use std::io;
use tracing::info;
use tracing_subscriber::EnvFilter;

const PAYMENTS: &str = "\
id,customer,amount
1,ann,12.50
2,bob,not-a-number
3,cid,7.25

4,dee,100.00
5,eve,0.99
";

/// Turns one CSV row into a printable line, or skips it when the amount does
/// not parse.
fn to_cents(row: &Value, key: &Key, decision: &mut Decision) -> Result<Pairs<String>, EtlError> {
    let amount = row["amount"].as_str().and_then(|a| a.parse::<f64>().ok());
    let Some(amount) = amount else {
        decision.skip_current_item();
        return Ok(Pairs::empty());
    };

    let line = format!(
        "#{} {:<6} {:>8} cents",
        row["id"].as_str().unwrap_or("?"),
        row["customer"].as_str().unwrap_or("?"),
        (amount * 100.0).round() as i64
    );
    Ok(Pairs::once(key.clone(), line))
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing for logs
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("simple_etl=info".parse()?))
        .init();

    let options = CsvOptionsBuilder::default().create_keys(true).build()?;

    let mut etl = EtlTool::<&str, Value>::with_extractor(CsvExtractor::new(options))
        .transform_with(to_cents)
        .loader(FileLoader::new(io::stdout()))
        .flush_count(2)
        .on_skip(|event| {
            info!(key = ?event.key(), "skipping malformed row");
            Ok(())
        })
        .on_flush(|event| {
            info!(rows = ?event.counter(), partial = event.is_partial(), "committed");
            Ok(())
        })
        .build()?;

    println!("\nRunning ETL pipeline:");
    println!("- Extracting payments from CSV");
    println!("- Transforming amounts to cents");
    println!("- Loading to stdout, committing every 2 rows\n");

    let summary = etl.process(PAYMENTS)?;
    println!("\n{} rows loaded", summary.total);

    Ok(())
}
