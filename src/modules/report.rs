use crate::config::OutputFormat;
use crate::error::ReportError;
use colored::Colorize;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

#[derive(Serialize)]
struct SubdomainReport<'a> {
    subdomains: Vec<&'a str>,
}

pub fn sorted(subdomains: &HashSet<String>) -> Vec<&str> {
    let mut sorted: Vec<&str> = subdomains.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted
}

pub fn print_subdomains(subdomains: &HashSet<String>) {
    for subdomain in sorted(subdomains) {
        println!("{}", format!("[+] {}", subdomain).blue());
    }
}

/// Writes the set to `filename`: JSON keeps iteration order, CSV is sorted.
pub fn save_subdomains(
    subdomains: &HashSet<String>,
    filename: &Path,
    format: OutputFormat,
) -> Result<(), ReportError> {
    let mut file_subdomains = BufWriter::new(File::create(filename)?);
    match format {
        OutputFormat::Json => {
            let report = SubdomainReport {
                subdomains: subdomains.iter().map(String::as_str).collect(),
            };
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut file_subdomains, formatter);
            report.serialize(&mut serializer)?;
        }
        OutputFormat::Csv => {
            for subdomain in sorted(subdomains) {
                writeln!(file_subdomains, "{}", subdomain)?;
            }
        }
    }
    file_subdomains.flush()?;
    info!("Subdomains saved to {}", filename.display());

    Ok(())
}
