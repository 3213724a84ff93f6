//! Human-readable run summaries printed to stdout.
//!
//! Logs go to stderr through `tracing`; these lines are the report a person
//! reads after a run and are not meant to be parsed.

use std::path::Path;

use geoclean_core::names::StripReport;
use geoclean_core::postal::ALL_REGIONS;
use geoclean_core::{Assignment, DropReason, PostalTable, RemovalScope, TrimReport};
use geoclean_records::RecordStats;

// ── Region trim ──

/// One line per dropped part or feature.
pub fn print_removals(report: &TrimReport) {
    for removal in &report.removals {
        let what = match removal.scope {
            RemovalScope::Part => "part (MultiPolygon)",
            RemovalScope::Feature => "entire feature (Polygon)",
        };
        let why = match removal.reason {
            DropReason::Longitude => "west of longitude bound",
            DropReason::Latitude => "south of latitude bound",
        };
        println!(
            "  - [{}] Removing {} at {} ({})",
            removal.entity, what, removal.coord, why
        );
    }
}

pub fn print_trim_summary(report: &TrimReport) {
    let found: Vec<&str> = report.encountered.iter().map(String::as_str).collect();

    println!();
    println!("--- Summary ---");
    println!("  {:<26} {}", "match candidates", format_list(&found));
    println!("  {:<26} {}", "geometries modified", report.modified);
    println!("  {:<26} {}", "features removed", report.removed);
    if report.skipped > 0 {
        println!("  {:<26} {}", "malformed (skipped)", report.skipped);
    }
    if !report.changed() {
        println!();
        println!(
            "No features were modified. Check the match candidates above to see \
             whether any rule found its country."
        );
    }
}

// ── Unit and property filters ──

pub fn print_unit_summary(removed: usize, output: &Path) {
    println!("Removed {removed} features.");
    println!("New file created: {}", output.display());
}

pub fn print_strip_summary(report: &StripReport) {
    println!("  {:<26} {}", "features touched", report.features_touched);
    println!("  {:<26} {}", "name keys removed", report.keys_removed);
}

// ── Competition records ──

pub fn print_record_stats(stats: &RecordStats, output: &Path) {
    if !stats.missing_columns.is_empty() {
        println!(
            "Warning: the following columns were not found: {}",
            stats.missing_columns.join(", ")
        );
    }
    match stats.after_country {
        Some(n) => println!(
            "Country filter applied: reduced from {} to {} rows.",
            stats.total_rows, n
        ),
        None => println!("Warning: country column missing, skipping country filter."),
    }
    match stats.after_state {
        Some(n) => println!(
            "State filter applied: reduced from {} to {} rows.",
            stats.after_country.unwrap_or(stats.total_rows),
            n
        ),
        None => println!("Warning: state column missing, skipping state filter."),
    }
    println!("Final row count: {}", stats.written_rows);
    println!("Saved to: {}", output.display());
}

// ── Postal table ──

pub fn print_postal_update(assignment: &Assignment, written: usize) {
    if assignment.code == ALL_REGIONS {
        println!(
            "Updated ALL {} regions in {} to '{}'.",
            written, assignment.country, assignment.value
        );
    } else {
        println!(
            "Updated {} -> {} to '{}'.",
            assignment.country, assignment.code, assignment.value
        );
    }
}

pub fn print_postal_table(table: &PostalTable) {
    println!();
    print!("{table}");
}

// ── Helpers ──

fn format_list(items: &[&str]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_formats_as_none() {
        assert_eq!(format_list(&[]), "(none)");
        assert_eq!(format_list(&["Netherlands", "South Africa"]), "Netherlands, South Africa");
    }
}
