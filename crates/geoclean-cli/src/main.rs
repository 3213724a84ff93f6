use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use geoclean_core::names::strip_collection;
use geoclean_core::{
    Assignment, FeatureCollection, MalformedPolicy, MatchStrategy, PostalTable, RuleSet,
    UnitFilter, drop_units, trim_regions,
};
use geoclean_records::{RecordFilter, filter_records};
use tracing::level_filters::LevelFilter;

mod display;

#[derive(Parser)]
#[command(name = "geoclean", version)]
#[command(about = "One-shot cleaning of country GeoJSON and competition CSV data")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Log warnings and errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trim outlying island groups from matched countries
    Trim {
        #[arg(default_value = "data/countries.json")]
        input: PathBuf,
        #[arg(default_value = "data/countries_cleaned.json")]
        output: PathBuf,
        /// JSON rule set replacing the built-in South Africa / Netherlands / New Zealand rules
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Match entities against whole name fields instead of substrings
        #[arg(long)]
        exact: bool,
        /// Pass malformed matched features through instead of aborting
        #[arg(long)]
        skip_malformed: bool,
        /// Indent the output JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Drop features whose unit name is listed
    DropUnits {
        #[arg(default_value = "data/countries.json")]
        input: PathBuf,
        #[arg(default_value = "data/countries_filtered.json")]
        output: PathBuf,
        /// Property holding the unit name
        #[arg(long, default_value = "geonunit")]
        field: String,
        /// Unit to drop (repeatable); defaults to Scotland, Wales, Northern Ireland
        #[arg(long = "unit")]
        units: Vec<String>,
        #[arg(long)]
        pretty: bool,
    },
    /// Remove translated name_xx properties, keeping name_en
    StripNames {
        #[arg(default_value = "data/countries.json")]
        input: PathBuf,
        #[arg(default_value = "data/countries_stripped.json")]
        output: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// Project and filter a competition-record CSV
    FilterRecords {
        #[arg(default_value = "data/openpowerlifting.csv")]
        input: PathBuf,
        #[arg(default_value = "data/openpowerlifting_filtered.csv")]
        output: PathBuf,
        /// Column to keep (repeatable, in output order); defaults to the standard lifter columns
        #[arg(long = "column")]
        columns: Vec<String>,
        /// Allowed country (repeatable); defaults to the built-in list
        #[arg(long = "country")]
        countries: Vec<String>,
    },
    /// Print the postal-code annotation table, applying COUNTRY:CODE=VALUE edits first
    Postal {
        /// Edit to apply (repeatable); CODE may be ALL
        #[arg(long = "set")]
        assignments: Vec<Assignment>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else if cli.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("geoclean v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Trim {
            input,
            output,
            rules,
            exact,
            skip_malformed,
            pretty,
        } => {
            let mut rules = match rules {
                Some(path) => RuleSet::from_json_file(&path)
                    .with_context(|| format!("loading rules from {}", path.display()))?,
                None => RuleSet::default(),
            };
            if exact {
                rules = rules.with_strategy(MatchStrategy::Exact);
            }
            let policy = if skip_malformed {
                MalformedPolicy::Skip
            } else {
                MalformedPolicy::Abort
            };

            let collection = load(&input)?;
            let (cleaned, report) =
                trim_regions(collection, &rules, policy).context("trimming regions")?;
            display::print_removals(&report);
            save(&cleaned, &output, pretty)?;
            display::print_trim_summary(&report);
        }
        Command::DropUnits {
            input,
            output,
            field,
            units,
            pretty,
        } => {
            let filter = if units.is_empty() {
                UnitFilter {
                    field,
                    ..UnitFilter::default()
                }
            } else {
                UnitFilter::new(field, units)
            };

            let mut collection = load(&input)?;
            let removed = drop_units(&mut collection, &filter);
            save(&collection, &output, pretty)?;
            display::print_unit_summary(removed, &output);
        }
        Command::StripNames {
            input,
            output,
            pretty,
        } => {
            let mut collection = load(&input)?;
            let report = strip_collection(&mut collection);
            save(&collection, &output, pretty)?;
            display::print_strip_summary(&report);
        }
        Command::FilterRecords {
            input,
            output,
            columns,
            countries,
        } => {
            let mut filter = RecordFilter::default();
            if !columns.is_empty() {
                filter.columns = columns;
            }
            if !countries.is_empty() {
                filter.countries = countries;
            }

            println!("Reading file from: {}", input.display());
            let stats = filter_records(&input, &output, &filter)
                .with_context(|| format!("filtering {}", input.display()))?;
            display::print_record_stats(&stats, &output);
        }
        Command::Postal { assignments } => {
            let mut table = PostalTable::default();
            for assignment in &assignments {
                let written = table
                    .apply(assignment)
                    .with_context(|| format!("applying {}:{}", assignment.country, assignment.code))?;
                display::print_postal_update(assignment, written);
            }
            display::print_postal_table(&table);
        }
    }

    Ok(())
}

fn load(path: &Path) -> anyhow::Result<FeatureCollection> {
    println!("Reading {}...", path.display());
    FeatureCollection::load(path).with_context(|| format!("reading {}", path.display()))
}

fn save(collection: &FeatureCollection, path: &Path, pretty: bool) -> anyhow::Result<()> {
    println!("Saving to {}...", path.display());
    collection
        .save(path, pretty)
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_records_paths_default_to_data_dir() {
        let cli = Cli::try_parse_from(["geoclean", "filter-records"]).unwrap();
        match cli.command {
            Command::FilterRecords { input, output, .. } => {
                assert_eq!(input, PathBuf::from("data/openpowerlifting.csv"));
                assert_eq!(output, PathBuf::from("data/openpowerlifting_filtered.csv"));
            }
            _ => panic!("expected filter-records"),
        }
    }
}
