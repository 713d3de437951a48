use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;

use kraken_report_rs::input::InputMode;
use kraken_report_rs::build_report;

/// Summarize per-read taxonomic classifications into a hierarchical
/// abundance report on standard output.
#[derive(Parser, Debug)]
#[clap(version, about = "Summarize per-read taxonomic classifications into a hierarchical abundance report")]
struct Cli {
    /// Taxonomy database file (taxID<TAB>parentID<TAB>name<TAB>rank per line)
    #[arg(long = "db", required = true)]
    db: PathBuf,

    /// Report every taxon in the taxonomy, even clades with no reads
    #[arg(long = "show-zeros", action)]
    show_zeros: bool,

    /// Input lines are `taxID [count]` pairs instead of per-read classifier output
    #[arg(long = "taxon-counts", action, conflicts_with = "taxon_list")]
    taxon_counts: bool,

    /// Input lines are whitespace-separated taxon-id lists, one read per id
    #[arg(long = "taxon-list", action)]
    taxon_list: bool,

    /// Classifier output files (`.gz` accepted); standard input when omitted
    input_files: Vec<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mode = if cli.taxon_counts {
        InputMode::TaxonCounts
    } else if cli.taxon_list {
        InputMode::TaxonList
    } else {
        InputMode::ReadOutput
    };

    let mut stderr = io::stderr();
    let results = match build_report(&cli.db, &cli.input_files, mode, cli.show_zeros, &mut stderr) {
        Ok(results) => results,
        Err(err) => {
            eprintln!("kraken-report: {}", err);
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = out.write_all(results.get_report_text().as_bytes()) {
        eprintln!("kraken-report: {}", err);
        std::process::exit(1);
    }
}
