extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;

extern crate crossref_tools;

use std::path::PathBuf;

use clap::Parser;

use crossref_tools::frontend::tree_dump::TreeDumpUnit;
use crossref_tools::frontend::ParsedUnit;
use crossref_tools::unit_pipeline::index_unit;

/// Index one translation unit's symbol references and merge them into a
/// cross-unit reference database.
#[derive(Parser)]
#[command(name = "unit-crossref")]
struct UnitCrossrefCli {
    /// Cross-unit reference database, created on first use
    #[arg(value_parser)]
    store_db: PathBuf,

    /// Output path for this unit's compressed reference index
    #[arg(value_parser)]
    index_output: PathBuf,

    /// Front-end invocation that dumps the unit's syntax tree; passed on
    /// verbatim, with the last argument naming the unit's primary source
    /// file
    #[arg(
        value_parser,
        required = true,
        num_args = 1..,
        allow_hyphen_values = true,
        trailing_var_arg = true
    )]
    front_end: Vec<String>,
}

fn main() {
    env_logger::init();
    let cli = UnitCrossrefCli::parse();

    // clap enforces at least one trailing argument.
    let unit_path = cli.front_end.last().unwrap().clone();

    let unit = match TreeDumpUnit::from_front_end(&cli.front_end) {
        Ok(unit) => unit,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // All diagnostics go to stderr, whatever their severity; the pipeline
    // decides below whether any of them are fatal for indexing.
    for diag in unit.diagnostics() {
        eprintln!("{}", diag);
    }

    if let Err(e) = index_unit(&unit, &unit_path, &cli.index_output, &cli.store_db) {
        error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
    info!(
        "merged {} into {}",
        cli.index_output.display(),
        cli.store_db.display()
    );
}
