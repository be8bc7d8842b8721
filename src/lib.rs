//! Corpus statistics for the RST Signalling Corpus
//!
//! Walks every document of the corpus, groups the annotated `segment`s of its `Signal.xml` by
//! span, and counts relations, signals and their combinations. Two plain text reports come out
//! the other end: one keyed by relation, one keyed by signal.


#[macro_use] extern crate log;
extern crate nom;
extern crate farmhash;
pub mod errors;
pub mod farm;
pub mod corpus;
pub mod markup;
pub mod stats;
pub mod report;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use errors::*;

/// Name of the per-document diagnostic file
pub const DEBUG_FILE: &'static str = "debug.txt";
/// Name of the report keyed by relation
pub const RELATION_REPORT_FILE: &'static str = "relation_keys.txt";
/// Name of the report keyed by signal
pub const SIGNAL_REPORT_FILE: &'static str = "signal_keys.txt";

/// Aggregate the corpus at `root` and write all three outputs into `out_dir`
///
/// Existing files are overwritten. Everything is counted before any report is written, so a
/// failure part way through the corpus leaves only a partial `debug.txt` behind.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(root: P, out_dir: Q) -> Result<stats::CorpusStats> {
    let out_dir = out_dir.as_ref();
    let corpus = corpus::Corpus::open(root);

    let stats = {
        let mut debug = BufWriter::new(File::create(out_dir.join(DEBUG_FILE))?);
        let stats = stats::CorpusStats::collect(&corpus, &mut debug)?;
        debug.flush()?;
        stats
    };

    let mut by_relation = BufWriter::new(File::create(out_dir.join(RELATION_REPORT_FILE))?);
    report::write_relation_report(&stats, &mut by_relation)?;
    by_relation.flush()?;
    info!("Wrote {}", out_dir.join(RELATION_REPORT_FILE).display());

    let mut by_signal = BufWriter::new(File::create(out_dir.join(SIGNAL_REPORT_FILE))?);
    report::write_signal_report(&stats, &mut by_signal)?;
    by_signal.flush()?;
    info!("Wrote {}", out_dir.join(SIGNAL_REPORT_FILE).display());

    Ok(stats)
}
