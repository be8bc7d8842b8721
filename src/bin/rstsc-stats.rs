//! Descriptive statistics over the RST Signalling Corpus
//!
//! Reads every document under `<rootfolder>/Corpus/All_Files` together with its
//! `<rootfolder>/Analyses/All_Files/<doc>/Signal.xml`, and writes three files into the current
//! directory:
//!
//! - `debug.txt`: for each document, how many spans carry how many signals
//! - `relation_keys.txt`: counts keyed by relation, with the signal count distribution and
//!   signal combinations of each
//! - `signal_keys.txt`: counts keyed by signal and by signal combination, each split up by
//!   relation
//!
//! A span annotated with two different relation texts stops the run.
//!

// argument parsing
#[macro_use] extern crate clap;
// logging
#[macro_use] extern crate log;
extern crate env_logger;
// lastly, this library
extern crate rstsc;

use std::path::Path;
use rstsc::errors::*;

pub fn main() {
    // Main can't return a Result, and the ? operator needs the enclosing function to return Result
    inner_main().expect("Could not recover. Exiting.");
}
pub fn inner_main() -> Result<()> {
    env_logger::init();
    let args = app_from_crate!()
        .about("Extract some corpus statistics from the RST Signalling Corpus")
        .arg_from_usage("-r, --rootfolder=[ROOTFOLDER] 'root folder of the RST-SC'")
        .get_matches();

    let root = match args.value_of("rootfolder") {
        Some(root) => root,
        None => {
            error!("No root folder given, use --rootfolder");
            return Err(Error::Other("missing --rootfolder".to_string()));
        }
    };

    let stats = rstsc::run(root, Path::new("."))?;
    info!("Counted {} relations over {} annotations, {} distinct signals",
        stats.total_groups(), stats.total_segments(), stats.signal_count.len());
    Ok(())
}
