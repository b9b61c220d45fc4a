#![allow(unknown_lints, dangerous_implicit_autorefs)] // clap 2.x crate_authors! macro

#[macro_use] extern crate clap;
#[macro_use] extern crate error_chain;
#[macro_use] extern crate log;
#[macro_use] extern crate utils;
extern crate biotac;
extern crate biotac_shim;
extern crate chrono;
extern crate env_logger;

use std::fs::File;
use std::io;
use std::num::ParseIntError;
use std::sync::Arc;
use chrono::Utc;
use biotac::{Frames, Session, Settings};
use biotac_shim::Recorder;

error_chain! {
    links {
        Shim(biotac_shim::Error, biotac_shim::ErrorKind);
        Biotac(biotac::Error, biotac::ErrorKind);
    }

    foreign_links {
        Io(io::Error);
        Parse(ParseIntError);
    }
}

quick_main!(|| -> Result<()> {
    env_logger::init();

    let matches = clap_app! { readbiotac =>
        (version: crate_version!())
        (author: crate_authors!("\n"))
        (about: "Reads frames from a BioTac and writes them as CSV")

        (@arg SETTINGS: -s --settings +takes_value "Settings JSON file (default: $BIOTAC_SETTINGS, or SDK defaults)")
        (@arg SENSOR: -n --sensor +takes_value "Cheetah port of the BioTac, counting from 0 (default: 0)")
        (@arg COUNT: -c --count +takes_value "Number of batches to read (default: 10)")
        (@arg OUT: -o --out +takes_value "Output CSV file (default: stdout)")
    }.get_matches();

    let settings = match matches.value_of("SETTINGS") {
        Some(path) => Settings::from_file(path)?,
        None => Settings::from_env()?,
    };
    let sensor: usize = matches.value_of("SENSOR").unwrap_or("0").parse()?;
    let count: usize = matches.value_of("COUNT").unwrap_or("10").parse()?;
    let out: Box<dyn io::Write> = match matches.value_of("OUT") {
        Some(path) => Box::new(File::create(path).chain_err(|| format!("could not create {}", path))?),
        None => Box::new(io::stdout()),
    };

    utils::prof::start("readbiotac");

    let session: Session = Session::init(&settings, sensor)?;
    let reader = session.reader();
    let mut recorder = Recorder::new(out)?;

    let mut last = Frames::default();
    for _ in 0..count {
        let frames = prof!("take", reader.take());
        if Arc::ptr_eq(&frames, &last) {
            // acquisition ended, nothing new is coming
            break;
        }
        prof!("write", recorder.write(Utc::now(), &frames))?;
        last = frames;
    }
    recorder.flush()?;
    info!("wrote {} frames", recorder.rows());

    let closed = session.close();
    utils::prof::finish();
    closed?;
    Ok(())
});
