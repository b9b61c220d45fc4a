//! BioTac frames for programs that just want the numbers
//!
//! The heavy lifting happens in the `biotac` crate. This crate adds what sits around it: a C API
//! over one process-wide session (so the shim can be loaded as a shared library), and CSV output
//! for the `readbiotac` tool.

#[macro_use] extern crate error_chain;
#[macro_use] extern crate lazy_static;
#[macro_use] extern crate log;
extern crate biotac;
extern crate chrono;
extern crate csv;
extern crate env_logger;
extern crate libc;

mod capi;
pub mod record;

pub use capi::{biotac_close, biotac_get_latest_data_array, biotac_get_n_samples, biotac_init};
pub use record::Recorder;

error_chain! {
    links {
        Biotac(biotac::Error, biotac::ErrorKind);
    }

    foreign_links {
        Csv(csv::Error);
        Io(::std::io::Error);
    }
}
