//! CSV output for BioTac frames

use std::io::Write;
use chrono::{DateTime, Utc};
use csv;
use biotac::{channel, Frame};

use Result;

/// Column names: timestamp, the four named channels, then the electrodes
pub fn header() -> Vec<String> {
    let mut header: Vec<String> = vec!["Timestamp".into(), "PAC".into(), "PDC".into(), "TAC".into(), "TDC".into()];
    header.extend(channel::ELECTRODES.enumerate().map(|(i, _)| format!("Electrode #{}", i)));
    header
}

/// Writes frames as CSV rows, one row per frame.
pub struct Recorder<W: Write> {
    csv: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> Recorder<W> {
    /// Start a CSV file on `out` (the header is written immediately)
    pub fn new(out: W) -> Result<Recorder<W>> {
        let mut csv = csv::Writer::from_writer(out);
        csv.write_record(&header())?;
        Ok(Recorder { csv: csv, rows: 0 })
    }

    /// Write one batch of frames, all stamped with the time the batch was taken
    pub fn write(&mut self, stamp: DateTime<Utc>, frames: &[Frame]) -> Result<()> {
        let stamp = format!("{:.9}", stamp.timestamp() as f64 + stamp.timestamp_subsec_nanos() as f64 / 1_000_000_000f64);
        for frame in frames {
            let mut row = Vec::with_capacity(5 + channel::ELECTRODES.len());
            row.push(stamp.clone());
            row.extend([frame.pac(), frame.pdc(), frame.tac(), frame.tdc()].iter()
                                                                         .chain(frame.electrodes())
                                                                         .map(|v| v.to_string()));
            self.csv.write_record(&row)?;
            self.rows += 1;
        }
        Ok(())
    }

    /// Frames written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<()> {
        self.csv.flush()?;
        Ok(())
    }
}
