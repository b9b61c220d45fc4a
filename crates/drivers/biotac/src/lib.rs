//! Service to read data from the BioTac sensor
//!
//! The BioTac hangs off a Cheetah SPI adapter, which can host up to `MAX_BIOTACS_PER_CHEETAH`
//! fingers. The vendor SDK delivers data in batches: each batch is a run of samples, each sample
//! tagged with the channel it measured and carrying one word per Cheetah port. A fixed number of
//! consecutive samples (the frame size, 44 for the default frame type) covers every channel, PAC
//! being sampled every other time.
//!
//! This crate turns those batches into `Frame`s (one `u16` per channel) and keeps the newest batch
//! worth of frames available to readers:
//!
//! - `extract` reshapes one raw batch into frames.
//! - `Acquisition` runs a background thread that collects, extracts and publishes, forever.
//! - `Session` ties a `Device` and an `Acquisition` together and closes the device when dropped.
//! - `Poller` is the no-thread variant: collect one batch when asked.
//!
//! The device itself is abstracted by the `Device` trait. With the `hardware` feature the real
//! Cheetah driver is used by default; otherwise a `Simulator` stands in.

#[macro_use] extern crate error_chain;
#[macro_use] extern crate log;
#[macro_use] extern crate serde_derive;
#[macro_use] extern crate utils;
extern crate chrono;
extern crate comms;
extern crate serde;
extern crate serde_json;

#[cfg(test)] extern crate tempfile;

use std::sync::Arc;

mod acquire;
mod device;
mod extract;
mod poll;
mod session;
mod settings;
pub mod sim;

pub use acquire::Acquisition;
pub use device::{Device, Finger, Layout};
pub use extract::extract;
pub use poll::Poller;
pub use session::{copy_frames, Reader, Session};
pub use settings::{Settings, MAX_BATCH_FRAME_COUNT, SETTINGS_ENV};

group_attr! {
    #[cfg(feature = "hardware")]

    extern crate libc;

    mod wrapper;
    mod cheetah;

    pub use cheetah::Cheetah;

    /// Device used when none is named explicitly
    pub type DefaultDevice = Cheetah;
}

/// Device used when none is named explicitly
#[cfg(not(feature = "hardware"))]
pub type DefaultDevice = sim::Simulator;

error_chain! {
    errors {
        WrongMaxBiotacNumber(n: usize) {
            description("unsupported number of BioTacs per Cheetah")
            display("built for {} BioTacs per Cheetah, but the SDK only supports 3 or 5", n)
        }

        NoBiotacDetected {
            description("no BioTac detected")
            display("no BioTac detected on any Cheetah port")
        }

        BadSensorIndex(index: usize) {
            description("sensor index out of range")
            display("sensor index {} out of range (Cheetah has {} ports)", index, MAX_BIOTACS_PER_CHEETAH)
        }

        BadSettings(why: String) {
            description("invalid BioTac settings")
            display("invalid BioTac settings: {}", why)
        }

        ConfigureBatch(samples: usize) {
            description("batch configuration rejected")
            display("could not configure a batch of {} samples", samples)
        }

        Collect {
            description("batch collection failed")
            display("batch collection failed")
        }

        Sdk(call: &'static str, code: i32) {
            description("BioTac SDK error")
            display("{} failed with error code {}", call, code)
        }

        AcquisitionPanicked {
            description("acquisition thread panicked")
            display("acquisition thread panicked")
        }
    }

    foreign_links {
        Io(::std::io::Error);
        Json(::serde_json::Error);
    }
}

/// Number of channel slots in a frame
pub const CHANNELS: usize = 36;

/// Number of ports on one Cheetah (the SDK is built for 3 or 5)
pub const MAX_BIOTACS_PER_CHEETAH: usize = 3;

/// Channel ids of the named BioTac readings
pub mod channel {
    use std::ops::Range;

    /// Dynamic pressure
    pub const PAC: usize = 0;
    /// Static pressure
    pub const PDC: usize = 1;
    /// Dynamic temperature
    pub const TAC: usize = 2;
    /// Static temperature
    pub const TDC: usize = 3;
    /// The 19 impedance electrodes
    pub const ELECTRODES: Range<usize> = 17..36;
}

/// One reading as delivered by the device: a channel id and one word per Cheetah port.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Sample {
    pub channel_id: u32,
    pub words: [u16; MAX_BIOTACS_PER_CHEETAH],
}

/// One snapshot of every channel of one BioTac.
///
/// Layout-compatible with the C `biotac_frame` struct.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Frame {
    pub channel: [u16; CHANNELS],
}

impl Default for Frame {
    fn default() -> Frame {
        Frame { channel: [0; CHANNELS] }
    }
}

impl Frame {
    pub fn pac(&self) -> u16 { self.channel[channel::PAC] }
    pub fn pdc(&self) -> u16 { self.channel[channel::PDC] }
    pub fn tac(&self) -> u16 { self.channel[channel::TAC] }
    pub fn tdc(&self) -> u16 { self.channel[channel::TDC] }

    pub fn electrodes(&self) -> &[u16] {
        &self.channel[channel::ELECTRODES]
    }
}

/// The frames extracted from one batch, shared read-only once published
pub type Frames = Arc<Vec<Frame>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_accessors() {
        let mut frame = Frame::default();
        for (i, c) in frame.channel.iter_mut().enumerate() {
            *c = i as u16;
        }
        assert_eq!((frame.pac(), frame.pdc(), frame.tac(), frame.tdc()), (0, 1, 2, 3));
        assert_eq!(frame.electrodes().len(), 19);
        assert_eq!(frame.electrodes()[0], 17);
        assert_eq!(frame.electrodes()[18], 35);
    }

    #[test]
    fn frame_matches_c_layout() {
        assert_eq!(::std::mem::size_of::<Frame>(), 2 * CHANNELS);
    }

    #[test]
    fn error_messages() {
        let e: Error = ErrorKind::BadSensorIndex(4).into();
        assert_eq!(e.to_string(), "sensor index 4 out of range (Cheetah has 3 ports)");
        let e: Error = ErrorKind::Sdk("bt_cheetah_initialize", -2).into();
        assert_eq!(e.to_string(), "bt_cheetah_initialize failed with error code -2");
    }
}
