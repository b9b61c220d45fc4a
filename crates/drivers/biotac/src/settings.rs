//! Acquisition settings
//!
//! Only the SDK defaults are known to work with the BioTac firmware, so the defaults here mirror
//! them. A JSON file can override any subset of the fields.

use std::env;
use std::fs::File;
use std::path::Path;
use serde_json;

use {ErrorKind, Result, ResultExt};

/// Environment variable naming a JSON settings file, read by `Settings::from_env`
pub const SETTINGS_ENV: &'static str = "BIOTAC_SETTINGS";

/// Most frames one batch may hold (ten seconds' worth at the default rate)
pub const MAX_BATCH_FRAME_COUNT: usize = 1000;

/// The SDK takes every setting as a C `int`
const MAX_SDK_VALUE: u32 = i32::max_value() as u32;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SPI clock of the Cheetah (kHz)
    pub spi_clock_khz: u32,
    /// Samples per second across all channels
    pub sample_rate_hz: u32,
    /// Frames the Cheetah buffers before handing over a batch
    pub batch_frame_count: usize,
    /// Batch period (ms)
    pub batch_ms: u32,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            spi_clock_khz: 4400,
            sample_rate_hz: 4400,
            batch_frame_count: 5,
            batch_ms: 50,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing fields keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        let file = File::open(path).chain_err(|| format!("could not open settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_reader(file).chain_err(|| format!("could not parse settings file {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from the file named by `$BIOTAC_SETTINGS`, or use the defaults if it is unset.
    pub fn from_env() -> Result<Settings> {
        match env::var_os(SETTINGS_ENV) {
            Some(path) => {
                debug!("loading BioTac settings from {:?}", path);
                Settings::from_file(path)
            }
            None => Ok(Settings::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.spi_clock_khz == 0 {
            bail!(ErrorKind::BadSettings("SPI clock must be nonzero".into()));
        }
        if self.sample_rate_hz == 0 {
            bail!(ErrorKind::BadSettings("sample rate must be nonzero".into()));
        }
        if self.batch_frame_count == 0 {
            bail!(ErrorKind::BadSettings("a batch must hold at least one frame".into()));
        }
        if self.batch_frame_count > MAX_BATCH_FRAME_COUNT {
            bail!(ErrorKind::BadSettings(format!("a batch can hold at most {} frames, not {}",
                                                 MAX_BATCH_FRAME_COUNT, self.batch_frame_count)));
        }
        for &(name, value) in &[("SPI clock", self.spi_clock_khz),
                                ("sample rate", self.sample_rate_hz),
                                ("batch period", self.batch_ms)] {
            if value > MAX_SDK_VALUE {
                bail!(ErrorKind::BadSettings(format!("{} of {} is out of range", name, value)));
            }
        }
        Ok(())
    }
}
