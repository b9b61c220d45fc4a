//! Simulated BioTac, for running without a Cheetah plugged in

use std::thread;
use std::time::Duration;

use {channel, Device, ErrorKind, Finger, Layout, Result, Sample, Settings, MAX_BIOTACS_PER_CHEETAH};

/// Channel sampled at each position of a frame: PAC every other sample, and in between PDC, the
/// electrodes, TAC and TDC.
pub const FRAME_STRUCTURE: [u8; 44] = [ 1, 0, 17, 0, 18, 0, 19, 0, 20, 0, 21, 0, 22, 0, 23, 0,
                                       24, 0, 25, 0, 26, 0, 27, 0, 28, 0, 29, 0, 30, 0, 31, 0,
                                       32, 0, 33, 0, 34, 0, 35, 0,  2, 0,  3, 0];

/// Port the simulated finger is plugged into
pub const PORT: usize = 1;

/// Plays a BioTac on port 1 of a Cheetah.
///
/// Batches arrive at the pace the sample rate dictates. Readings are 12-bit like the real thing:
/// PAC wobbles from sample to sample, everything else drifts slowly. Unconnected ports read zero.
pub struct Simulator {
    /// Configured batch length
    n_samples: Option<usize>,
    /// Time it takes the "sensor" to produce one sample
    sample_period: Duration,
    /// Samples produced so far
    tick: u64,
}

impl Simulator {
    fn reading(&self, id: usize, tick: u64) -> u16 {
        let t = tick as usize;
        let value = if id == channel::PAC {
            2048 + (t * 37) % 512
        } else {
            1000 + 50 * id + (t / FRAME_STRUCTURE.len()) % 256
        };
        (value & 0xFFF) as u16
    }
}

impl Device for Simulator {
    fn initialize(settings: &Settings) -> Result<(Simulator, Layout)> {
        settings.validate()?;
        debug!("simulating a BioTac at {} Hz", settings.sample_rate_hz);

        let layout = Layout {
            frame_size: FRAME_STRUCTURE.len(),
            batch_frame_count: settings.batch_frame_count,
            fingers: vec![Finger { port: PORT, serial: "SIM-0001".into() }],
        };
        let sim = Simulator {
            n_samples: None,
            sample_period: Duration::from_nanos(1_000_000_000 / settings.sample_rate_hz as u64),
            tick: 0,
        };
        Ok((sim, layout))
    }

    fn configure_batch(&mut self, n_samples: usize) -> Result<()> {
        if n_samples == 0 || n_samples % FRAME_STRUCTURE.len() != 0 {
            bail!(ErrorKind::ConfigureBatch(n_samples));
        }
        self.n_samples = Some(n_samples);
        Ok(())
    }

    fn collect_batch(&mut self, batch: &mut [Sample]) -> Result<()> {
        if self.n_samples != Some(batch.len()) {
            bail!("simulator configured for {:?} samples, asked for {}", self.n_samples, batch.len());
        }

        thread::sleep(self.sample_period * batch.len() as u32);

        for sample in batch.iter_mut() {
            let pos = (self.tick % FRAME_STRUCTURE.len() as u64) as usize;
            let id = FRAME_STRUCTURE[pos] as usize;
            let mut words = [0; MAX_BIOTACS_PER_CHEETAH];
            words[PORT - 1] = self.reading(id, self.tick);

            *sample = Sample { channel_id: id as u32, words: words };
            self.tick += 1;
        }
        Ok(())
    }

    fn close(self) -> Result<()> {
        debug!("simulated BioTac closed after {} samples", self.tick);
        Ok(())
    }
}
