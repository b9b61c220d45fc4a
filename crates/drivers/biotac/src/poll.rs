use {extract, DefaultDevice, Device, Frame, Layout, Result, ResultExt, Sample, Settings, ErrorKind, MAX_BIOTACS_PER_CHEETAH};

/// A BioTac read on demand, without a background thread.
///
/// Each call to `frames()` collects one batch, blocking until the device delivers it.
pub struct Poller<D: Device = DefaultDevice> {
    device: Option<D>,
    layout: Layout,
    batch: Vec<Sample>,
}

impl<D: Device> Poller<D> {
    pub fn init(settings: &Settings) -> Result<Poller<D>> {
        settings.validate()?;
        let (mut device, layout) = D::initialize(settings)?;

        let configured = layout.n_samples().and_then(|n| {
            device.configure_batch(n).chain_err(|| ErrorKind::ConfigureBatch(n)).map(|()| n)
        });
        let n_samples = match configured {
            Ok(n) => n,
            Err(e) => {
                if let Err(close_err) = device.close() {
                    warn!("could not close BioTac after failed configuration: {}", close_err);
                }
                return Err(e);
            }
        };

        Ok(Poller {
            device: Some(device),
            batch: vec![Sample::default(); n_samples],
            layout: layout,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn n_samples(&self) -> usize {
        self.batch.len()
    }

    /// Collect one batch and extract the frames for `sensor`.
    pub fn frames(&mut self, sensor: usize) -> Result<Vec<Frame>> {
        if sensor >= MAX_BIOTACS_PER_CHEETAH {
            bail!(ErrorKind::BadSensorIndex(sensor));
        }
        let (device, batch) = match self.device {
            Some(ref mut device) => (device, &mut self.batch),
            None => bail!("BioTac poller is closed"),
        };

        prof!("collect", device.collect_batch(batch)).chain_err(|| ErrorKind::Collect)?;
        Ok(prof!("extract", extract(&self.batch, self.layout.frame_size, sensor)))
    }

    /// Collect one batch and copy as many of its frames as fit into `out`.
    ///
    /// Unlike `Session::latest_frames`, a short `out` gets the first frames rather than nothing.
    pub fn latest_frames(&mut self, sensor: usize, out: &mut [Frame]) -> Result<usize> {
        let frames = self.frames(sensor)?;
        let n = frames.len().min(out.len());
        out[..n].copy_from_slice(&frames[..n]);
        Ok(n)
    }

    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        match self.device.take() {
            Some(device) => device.close(),
            None => Ok(()),
        }
    }
}

impl<D: Device> Drop for Poller<D> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("error while closing BioTac: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim::Simulator;

    fn fast() -> Settings {
        Settings { sample_rate_hz: 4_400_000, batch_frame_count: 3, ..Settings::default() }
    }

    #[test]
    fn polls_one_batch_at_a_time() {
        let mut poller = Poller::<Simulator>::init(&fast()).unwrap();
        assert_eq!(poller.n_samples(), 44 * 3);

        let first = poller.frames(0).unwrap();
        let second = poller.frames(0).unwrap();
        assert_eq!(first.len(), 3);
        assert!(first != second);

        let mut out = [Frame::default(); 2];
        assert_eq!(poller.latest_frames(0, &mut out).unwrap(), 2);
        assert!(out[1].electrodes().iter().all(|&e| e > 0));

        poller.close().unwrap();
    }

    #[test]
    fn rejects_bad_sensor() {
        let mut poller = Poller::<Simulator>::init(&fast()).unwrap();
        assert!(poller.frames(MAX_BIOTACS_PER_CHEETAH).is_err());
    }
}
