use {ErrorKind, Result, Sample, Settings, MAX_BATCH_FRAME_COUNT};

/// A BioTac found on one of the Cheetah ports
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finger {
    /// 1-based Cheetah port number (port `n` is sensor index `n - 1`)
    pub port: usize,
    pub serial: String,
}

/// Batch geometry and attached fingers, as reported by the device after initialization
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Samples needed to cover every channel once
    pub frame_size: usize,
    /// Frames delivered per batch
    pub batch_frame_count: usize,
    pub fingers: Vec<Finger>,
}

impl Layout {
    /// Samples per batch
    ///
    /// Fails if the batch would be empty or bigger than a batch buffer can be.
    pub fn n_samples(&self) -> Result<usize> {
        if self.batch_frame_count > MAX_BATCH_FRAME_COUNT {
            bail!(ErrorKind::BadSettings(format!("{} frames per batch, at most {} allowed",
                                                 self.batch_frame_count, MAX_BATCH_FRAME_COUNT)));
        }
        match self.frame_size.checked_mul(self.batch_frame_count) {
            Some(0) => bail!(ErrorKind::BadSettings(format!("device reported an empty batch ({:?})", self))),
            Some(n) => Ok(n),
            None => bail!(ErrorKind::BadSettings(format!("batch of {} {}-sample frames is too big",
                                                         self.batch_frame_count, self.frame_size))),
        }
    }

    pub fn finger(&self, sensor: usize) -> Option<&Finger> {
        self.fingers.iter().find(|f| f.port == sensor + 1)
    }
}

/// The acquisition hardware, as far as this crate is concerned.
///
/// Implementations own whatever handle the vendor library hands out. The contract is:
/// `initialize` once, `configure_batch` before collecting, `collect_batch` as often as desired
/// (each call blocks until a whole batch has arrived), `close` once at the end.
pub trait Device: Send + Sized + 'static {
    /// Open the device and find out what is attached.
    ///
    /// Fails if the settings are unusable or no BioTac is connected.
    fn initialize(settings: &Settings) -> Result<(Self, Layout)>;

    /// Prepare to deliver batches of `n_samples` samples.
    fn configure_batch(&mut self, n_samples: usize) -> Result<()>;

    /// Fill `batch` (whose length was passed to `configure_batch`) with the next batch.
    fn collect_batch(&mut self, batch: &mut [Sample]) -> Result<()>;

    /// Release the device.
    fn close(self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_geometry() {
        let layout = Layout {
            frame_size: 44,
            batch_frame_count: 5,
            fingers: vec![Finger { port: 2, serial: "BT-0002".into() }],
        };
        assert_eq!(layout.n_samples().unwrap(), 220);
        assert_eq!(layout.finger(1).map(|f| &f.serial[..]), Some("BT-0002"));
        assert!(layout.finger(0).is_none());
    }

    fn rejected(layout: Layout) -> bool {
        match layout.n_samples() {
            Err(e) => match *e.kind() {
                ErrorKind::BadSettings(_) => true,
                _ => false,
            },
            Ok(_) => false,
        }
    }

    #[test]
    fn unusable_geometry() {
        let layout = |frame_size, batch_frame_count| Layout { frame_size: frame_size, batch_frame_count: batch_frame_count, fingers: vec![] };

        assert!(rejected(layout(0, 5)));
        assert!(rejected(layout(44, 0)));
        assert!(rejected(layout(44, MAX_BATCH_FRAME_COUNT + 1)));
        assert!(rejected(layout(usize::max_value() / 4, 8)));
        assert_eq!(layout(44, MAX_BATCH_FRAME_COUNT).n_samples().unwrap(), 44 * MAX_BATCH_FRAME_COUNT);
    }
}
