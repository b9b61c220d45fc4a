use std::sync::Arc;
use std::time::Duration;
use comms::Latest;

use {Acquisition, DefaultDevice, Device, ErrorKind, Frame, Frames, Layout, Result, Settings, MAX_BIOTACS_PER_CHEETAH};

/// Copy `frames` into `out` if it fits.
///
/// Returns the number of frames either way: if `out` is too short nothing is copied, and the
/// caller should come back with at least that much room.
pub fn copy_frames(frames: &[Frame], out: &mut [Frame]) -> usize {
    if out.len() >= frames.len() {
        out[..frames.len()].copy_from_slice(frames);
    }
    frames.len()
}

/// Read access to a session's frames, usable from any thread.
///
/// All readers of a session share one freshness flag: a batch taken by one reader is not fresh
/// for the others.
#[derive(Clone)]
pub struct Reader {
    latest: Arc<Latest<Frames>>,
}

impl Reader {
    /// Wait for the next batch of frames.
    ///
    /// Once acquisition has stopped, returns the last batch (or nothing, if there never was one)
    /// without waiting.
    pub fn take(&self) -> Frames {
        self.latest.take()
    }

    /// Like `take()`, but returns None if nothing new arrives within `timeout`.
    pub fn take_timeout(&self, timeout: Duration) -> Option<Frames> {
        self.latest.take_timeout(timeout)
    }

    /// Wait for the next batch and copy it into `out` (see `copy_frames`).
    ///
    /// If `out` is too short the batch is consumed anyway. Every batch of a session has the same
    /// number of frames, so a retry with enough room gets the next one.
    pub fn latest_frames(&self, out: &mut [Frame]) -> usize {
        copy_frames(&self.take(), out)
    }

    /// True once acquisition has ended and no more frames will be published.
    pub fn is_stopped(&self) -> bool {
        self.latest.is_stopped()
    }
}

/// An open BioTac with frames being acquired in the background.
///
/// The device is closed when the session is closed or dropped, whichever comes first.
pub struct Session<D: Device = DefaultDevice> {
    layout: Layout,
    sensor: usize,
    n_samples: usize,
    reader: Reader,
    acquisition: Option<Acquisition<D>>,
}

impl<D: Device> Session<D> {
    /// Open the device and start acquiring frames for the BioTac at `sensor` (0-based port).
    pub fn init(settings: &Settings, sensor: usize) -> Result<Session<D>> {
        settings.validate()?;
        if sensor >= MAX_BIOTACS_PER_CHEETAH {
            bail!(ErrorKind::BadSensorIndex(sensor));
        }

        let (device, layout) = D::initialize(settings)?;
        for finger in &layout.fingers {
            info!("finger #{} serial number = {}", finger.port, finger.serial);
        }
        if layout.finger(sensor).is_none() {
            warn!("no BioTac on port {}, its frames will not mean anything", sensor + 1);
        }

        let acquisition = Acquisition::start(device, &layout, sensor)?;
        info!("BioTac session started ({} samples per frame, {} frames per batch)",
              layout.frame_size, layout.batch_frame_count);

        Ok(Session {
            reader: Reader { latest: acquisition.latest() },
            n_samples: acquisition.n_samples(),
            acquisition: Some(acquisition),
            layout: layout,
            sensor: sensor,
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn sensor(&self) -> usize {
        self.sensor
    }

    /// Samples per raw batch
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Frames per batch, i.e. the room `latest_frames` needs
    pub fn frame_count(&self) -> usize {
        self.layout.batch_frame_count
    }

    pub fn reader(&self) -> Reader {
        self.reader.clone()
    }

    /// See `Reader::take`
    pub fn take(&self) -> Frames {
        self.reader.take()
    }

    /// See `Reader::latest_frames`
    pub fn latest_frames(&self, out: &mut [Frame]) -> usize {
        self.reader.latest_frames(out)
    }

    pub fn is_running(&self) -> bool {
        self.acquisition.as_ref().map_or(false, Acquisition::is_running)
    }

    /// Stop acquisition and close the device.
    ///
    /// Reports the first thing that went wrong: a failed acquisition loop, or failing to close.
    pub fn close(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        let mut acquisition = match self.acquisition.take() {
            Some(acquisition) => acquisition,
            None => return Ok(()),
        };

        let (device, result) = acquisition.stop();
        let closed = match device {
            Some(device) => device.close(),
            None => {
                warn!("BioTac handle was lost with the acquisition thread");
                Ok(())
            }
        };
        info!("BioTac session closed");

        result.and(closed)
    }
}

impl<D: Device> Drop for Session<D> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("error while closing BioTac session: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::mpsc;
    use std::thread;
    use {Finger, Sample};

    /// Ids (taken from the SPI clock setting) of the devices currently open
    static OPEN: Mutex<Vec<u32>> = Mutex::new(Vec::new());

    /// Id of a device that fails its first collection
    const UNPLUGGED: u32 = 666;

    /// Keeps track of open handles; every batch is the same
    struct Counted(u32);

    impl Device for Counted {
        fn initialize(settings: &Settings) -> Result<(Counted, Layout)> {
            if settings.batch_ms == 0 {
                bail!(ErrorKind::NoBiotacDetected);
            }
            OPEN.lock().unwrap().push(settings.spi_clock_khz);
            Ok((Counted(settings.spi_clock_khz), Layout {
                frame_size: 2,
                batch_frame_count: settings.batch_frame_count,
                fingers: vec![Finger { port: 1, serial: "counted".into() }],
            }))
        }

        fn configure_batch(&mut self, _: usize) -> Result<()> {
            Ok(())
        }

        fn collect_batch(&mut self, batch: &mut [Sample]) -> Result<()> {
            thread::sleep(Duration::from_millis(1));
            if self.0 == UNPLUGGED {
                bail!("device unplugged");
            }
            for (i, s) in batch.iter_mut().enumerate() {
                *s = Sample { channel_id: (i % 2) as u32, words: [10 + i as u16, 0, 0] };
            }
            Ok(())
        }

        fn close(self) -> Result<()> {
            OPEN.lock().unwrap().retain(|&id| id != self.0);
            Ok(())
        }
    }

    fn settings(frames: usize) -> Settings {
        Settings { batch_frame_count: frames, ..Settings::default() }
    }

    fn is_open(id: u32) -> bool {
        OPEN.lock().unwrap().contains(&id)
    }

    #[test]
    fn copy_frames_protocol() {
        let frames = [Frame::default(); 3];
        let mut small = [Frame::default(); 2];
        small[0].channel[0] = 99;
        assert_eq!(copy_frames(&frames, &mut small), 3);
        assert_eq!(small[0].channel[0], 99); // untouched

        let mut big = [Frame::default(); 4];
        big[0].channel[0] = 99;
        big[3].channel[0] = 42;
        assert_eq!(copy_frames(&frames, &mut big), 3);
        assert_eq!(big[0].channel[0], 0);
        assert_eq!(big[3].channel[0], 42);
    }

    #[test]
    fn session_lifecycle() {
        let session = Session::<Counted>::init(&settings(4), 0).unwrap();
        assert_eq!(session.n_samples(), 8);
        assert_eq!(session.frame_count(), 4);
        assert!(session.is_running());

        let frames = session.take();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[1].pac(), 12);
        assert_eq!(frames[1].pdc(), 13);

        let mut out = vec![Frame::default(); 3];
        assert_eq!(session.latest_frames(&mut out), 4);
        out.resize(4, Frame::default());
        assert_eq!(session.latest_frames(&mut out), 4);
        assert_eq!(out[3].pdc(), 17);

        session.close().unwrap();
    }

    #[test]
    fn readers_released_on_close() {
        let session = Session::<Counted>::init(&settings(1), 0).unwrap();
        let reader = session.reader();
        session.close().unwrap();

        assert!(reader.is_stopped());
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            reader.take();
            tx.send(reader.take().len()).unwrap();
        });
        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap() <= 1);
    }

    #[test]
    fn close_reports_collect_failure() {
        let session = Session::<Counted>::init(&Settings { spi_clock_khz: UNPLUGGED, ..settings(1) }, 0).unwrap();
        let reader = session.reader();

        // wait for the loop to give up
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            reader.take();
            tx.send(reader.is_stopped()).unwrap();
        });
        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap());
        assert!(!session.is_running());

        match session.close() {
            Err(e) => match *e.kind() {
                ErrorKind::Collect => {}
                ref other => panic!("wrong error: {}", other),
            },
            Ok(()) => panic!("collect failure not reported"),
        }
        assert!(!is_open(UNPLUGGED));
    }

    #[test]
    fn init_failures() {
        assert!(Session::<Counted>::init(&Settings { batch_ms: 0, ..Settings::default() }, 0).is_err());
        assert!(Session::<Counted>::init(&settings(0), 0).is_err());
        match Session::<Counted>::init(&settings(usize::max_value() / 8), 0) {
            Err(e) => match *e.kind() {
                ErrorKind::BadSettings(_) => {}
                ref other => panic!("wrong error: {}", other),
            },
            Ok(_) => panic!("oversized batch accepted"),
        }
        match Session::<Counted>::init(&settings(1), MAX_BIOTACS_PER_CHEETAH) {
            Err(e) => match *e.kind() {
                ErrorKind::BadSensorIndex(_) => {}
                ref other => panic!("wrong error: {}", other),
            },
            Ok(_) => panic!("bad sensor accepted"),
        }
    }

    #[test]
    fn drop_closes_device() {
        let id = 1234;
        {
            let _session = Session::<Counted>::init(&Settings { spi_clock_khz: id, ..settings(2) }, 1).unwrap();
            assert!(is_open(id));
        }
        assert!(!is_open(id));
    }
}
