//! Background acquisition thread

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicBool, Ordering};
use chrono::Local;
use comms::{Latest, RunningThread};

use {extract, Device, Error, ErrorKind, Frames, Layout, Result, ResultExt, Sample, MAX_BIOTACS_PER_CHEETAH};

const THREAD_NAME: &'static str = "biotac acquisition";

/// What the thread hands back: the device (unless it never got it) and how the loop ended
type Outcome<D> = (Option<D>, Result<()>);

/// Thread body, boxed so the spawner can be swapped out
type Body<D> = Box<dyn FnOnce(&AtomicBool) -> Outcome<D> + Send>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases blocked readers however the acquisition loop ends (including by panicking).
struct WakeReaders<'a>(&'a Latest<Frames>);

impl<'a> Drop for WakeReaders<'a> {
    fn drop(&mut self) {
        self.0.stop();
    }
}

/// A running acquisition loop.
///
/// The loop owns the device while it runs. It collects a batch (blocking until the device
/// delivers), extracts frames, publishes them and starts over, until `stop()` is called or the
/// device reports an error. `stop()` hands the device back.
pub struct Acquisition<D: Device> {
    latest: Arc<Latest<Frames>>,
    thread: RunningThread<Outcome<D>>,
    n_samples: usize,
}

impl<D: Device> Acquisition<D> {
    /// Configure `device` for batches of `layout.n_samples()` samples and start collecting frames
    /// for `sensor`.
    ///
    /// If the batch geometry is unusable, the device refuses the configuration or the thread
    /// cannot be spawned, the device is closed and the error returned.
    pub fn start(device: D, layout: &Layout, sensor: usize) -> Result<Acquisition<D>> {
        Acquisition::start_on(device, layout, sensor, |body| RunningThread::spawn(THREAD_NAME, body))
    }

    fn start_on<S>(mut device: D, layout: &Layout, sensor: usize, spawn: S) -> Result<Acquisition<D>>
        where S: FnOnce(Body<D>) -> io::Result<RunningThread<Outcome<D>>>
    {
        let checked = if sensor >= MAX_BIOTACS_PER_CHEETAH {
            Err(ErrorKind::BadSensorIndex(sensor).into())
        } else {
            layout.n_samples().and_then(|n| {
                device.configure_batch(n).chain_err(|| ErrorKind::ConfigureBatch(n)).map(|()| n)
            })
        };
        let n_samples = match checked {
            Ok(n) => n,
            Err(e) => {
                if let Err(close_err) = device.close() {
                    warn!("could not close BioTac after failed start: {}", close_err);
                }
                return Err(e);
            }
        };

        // allocated once here and reused for every batch
        let batch = vec![Sample::default(); n_samples];
        let frame_size = layout.frame_size;
        let latest = Arc::new(Latest::new(Frames::default()));

        // the thread takes the device out; if it never starts, the device is still here to close
        let handoff = Arc::new(Mutex::new(Some(device)));
        let body: Body<D> = {
            let (latest, handoff) = (latest.clone(), handoff.clone());
            Box::new(move |running: &AtomicBool| {
                let device = lock(&handoff).take();
                match device {
                    Some(device) => {
                        let (device, result) = run(device, batch, frame_size, sensor, &latest, running);
                        (Some(device), result)
                    }
                    None => (None, Ok(())),
                }
            })
        };

        let thread = match spawn(body) {
            Ok(thread) => thread,
            Err(e) => {
                let device = lock(&handoff).take();
                if let Some(device) = device {
                    if let Err(close_err) = device.close() {
                        warn!("could not close BioTac after failed start: {}", close_err);
                    }
                }
                return Err(e).chain_err(|| "could not spawn acquisition thread");
            }
        };
        debug!("acquiring {} samples per batch for sensor {}", n_samples, sensor);

        Ok(Acquisition { latest: latest, thread: thread, n_samples: n_samples })
    }

    /// Samples per batch
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Where the frames show up
    pub fn latest(&self) -> Arc<Latest<Frames>> {
        self.latest.clone()
    }

    /// False once the loop has been asked to stop or has ended on its own.
    pub fn is_running(&self) -> bool {
        self.thread.is_running() && !self.latest.is_stopped()
    }

    /// Stop the loop, release readers, and wait for the thread to exit.
    ///
    /// Returns the device (unless the thread panicked and took it down) and the outcome of the
    /// loop. A batch collection already in progress is allowed to finish first. Calling this again
    /// returns `(None, Ok(()))`.
    pub fn stop(&mut self) -> (Option<D>, Result<()>) {
        self.thread.signal();
        self.latest.stop();
        match self.thread.stop() {
            None => (None, Ok(())),
            Some(Ok((device, result))) => (device, result),
            Some(Err(_)) => (None, Err(ErrorKind::AcquisitionPanicked.into())),
        }
    }
}

impl<D: Device> Drop for Acquisition<D> {
    fn drop(&mut self) {
        let (device, result) = self.stop();
        if let Err(e) = result {
            error!("BioTac acquisition failed: {}", e);
        }
        if let Some(device) = device {
            if let Err(e) = device.close() {
                error!("could not close BioTac: {}", e);
            }
        }
    }
}

/// The acquisition loop itself
fn run<D: Device>(mut device: D,
                  mut batch: Vec<Sample>,
                  frame_size: usize,
                  sensor: usize,
                  latest: &Latest<Frames>,
                  running: &AtomicBool) -> (D, Result<()>) {
    let _wake = WakeReaders(latest);

    let start = Local::now();
    let mut i = 0u64;
    let result = loop {
        if !running.load(Ordering::SeqCst) {
            break Ok(());
        }

        if let Err(e) = prof!("collect", device.collect_batch(&mut batch)) {
            let e = Error::with_chain(e, ErrorKind::Collect);
            error!("BioTac acquisition stopped: {}", e);
            break Err(e);
        }
        let frames = prof!("extract", extract(&batch, frame_size, sensor));
        latest.publish(Arc::new(frames));

        i += 1;
    };

    let millis = (Local::now() - start).num_milliseconds() as f64;
    info!("{} BioTac batches grabbed in {} s ({} FPS)!", i, millis/1000.0, 1000.0*(i as f64)/millis);

    (device, result)
}
