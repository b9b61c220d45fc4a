//! Utilities for communication between acquisition threads and their readers

extern crate utils;
#[macro_use] extern crate log;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

mod latest;

pub use latest::Latest;

/// Container for a thread that loops until asked to stop.
///
/// The thread body receives a flag that stays `true` until `stop()` is called. Stopping is
/// cooperative: the body has to check the flag, so a body stuck in a blocking call only notices
/// after that call returns.
pub struct RunningThread<R: Send + 'static> {
    /// Cleared to ask the thread to finish up
    running: Arc<AtomicBool>,

    /// Handle to the running thread
    ///
    /// Wrapped in an option so it can be joined without moving self.
    thread: Option<thread::JoinHandle<R>>,
}

impl<R: Send + 'static> RunningThread<R> {
    /// Spawn a named thread running `f`. Each such thread gets its own profiler.
    pub fn spawn<F>(name: &'static str, f: F) -> io::Result<RunningThread<R>>
        where F: FnOnce(&AtomicBool) -> R + Send + 'static
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let thread = thread::Builder::new().name(name.into()).spawn(move || {
            utils::prof::start(name);
            let ret = f(&flag);
            utils::prof::finish();
            ret
        })?;
        debug!("spawned thread {:?}", name);

        Ok(RunningThread {
            running: running,
            thread: Some(thread),
        })
    }

    /// True until `stop()` has been called.
    pub fn is_running(&self) -> bool {
        self.thread.is_some() && self.running.load(Ordering::SeqCst)
    }

    /// Clear the flag without waiting for the thread.
    pub fn signal(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Clear the flag and wait for the thread to exit.
    ///
    /// Returns what the thread returned (or its panic payload), or None if it was already joined.
    pub fn stop(&mut self) -> Option<thread::Result<R>> {
        self.signal();
        self.thread.take().map(|t| t.join())
    }
}

impl<R: Send + 'static> Drop for RunningThread<R> {
    /// When the RunningThread goes out of scope, stop the thread.
    fn drop(&mut self) {
        if let Some(Err(_)) = self.stop() {
            warn!("thread panicked before it was dropped");
        }
    }
}
