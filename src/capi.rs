//! C API over a single process-wide session
//!
//! See `include/biotac_shim.h` for the C side.

use std::{panic, slice};
use std::sync::{Mutex, MutexGuard, Once, PoisonError};
use libc::{self, c_int, c_uint, size_t};
use env_logger;
use biotac::{copy_frames, Frame, Session, Settings};

use Result;

lazy_static! {
    static ref SESSION: Mutex<Option<Session>> = Mutex::new(None);
}

static AT_EXIT: Once = Once::new();

fn session() -> MutexGuard<'static, Option<Session>> {
    SESSION.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run `f`, turning a panic into `default` so it never unwinds into C
fn guard<T, F: FnOnce() -> T + panic::UnwindSafe>(default: T, f: F) -> T {
    panic::catch_unwind(f).unwrap_or_else(|_| {
        error!("panic in BioTac C API");
        default
    })
}

fn open(sensor: usize) -> Result<()> {
    let mut slot = session();
    if let Some(ref session) = *slot {
        if session.sensor() == sensor && session.is_running() {
            debug!("BioTac session for sensor {} already open", sensor);
            return Ok(());
        }
    }
    if let Some(old) = slot.take() {
        if let Err(e) = old.close() {
            warn!("error while closing previous BioTac session: {}", e);
        }
    }

    let settings = Settings::from_env()?;
    *slot = Some(Session::init(&settings, sensor)?);

    AT_EXIT.call_once(|| unsafe {
        libc::atexit(close_at_exit);
    });
    Ok(())
}

fn close() {
    // the lock is not held while the acquisition thread winds down
    let session = session().take();
    if let Some(session) = session {
        if let Err(e) = session.close() {
            error!("error while closing BioTac session: {}", e);
        }
    }
}

extern "C" fn close_at_exit() {
    // NB: must not unwind into libc
    let _ = panic::catch_unwind(close);
}

/// Start acquiring frames from the BioTac on port `index` (counting from 0).
///
/// Returns 1 on success, 0 on failure (the reason is logged).
#[no_mangle]
pub extern "C" fn biotac_init(index: c_uint) -> c_int {
    let _ = env_logger::try_init();

    guard(0, || match open(index as usize) {
        Ok(()) => 1,
        Err(e) => {
            error!("could not start BioTac session: {}", e);
            for cause in e.iter().skip(1) {
                error!("caused by: {}", cause);
            }
            0
        }
    })
}

/// Stop acquisition and close the device. Does nothing if nothing is open.
#[no_mangle]
pub extern "C" fn biotac_close() {
    guard((), close)
}

/// Samples per raw batch, or 0 if not initialized.
#[no_mangle]
pub extern "C" fn biotac_get_n_samples() -> size_t {
    guard(0, || session().as_ref().map_or(0, Session::n_samples))
}

/// Wait for the next batch of frames and copy it into `array`, which has room for `capacity`
/// frames.
///
/// Returns the number of frames in the batch. If `array` is null or `capacity` is too small,
/// nothing is copied: call again with at least that much room. Returns 0 if not initialized.
///
/// # Safety
///
/// Unless null, `array` must point to `capacity` writable frames.
#[no_mangle]
pub unsafe extern "C" fn biotac_get_latest_data_array(array: *mut Frame, capacity: size_t) -> size_t {
    let reader = match *session() {
        Some(ref session) => session.reader(),
        None => return 0,
    };

    guard(0, panic::AssertUnwindSafe(move || {
        let frames = reader.take();
        if array.is_null() {
            frames.len()
        } else {
            copy_frames(&frames, slice::from_raw_parts_mut(array, capacity))
        }
    }))
}
