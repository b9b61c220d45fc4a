// these talk to the simulator; with real hardware attached, use readbiotac instead
#![cfg(not(feature = "hardware"))]

extern crate biotac;
extern crate biotac_shim;
extern crate serial_test;

use std::ptr;
use serial_test::serial;
use biotac::Frame;
use biotac_shim::{biotac_close, biotac_get_latest_data_array, biotac_get_n_samples, biotac_init};

// default settings: 44-sample frames, 5 frames per batch

#[test]
#[serial]
fn nothing_open() {
    biotac_close();
    assert_eq!(biotac_get_n_samples(), 0);
    assert_eq!(unsafe { biotac_get_latest_data_array(ptr::null_mut(), 0) }, 0);

    let mut frames = [Frame::default(); 5];
    assert_eq!(unsafe { biotac_get_latest_data_array(frames.as_mut_ptr(), frames.len()) }, 0);
    biotac_close();
}

#[test]
#[serial]
fn query_then_fetch() {
    assert_eq!(biotac_init(0), 1);
    assert_eq!(biotac_get_n_samples(), 220);

    let needed = unsafe { biotac_get_latest_data_array(ptr::null_mut(), 0) };
    assert_eq!(needed, 5);

    let mut short = [Frame::default(); 2];
    assert_eq!(unsafe { biotac_get_latest_data_array(short.as_mut_ptr(), short.len()) }, 5);
    assert!(short.iter().all(|f| *f == Frame::default()));

    let mut frames = vec![Frame::default(); needed];
    assert_eq!(unsafe { biotac_get_latest_data_array(frames.as_mut_ptr(), frames.len()) }, 5);
    assert!(frames.iter().all(|f| f.pac() >= 2048 && f.pdc() > 0));

    biotac_close();
    biotac_close();
    assert_eq!(biotac_get_n_samples(), 0);
}

#[test]
#[serial]
fn reinit_switches_sensor() {
    assert_eq!(biotac_init(0), 1);
    assert_eq!(biotac_init(0), 1);
    // nothing on port 2, but that's only worth a warning
    assert_eq!(biotac_init(1), 1);

    let mut frames = [Frame::default(); 5];
    assert_eq!(unsafe { biotac_get_latest_data_array(frames.as_mut_ptr(), frames.len()) }, 5);
    assert!(frames.iter().all(|f| *f == Frame::default()));

    biotac_close();
}

#[test]
#[serial]
fn bad_index() {
    assert_eq!(biotac_init(7), 0);
    assert_eq!(biotac_get_n_samples(), 0);
    biotac_close();
}
