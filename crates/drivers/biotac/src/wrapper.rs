//! Bindings to the BioTac SDK (biotac.h / cheetah.h)

#![allow(non_camel_case_types, non_snake_case, dead_code)]

pub mod cheetah {
    use libc::c_int;

    /// Cheetah adapter handle
    pub type Cheetah = c_int;
}

pub mod biotac {
    use libc::{c_char, c_double, c_int, c_uint};
    use MAX_BIOTACS_PER_CHEETAH;

    pub use super::cheetah::Cheetah;

    pub const MAX_FRAME_SIZE: usize = 44;

    pub const YES: c_int = 1;
    pub const NO: c_int = 0;

    #[repr(C)]
    #[derive(Copy, Clone)]
    pub struct bt_info_frame {
        pub frame_type: c_int,
        pub frame_size: c_int,
        pub frame_structure: [c_char; MAX_FRAME_SIZE],
    }

    #[repr(C)]
    #[derive(Copy, Clone, Default)]
    pub struct bt_info_batch {
        pub batch_frame_count: c_int,
        pub batch_ms: c_int,
    }

    #[repr(C)]
    #[derive(Copy, Clone)]
    pub struct bt_info {
        pub spi_clock_speed: c_int,
        pub number_of_biotacs: c_int,
        pub sample_rate_Hz: c_int,
        pub frame: bt_info_frame,
        pub batch: bt_info_batch,
    }

    #[repr(C)]
    #[derive(Copy, Clone)]
    pub struct bt_property {
        pub serial_number: [u8; 25],
        pub cpu_speed: [u8; 8],
        pub firmware_version: [u8; 8],
        pub hardware_version: [u8; 8],
        pub bt_connected: c_int,
    }

    #[repr(C)]
    #[derive(Copy, Clone)]
    pub struct bt_single_biotac_data {
        pub channel_id: c_uint,
        pub word: u16,
        pub spi_data: [u8; 2],
        pub bit_parity: c_char,
    }

    #[repr(C)]
    #[derive(Copy, Clone)]
    pub struct bt_data {
        pub index: c_uint,
        pub time: c_double,
        pub batch_index: c_uint,
        pub frame_index: c_uint,
        pub channel_id: c_uint,
        pub d: [bt_single_biotac_data; MAX_BIOTACS_PER_CHEETAH],
    }

    #[link(name = "biotac")]
    #[link(name = "cheetah")]
    extern "C" {
        pub fn bt_cheetah_initialize(biotac: *const bt_info, ch_handle: *mut Cheetah) -> c_int;
        pub fn bt_cheetah_get_properties(ch_handle: Cheetah, biotac_number: c_int, property: *mut bt_property) -> c_int;
        pub fn bt_init_frame_and_batch_info(biotac: *mut bt_info);
        pub fn bt_cheetah_configure_batch(ch_handle: Cheetah, biotac: *mut bt_info, num_samples: c_int) -> c_int;
        pub fn bt_cheetah_collect_batch(ch_handle: Cheetah, biotac: *const bt_info, data: *mut bt_data, print_flag: c_int);
        pub fn bt_cheetah_close(ch_handle: Cheetah);
    }
}
