//! The real thing: a BioTac on a Cheetah, through the vendor SDK

use std::mem;
use libc::c_int;

use wrapper::biotac as ll;
use {Device, ErrorKind, Finger, Layout, Result, Sample, Settings, MAX_BIOTACS_PER_CHEETAH};

pub struct Cheetah {
    handle: ll::Cheetah,
    info: ll::bt_info,
    /// What the SDK fills in; copied into the caller's samples after each batch
    raw: Vec<ll::bt_data>,
}

fn serial(props: &ll::bt_property) -> String {
    let len = props.serial_number.iter().position(|&c| c == 0).unwrap_or(props.serial_number.len());
    String::from_utf8_lossy(&props.serial_number[..len]).into_owned()
}

impl Device for Cheetah {
    fn initialize(settings: &Settings) -> Result<(Cheetah, Layout)> {
        if MAX_BIOTACS_PER_CHEETAH != 3 && MAX_BIOTACS_PER_CHEETAH != 5 {
            bail!(ErrorKind::WrongMaxBiotacNumber(MAX_BIOTACS_PER_CHEETAH));
        }

        let mut info: ll::bt_info = unsafe { mem::zeroed() };
        info.spi_clock_speed = settings.spi_clock_khz as c_int;
        info.sample_rate_Hz = settings.sample_rate_hz as c_int;
        info.batch.batch_frame_count = settings.batch_frame_count as c_int;
        info.batch.batch_ms = settings.batch_ms as c_int;

        let mut handle: ll::Cheetah = 0;
        let code = unsafe { ll::bt_cheetah_initialize(&info, &mut handle) };
        if code != 0 {
            bail!(ErrorKind::Sdk("bt_cheetah_initialize", code));
        }

        // get properties
        let mut fingers = vec![];
        for port in 1..(MAX_BIOTACS_PER_CHEETAH + 1) {
            let mut props: ll::bt_property = unsafe { mem::zeroed() };
            let code = unsafe { ll::bt_cheetah_get_properties(handle, port as c_int, &mut props) };
            if code != 0 {
                unsafe { ll::bt_cheetah_close(handle) };
                bail!(ErrorKind::Sdk("bt_cheetah_get_properties", code));
            }
            if props.bt_connected == ll::YES {
                fingers.push(Finger { port: port, serial: serial(&props) });
                info.number_of_biotacs += 1;
            }
        }
        if fingers.is_empty() {
            unsafe { ll::bt_cheetah_close(handle) };
            bail!(ErrorKind::NoBiotacDetected);
        }

        unsafe { ll::bt_init_frame_and_batch_info(&mut info) };
        let layout = Layout {
            frame_size: info.frame.frame_size as usize,
            batch_frame_count: info.batch.batch_frame_count as usize,
            fingers: fingers,
        };

        Ok((Cheetah { handle: handle, info: info, raw: vec![] }, layout))
    }

    fn configure_batch(&mut self, n_samples: usize) -> Result<()> {
        self.raw = vec![unsafe { mem::zeroed() }; n_samples];
        let code = unsafe { ll::bt_cheetah_configure_batch(self.handle, &mut self.info, n_samples as c_int) };
        if code < 0 {
            bail!(ErrorKind::Sdk("bt_cheetah_configure_batch", code));
        }
        Ok(())
    }

    fn collect_batch(&mut self, batch: &mut [Sample]) -> Result<()> {
        if batch.len() != self.raw.len() {
            bail!("Cheetah configured for {} samples, asked for {}", self.raw.len(), batch.len());
        }

        unsafe { ll::bt_cheetah_collect_batch(self.handle, &self.info, self.raw.as_mut_ptr(), ll::NO) };

        for (sample, raw) in batch.iter_mut().zip(&self.raw) {
            sample.channel_id = raw.channel_id;
            for (word, d) in sample.words.iter_mut().zip(raw.d.iter()) {
                *word = d.word;
            }
        }
        Ok(())
    }

    fn close(self) -> Result<()> {
        unsafe { ll::bt_cheetah_close(self.handle) };
        info!("Cheetah closed");
        Ok(())
    }
}
