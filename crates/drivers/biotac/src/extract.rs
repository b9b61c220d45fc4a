use {Frame, Sample, CHANNELS, MAX_BIOTACS_PER_CHEETAH};

/// Reshape a raw batch into frames for the BioTac on port `sensor + 1`.
///
/// The batch is cut into consecutive runs of `frame_size` samples, and each run becomes one
/// frame. Within a run, every sample writes its word for `sensor` into the slot of its channel
/// (so for channels sampled more than once per frame, such as PAC, the last reading wins).
/// Channels that never show up in a run read as zero.
///
/// # Panics
///
/// If the batch is not a whole number of frames, if `sensor` is not a Cheetah port, or if a sample
/// carries a channel id outside the frame. Any of these means the device and this code disagree
/// about the data format, and carrying on would produce garbage.
pub fn extract(batch: &[Sample], frame_size: usize, sensor: usize) -> Vec<Frame> {
    assert!(frame_size > 0, "frame size must be nonzero");
    assert!(batch.len() % frame_size == 0,
            "batch of {} samples is not a whole number of {}-sample frames", batch.len(), frame_size);
    assert!(sensor < MAX_BIOTACS_PER_CHEETAH, "sensor index {} out of range", sensor);

    batch.chunks(frame_size)
         .map(|samples| {
             let mut frame = Frame::default();
             for sample in samples {
                 let id = sample.channel_id as usize;
                 assert!(id < CHANNELS, "channel id {} out of range", id);
                 frame.channel[id] = sample.words[sensor];
             }
             frame
         })
         .collect()
}

#[cfg(test)]
mod tests {
    use super::extract;
    use {Frame, Sample, CHANNELS};

    fn sample(channel_id: u32, word: u16) -> Sample {
        Sample { channel_id: channel_id, words: [word, 0xFFF - word, 7] }
    }

    #[test]
    fn two_frames_of_two_samples() {
        let batch = [sample(0, 0x10), sample(1, 0x20), sample(0, 0x30), sample(1, 0x40)];
        let frames = extract(&batch, 2, 0);

        let mut expected = [Frame::default(); 2];
        expected[0].channel[0] = 0x10;
        expected[0].channel[1] = 0x20;
        expected[1].channel[0] = 0x30;
        expected[1].channel[1] = 0x40;
        assert_eq!(frames, expected);
    }

    #[test]
    fn one_frame_per_run_of_samples() {
        let batch = (0..44 * 5).map(|i| sample((i % CHANNELS) as u32, i as u16)).collect::<Vec<_>>();
        assert_eq!(extract(&batch, 44, 0).len(), 5);
        assert_eq!(extract(&batch, 1, 0).len(), 220);
        assert!(extract(&[], 44, 0).is_empty());
    }

    #[test]
    fn sensor_selects_word() {
        let batch = [sample(3, 0x100)];
        assert_eq!(extract(&batch, 1, 0)[0].tdc(), 0x100);
        assert_eq!(extract(&batch, 1, 1)[0].tdc(), 0xFFF - 0x100);
        assert_eq!(extract(&batch, 1, 2)[0].tdc(), 7);
    }

    #[test]
    fn later_samples_overwrite_earlier_ones() {
        let batch = [sample(0, 1), sample(5, 2), sample(0, 3)];
        let frame = extract(&batch, 3, 0)[0];
        assert_eq!(frame.pac(), 3);
        assert_eq!(frame.channel[5], 2);
    }

    #[test]
    fn missing_channels_are_zero() {
        let batch = [sample(17, 0xABC), sample(17, 0xABD)];
        let frame = extract(&batch, 2, 0)[0];
        for (i, &c) in frame.channel.iter().enumerate() {
            if i == 17 {
                assert_eq!(c, 0xABD);
            } else {
                assert_eq!(c, 0);
            }
        }
    }

    #[test]
    fn deterministic() {
        let batch = (0..88).map(|i| sample((i * 7 % 36) as u32, (i * 31) as u16)).collect::<Vec<_>>();
        assert_eq!(extract(&batch, 44, 1), extract(&batch, 44, 1));
    }

    #[test]
    #[should_panic(expected = "channel id 36 out of range")]
    fn channel_out_of_range() {
        extract(&[sample(0, 1), sample(36, 2)], 2, 0);
    }

    #[test]
    #[should_panic(expected = "not a whole number")]
    fn ragged_batch() {
        extract(&[sample(0, 1), sample(1, 2), sample(2, 3)], 2, 0);
    }

    #[test]
    #[should_panic(expected = "sensor index 3 out of range")]
    fn bad_sensor() {
        extract(&[sample(0, 1)], 1, 3);
    }
}
