//! PCM sample utilities: downmix, resample, RMS, wire encoding.
//!
//! The remote recognizer wants **16 kHz mono 16-bit LE** audio; the
//! microphone delivers whatever the device prefers.  Resampling is linear
//! interpolation — adequate for speech endpointing and recognition upload
//! (swap in `rubato` for a higher-quality path).

/// Mix interleaved multi-channel audio down to mono by averaging channels.
///
/// The output length is `samples.len() / channels`.  Mono input is returned
/// as an owned copy; zero channels yields an empty vector.
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Resample mono audio from `from_hz` to `to_hz` by linear interpolation.
///
/// Equal rates and empty input are no-ops.
pub fn resample(samples: &[f32], from_hz: u32, to_hz: u32) -> Vec<f32> {
    if from_hz == to_hz || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = f64::from(to_hz) / f64::from(from_hz);
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };
        output.push(sample);
    }

    output
}

/// Root-mean-square amplitude of a frame; `0.0` for an empty frame.
pub fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let mean_sq = frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32;
    mean_sq.sqrt()
}

/// Encode `f32` samples in `[-1, 1]` as little-endian signed 16-bit PCM.
pub fn to_i16_le_bytes(samples: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        let clamped = s.clamp(-1.0, 1.0);
        let value = (clamped * f32::from(i16::MAX)) as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- downmix -----------------------------------------------------------

    #[test]
    fn downmix_mono_is_identity() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(downmix(&input, 1), input);
    }

    #[test]
    fn downmix_stereo_averages_frames() {
        let input = vec![1.0_f32, -1.0, 0.5, 0.5];
        let out = downmix(&input, 2);
        assert_eq!(out.len(), 2);
        assert!((out[0]).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn downmix_zero_channels_is_empty() {
        assert!(downmix(&[1.0, 2.0], 0).is_empty());
    }

    // ---- resample ----------------------------------------------------------

    #[test]
    fn resample_same_rate_is_noop() {
        let input = vec![0.25_f32; 160];
        assert_eq!(resample(&input, 16_000, 16_000), input);
    }

    #[test]
    fn resample_48k_to_16k_thirds_the_length() {
        let input = vec![0.5_f32; 480];
        assert_eq!(resample(&input, 48_000, 16_000).len(), 160);
    }

    #[test]
    fn resample_preserves_dc_amplitude() {
        let input = vec![0.5_f32; 441];
        for &s in &resample(&input, 44_100, 16_000) {
            assert!((s - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn resample_upsamples() {
        let input = vec![0.0_f32; 80];
        assert_eq!(resample(&input, 8_000, 16_000).len(), 160);
    }

    // ---- rms ---------------------------------------------------------------

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms(&[0.0; 480]), 0.0);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn rms_of_constant_signal_is_its_magnitude() {
        assert!((rms(&[0.5; 480]) - 0.5).abs() < 1e-6);
        assert!((rms(&[-0.5; 480]) - 0.5).abs() < 1e-6);
    }

    // ---- to_i16_le_bytes ---------------------------------------------------

    #[test]
    fn encodes_two_bytes_per_sample() {
        assert_eq!(to_i16_le_bytes(&[0.0, 0.5, -0.5]).len(), 6);
    }

    #[test]
    fn encodes_full_scale_and_silence() {
        let bytes = to_i16_le_bytes(&[0.0, 1.0]);
        assert_eq!(&bytes[0..2], &0i16.to_le_bytes());
        assert_eq!(&bytes[2..4], &i16::MAX.to_le_bytes());
    }

    #[test]
    fn clamps_out_of_range_samples() {
        let bytes = to_i16_le_bytes(&[2.0, -2.0]);
        assert_eq!(&bytes[0..2], &i16::MAX.to_le_bytes());
        assert_eq!(&bytes[2..4], &(-i16::MAX).to_le_bytes());
    }
}
