//! WAV file I/O (component C13): the auxiliary, allocating edge of the
//! crate that feeds sample streams into the DSP core and writes them back
//! out, via [`hound`]. Grounded on the original's `wav_util.cpp`, which
//! this crate's [`hound`]-based implementation replaces entirely.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::{RadlibError, RadlibResult};

/// Reads a mono 16-bit PCM WAV file, returning its sample rate and samples.
pub fn read_mono_pcm16<P: AsRef<Path>>(path: P) -> RadlibResult<(u32, Vec<i16>)> {
    let mut reader = hound::WavReader::open(path).map_err(|e| RadlibError::Wav(e.to_string()))?;
    let spec = reader.spec();

    if spec.channels != 1 {
        return Err(RadlibError::Wav(format!("expected mono audio, got {} channels", spec.channels)));
    }
    if spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int {
        return Err(RadlibError::Wav("expected 16-bit PCM audio".to_string()));
    }

    let samples: Result<Vec<i16>, _> = reader.samples::<i16>().collect();
    let samples = samples.map_err(|e| RadlibError::Wav(e.to_string()))?;

    Ok((spec.sample_rate, samples))
}

/// Writes `samples` as a canonical mono 16-bit PCM WAV file.
pub fn write_mono_pcm16<P: AsRef<Path>>(path: P, sample_rate: u32, samples: &[i16]) -> RadlibResult<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).map_err(|e| RadlibError::Wav(e.to_string()))?;
    for &s in samples {
        writer.write_sample(s).map_err(|e| RadlibError::Wav(e.to_string()))?;
    }
    writer.finalize().map_err(|e| RadlibError::Wav(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_samples_through_a_wav_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("roundtrip.wav");

        let samples: Vec<i16> = (0..200).map(|i| ((i * 137) % 30000) as i16).collect();
        write_mono_pcm16(&path, 8000, &samples).expect("write");

        let (rate, back) = read_mono_pcm16(&path).expect("read");
        assert_eq!(rate, 8000);
        assert_eq!(back, samples);
    }

    #[test]
    fn rejects_stereo_audio() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stereo.wav");

        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).expect("create");
        writer.write_sample(0i16).expect("write");
        writer.write_sample(0i16).expect("write");
        writer.finalize().expect("finalize");

        assert!(read_mono_pcm16(&path).is_err());
    }
}
