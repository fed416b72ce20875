//! WAV file import.
//!
//! Decodes a RIFF/WAVE file into a [`SampleBuffer`], converting whatever
//! sample format the file carries into planar `f32`.

use super::SampleBuffer;
use std::path::Path;
use tracing::debug;

/// Errors that can occur during WAV import.
#[derive(Debug)]
pub enum WaveImportError {
    /// File could not be read.
    IoError(std::io::Error),
    /// File was read but is not valid WAV data.
    ParseError(String),
    /// Valid WAV data in a layout this tool does not handle.
    UnsupportedFormat(String),
}

impl std::fmt::Display for WaveImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaveImportError::IoError(e) => write!(f, "IO error: {}", e),
            WaveImportError::ParseError(msg) => write!(f, "WAV parse error: {}", msg),
            WaveImportError::UnsupportedFormat(msg) => {
                write!(f, "Unsupported WAV format: {}", msg)
            }
        }
    }
}

impl std::error::Error for WaveImportError {}

impl From<std::io::Error> for WaveImportError {
    fn from(e: std::io::Error) -> Self {
        WaveImportError::IoError(e)
    }
}

impl From<hound::Error> for WaveImportError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => WaveImportError::IoError(io),
            hound::Error::Unsupported => {
                WaveImportError::UnsupportedFormat("unsupported encoding".to_string())
            }
            other => WaveImportError::ParseError(other.to_string()),
        }
    }
}

/// Imports a WAV file into a sample buffer.
///
/// Integer samples of any supported width are rescaled to [-1.0, 1.0];
/// float samples pass through unchanged. Channels are deinterleaved into
/// one plane per channel.
///
/// # Arguments
/// * `path` - Path to the .wav file
///
/// # Returns
/// * `Ok(SampleBuffer)` - Decoded audio
/// * `Err(WaveImportError)` - File missing, malformed, or unsupported
pub fn import_wav(path: &Path) -> Result<SampleBuffer, WaveImportError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let channel_count = spec.channels as usize;
    if channel_count == 0 {
        return Err(WaveImportError::UnsupportedFormat(
            "file reports zero channels".to_string(),
        ));
    }
    if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
        return Err(WaveImportError::UnsupportedFormat(format!(
            "{}-bit samples",
            spec.bits_per_sample
        )));
    }

    let frames = reader.duration() as usize;
    let mut planar: Vec<Vec<f32>> = (0..channel_count)
        .map(|_| Vec::with_capacity(frames))
        .collect();

    match spec.sample_format {
        hound::SampleFormat::Float => {
            for (i, sample) in reader.samples::<f32>().enumerate() {
                planar[i % channel_count].push(sample?);
            }
        }
        hound::SampleFormat::Int => {
            // Full-scale for the source bit depth, so 16-bit 32767 maps
            // just under 1.0 and -32768 maps to exactly -1.0.
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            for (i, sample) in reader.samples::<i32>().enumerate() {
                planar[i % channel_count].push(sample? as f32 * scale);
            }
        }
    }

    debug!(
        path = %path.display(),
        channels = channel_count,
        frames,
        sample_rate = spec.sample_rate,
        "imported WAV file"
    );

    Ok(SampleBuffer::new(planar, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("wavetui_{}_{}.wav", name, std::process::id()))
    }

    #[test]
    fn test_import_int16_stereo() {
        let path = fixture_path("int16_stereo");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        // Interleaved L/R pairs.
        for (left, right) in [(0i16, 16_384), (-16_384, 32_767), (-32_768, 0)] {
            writer.write_sample(left).unwrap();
            writer.write_sample(right).unwrap();
        }
        writer.finalize().unwrap();

        let buffer = import_wav(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frame_count(), 3);
        assert_eq!(buffer.sample_rate(), 44_100);

        let left = buffer.channel(0);
        let right = buffer.channel(1);
        assert!((left[0] - 0.0).abs() < 1e-4);
        assert!((left[1] + 0.5).abs() < 1e-4);
        assert!((left[2] + 1.0).abs() < 1e-4);
        assert!((right[0] - 0.5).abs() < 1e-4);
        assert!((right[1] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_import_f32_mono_passthrough() {
        let path = fixture_path("f32_mono");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for value in [0.25f32, -0.75, 1.0, 0.0] {
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();

        let buffer = import_wav(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(buffer.channel_count(), 1);
        assert_eq!(buffer.sample_rate(), 48_000);
        assert_eq!(buffer.channel(0), &[0.25, -0.75, 1.0, 0.0]);
    }

    #[test]
    fn test_import_missing_file() {
        let path = fixture_path("does_not_exist");
        let result = import_wav(&path);
        assert!(matches!(result, Err(WaveImportError::IoError(_))));
    }

    #[test]
    fn test_import_rejects_garbage() {
        let path = fixture_path("garbage");
        std::fs::write(&path, b"this is not a wav file at all").unwrap();

        let result = import_wav(&path);
        let _ = std::fs::remove_file(&path);
        assert!(result.is_err());
    }
}
