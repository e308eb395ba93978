// WAV encoding of reconstructed sample audio

use std::io::Cursor;

use model::SampleAudio;

use crate::PackError;

/// Encode integer PCM audio as a WAV file held in memory
///
/// The data chunk carries exactly the stored frames. Up to 16 bits the
/// header is plain PCM (format 1); deeper samples get an extensible header
/// (0xFFFE) whose subformat is PCM.
pub fn encode(audio: &SampleAudio) -> Result<Vec<u8>, PackError> {
    let frame_size = audio.frame_size();
    if audio.channels == 0 {
        return Err(PackError::InvalidSample("no channels".to_string()));
    }
    if audio.bits_per_sample % 8 != 0 || !(1..=4).contains(&frame_size) {
        return Err(PackError::InvalidSample(format!(
            "unsupported bit depth {}",
            audio.bits_per_sample
        )));
    }

    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: audio.bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, spec)?;
        for frame in audio.pcm.chunks_exact(frame_size) {
            writer.write_sample(frame_value(frame))?;
        }
        writer.finalize()?;
    }

    Ok(buffer.into_inner())
}

/// Integer value of one little-endian frame, as the WAV writer expects it
fn frame_value(frame: &[u8]) -> i32 {
    // 8 bit WAV data is unsigned
    if let [byte] = frame {
        return i32::from(*byte) - 128;
    }

    let mut bytes = [0u8; 4];
    let shift = 4 - frame.len();
    bytes[shift..].copy_from_slice(frame);
    i32::from_le_bytes(bytes) >> (8 * shift)
}
