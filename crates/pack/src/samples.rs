// Sample bank reassembly
//
// A sample bank arrives as a section marker (0x77), any number of low7
// encoded data chunks (0x79) and a closing CRC (0x7a). The same section
// command also opens session dumps, which are not decoded here.

use codec::{low7, nybble, ByteOrder, ByteWriter, Cursor, NybbleDecoder};
use log::{debug, info, warn};
use model::{Sample, SampleAudio};

use crate::PackError;

pub const CMD_SECTION: u8 = 0x77;
pub const CMD_DATA: u8 = 0x79;
pub const CMD_END: u8 = 0x7a;

/// Section marker identifying the sample bank
pub const SAMPLE_SECTION_MAGIC: [u8; 4] = [0x00, 0x23, 0xb0, 0x00];

/// Raw bytes carried by one data chunk
const CHUNK_SIZE: usize = 256;

#[derive(Debug)]
enum State {
    Idle,
    Collecting(Vec<u8>),
}

/// State machine turning sample bank messages into samples
#[derive(Debug)]
pub struct SampleAssembler {
    state: State,
}

impl Default for SampleAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleAssembler {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// Whether a sample bank is being collected
    pub fn is_collecting(&self) -> bool {
        matches!(self.state, State::Collecting(_))
    }

    /// Feed one message payload, stripped of its manufacturer/sample prefix
    ///
    /// Returns the samples of the bank when `payload` closes one, an empty
    /// list otherwise.
    pub fn feed(&mut self, payload: &[u8]) -> Result<Vec<Sample>, PackError> {
        let mut cursor = Cursor::new(payload);
        let cmd = cursor.read_u8()?;
        let body = &payload[1..];

        match cmd {
            CMD_SECTION => {
                let marker = leading_nybbles(body)?;
                if marker == SAMPLE_SECTION_MAGIC {
                    debug!("Sample bank started");
                    self.state = State::Collecting(Vec::new());
                } else {
                    debug!("Skipping section {:02x?}", marker);
                    self.state = State::Idle;
                }
                Ok(Vec::new())
            }
            CMD_DATA => {
                if let State::Collecting(raw) = &mut self.state {
                    let chunk = low7::decode(body)?;
                    raw.extend_from_slice(&chunk);
                }
                Ok(Vec::new())
            }
            CMD_END => {
                let raw = match std::mem::replace(&mut self.state, State::Idle) {
                    State::Collecting(raw) => raw,
                    State::Idle => return Ok(Vec::new()),
                };
                let crc = Cursor::new(&leading_nybbles(body)?).read_u32(ByteOrder::Big)?;
                let samples = parse_sample_table(&raw, crc)?;
                info!("Sample bank decoded: {} samples from {} bytes", samples.len(), raw.len());
                Ok(samples)
            }
            other => Err(PackError::InvalidSampleCommand(other)),
        }
    }
}

/// Decode the 8 nybbles following a command byte
fn leading_nybbles(body: &[u8]) -> Result<Vec<u8>, PackError> {
    let decoded = NybbleDecoder::new(body.iter().copied().take(8)).collect::<Result<Vec<u8>, _>>()?;
    Ok(decoded)
}

/// Parse a checksum-verified sample table
pub fn parse_sample_table(raw: &[u8], crc: u32) -> Result<Vec<Sample>, PackError> {
    let mut cursor = Cursor::new(raw);
    cursor.check_crc(crc)?;

    let count = cursor.read_u8()?;
    let mut samples = Vec::with_capacity(usize::from(count));
    for index in 0..count {
        let channels = cursor.read_u8()?;
        let bits = cursor.read_u8()?;
        let rate = cursor.read_u32(ByteOrder::Little)?;
        let length = cursor.read_u32(ByteOrder::Little)? as usize;

        if bits == 0 || bits % 8 != 0 {
            return Err(PackError::InvalidBitDepth(bits));
        }
        let frame_size = usize::from(bits / 8);
        let region = cursor.section(length)?;

        let mut pcm = Vec::with_capacity(length);
        let mut frames = region.as_slice().chunks_exact(frame_size);
        for frame in frames.by_ref() {
            // The device sends each frame most significant byte first
            pcm.extend(frame.iter().rev());
        }
        if !frames.remainder().is_empty() {
            warn!("Sample {}: ignoring {} trailing bytes", index, frames.remainder().len());
        }

        debug!(
            "Sample {}: {} channels, {} bits, {} Hz, {} bytes",
            index, channels, bits, rate, length
        );
        samples.push(Sample {
            name: String::new(),
            audio: Some(SampleAudio {
                channels: u16::from(channels),
                bits_per_sample: u16::from(bits),
                sample_rate: rate,
                pcm,
            }),
        });
    }

    Ok(samples)
}

/// Build the sample table the device would send for `samples`
pub fn build_sample_table(samples: &[&SampleAudio]) -> Result<Vec<u8>, PackError> {
    let count = u8::try_from(samples.len())
        .map_err(|_| PackError::InvalidSample(format!("{} samples in one bank", samples.len())))?;

    let mut writer = ByteWriter::new();
    writer.put_u8(count);
    for audio in samples {
        let channels = u8::try_from(audio.channels)
            .map_err(|_| PackError::InvalidSample(format!("{} channels", audio.channels)))?;
        let bits = u8::try_from(audio.bits_per_sample)
            .map_err(|_| PackError::InvalidSample(format!("{} bits", audio.bits_per_sample)))?;
        if bits == 0 || bits % 8 != 0 {
            return Err(PackError::InvalidBitDepth(bits));
        }

        let frame_size = audio.frame_size();
        let length = audio.frame_count() * frame_size;
        let length = u32::try_from(length)
            .map_err(|_| PackError::InvalidSample(format!("{} bytes of audio", length)))?;

        writer.put_u8(channels);
        writer.put_u8(bits);
        writer.put_u32(audio.sample_rate, ByteOrder::Little);
        writer.put_u32(length, ByteOrder::Little);
        for frame in audio.pcm.chunks_exact(frame_size) {
            let reversed: Vec<u8> = frame.iter().rev().copied().collect();
            writer.put_bytes(&reversed);
        }
    }

    Ok(writer.into_inner())
}

/// Encode a whole sample bank as message payloads, without the sample prefix
pub fn encode_bank(samples: &[&SampleAudio]) -> Result<Vec<Vec<u8>>, PackError> {
    let raw = build_sample_table(samples)?;

    let mut messages = Vec::with_capacity(raw.len() / CHUNK_SIZE + 3);

    let mut section = vec![CMD_SECTION];
    section.extend(nybble::encode(&SAMPLE_SECTION_MAGIC));
    messages.push(section);

    for chunk in raw.chunks(CHUNK_SIZE) {
        let mut data = vec![CMD_DATA];
        data.extend(low7::encode(chunk));
        messages.push(data);
    }

    let mut end = vec![CMD_END];
    end.extend(nybble::encode(&crc32fast::hash(&raw).to_be_bytes()));
    messages.push(end);

    Ok(messages)
}
