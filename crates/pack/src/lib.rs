// Pack transcoding between Circuit SysEx dumps and pack archives

pub mod archive;
pub mod patch_codec;
pub mod samples;
pub mod transport;
pub mod wav;


use std::io::{Read, Write};

use codec::CodecError;
use log::{debug, info, warn};
use model::{Flavor, Pack, SampleAudio, FLAVORS};
use thiserror::Error;

pub use crate::archive::{PackIndex, PackObject};
pub use crate::samples::SampleAssembler;

/// First byte of a zip archive ("PK")
const ARCHIVE_SIGNATURE: u8 = 0x50;

/// Error types for pack transcoding
#[derive(Debug, Error)]
pub enum PackError {
    #[error("malformed MIDI stream: {0}")]
    Transport(String),

    #[error("unsupported input format: {0}")]
    UnsupportedFormat(&'static str),

    #[error("unsupported flavor: {0}")]
    UnsupportedFlavor(&'static str),

    #[error("too many {kind}: {count} (limit {limit})")]
    CapacityExceeded {
        kind: &'static str,
        count: usize,
        limit: usize,
    },

    #[error("invalid sample sysex cmd: {0:#04x}")]
    InvalidSampleCommand(u8),

    #[error("invalid sample bit depth: {0}")]
    InvalidBitDepth(u8),

    #[error("invalid sample: {0}")]
    InvalidSample(String),

    #[error("patch {0} carries bytes outside the 7-bit SysEx range")]
    InvalidPatch(usize),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("index error: {0}")]
    Index(#[from] serde_json::Error),

    #[error("WAV encoding error: {0}")]
    Wav(#[from] hound::Error),
}

/// Reading and writing a `Pack` in the device's exchange formats
pub trait PackTranscoder {
    /// Append the patches and samples of a SysEx dump
    ///
    /// Nothing is added when the read fails.
    fn read<R: Read>(&mut self, input: R) -> Result<(), PackError>;

    /// Write the pack archive for `flavor`
    ///
    /// Nothing is written when the pack does not fit the flavor.
    fn write<W: Write>(&self, output: W, flavor: &Flavor) -> Result<(), PackError>;

    /// Write the pack back as a SysEx dump for `flavor`
    fn write_sysex<W: Write>(&self, output: W, flavor: &Flavor) -> Result<(), PackError>;
}

/// Reject packs holding more entities than `flavor` has slots for
pub fn check_capacity(pack: &Pack, flavor: &Flavor) -> Result<(), PackError> {
    let checks = [
        ("projects", pack.projects.len(), flavor.number_projects),
        ("samples", pack.samples.len(), flavor.number_samples),
        ("patches", pack.patches.len(), flavor.number_patches),
    ];
    for (kind, count, limit) in checks {
        if count > limit {
            return Err(PackError::CapacityExceeded { kind, count, limit });
        }
    }
    Ok(())
}

impl PackTranscoder for Pack {
    fn read<R: Read>(&mut self, mut input: R) -> Result<(), PackError> {
        let mut buffer = Vec::new();
        input.read_to_end(&mut buffer)?;

        match buffer.first() {
            None => return Err(PackError::Transport("empty input".to_string())),
            Some(&ARCHIVE_SIGNATURE) => return Err(PackError::UnsupportedFormat("pack archive")),
            Some(_) => {}
        }

        let sample_prefix = Flavor::sysex_sample_prefix();
        let synth_prefix = Flavor::sysex_synth_prefix();
        let mut assembler = SampleAssembler::new();
        let mut samples = Vec::new();
        let mut patches = Vec::new();

        let messages = transport::for_each_sysex(&buffer, |payload| {
            if let Some(rest) = payload.strip_prefix(sample_prefix.as_slice()) {
                samples.extend(assembler.feed(rest)?);
            } else if payload.starts_with(&synth_prefix) {
                if let Some(patch) = patch_codec::decode(payload, &FLAVORS) {
                    patches.push(patch);
                }
            } else {
                debug!("Ignoring SysEx message of {} bytes", payload.len());
            }
            Ok(())
        })?;

        if assembler.is_collecting() {
            warn!("SysEx stream ended inside a sample bank, its samples are dropped");
        }

        info!(
            "Read {} SysEx messages: {} patches, {} samples",
            messages,
            patches.len(),
            samples.len()
        );
        self.patches.extend(patches);
        self.samples.extend(samples);
        Ok(())
    }

    fn write<W: Write>(&self, mut output: W, flavor: &Flavor) -> Result<(), PackError> {
        check_capacity(self, flavor)?;
        let product = flavor
            .product
            .ok_or(PackError::UnsupportedFlavor(flavor.name))?;

        let archive = archive::write_archive(self, flavor, product)?;
        output.write_all(&archive)?;
        output.flush()?;

        info!(
            "Wrote {} pack '{}' ({} bytes)",
            flavor.name,
            self.name,
            archive.len()
        );
        Ok(())
    }

    fn write_sysex<W: Write>(&self, mut output: W, flavor: &Flavor) -> Result<(), PackError> {
        check_capacity(self, flavor)?;

        let mut stream = Vec::new();
        for (slot, patch) in self.patches.iter().enumerate() {
            let slot = u8::try_from(slot).map_err(|_| PackError::InvalidPatch(slot))?;
            let payload = patch_codec::encode_sysex(patch, flavor, slot)?;
            stream.extend(transport::wrap(&payload));
        }

        let audio: Vec<&SampleAudio> = self
            .samples
            .iter()
            .filter_map(|sample| sample.audio.as_ref())
            .collect();
        if !audio.is_empty() {
            let prefix = Flavor::sysex_sample_prefix();
            for message in samples::encode_bank(&audio)? {
                let mut payload = prefix.clone();
                payload.extend(message);
                stream.extend(transport::wrap(&payload));
            }
        }

        output.write_all(&stream)?;
        output.flush()?;

        info!(
            "Wrote {} SysEx dump: {} patches, {} samples",
            flavor.name,
            self.patches.len(),
            audio.len()
        );
        Ok(())
    }
}
