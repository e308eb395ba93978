// SysEx framing over a raw MIDI byte stream

use log::{debug, warn};
use wmidi::{FromBytesError, MidiMessage, U7};

use crate::PackError;

pub const SYSEX_START: u8 = 0xf0;
pub const SYSEX_END: u8 = 0xf7;

/// Call `handle` with the payload of every SysEx message in `bytes`
///
/// Payloads exclude the 0xF0/0xF7 envelope. Other MIDI messages are
/// skipped. A final message cut short is tolerated once at least one
/// complete SysEx message went through. Returns the number of SysEx
/// messages handled.
pub fn for_each_sysex<F>(bytes: &[u8], mut handle: F) -> Result<usize, PackError>
where
    F: FnMut(&[u8]) -> Result<(), PackError>,
{
    let mut rest = bytes;
    let mut seen = 0;

    while !rest.is_empty() {
        let offset = bytes.len() - rest.len();
        let message = match MidiMessage::try_from(rest) {
            Ok(message) => message,
            Err(FromBytesError::NoSysExEndByte) if seen > 0 => {
                warn!("SysEx stream truncated at offset {} after {} messages", offset, seen);
                break;
            }
            Err(err) => {
                return Err(PackError::Transport(format!("{:?} at offset {}", err, offset)));
            }
        };

        let size = message.bytes_size();
        if let MidiMessage::SysEx(data) = message {
            seen += 1;
            handle(U7::data_to_bytes(data))?;
        } else {
            debug!("Skipping non SysEx message at offset {}", offset);
        }
        rest = &rest[size..];
    }

    Ok(seen)
}

/// Wrap a payload in the SysEx envelope
pub fn wrap(payload: &[u8]) -> Vec<u8> {
    let mut message = Vec::with_capacity(payload.len() + 2);
    message.push(SYSEX_START);
    message.extend_from_slice(payload);
    message.push(SYSEX_END);
    message
}
