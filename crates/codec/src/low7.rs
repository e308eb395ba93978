// Low7 codec
// SysEx data bytes must keep bit 7 clear, so every group of up to seven
// bytes travels behind one byte carrying their high bits.

use crate::CodecError;

/// Data bytes carried by one high-bits byte
pub const GROUP_SIZE: usize = 7;

/// Pull-based low7 decoder over any byte source
///
/// Yields one decoded byte per call. A partial trailing group is decoded
/// as far as it goes; a high-bits byte with nothing after it is an error.
pub struct Low7Decoder<I> {
    source: I,
    high_bits: u8,
    position: usize,
    failed: bool,
}

impl<I> Low7Decoder<I>
where
    I: Iterator<Item = u8>,
{
    pub fn new(source: I) -> Self {
        Self {
            source,
            high_bits: 0,
            position: GROUP_SIZE,
            failed: false,
        }
    }
}

impl<I> Iterator for Low7Decoder<I>
where
    I: Iterator<Item = u8>,
{
    type Item = Result<u8, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let starts_group = self.position == GROUP_SIZE;
        if starts_group {
            self.high_bits = self.source.next()?;
            self.position = 0;
        }

        let byte = match self.source.next() {
            Some(byte) => byte,
            None if starts_group => {
                self.failed = true;
                return Some(Err(CodecError::DanglingHighBits));
            }
            None => return None,
        };

        let restored = if self.high_bits & (1u8 << self.position) != 0 {
            byte | 0x80
        } else {
            byte
        };
        self.position += 1;

        Some(Ok(restored))
    }
}

/// Decode a whole low7 buffer
pub fn decode(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    Low7Decoder::new(data.iter().copied()).collect()
}

/// Encode bytes so that every emitted byte has bit 7 clear
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(data.len()));
    for group in data.chunks(GROUP_SIZE) {
        let high_bits = group
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, b)| acc | ((b >> 7) << i));
        out.push(high_bits);
        out.extend(group.iter().map(|b| b & 0x7f));
    }
    out
}

/// Size of the low7 encoding of `len` raw bytes
pub fn encoded_len(len: usize) -> usize {
    len + (len + GROUP_SIZE - 1) / GROUP_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_GROUP: [u8; 8] = [0x18, 0x40, 0x01, 0x10, 0x00, 0x3b, 0x00, 0x00];

    #[test]
    fn test_full_group() {
        let decoded = decode(&FULL_GROUP).unwrap();
        assert_eq!(decoded, vec![0x40, 0x01, 0x10, 0x80, 0xbb, 0x00, 0x00]);
    }

    #[test]
    fn test_partial_group() {
        let decoded = decode(&FULL_GROUP[..6]).unwrap();
        assert_eq!(decoded, vec![0x40, 0x01, 0x10, 0x80, 0xbb]);
    }

    #[test]
    fn test_trailing_high_bits_byte() {
        let mut data = FULL_GROUP.to_vec();
        data.push(0x01);
        assert_eq!(decode(&data), Err(CodecError::DanglingHighBits));
    }

    #[test]
    fn test_streaming_stops_after_error() {
        let mut decoder = Low7Decoder::new([0x18u8].into_iter());
        assert_eq!(decoder.next(), Some(Err(CodecError::DanglingHighBits)));
        assert_eq!(decoder.next(), None);
    }

    #[test]
    fn test_fixed_size_chunk() {
        // A caller may only want the first few bytes of a longer stream
        let head: Result<Vec<u8>, _> = Low7Decoder::new(FULL_GROUP.iter().copied()).take(4).collect();
        assert_eq!(head.unwrap(), vec![0x40, 0x01, 0x10, 0x80]);
    }

    #[test]
    fn test_encode_matches_device_fixture() {
        let raw = [0x40, 0x01, 0x10, 0x80, 0xbb, 0x00, 0x00];
        assert_eq!(encode(&raw), FULL_GROUP.to_vec());
    }

    #[test]
    fn test_roundtrip() {
        let raw: Vec<u8> = (0..=255u8).collect();
        let encoded = encode(&raw);
        assert_eq!(encoded.len(), encoded_len(raw.len()));
        assert!(encoded.iter().all(|b| b & 0x80 == 0));
        assert_eq!(decode(&encoded).unwrap(), raw);
    }

    #[test]
    fn test_sample_chunk_size() {
        // Sample banks travel in 256 byte chunks
        assert_eq!(encoded_len(256), 293);
    }

    #[test]
    fn test_decoded_length() {
        for len in [1usize, 7, 8, 9, 15, 16, 64] {
            let encoded: Vec<u8> = vec![0x00; len];
            // A group of one high-bits byte alone is only legal when it is not last
            if len % 8 == 1 {
                assert!(decode(&encoded).is_err());
                continue;
            }
            let decoded = decode(&encoded).unwrap();
            assert_eq!(decoded.len(), len - (len + 7) / 8);
        }
    }
}
