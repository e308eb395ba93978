// Nybble codec
// Two transport bytes, each holding four bits, make one data byte.

use crate::CodecError;

/// Pull-based nybble decoder over any byte source
///
/// The first byte of each pair is the high nybble. Input bytes are not
/// masked, so bytes outside 0..=0x0f corrupt the output silently.
pub struct NybbleDecoder<I> {
    source: I,
    failed: bool,
}

impl<I> NybbleDecoder<I>
where
    I: Iterator<Item = u8>,
{
    pub fn new(source: I) -> Self {
        Self {
            source,
            failed: false,
        }
    }
}

impl<I> Iterator for NybbleDecoder<I>
where
    I: Iterator<Item = u8>,
{
    type Item = Result<u8, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let high = self.source.next()?;
        match self.source.next() {
            Some(low) => Some(Ok(high << 4 | low)),
            None => {
                self.failed = true;
                Some(Err(CodecError::OddNybbleCount))
            }
        }
    }
}

/// Decode a whole nybble buffer
pub fn decode(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    NybbleDecoder::new(data.iter().copied()).collect()
}

/// Split every byte into its high then low nybble
pub fn encode(data: &[u8]) -> Vec<u8> {
    data.iter().flat_map(|b| [b >> 4, b & 0x0f]).collect()
}
