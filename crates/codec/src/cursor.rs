// Bounds-checked binary reader and writer for device records

use crate::CodecError;

/// Byte order of a multi-byte field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

/// Reader over a borrowed buffer
///
/// Every read advances the cursor; reading past the end returns
/// `CodecError::UnexpectedEnd` instead of panicking.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The remaining bytes, without advancing
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    /// Borrow the next `n` bytes and advance past them
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.data.len() {
            return Err(CodecError::UnexpectedEnd {
                wanted: n,
                available: self.data.len(),
            });
        }
        let (head, tail) = self.data.split_at(n);
        self.data = tail;
        Ok(head)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u32(&mut self, order: ByteOrder) -> Result<u32, CodecError> {
        let bytes: [u8; 4] = self
            .read_bytes(4)?
            .try_into()
            .map_err(|_| CodecError::UnexpectedEnd { wanted: 4, available: 0 })?;
        Ok(match order {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            ByteOrder::Little => u32::from_le_bytes(bytes),
        })
    }

    /// Carve an independent cursor over the next `n` bytes
    pub fn section(&mut self, n: usize) -> Result<Cursor<'a>, CodecError> {
        self.read_bytes(n).map(Cursor::new)
    }

    /// Verify the IEEE CRC-32 of the remaining bytes
    pub fn check_crc(&self, expected: u32) -> Result<(), CodecError> {
        let computed = crc32fast::hash(self.data);
        if computed != expected {
            return Err(CodecError::ChecksumMismatch { expected, computed });
        }
        Ok(())
    }
}

/// Append-only writer, the counterpart of `Cursor`
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    data: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn put_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn put_u32(&mut self, value: u32, order: ByteOrder) {
        let bytes = match order {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        };
        self.data.extend_from_slice(&bytes);
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

/// A fixed-size binary record
///
/// Fields are read and written in declaration order; `SIZE` is the exact
/// number of bytes consumed or produced.
pub trait Record: Sized {
    const SIZE: usize;

    fn read(cursor: &mut Cursor<'_>) -> Result<Self, CodecError>;

    fn write(&self, writer: &mut ByteWriter);
}

impl Record for u8 {
    const SIZE: usize = 1;

    fn read(cursor: &mut Cursor<'_>) -> Result<Self, CodecError> {
        cursor.read_u8()
    }

    fn write(&self, writer: &mut ByteWriter) {
        writer.put_u8(*self);
    }
}

impl<T, const N: usize> Record for [T; N]
where
    T: Record + Copy + Default,
{
    const SIZE: usize = T::SIZE * N;

    fn read(cursor: &mut Cursor<'_>) -> Result<Self, CodecError> {
        let mut out = [T::default(); N];
        for slot in out.iter_mut() {
            *slot = T::read(cursor)?;
        }
        Ok(out)
    }

    fn write(&self, writer: &mut ByteWriter) {
        for item in self {
            item.write(writer);
        }
    }
}

/// Declare a plain struct of `Record` fields laid out back to back
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$field_meta:meta])* pub $field:ident : $ty:ty, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name {
            $( $(#[$field_meta])* pub $field: $ty, )*
        }

        impl $crate::Record for $name {
            const SIZE: usize = 0 $( + <$ty as $crate::Record>::SIZE )*;

            fn read(cursor: &mut $crate::Cursor<'_>) -> Result<Self, $crate::CodecError> {
                Ok(Self {
                    $( $field: <$ty as $crate::Record>::read(cursor)?, )*
                })
            }

            fn write(&self, writer: &mut $crate::ByteWriter) {
                $( $crate::Record::write(&self.$field, writer); )*
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_advance() {
        let data = [0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u8().unwrap(), 0x01);
        assert_eq!(cursor.read_u32(ByteOrder::Big).unwrap(), 0x00000002);
        assert_eq!(cursor.read_u32(ByteOrder::Little).unwrap(), 0x03000000);
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_read_past_end() {
        let data = [0x01, 0x02];
        let mut cursor = Cursor::new(&data);
        assert_eq!(
            cursor.read_u32(ByteOrder::Little),
            Err(CodecError::UnexpectedEnd { wanted: 4, available: 2 })
        );
        // A failed read leaves the cursor where it was
        assert_eq!(cursor.remaining(), 2);
        assert_eq!(cursor.read_u8().unwrap(), 0x01);
    }

    #[test]
    fn test_section_is_independent() {
        let data = [0xaa, 0xbb, 0xcc, 0xdd];
        let mut cursor = Cursor::new(&data);
        let mut section = cursor.section(3).unwrap();
        assert_eq!(cursor.remaining(), 1);
        assert_eq!(section.read_bytes(3).unwrap(), &[0xaa, 0xbb, 0xcc]);
        assert!(section.read_u8().is_err());
        assert_eq!(cursor.read_u8().unwrap(), 0xdd);
    }

    #[test]
    fn test_check_crc() {
        let data = b"123456789";
        let cursor = Cursor::new(data);
        // Standard CRC-32 check value
        assert!(cursor.check_crc(0xcbf43926).is_ok());
        assert_eq!(
            cursor.check_crc(0),
            Err(CodecError::ChecksumMismatch { expected: 0, computed: 0xcbf43926 })
        );
    }

    #[test]
    fn test_crc_covers_only_remaining_bytes() {
        let data = b"x123456789";
        let mut cursor = Cursor::new(data);
        cursor.read_u8().unwrap();
        assert!(cursor.check_crc(0xcbf43926).is_ok());
    }

    #[test]
    fn test_writer_byte_orders() {
        let mut writer = ByteWriter::new();
        writer.put_u8(0x7f);
        writer.put_u32(0x01020304, ByteOrder::Big);
        writer.put_u32(0x01020304, ByteOrder::Little);
        assert_eq!(
            writer.into_inner(),
            vec![0x7f, 0x01, 0x02, 0x03, 0x04, 0x04, 0x03, 0x02, 0x01]
        );
    }

    record! {
        pub struct Pair {
            pub first: u8,
            pub rest: [u8; 3],
        }
    }

    #[test]
    fn test_record_layout() {
        assert_eq!(Pair::SIZE, 4);
        assert_eq!(<[Pair; 2] as Record>::SIZE, 8);

        let data = [1, 2, 3, 4, 5, 6, 7, 8];
        let mut cursor = Cursor::new(&data);
        let pairs = <[Pair; 2]>::read(&mut cursor).unwrap();
        assert_eq!(pairs[1], Pair { first: 5, rest: [6, 7, 8] });

        let mut writer = ByteWriter::new();
        pairs.write(&mut writer);
        assert_eq!(writer.into_inner(), data.to_vec());
    }
}
