//! Consensus encoding primitives: fixed-width little-endian integers,
//! CompactSize, length-prefixed byte blobs and counted lists.

use std::io::{self, Write};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::cursor::Cursor;
use crate::error::Result;

/// Data which can be written out in its wire format.
///
/// Returns the number of bytes written; the only errors come from the writer.
pub trait Encodable {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<usize>;
}

/// Data which can be read back from its wire format.
pub trait Decodable: Sized {
    fn consensus_decode(cursor: &mut Cursor) -> Result<Self>;
}

/// Encodes a value into a fresh vector.
pub fn serialize<T: Encodable + ?Sized>(data: &T) -> Vec<u8> {
    let mut encoder = Vec::new();
    let len = data
        .consensus_encode(&mut encoder)
        .expect("in-memory writers don't error");
    debug_assert_eq!(len, encoder.len());
    encoder
}

impl Decodable for u8 {
    fn consensus_decode(cursor: &mut Cursor) -> Result<Self> {
        cursor.read_u8()
    }
}

impl Encodable for u8 {
    fn consensus_encode<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<usize> {
        w.write_u8(*self)?;
        Ok(1)
    }
}

macro_rules! impl_int_encodable {
    ($ty:ident, $read:ident, $write:ident) => {
        impl Decodable for $ty {
            fn consensus_decode(cursor: &mut Cursor) -> Result<Self> {
                let bytes = cursor.read_exact(std::mem::size_of::<$ty>())?;
                Ok(LittleEndian::$read(bytes))
            }
        }

        impl Encodable for $ty {
            fn consensus_encode<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<usize> {
                w.$write::<LittleEndian>(*self)?;
                Ok(std::mem::size_of::<$ty>())
            }
        }
    };
}

impl_int_encodable!(u16, read_u16, write_u16);
impl_int_encodable!(u32, read_u32, write_u32);
impl_int_encodable!(u64, read_u64, write_u64);

impl Decodable for [u8; 32] {
    fn consensus_decode(cursor: &mut Cursor) -> Result<Self> {
        cursor.read_array::<32>()
    }
}

impl Encodable for [u8; 32] {
    fn consensus_encode<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<usize> {
        w.write_all(self)?;
        Ok(32)
    }
}

/// Bitcoin's variable-length unsigned integer.
///
/// Decoding accepts any of the four wire forms, encoding always picks the
/// shortest one that fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompactSize(pub u64);

impl CompactSize {
    /// Number of bytes the minimal encoding of this value takes
    pub fn encoded_len(&self) -> usize {
        match self.0 {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x10000..=0xffff_ffff => 5,
            _ => 9,
        }
    }
}

impl Decodable for CompactSize {
    fn consensus_decode(cursor: &mut Cursor) -> Result<Self> {
        let prefix = u8::consensus_decode(cursor)?;
        let value = match prefix {
            0..=0xfc => prefix as u64,
            0xfd => u16::consensus_decode(cursor)? as u64,
            0xfe => u32::consensus_decode(cursor)? as u64,
            0xff => u64::consensus_decode(cursor)?,
        };
        Ok(CompactSize(value))
    }
}

impl Encodable for CompactSize {
    fn consensus_encode<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<usize> {
        match self.0 {
            0..=0xfc => {
                (self.0 as u8).consensus_encode(w)?;
            }
            0xfd..=0xffff => {
                w.write_u8(0xfd)?;
                (self.0 as u16).consensus_encode(w)?;
            }
            0x10000..=0xffff_ffff => {
                w.write_u8(0xfe)?;
                (self.0 as u32).consensus_encode(w)?;
            }
            _ => {
                w.write_u8(0xff)?;
                self.0.consensus_encode(w)?;
            }
        }
        Ok(self.encoded_len())
    }
}

/// Length-prefixed opaque bytes (scripts, witness items)
impl Decodable for Vec<u8> {
    fn consensus_decode(cursor: &mut Cursor) -> Result<Self> {
        let len = CompactSize::consensus_decode(cursor)?.0;
        // A length beyond usize can never be satisfied by the buffer anyway
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        Ok(cursor.read_exact(len)?.to_vec())
    }
}

impl Encodable for Vec<u8> {
    fn consensus_encode<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<usize> {
        let len = CompactSize(self.len() as u64).consensus_encode(w)?;
        w.write_all(self)?;
        Ok(len + self.len())
    }
}

/// Reads a CompactSize count followed by that many items.
///
/// The up-front allocation is capped by what is left in the cursor, so a
/// bogus count fails on a short read instead of reserving gigabytes.
pub fn decode_list<T: Decodable>(cursor: &mut Cursor) -> Result<Vec<T>> {
    let count = CompactSize::consensus_decode(cursor)?.0;
    let capacity = usize::try_from(count)
        .unwrap_or(usize::MAX)
        .min(cursor.remaining());
    let mut ret = Vec::with_capacity(capacity);
    for _ in 0..count {
        ret.push(T::consensus_decode(cursor)?);
    }
    Ok(ret)
}

/// Writes a CompactSize count followed by every item in order
pub fn encode_list<T: Encodable, W: Write + ?Sized>(items: &[T], w: &mut W) -> io::Result<usize> {
    let mut len = CompactSize(items.len() as u64).consensus_encode(w)?;
    for item in items {
        len += item.consensus_encode(w)?;
    }
    Ok(len)
}
