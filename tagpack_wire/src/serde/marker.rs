use crate::serde::ReadResult;
use anyhow::{anyhow, Result};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom};
use std::mem;

pub const MAX_FIX_POS_INT: u8 = 0x7f;
pub const MIN_FIX_NEG_INT: i8 = -32;
pub const MAX_FIX_STR_LEN: usize = 31;
pub const MAX_FIX_ARRAY_COUNT: usize = 15;
pub const MAX_FIX_MAP_COUNT: usize = 15;

const FIX_MAP_PREFIX: u8 = 0x80;
const FIX_ARRAY_PREFIX: u8 = 0x90;
const FIX_STR_PREFIX: u8 = 0xa0;

/// The formats that occupy a whole byte.
#[repr(u8)]
#[derive(PartialEq, Eq, Hash, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum Marker {
    Nil = 0xc0,
    Reserved = 0xc1,
    False = 0xc2,
    True = 0xc3,
    Bin8 = 0xc4,
    Bin16 = 0xc5,
    Bin32 = 0xc6,
    Ext8 = 0xc7,
    Ext16 = 0xc8,
    Ext32 = 0xc9,
    F32 = 0xca,
    F64 = 0xcb,
    U8 = 0xcc,
    U16 = 0xcd,
    U32 = 0xce,
    U64 = 0xcf,
    I8 = 0xd0,
    I16 = 0xd1,
    I32 = 0xd2,
    I64 = 0xd3,
    FixExt1 = 0xd4,
    FixExt2 = 0xd5,
    FixExt4 = 0xd6,
    FixExt8 = 0xd7,
    FixExt16 = 0xd8,
    Str8 = 0xd9,
    Str16 = 0xda,
    Str32 = 0xdb,
    Array16 = 0xdc,
    Array32 = 0xdd,
    Map16 = 0xde,
    Map32 = 0xdf,
}

/// A decoded format byte.
///
/// The fix-range formats carry the value or length that was packed into the byte.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Format {
    PosFixInt(u8),
    NegFixInt(i8),
    FixMap(u8),
    FixArray(u8),
    FixStr(u8),
    Marker(Marker),
}

impl From<u8> for Format {
    fn from(byte: u8) -> Self {
        match byte {
            0x00..=0x7f => Format::PosFixInt(byte),
            0x80..=0x8f => Format::FixMap(byte & 0x0f),
            0x90..=0x9f => Format::FixArray(byte & 0x0f),
            0xa0..=0xbf => Format::FixStr(byte & 0x1f),
            0xe0..=0xff => Format::NegFixInt(byte as i8),
            // 0xc0..=0xdf are all enumerated by `Marker`.
            _ => Format::Marker(Marker::from_u8(byte).unwrap_or(Marker::Reserved)),
        }
    }
}

impl From<Marker> for Format {
    fn from(marker: Marker) -> Self {
        Format::Marker(marker)
    }
}

impl From<Format> for u8 {
    fn from(format: Format) -> Self {
        match format {
            Format::PosFixInt(i) => i & MAX_FIX_POS_INT,
            Format::NegFixInt(i) => i as u8,
            Format::FixMap(ct) => FIX_MAP_PREFIX | (ct & 0x0f),
            Format::FixArray(ct) => FIX_ARRAY_PREFIX | (ct & 0x0f),
            Format::FixStr(len) => FIX_STR_PREFIX | (len & 0x1f),
            Format::Marker(marker) => marker.to_u8().unwrap_or(Marker::Reserved as u8),
        }
    }
}

impl Format {
    pub fn is_nil(&self) -> bool {
        *self == Format::Marker(Marker::Nil)
    }

    pub fn deser<R: Read + ?Sized>(r: &mut R) -> Result<(usize, Self), io::Error> {
        let mut buf = [0u8; mem::size_of::<u8>()];
        r.read_exact(&mut buf)?;
        Ok((buf.len(), Self::from(buf[0])))
    }

    /// Reads the next format without consuming it.
    pub fn peek<R: Read + Seek + ?Sized>(r: &mut R) -> Result<ReadResult<Self>> {
        let (r_len, format) = match Self::deser(r) {
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(ReadResult::EOF),
            Err(e) => return Err(anyhow!(e)),
            Ok(res) => res,
        };
        r.seek(SeekFrom::Current(-(r_len as i64)))?;
        Ok(ReadResult::Some(0, format))
    }
}
