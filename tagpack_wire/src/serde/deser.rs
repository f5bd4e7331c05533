use crate::serde::{Format, Marker, ReadResult, WireError};
use anyhow::{anyhow, Result};
use std::any;
use std::io::{self, ErrorKind, Read, Seek};

fn deser_be<const LEN: usize, R: Read + ?Sized>(r: &mut R, r_len: &mut usize) -> Result<[u8; LEN]> {
    let mut buf = [0u8; LEN];
    r.read_exact(&mut buf)?;
    *r_len += LEN;
    Ok(buf)
}

fn deser_body<R: Read + ?Sized>(r: &mut R, len: usize, r_len: &mut usize) -> Result<Vec<u8>> {
    // The declared length is untrusted; let the reader's actual contents bound the allocation.
    let mut buf = vec![];
    (&mut *r).take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(anyhow!(io::Error::from(ErrorKind::UnexpectedEof)));
    }
    *r_len += len;
    Ok(buf)
}

fn unexpected(expected: &'static str, found: Format) -> anyhow::Error {
    match found {
        Format::Marker(Marker::Reserved) => anyhow!(WireError::ReservedMarker),
        found => anyhow!(WireError::UnexpectedFormat { expected, found }),
    }
}

/// Returns whether the next value is nil, without consuming it.
pub fn is_nil<R: Read + Seek + ?Sized>(r: &mut R) -> Result<bool> {
    match Format::peek(r)? {
        ReadResult::EOF => Err(anyhow!(io::Error::from(ErrorKind::UnexpectedEof))),
        ReadResult::Some(_, format) => Ok(format.is_nil()),
    }
}

pub fn deser_nil<R: Read + ?Sized>(r: &mut R) -> Result<usize> {
    let (r_len, format) = Format::deser(r)?;
    match format {
        Format::Marker(Marker::Nil) => Ok(r_len),
        found => Err(unexpected("nil", found)),
    }
}

pub fn deser_bool<R: Read + ?Sized>(r: &mut R) -> Result<(usize, bool)> {
    let (r_len, format) = Format::deser(r)?;
    match format {
        Format::Marker(Marker::True) => Ok((r_len, true)),
        Format::Marker(Marker::False) => Ok((r_len, false)),
        found => Err(unexpected("bool", found)),
    }
}

/// An integer as read off the wire, before narrowing to its destination type.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum WireInt {
    Signed(i64),
    Unsigned(u64),
}
impl WireInt {
    fn as_i128(self) -> i128 {
        match self {
            WireInt::Signed(i) => i as i128,
            WireInt::Unsigned(u) => u as i128,
        }
    }

    pub fn narrow<T>(self) -> Result<T>
    where
        T: TryFrom<i64> + TryFrom<u64>,
    {
        let narrowed = match self {
            WireInt::Signed(i) => <T as TryFrom<i64>>::try_from(i).ok(),
            WireInt::Unsigned(u) => <T as TryFrom<u64>>::try_from(u).ok(),
        };
        narrowed.ok_or_else(|| {
            anyhow!(WireError::IntOutOfRange {
                value: self.as_i128(),
                target: any::type_name::<T>(),
            })
        })
    }
}

fn deser_int_after<R: Read + ?Sized>(
    format: Format,
    r: &mut R,
    r_len: &mut usize,
) -> Result<Option<WireInt>> {
    let int = match format {
        Format::PosFixInt(u) => WireInt::Unsigned(u as u64),
        Format::NegFixInt(i) => WireInt::Signed(i as i64),
        Format::Marker(Marker::U8) => WireInt::Unsigned(u8::from_be_bytes(deser_be(r, r_len)?) as u64),
        Format::Marker(Marker::U16) => WireInt::Unsigned(u16::from_be_bytes(deser_be(r, r_len)?) as u64),
        Format::Marker(Marker::U32) => WireInt::Unsigned(u32::from_be_bytes(deser_be(r, r_len)?) as u64),
        Format::Marker(Marker::U64) => WireInt::Unsigned(u64::from_be_bytes(deser_be(r, r_len)?)),
        Format::Marker(Marker::I8) => WireInt::Signed(i8::from_be_bytes(deser_be(r, r_len)?) as i64),
        Format::Marker(Marker::I16) => WireInt::Signed(i16::from_be_bytes(deser_be(r, r_len)?) as i64),
        Format::Marker(Marker::I32) => WireInt::Signed(i32::from_be_bytes(deser_be(r, r_len)?) as i64),
        Format::Marker(Marker::I64) => WireInt::Signed(i64::from_be_bytes(deser_be(r, r_len)?)),
        _ => return Ok(None),
    };
    Ok(Some(int))
}

pub fn deser_int<R: Read + ?Sized>(r: &mut R) -> Result<(usize, WireInt)> {
    let (mut r_len, format) = Format::deser(r)?;
    match deser_int_after(format, r, &mut r_len)? {
        Some(int) => Ok((r_len, int)),
        None => Err(unexpected("integer", format)),
    }
}

pub fn deser_i64<R: Read + ?Sized>(r: &mut R) -> Result<(usize, i64)> {
    let (r_len, int) = deser_int(r)?;
    Ok((r_len, int.narrow()?))
}

pub fn deser_u64<R: Read + ?Sized>(r: &mut R) -> Result<(usize, u64)> {
    let (r_len, int) = deser_int(r)?;
    Ok((r_len, int.narrow()?))
}

/// Accepts either float width, and integers.
pub fn deser_f64<R: Read + ?Sized>(r: &mut R) -> Result<(usize, f64)> {
    let (mut r_len, format) = Format::deser(r)?;
    let f = match format {
        Format::Marker(Marker::F64) => f64::from_be_bytes(deser_be(r, &mut r_len)?),
        Format::Marker(Marker::F32) => f32::from_be_bytes(deser_be(r, &mut r_len)?) as f64,
        _ => match deser_int_after(format, r, &mut r_len)? {
            Some(WireInt::Signed(i)) => i as f64,
            Some(WireInt::Unsigned(u)) => u as f64,
            None => return Err(unexpected("float", format)),
        },
    };
    Ok((r_len, f))
}

/// Accepts `f32` and integers. An `f64` is refused rather than silently narrowed.
pub fn deser_f32<R: Read + ?Sized>(r: &mut R) -> Result<(usize, f32)> {
    let (mut r_len, format) = Format::deser(r)?;
    let f = match format {
        Format::Marker(Marker::F32) => f32::from_be_bytes(deser_be(r, &mut r_len)?),
        _ => match deser_int_after(format, r, &mut r_len)? {
            Some(WireInt::Signed(i)) => i as f32,
            Some(WireInt::Unsigned(u)) => u as f32,
            None => return Err(unexpected("f32", format)),
        },
    };
    Ok((r_len, f))
}

pub fn deser_str_bytes<R: Read + ?Sized>(r: &mut R) -> Result<(usize, Vec<u8>)> {
    let (mut r_len, format) = Format::deser(r)?;
    let len = match format {
        Format::FixStr(len) => len as usize,
        Format::Marker(Marker::Str8) => u8::from_be_bytes(deser_be(r, &mut r_len)?) as usize,
        Format::Marker(Marker::Str16) => u16::from_be_bytes(deser_be(r, &mut r_len)?) as usize,
        Format::Marker(Marker::Str32) => u32::from_be_bytes(deser_be(r, &mut r_len)?) as usize,
        found => return Err(unexpected("str", found)),
    };
    let body = deser_body(r, len, &mut r_len)?;
    Ok((r_len, body))
}

pub fn deser_str<R: Read + ?Sized>(r: &mut R) -> Result<(usize, String)> {
    let (r_len, body) = deser_str_bytes(r)?;
    let s = String::from_utf8(body)?;
    Ok((r_len, s))
}

pub fn deser_bin<R: Read + ?Sized>(r: &mut R) -> Result<(usize, Vec<u8>)> {
    let (mut r_len, format) = Format::deser(r)?;
    let len = match format {
        Format::Marker(Marker::Bin8) => u8::from_be_bytes(deser_be(r, &mut r_len)?) as usize,
        Format::Marker(Marker::Bin16) => u16::from_be_bytes(deser_be(r, &mut r_len)?) as usize,
        Format::Marker(Marker::Bin32) => u32::from_be_bytes(deser_be(r, &mut r_len)?) as usize,
        found => return Err(unexpected("bin", found)),
    };
    let body = deser_body(r, len, &mut r_len)?;
    Ok((r_len, body))
}

pub fn deser_array_header<R: Read + ?Sized>(r: &mut R) -> Result<(usize, u32)> {
    let (mut r_len, format) = Format::deser(r)?;
    let ct = match format {
        Format::FixArray(ct) => ct as u32,
        Format::Marker(Marker::Array16) => u16::from_be_bytes(deser_be(r, &mut r_len)?) as u32,
        Format::Marker(Marker::Array32) => u32::from_be_bytes(deser_be(r, &mut r_len)?),
        found => return Err(unexpected("array", found)),
    };
    Ok((r_len, ct))
}

pub fn deser_map_header<R: Read + ?Sized>(r: &mut R) -> Result<(usize, u32)> {
    let (mut r_len, format) = Format::deser(r)?;
    let ct = match format {
        Format::FixMap(ct) => ct as u32,
        Format::Marker(Marker::Map16) => u16::from_be_bytes(deser_be(r, &mut r_len)?) as u32,
        Format::Marker(Marker::Map32) => u32::from_be_bytes(deser_be(r, &mut r_len)?),
        found => return Err(unexpected("map", found)),
    };
    Ok((r_len, ct))
}

/// Consumes exactly one value, however deeply nested, and returns its length.
///
/// Nesting is tracked with a countdown of pending values, not with recursion.
pub fn skip<R: Read + ?Sized>(r: &mut R) -> Result<usize> {
    let mut r_len = 0;
    let mut pending: u64 = 1;
    while pending > 0 {
        pending -= 1;

        /* format */
        let (delta_r_len, format) = Format::deser(r)?;
        r_len += delta_r_len;

        /* (body_len, nested values count) */
        let (body_len, nested_ct) = match format {
            Format::PosFixInt(_) | Format::NegFixInt(_) => (0, 0),
            Format::FixStr(len) => (len as u64, 0),
            Format::FixArray(ct) => (0, ct as u64),
            Format::FixMap(ct) => (0, 2 * ct as u64),
            Format::Marker(marker) => match marker {
                Marker::Reserved => return Err(anyhow!(WireError::ReservedMarker)),
                Marker::Nil | Marker::False | Marker::True => (0, 0),
                Marker::U8 | Marker::I8 => (1, 0),
                Marker::U16 | Marker::I16 => (2, 0),
                Marker::U32 | Marker::I32 | Marker::F32 => (4, 0),
                Marker::U64 | Marker::I64 | Marker::F64 => (8, 0),
                Marker::FixExt1 => (1 + 1, 0),
                Marker::FixExt2 => (1 + 2, 0),
                Marker::FixExt4 => (1 + 4, 0),
                Marker::FixExt8 => (1 + 8, 0),
                Marker::FixExt16 => (1 + 16, 0),
                Marker::Str8 | Marker::Bin8 => {
                    (u8::from_be_bytes(deser_be(r, &mut r_len)?) as u64, 0)
                }
                Marker::Str16 | Marker::Bin16 => {
                    (u16::from_be_bytes(deser_be(r, &mut r_len)?) as u64, 0)
                }
                Marker::Str32 | Marker::Bin32 => {
                    (u32::from_be_bytes(deser_be(r, &mut r_len)?) as u64, 0)
                }
                Marker::Ext8 => (1 + u8::from_be_bytes(deser_be(r, &mut r_len)?) as u64, 0),
                Marker::Ext16 => (1 + u16::from_be_bytes(deser_be(r, &mut r_len)?) as u64, 0),
                Marker::Ext32 => (1 + u32::from_be_bytes(deser_be(r, &mut r_len)?) as u64, 0),
                Marker::Array16 => (0, u16::from_be_bytes(deser_be(r, &mut r_len)?) as u64),
                Marker::Array32 => (0, u32::from_be_bytes(deser_be(r, &mut r_len)?) as u64),
                Marker::Map16 => (0, 2 * u16::from_be_bytes(deser_be(r, &mut r_len)?) as u64),
                Marker::Map32 => (0, 2 * u32::from_be_bytes(deser_be(r, &mut r_len)?) as u64),
            },
        };

        /* body */
        if body_len > 0 {
            let skipped = io::copy(&mut (&mut *r).take(body_len), &mut io::sink())?;
            if skipped != body_len {
                return Err(anyhow!(io::Error::from(ErrorKind::UnexpectedEof)));
            }
            r_len += body_len as usize;
        }

        pending += nested_ct;
    }
    Ok(r_len)
}

/* Trait form, mirroring `Ser`. */

pub trait Deser: Sized {
    fn deser<R: Read + ?Sized>(r: &mut R) -> Result<(usize, Self)>;

    fn deser_solo(buf: &[u8]) -> Result<Self> {
        let mut r = buf;
        let (_, moi) = Self::deser(&mut r)?;
        Ok(moi)
    }
}

macro_rules! impl_deser_int {
    ($($t:ty),*) => {$(
        impl Deser for $t {
            fn deser<R: Read + ?Sized>(r: &mut R) -> Result<(usize, Self)> {
                let (r_len, int) = deser_int(r)?;
                Ok((r_len, int.narrow()?))
            }
        }
    )*};
}
impl_deser_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl Deser for bool {
    fn deser<R: Read + ?Sized>(r: &mut R) -> Result<(usize, Self)> {
        deser_bool(r)
    }
}
impl Deser for f32 {
    fn deser<R: Read + ?Sized>(r: &mut R) -> Result<(usize, Self)> {
        deser_f32(r)
    }
}
impl Deser for f64 {
    fn deser<R: Read + ?Sized>(r: &mut R) -> Result<(usize, Self)> {
        deser_f64(r)
    }
}
impl Deser for char {
    fn deser<R: Read + ?Sized>(r: &mut R) -> Result<(usize, Self)> {
        let (r_len, int) = deser_int(r)?;
        let value: u32 = int.narrow()?;
        let c = char::from_u32(value).ok_or(WireError::InvalidChar { value })?;
        Ok((r_len, c))
    }
}
impl Deser for String {
    fn deser<R: Read + ?Sized>(r: &mut R) -> Result<(usize, Self)> {
        deser_str(r)
    }
}
impl Deser for Vec<u8> {
    fn deser<R: Read + ?Sized>(r: &mut R) -> Result<(usize, Self)> {
        deser_bin(r)
    }
}
