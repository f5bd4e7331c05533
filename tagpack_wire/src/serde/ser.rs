use crate::serde::{
    Format, Marker, WireLen, WriteLen, MAX_FIX_ARRAY_COUNT, MAX_FIX_MAP_COUNT, MAX_FIX_POS_INT,
    MAX_FIX_STR_LEN, MIN_FIX_NEG_INT,
};
use anyhow::Result;
use std::io::Write;

fn ser_format<W: Write + ?Sized>(format: Format, w: &mut W) -> Result<WriteLen> {
    w.write_all(&[u8::from(format)])?;
    Ok(WriteLen::new_manual(1))
}

fn ser_marked<W: Write + ?Sized>(marker: Marker, body: &[u8], w: &mut W) -> Result<WriteLen> {
    let mut w_len = ser_format(Format::from(marker), w)?;
    w.write_all(body)?;
    w_len += WriteLen::new_manual(body.len());
    Ok(w_len)
}

pub fn ser_nil<W: Write + ?Sized>(w: &mut W) -> Result<WriteLen> {
    ser_format(Format::from(Marker::Nil), w)
}

pub fn ser_bool<W: Write + ?Sized>(b: bool, w: &mut W) -> Result<WriteLen> {
    let marker = if b { Marker::True } else { Marker::False };
    ser_format(Format::from(marker), w)
}

/// Writes `u` in the smallest unsigned format that holds it.
pub fn ser_u64<W: Write + ?Sized>(u: u64, w: &mut W) -> Result<WriteLen> {
    if u <= MAX_FIX_POS_INT as u64 {
        ser_format(Format::PosFixInt(u as u8), w)
    } else if let Ok(u) = u8::try_from(u) {
        ser_marked(Marker::U8, &u.to_be_bytes(), w)
    } else if let Ok(u) = u16::try_from(u) {
        ser_marked(Marker::U16, &u.to_be_bytes(), w)
    } else if let Ok(u) = u32::try_from(u) {
        ser_marked(Marker::U32, &u.to_be_bytes(), w)
    } else {
        ser_marked(Marker::U64, &u.to_be_bytes(), w)
    }
}

/// Writes `i` in the smallest format that holds it.
/// Non-negative values use the unsigned formats.
pub fn ser_i64<W: Write + ?Sized>(i: i64, w: &mut W) -> Result<WriteLen> {
    if i >= 0 {
        ser_u64(i as u64, w)
    } else if i >= MIN_FIX_NEG_INT as i64 {
        ser_format(Format::NegFixInt(i as i8), w)
    } else if let Ok(i) = i8::try_from(i) {
        ser_marked(Marker::I8, &i.to_be_bytes(), w)
    } else if let Ok(i) = i16::try_from(i) {
        ser_marked(Marker::I16, &i.to_be_bytes(), w)
    } else if let Ok(i) = i32::try_from(i) {
        ser_marked(Marker::I32, &i.to_be_bytes(), w)
    } else {
        ser_marked(Marker::I64, &i.to_be_bytes(), w)
    }
}

pub fn ser_f32<W: Write + ?Sized>(f: f32, w: &mut W) -> Result<WriteLen> {
    ser_marked(Marker::F32, &f.to_be_bytes(), w)
}

pub fn ser_f64<W: Write + ?Sized>(f: f64, w: &mut W) -> Result<WriteLen> {
    ser_marked(Marker::F64, &f.to_be_bytes(), w)
}

/// Writes only the header of a string whose UTF-8 body is `byte_len` long.
pub fn ser_str_header<W: Write + ?Sized>(byte_len: usize, w: &mut W) -> Result<WriteLen> {
    let len = WireLen::from_usize(byte_len)?;
    if byte_len <= MAX_FIX_STR_LEN {
        ser_format(Format::FixStr(*len as u8), w)
    } else if let Ok(len) = u8::try_from(*len) {
        ser_marked(Marker::Str8, &len.to_be_bytes(), w)
    } else if let Ok(len) = u16::try_from(*len) {
        ser_marked(Marker::Str16, &len.to_be_bytes(), w)
    } else {
        ser_marked(Marker::Str32, &len.to_be_bytes(), w)
    }
}

pub fn ser_str<W: Write + ?Sized>(s: &str, w: &mut W) -> Result<WriteLen> {
    let mut w_len = ser_str_header(s.len(), w)?;
    w.write_all(s.as_bytes())?;
    w_len += WriteLen::new_manual(s.len());
    Ok(w_len)
}

pub fn ser_bin<W: Write + ?Sized>(b: &[u8], w: &mut W) -> Result<WriteLen> {
    let len = WireLen::from_usize(b.len())?;
    let mut w_len = if let Ok(len) = u8::try_from(*len) {
        ser_marked(Marker::Bin8, &len.to_be_bytes(), w)?
    } else if let Ok(len) = u16::try_from(*len) {
        ser_marked(Marker::Bin16, &len.to_be_bytes(), w)?
    } else {
        ser_marked(Marker::Bin32, &len.to_be_bytes(), w)?
    };
    w.write_all(b)?;
    w_len += WriteLen::new_manual(b.len());
    Ok(w_len)
}

pub fn ser_array_header<W: Write + ?Sized>(count: usize, w: &mut W) -> Result<WriteLen> {
    let ct = WireLen::from_usize(count)?;
    if count <= MAX_FIX_ARRAY_COUNT {
        ser_format(Format::FixArray(*ct as u8), w)
    } else if let Ok(ct) = u16::try_from(*ct) {
        ser_marked(Marker::Array16, &ct.to_be_bytes(), w)
    } else {
        ser_marked(Marker::Array32, &ct.to_be_bytes(), w)
    }
}

pub fn ser_map_header<W: Write + ?Sized>(count: usize, w: &mut W) -> Result<WriteLen> {
    let ct = WireLen::from_usize(count)?;
    if count <= MAX_FIX_MAP_COUNT {
        ser_format(Format::FixMap(*ct as u8), w)
    } else if let Ok(ct) = u16::try_from(*ct) {
        ser_marked(Marker::Map16, &ct.to_be_bytes(), w)
    } else {
        ser_marked(Marker::Map32, &ct.to_be_bytes(), w)
    }
}

/* Trait form, for the scalar types that map onto a single wire value. */

pub trait Ser {
    fn ser<W: Write + ?Sized>(&self, w: &mut W) -> Result<WriteLen>;

    fn ser_solo(&self) -> Result<Vec<u8>> {
        let mut buf = vec![];
        self.ser(&mut buf)?;
        Ok(buf)
    }
}

macro_rules! impl_ser_signed {
    ($($t:ty),*) => {$(
        impl Ser for $t {
            fn ser<W: Write + ?Sized>(&self, w: &mut W) -> Result<WriteLen> {
                ser_i64(*self as i64, w)
            }
        }
    )*};
}
macro_rules! impl_ser_unsigned {
    ($($t:ty),*) => {$(
        impl Ser for $t {
            fn ser<W: Write + ?Sized>(&self, w: &mut W) -> Result<WriteLen> {
                ser_u64(*self as u64, w)
            }
        }
    )*};
}
impl_ser_signed!(i8, i16, i32, i64);
impl_ser_unsigned!(u8, u16, u32, u64);

impl Ser for bool {
    fn ser<W: Write + ?Sized>(&self, w: &mut W) -> Result<WriteLen> {
        ser_bool(*self, w)
    }
}
impl Ser for f32 {
    fn ser<W: Write + ?Sized>(&self, w: &mut W) -> Result<WriteLen> {
        ser_f32(*self, w)
    }
}
impl Ser for f64 {
    fn ser<W: Write + ?Sized>(&self, w: &mut W) -> Result<WriteLen> {
        ser_f64(*self, w)
    }
}
impl Ser for char {
    fn ser<W: Write + ?Sized>(&self, w: &mut W) -> Result<WriteLen> {
        ser_u64(*self as u64, w)
    }
}
impl Ser for str {
    fn ser<W: Write + ?Sized>(&self, w: &mut W) -> Result<WriteLen> {
        ser_str(self, w)
    }
}
impl Ser for String {
    fn ser<W: Write + ?Sized>(&self, w: &mut W) -> Result<WriteLen> {
        ser_str(self, w)
    }
}
impl Ser for [u8] {
    fn ser<W: Write + ?Sized>(&self, w: &mut W) -> Result<WriteLen> {
        ser_bin(self, w)
    }
}
impl Ser for Vec<u8> {
    fn ser<W: Write + ?Sized>(&self, w: &mut W) -> Result<WriteLen> {
        ser_bin(self, w)
    }
}
