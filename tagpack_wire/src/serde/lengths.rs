use crate::serde::WireError;
use anyhow::Result;
use derive_more::{Add, AddAssign, Deref, From};

#[derive(PartialEq, Eq, Debug)]
pub enum ReadResult<T> {
    EOF,
    Some(usize, T),
}

#[derive(Deref, From, Add, AddAssign, PartialEq, Eq, Clone, Copy, Default, Debug)]
pub struct WriteLen(usize);
impl WriteLen {
    pub fn new_manual(i: usize) -> Self {
        Self(i)
    }
}

/// A length or element count as it is carried on the wire.
#[derive(Deref, Clone, Copy, PartialEq, Eq, Debug)]
pub struct WireLen(u32);
impl WireLen {
    pub fn from_usize(len: usize) -> Result<Self> {
        let int = u32::try_from(len).map_err(|_| WireError::LengthOverflow { len })?;
        Ok(Self(int))
    }
    pub fn new_manual(len: u32) -> Self {
        Self(len)
    }
}
