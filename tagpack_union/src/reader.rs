use crate::codec::Codec;
use crate::resolver::Resolver;
use anyhow::Result;
use std::io::{Read, Seek};
use std::sync::Arc;
use tagpack_wire::serde::{Format, ReadResult};

/// Reads back-to-back encoded values of one type.
///
/// Ending exactly between two values is EOF; ending inside one is an error.
pub struct UnionReader<'a, R, T> {
    r: R,
    codec: Arc<dyn Codec<T>>,
    resolver: &'a Resolver,
    failed: bool,
}

impl<'a, R, T> UnionReader<'a, R, T>
where
    R: Read + Seek,
{
    pub fn new(r: R, codec: Arc<dyn Codec<T>>, resolver: &'a Resolver) -> Self {
        Self {
            r,
            codec,
            resolver,
            failed: false,
        }
    }

    pub fn deser(&mut self) -> Result<ReadResult<T>> {
        if let ReadResult::EOF = Format::peek(&mut self.r)? {
            return Ok(ReadResult::EOF);
        }
        let (r_len, value) = self.codec.decode(&mut self.r, self.resolver)?;
        Ok(ReadResult::Some(r_len, value))
    }

    pub fn into_inner(self) -> R {
        self.r
    }
}

impl<R, T> Iterator for UnionReader<'_, R, T>
where
    R: Read + Seek,
{
    /// Bytes consumed, and the value.
    type Item = Result<(usize, T)>;

    /// Stops for good after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let res_opt = self.deser().map(|read_result| match read_result {
            ReadResult::EOF => None,
            ReadResult::Some(r_len, value) => Some((r_len, value)),
        });
        self.failed = res_opt.is_err();
        res_opt.transpose()
    }
}
