use crate::serde::Format;
use thiserror::Error;

#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum WireError {
    #[error("expected {expected}, found {found:?}")]
    UnexpectedFormat {
        expected: &'static str,
        found: Format,
    },

    #[error("reserved format byte 0xc1")]
    ReservedMarker,

    #[error("integer {value} does not fit in {target}")]
    IntOutOfRange { value: i128, target: &'static str },

    #[error("length {len} exceeds the 32-bit wire limit")]
    LengthOverflow { len: usize },

    #[error("{value:#x} is not a unicode scalar value")]
    InvalidChar { value: u32 },
}
