//! # Serialization format
//!
//! The wire primitives are a subset of MessagePack.
//!
//! Every value starts with a one-byte `format`. Some formats pack their payload
//! (a small integer, or a small length) into the format byte itself; the rest
//! are followed by a fixed-width, big-endian length or body.
//!
//! Readers may skip any value without understanding it; see [`skip`].
//!
//! ```text
//! struct Nil          { format: 0xc0 }
//! struct Bool         { format: 0xc2 | 0xc3 }
//!
//! struct PosFixInt    { format: 0b0xxx_xxxx }           // 0..=127
//! struct NegFixInt    { format: 0b111x_xxxx }           // -32..=-1
//! struct Int          { format: 0xcc..=0xd3, body: [u8; 1 | 2 | 4 | 8] }
//! struct Float        { format: 0xca | 0xcb, body: [u8; 4 | 8] }
//!
//! struct Str {
//!     format:     0b101x_xxxx | 0xd9 | 0xda | 0xdb,
//!     len:        (none, packed) | u8 | u16 | u32,
//!     body:       [u8; len],                            // UTF-8
//! }
//! struct Bin {
//!     format:     0xc4 | 0xc5 | 0xc6,
//!     len:        u8 | u16 | u32,
//!     body:       [u8; len],
//! }
//!
//! struct Array {
//!     format:     0b1001_xxxx | 0xdc | 0xdd,
//!     count:      (none, packed) | u16 | u32,
//!     elements:   [Value; count],
//! }
//! struct Map {
//!     format:     0b1000_xxxx | 0xde | 0xdf,
//!     count:      (none, packed) | u16 | u32,
//!     entries:    [(Value, Value); count],
//! }
//!
//! // Never written; skipped when read.
//! struct Ext {
//!     format:     0xd4..=0xd8 | 0xc7 | 0xc8 | 0xc9,
//!     len:        (none, fixed) | u8 | u16 | u32,
//!     ext_type:   i8,
//!     body:       [u8; len],
//! }
//! ```

mod deser;
mod error;
mod lengths;
mod marker;
mod ser;

pub use deser::*;
pub use error::*;
pub use lengths::*;
pub use marker::*;
pub use ser::*;
