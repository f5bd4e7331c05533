//! Codecs for tagged sum types.
//!
//! A sum type registers a `UnionSchema` with a `Resolver`.
//! The first request for its codec builds a plan, which is kept for the life of the resolver.
//!
//! ```text
//! [ array(2):
//!     tag: int
//!     payload:
//!         positional: array(max_key + 1); element i is the field keyed i, or nil
//!         named:      map(field count); entries are (name: str, value)
//! ]
//! ```
//! A reference-like type encodes absence as a single nil in place of the envelope.

pub mod cache;
pub mod config;
pub mod error;
pub mod key_map;
pub mod layout;
pub mod schema;
pub mod synth;

mod codec;
mod reader;
mod resolver;

pub use codec::*;
pub use config::{KeyMode, Representation, UnionConfig, UnknownTagPolicy};
pub use error::{FormatError, ResolveError, SchemaError};
pub use reader::*;
pub use resolver::*;
pub use synth::{NullableCodec, UnionCodec};
