use crate::codec::ReadSeek;
use crate::resolver::Resolver;
use anyhow::{anyhow, Result};
use std::any::{self, Any, TypeId};
use std::fmt;
use std::io::Write;
use tagpack_wire::serde::{Deser, Ser, WriteLen};

/// The field types that are written directly as wire primitives,
/// without going through the resolver.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum PrimKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    Str,
    Bytes,
}

/// A borrowed field value, as handed over by a case's `deconstruct`.
pub enum FieldRef<'a> {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(&'a str),
    Bytes(&'a [u8]),
    Nested(&'a (dyn Any + Send + Sync)),
}

/// An owned field value, as handed over to a case's `reconstruct`.
pub enum FieldValue {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(String),
    Bytes(Vec<u8>),
    Nested(Box<dyn Any + Send>),
}

impl FieldRef<'_> {
    pub fn nested<U: Send + Sync + 'static>(u: &U) -> FieldRef<'_> {
        FieldRef::Nested(u)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldRef::Bool(_) => "bool",
            FieldRef::I8(_) => "i8",
            FieldRef::I16(_) => "i16",
            FieldRef::I32(_) => "i32",
            FieldRef::I64(_) => "i64",
            FieldRef::U8(_) => "u8",
            FieldRef::U16(_) => "u16",
            FieldRef::U32(_) => "u32",
            FieldRef::U64(_) => "u64",
            FieldRef::F32(_) => "f32",
            FieldRef::F64(_) => "f64",
            FieldRef::Char(_) => "char",
            FieldRef::Str(_) => "str",
            FieldRef::Bytes(_) => "bytes",
            FieldRef::Nested(_) => "nested",
        }
    }
}

impl FieldValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::I8(_) => "i8",
            FieldValue::I16(_) => "i16",
            FieldValue::I32(_) => "i32",
            FieldValue::I64(_) => "i64",
            FieldValue::U8(_) => "u8",
            FieldValue::U16(_) => "u16",
            FieldValue::U32(_) => "u32",
            FieldValue::U64(_) => "u64",
            FieldValue::F32(_) => "f32",
            FieldValue::F64(_) => "f64",
            FieldValue::Char(_) => "char",
            FieldValue::Str(_) => "str",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::Nested(_) => "nested",
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(v) => write!(f, "Bool({v:?})"),
            FieldValue::I8(v) => write!(f, "I8({v:?})"),
            FieldValue::I16(v) => write!(f, "I16({v:?})"),
            FieldValue::I32(v) => write!(f, "I32({v:?})"),
            FieldValue::I64(v) => write!(f, "I64({v:?})"),
            FieldValue::U8(v) => write!(f, "U8({v:?})"),
            FieldValue::U16(v) => write!(f, "U16({v:?})"),
            FieldValue::U32(v) => write!(f, "U32({v:?})"),
            FieldValue::U64(v) => write!(f, "U64({v:?})"),
            FieldValue::F32(v) => write!(f, "F32({v:?})"),
            FieldValue::F64(v) => write!(f, "F64({v:?})"),
            FieldValue::Char(v) => write!(f, "Char({v:?})"),
            FieldValue::Str(v) => write!(f, "Str({v:?})"),
            FieldValue::Bytes(v) => write!(f, "Bytes({v:?})"),
            FieldValue::Nested(_) => write!(f, "Nested(..)"),
        }
    }
}

/* Primitive <-> FieldRef / FieldValue. */

pub trait Primitive: Sized + 'static {
    const KIND: PrimKind;
    fn from_value(value: FieldValue) -> Option<Self>;
}

macro_rules! impl_primitive {
    ($($t:ty => $variant:ident),* $(,)?) => {$(
        impl Primitive for $t {
            const KIND: PrimKind = PrimKind::$variant;
            fn from_value(value: FieldValue) -> Option<Self> {
                match value {
                    FieldValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
        impl<'a> From<&'a $t> for FieldRef<'a> {
            fn from(v: &'a $t) -> Self {
                FieldRef::$variant(*v)
            }
        }
    )*};
}
impl_primitive!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
);

impl Primitive for String {
    const KIND: PrimKind = PrimKind::Str;
    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }
}
impl<'a> From<&'a String> for FieldRef<'a> {
    fn from(s: &'a String) -> Self {
        FieldRef::Str(s)
    }
}
impl<'a> From<&'a str> for FieldRef<'a> {
    fn from(s: &'a str) -> Self {
        FieldRef::Str(s)
    }
}

impl Primitive for Vec<u8> {
    const KIND: PrimKind = PrimKind::Bytes;
    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }
}
impl<'a> From<&'a Vec<u8>> for FieldRef<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        FieldRef::Bytes(b)
    }
}

/* Wire access, keyed by the declared kind. */

impl PrimKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimKind::Bool => "bool",
            PrimKind::I8 => "i8",
            PrimKind::I16 => "i16",
            PrimKind::I32 => "i32",
            PrimKind::I64 => "i64",
            PrimKind::U8 => "u8",
            PrimKind::U16 => "u16",
            PrimKind::U32 => "u32",
            PrimKind::U64 => "u64",
            PrimKind::F32 => "f32",
            PrimKind::F64 => "f64",
            PrimKind::Char => "char",
            PrimKind::Str => "str",
            PrimKind::Bytes => "bytes",
        }
    }

    pub fn default_value(self) -> FieldValue {
        match self {
            PrimKind::Bool => FieldValue::Bool(false),
            PrimKind::I8 => FieldValue::I8(0),
            PrimKind::I16 => FieldValue::I16(0),
            PrimKind::I32 => FieldValue::I32(0),
            PrimKind::I64 => FieldValue::I64(0),
            PrimKind::U8 => FieldValue::U8(0),
            PrimKind::U16 => FieldValue::U16(0),
            PrimKind::U32 => FieldValue::U32(0),
            PrimKind::U64 => FieldValue::U64(0),
            PrimKind::F32 => FieldValue::F32(0.0),
            PrimKind::F64 => FieldValue::F64(0.0),
            PrimKind::Char => FieldValue::Char('\0'),
            PrimKind::Str => FieldValue::Str(String::new()),
            PrimKind::Bytes => FieldValue::Bytes(vec![]),
        }
    }

    /// Returns `None` if `field` is not of this kind.
    pub(crate) fn ser(self, field: &FieldRef<'_>, w: &mut dyn Write) -> Result<Option<WriteLen>> {
        let w_len = match (self, field) {
            (PrimKind::Bool, FieldRef::Bool(v)) => v.ser(w)?,
            (PrimKind::I8, FieldRef::I8(v)) => v.ser(w)?,
            (PrimKind::I16, FieldRef::I16(v)) => v.ser(w)?,
            (PrimKind::I32, FieldRef::I32(v)) => v.ser(w)?,
            (PrimKind::I64, FieldRef::I64(v)) => v.ser(w)?,
            (PrimKind::U8, FieldRef::U8(v)) => v.ser(w)?,
            (PrimKind::U16, FieldRef::U16(v)) => v.ser(w)?,
            (PrimKind::U32, FieldRef::U32(v)) => v.ser(w)?,
            (PrimKind::U64, FieldRef::U64(v)) => v.ser(w)?,
            (PrimKind::F32, FieldRef::F32(v)) => v.ser(w)?,
            (PrimKind::F64, FieldRef::F64(v)) => v.ser(w)?,
            (PrimKind::Char, FieldRef::Char(v)) => v.ser(w)?,
            (PrimKind::Str, FieldRef::Str(v)) => v.ser(w)?,
            (PrimKind::Bytes, FieldRef::Bytes(v)) => v.ser(w)?,
            _ => return Ok(None),
        };
        Ok(Some(w_len))
    }

    pub(crate) fn deser(self, r: &mut dyn ReadSeek) -> Result<(usize, FieldValue)> {
        fn wrap<P: Deser>(
            r: &mut dyn ReadSeek,
            f: fn(P) -> FieldValue,
        ) -> Result<(usize, FieldValue)> {
            let (r_len, p) = P::deser(r)?;
            Ok((r_len, f(p)))
        }
        match self {
            PrimKind::Bool => wrap(r, FieldValue::Bool),
            PrimKind::I8 => wrap(r, FieldValue::I8),
            PrimKind::I16 => wrap(r, FieldValue::I16),
            PrimKind::I32 => wrap(r, FieldValue::I32),
            PrimKind::I64 => wrap(r, FieldValue::I64),
            PrimKind::U8 => wrap(r, FieldValue::U8),
            PrimKind::U16 => wrap(r, FieldValue::U16),
            PrimKind::U32 => wrap(r, FieldValue::U32),
            PrimKind::U64 => wrap(r, FieldValue::U64),
            PrimKind::F32 => wrap(r, FieldValue::F32),
            PrimKind::F64 => wrap(r, FieldValue::F64),
            PrimKind::Char => wrap(r, FieldValue::Char),
            PrimKind::Str => wrap(r, FieldValue::Str),
            PrimKind::Bytes => wrap(r, FieldValue::Bytes),
        }
    }
}

/* Nested types, resolved through the resolver at encode/decode time. */

type EncodeFn = fn(&Resolver, &(dyn Any + Send + Sync), &mut dyn Write) -> Result<WriteLen>;
type DecodeFn = fn(&Resolver, &mut dyn ReadSeek) -> Result<(usize, Box<dyn Any + Send>)>;
type DefaultFn = fn() -> Box<dyn Any + Send>;

/// A non-primitive field type.
///
/// Holds trampolines monomorphized for the concrete type, so that a plan
/// built from erased descriptors can still call typed sub-codecs.
#[derive(Clone, Copy)]
pub struct NestedType {
    type_id: TypeId,
    type_name: &'static str,
    encode: EncodeFn,
    decode: DecodeFn,
    default: DefaultFn,
}

impl NestedType {
    pub fn of<U: Default + Send + Sync + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<U>(),
            type_name: any::type_name::<U>(),
            encode: encode_with::<U>,
            decode: decode_with::<U>,
            default: default_with::<U>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn ser(
        &self,
        resolver: &Resolver,
        value: &(dyn Any + Send + Sync),
        w: &mut dyn Write,
    ) -> Result<WriteLen> {
        (self.encode)(resolver, value, w)
    }

    pub(crate) fn deser(
        &self,
        resolver: &Resolver,
        r: &mut dyn ReadSeek,
    ) -> Result<(usize, Box<dyn Any + Send>)> {
        (self.decode)(resolver, r)
    }

    /// Whether `value` is of this type.
    pub(crate) fn admits(&self, value: &(dyn Any + Send + Sync)) -> bool {
        value.type_id() == self.type_id
    }
}

fn encode_with<U: Send + Sync + 'static>(
    resolver: &Resolver,
    value: &(dyn Any + Send + Sync),
    w: &mut dyn Write,
) -> Result<WriteLen> {
    let value = value
        .downcast_ref::<U>()
        .ok_or_else(|| anyhow!("Expected a field value of type {}", any::type_name::<U>()))?;
    resolver.resolve::<U>()?.encode(value, w, resolver)
}

fn decode_with<U: Send + Sync + 'static>(
    resolver: &Resolver,
    r: &mut dyn ReadSeek,
) -> Result<(usize, Box<dyn Any + Send>)> {
    let (r_len, value) = resolver.resolve::<U>()?.decode(r, resolver)?;
    Ok((r_len, Box::new(value)))
}

fn default_with<U: Default + Send + 'static>() -> Box<dyn Any + Send> {
    Box::new(U::default())
}

/// The declared type of a field, or of a reconstruction parameter.
#[derive(Clone, Copy)]
pub enum FieldType {
    Prim(PrimKind),
    Nested(NestedType),
}

impl FieldType {
    pub fn prim<P: Primitive>() -> Self {
        FieldType::Prim(P::KIND)
    }

    pub fn nested<U: Default + Send + Sync + 'static>() -> Self {
        FieldType::Nested(NestedType::of::<U>())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Prim(kind) => kind.name(),
            FieldType::Nested(nested) => nested.type_name,
        }
    }

    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldType::Prim(kind) => kind.default_value(),
            FieldType::Nested(nested) => FieldValue::Nested((nested.default)()),
        }
    }
}

impl PartialEq for FieldType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldType::Prim(slf), FieldType::Prim(oth)) => slf == oth,
            (FieldType::Nested(slf), FieldType::Nested(oth)) => slf.type_id == oth.type_id,
            _ => false,
        }
    }
}
impl Eq for FieldType {}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Prim(kind) => write!(f, "Prim({kind:?})"),
            FieldType::Nested(nested) => write!(f, "Nested({})", nested.type_name),
        }
    }
}

/* Reconstruction arguments. */

/// Field values in constructor-parameter order, as passed to `reconstruct`.
pub struct Args {
    type_name: &'static str,
    case_name: String,
    values: Vec<Option<FieldValue>>,
}

impl Args {
    pub fn new(type_name: &'static str, case_name: &str, values: Vec<FieldValue>) -> Self {
        Self {
            type_name,
            case_name: case_name.to_owned(),
            values: values.into_iter().map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn take_value(&mut self, idx: usize) -> Result<FieldValue> {
        self.values
            .get_mut(idx)
            .and_then(Option::take)
            .ok_or_else(|| {
                anyhow!(
                    "{}.{}: argument {idx} is out of range or already taken",
                    self.type_name,
                    self.case_name
                )
            })
    }

    pub fn take<P: Primitive>(&mut self, idx: usize) -> Result<P> {
        let value = self.take_value(idx)?;
        let found = value.kind_name();
        P::from_value(value).ok_or_else(|| {
            anyhow!(
                "{}.{}: argument {idx} is {found}, expected {}",
                self.type_name,
                self.case_name,
                P::KIND.name()
            )
        })
    }

    pub fn take_nested<U: 'static>(&mut self, idx: usize) -> Result<U> {
        match self.take_value(idx)? {
            FieldValue::Nested(boxed) => boxed.downcast::<U>().map(|b| *b).map_err(|_| {
                anyhow!(
                    "{}.{}: argument {idx} is not a {}",
                    self.type_name,
                    self.case_name,
                    any::type_name::<U>()
                )
            }),
            other => Err(anyhow!(
                "{}.{}: argument {idx} is {}, expected {}",
                self.type_name,
                self.case_name,
                other.kind_name(),
                any::type_name::<U>()
            )),
        }
    }
}
