use thiserror::Error;

/// A sum type's description cannot be turned into a codec.
/// Raised once per build attempt; nothing is cached.
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum SchemaError {
    #[error("{type_name}: tag {tag} is declared by both {first} and {second}")]
    DuplicateTag {
        type_name: &'static str,
        tag: i32,
        first: String,
        second: String,
    },

    #[error("{type_name}.{case}: index key {key} is assigned to more than one field")]
    DuplicateKey {
        type_name: &'static str,
        case: String,
        key: u32,
    },

    #[error("{type_name}.{case}: field {field:?} has index key {key}, above the limit of {max}")]
    KeyOutOfRange {
        type_name: &'static str,
        case: String,
        field: String,
        key: u32,
        max: u32,
    },

    #[error("{type_name}.{case}: field name {name:?} is declared more than once")]
    DuplicateName {
        type_name: &'static str,
        case: String,
        name: String,
    },

    #[error("{type_name}: composite key of {case}.{field} collides with {other_case}")]
    KeyCollision {
        type_name: &'static str,
        case: String,
        field: String,
        other_case: String,
    },

    #[error("{type_name}.{case}: parameter {param:?} at index {index} has no field at that position")]
    ParamIndexNotFound {
        type_name: &'static str,
        case: String,
        param: String,
        index: usize,
    },

    #[error("{type_name}.{case}: parameter {param:?} matches no field name")]
    ParamNameNotFound {
        type_name: &'static str,
        case: String,
        param: String,
    },

    #[error("{type_name}.{case}: parameter {param:?} matches more than one field, ignoring case")]
    DuplicateParamMatch {
        type_name: &'static str,
        case: String,
        param: String,
    },

    #[error("{type_name}.{case}: parameter {param:?} is {param_type} but its field is {field_type}")]
    ParamTypeMismatch {
        type_name: &'static str,
        case: String,
        param: String,
        param_type: &'static str,
        field_type: &'static str,
    },

    #[error("{type_name}.{case}: field {field:?} is bound to more than one parameter")]
    ParamSlotReused {
        type_name: &'static str,
        case: String,
        field: String,
    },
}

/// A message cannot be encoded or decoded as the given sum type.
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum FormatError {
    #[error("{type_name}: envelope must be an array of 2. Found {len}")]
    EnvelopeLength { type_name: &'static str, len: u32 },

    #[error("{type_name}: a value type cannot be encoded as nil")]
    NilForValueType { type_name: &'static str },

    #[error("{type_name}: found nil where a value is required")]
    UnexpectedNil { type_name: &'static str },

    #[error("{type_name}: a value type cannot encode absence")]
    AbsentValueType { type_name: &'static str },

    #[error("{type_name}: unknown tag {tag}")]
    UnknownTag { type_name: &'static str, tag: i32 },

    #[error("{type_name}.{case}: expected {expected} field values. Found {found}")]
    FieldCountMismatch {
        type_name: &'static str,
        case: String,
        expected: usize,
        found: usize,
    },

    #[error("{type_name}.{case}: field {field:?} is declared {expected} but holds {found}")]
    FieldTypeMismatch {
        type_name: &'static str,
        case: String,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{type_name}: {len} bytes remain after the value")]
    TrailingBytes { type_name: &'static str, len: usize },
}

#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum ResolveError {
    #[error("No codec is registered for {type_name}")]
    NoCodec { type_name: &'static str },
}
