use anyhow::{anyhow, Error, Result};
use std::env::{self, VarError};
use std::str::FromStr;

/// Names the default `UnknownTagPolicy`: `skip` or `reject`.
pub const ENV_VAR_UNKNOWN_TAG: &str = "TAGPACK_UNKNOWN_TAG";

/// How fields are keyed inside a case payload.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
pub enum KeyMode {
    /// Array payload; a field's key is its index.
    Index,
    /// Map payload; a field's key is its name.
    #[default]
    Name,
}

/// Null semantics of a sum type.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
pub enum Representation {
    /// Absence is a valid value, encoded as a single nil.
    #[default]
    Reference,
    /// Absence is not representable; nil on the wire is an error.
    Value,
}

/// What decoding does upon a tag that matches no case.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
pub enum UnknownTagPolicy {
    /// Consume the payload and yield no value.
    #[default]
    Skip,
    Reject,
}

impl FromStr for UnknownTagPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "reject" => Ok(Self::Reject),
            _ => Err(anyhow!("Unknown tag policy must be skip or reject. Found {s:?}")),
        }
    }
}

impl UnknownTagPolicy {
    pub fn from_env() -> Self {
        Self::from_var(env::var(ENV_VAR_UNKNOWN_TAG))
    }

    fn from_var(var: Result<String, VarError>) -> Self {
        var.map_or_else(
            |_| Self::default(),
            |s| {
                s.parse().unwrap_or_else(|e| {
                    tracing::warn!("Ignoring {ENV_VAR_UNKNOWN_TAG}: {e}");
                    Self::default()
                })
            },
        )
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct UnionConfig {
    pub keys: KeyMode,
    pub representation: Representation,
    pub unknown_tag: UnknownTagPolicy,
}

impl Default for UnionConfig {
    fn default() -> Self {
        Self {
            keys: KeyMode::default(),
            representation: Representation::default(),
            unknown_tag: UnknownTagPolicy::from_env(),
        }
    }
}
