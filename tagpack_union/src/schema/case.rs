use crate::config::{KeyMode, Representation, UnionConfig, UnknownTagPolicy};
use crate::schema::{Args, FieldRef, FieldType};
use anyhow::Result;

#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: FieldType,
    /// An explicitly assigned index key. Consulted only when keys are indices.
    pub index: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct ParamDescriptor {
    pub name: String,
    pub ty: FieldType,
}

pub type Deconstruct<T> = fn(&T) -> Vec<FieldRef<'_>>;
pub type Reconstruct<T> = fn(Args) -> Result<T>;

/// One case of a sum type.
///
/// `deconstruct` yields field values in declared field order.
/// `reconstruct` receives values in parameter order; if no params were declared,
/// the parameter list is the field list.
pub struct CaseDescriptor<T> {
    pub tag: i32,
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub params: Option<Vec<ParamDescriptor>>,
    pub deconstruct: Deconstruct<T>,
    pub reconstruct: Reconstruct<T>,
}

impl<T> CaseDescriptor<T> {
    pub fn new(
        tag: i32,
        name: impl Into<String>,
        deconstruct: Deconstruct<T>,
        reconstruct: Reconstruct<T>,
    ) -> Self {
        Self {
            tag,
            name: name.into(),
            fields: vec![],
            params: None,
            deconstruct,
            reconstruct,
        }
    }

    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            ty,
            index: None,
        });
        self
    }

    pub fn field_at(mut self, index: u32, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDescriptor {
            name: name.into(),
            ty,
            index: Some(index),
        });
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.params.get_or_insert_with(Vec::new).push(ParamDescriptor {
            name: name.into(),
            ty,
        });
        self
    }

    pub(crate) fn params(&self) -> Vec<ParamDescriptor> {
        match &self.params {
            Some(params) => params.clone(),
            None => self
                .fields
                .iter()
                .map(|fd| ParamDescriptor {
                    name: fd.name.clone(),
                    ty: fd.ty,
                })
                .collect(),
        }
    }
}

pub struct UnionSchema<T> {
    pub type_name: &'static str,
    pub config: UnionConfig,
    pub tag_of: fn(&T) -> i32,
    pub cases: Vec<CaseDescriptor<T>>,
}

impl<T> UnionSchema<T> {
    pub fn new(tag_of: fn(&T) -> i32) -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            config: UnionConfig::default(),
            tag_of,
            cases: vec![],
        }
    }

    pub fn named(mut self, type_name: &'static str) -> Self {
        self.type_name = type_name;
        self
    }

    pub fn config(mut self, config: UnionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn keys(mut self, keys: KeyMode) -> Self {
        self.config.keys = keys;
        self
    }

    pub fn representation(mut self, representation: Representation) -> Self {
        self.config.representation = representation;
        self
    }

    pub fn unknown_tag(mut self, policy: UnknownTagPolicy) -> Self {
        self.config.unknown_tag = policy;
        self
    }

    pub fn case(mut self, case: CaseDescriptor<T>) -> Self {
        self.cases.push(case);
        self
    }
}

/// A sum type that can describe its own cases.
pub trait UnionType: Sized + Send + Sync + 'static {
    fn describe() -> UnionSchema<Self>;
}
