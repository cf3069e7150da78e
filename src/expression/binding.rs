//! Binding sets: the names an expression can see while it is evaluated.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::EvalError;
use crate::{
    frame::{Field, Frame},
    value::{is_canonical_type, Value},
};

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_]+").expect("static pattern"));

/// Reduce a field name to a bare identifier: trimmed, lower-cased, with
/// every run of characters other than ASCII letters, digits and `_`
/// collapsed to `_`.
pub fn slugify(name: &str) -> String {
    NON_WORD
        .replace_all(&name.trim().to_lowercase(), "_")
        .into_owned()
}

/// Something a name can be bound to.
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    /// A scalar.
    Value(Value),
    /// A whole column, bound in whole-frame scope.
    Field(&'a Field),
    /// The frame being evaluated.
    Frame(&'a Frame),
}

impl<'a> Operand<'a> {
    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Operand::Value(value) => value.type_name(),
            Operand::Field(_) => "field",
            Operand::Frame(_) => "frame",
        }
    }

    /// The scalar, if this is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Operand::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The scalar, or [`EvalError::NotAValue`] for a field or frame.
    pub fn into_value(self) -> Result<Value, EvalError> {
        match self {
            Operand::Value(value) => Ok(value),
            other => Err(EvalError::NotAValue(other.type_name())),
        }
    }
}

impl From<Value> for Operand<'_> {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

/// A name to operand map, built fresh for every evaluation.
pub type Bindings<'a> = HashMap<String, Operand<'a>>;

/// Precomputed binding names for one frame.
///
/// Slugs are computed once per transformation call; [`FrameBinder::row`] and
/// [`FrameBinder::frame`] then assemble fresh binding sets from them.
#[derive(Debug)]
pub struct FrameBinder<'a> {
    frame: &'a Frame,
    slugs: Vec<String>,
}

impl<'a> FrameBinder<'a> {
    /// Slugify every field name of `frame`.
    pub fn new(frame: &'a Frame) -> Self {
        let slugs = frame.fields.iter().map(|f| slugify(&f.name)).collect();
        Self { frame, slugs }
    }

    /// Fields whose Arrow type has no canonical form, by name.
    pub fn unrecognized_fields(&self) -> impl Iterator<Item = &'a Field> + 'a {
        self.frame
            .fields
            .iter()
            .filter(|field| !is_canonical_type(field.data_type()))
    }

    /// Row scope: every field bound to its canonical value at `row`, under
    /// both its literal and slugified name, plus `frame`, `null`, `nil`,
    /// `rowIndex` and `recordsCount`.
    pub fn row(&self, row: usize) -> Bindings<'a> {
        let mut bindings = Bindings::with_capacity(5 + self.slugs.len() * 2);
        bindings.insert("frame".to_string(), Operand::Frame(self.frame));
        bindings.insert("null".to_string(), Operand::Value(Value::Null));
        bindings.insert("nil".to_string(), Operand::Value(Value::Null));
        bindings.insert("rowIndex".to_string(), Operand::Value(Value::from(row)));
        bindings.insert(
            "recordsCount".to_string(),
            Operand::Value(Value::from(self.frame.row_count())),
        );
        for (field, slug) in self.frame.fields.iter().zip(&self.slugs) {
            let value = field.value(row);
            bindings.insert(field.name.clone(), Operand::Value(value.clone()));
            bindings.insert(slug.clone(), Operand::Value(value));
        }
        bindings
    }

    /// Whole-frame scope: `frame` plus every field bound to itself under
    /// both its literal and slugified name.
    pub fn frame(&self) -> Bindings<'a> {
        let mut bindings = Bindings::with_capacity(1 + self.slugs.len() * 2);
        bindings.insert("frame".to_string(), Operand::Frame(self.frame));
        for (field, slug) in self.frame.fields.iter().zip(&self.slugs) {
            bindings.insert(field.name.clone(), Operand::Field(field));
            bindings.insert(slug.clone(), Operand::Field(field));
        }
        bindings
    }
}
