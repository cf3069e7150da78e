#![deny(missing_docs)]
//! Expression-driven transformations over typed, columnar frames.
//!
//! A [`Frame`] is a named list of equal-length Arrow-backed fields. The
//! transformations in [`transform`] filter, extend, summarize, truncate and
//! concatenate frames, driven by a small expression language
//! ([`expression`]) whose values are the canonical [`Value`] type.
//!
//! Everything is synchronous and in-memory. The only shared state is the
//! built-in function registry, which is immutable once built.

/// Crate-wide error types.
pub mod error;

/// Expression language: compile, bind, evaluate.
pub mod expression;

/// Frames, fields and column builders.
pub mod frame;

/// Structured logging helpers.
pub(crate) mod observability;

/// Options shared by transformations.
pub mod option;

/// Filter, computed columns, summarize, limit, merge and the pipeline.
pub mod transform;

/// Canonical values and storage coercion.
pub mod value;

pub use error::{ErrorKind, SchemaError, TransformError};
pub use expression::{EvalError, Expression, ParseError};
pub use frame::{Field, FieldType, Frame};
pub use option::TransformOptions;
pub use transform::{apply_transformations, ComputedColumn, Transformation};
pub use value::Value;
