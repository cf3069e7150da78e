//! Built-in expression functions and the registry that resolves them.
//!
//! The registry is built once on first use and is read-only afterwards, so
//! any number of transformation calls can share it.

use std::{collections::HashMap, fmt::Debug};

use once_cell::sync::Lazy;

use super::{binding::Operand, error::EvalError};
use crate::value::Value;

// Aggregate functions
mod aggregate;
// Identifier functions
mod id;
// String functions
mod string;

/// A function callable from an expression.
pub trait Function: Debug + Send + Sync {
    /// Name the function is called by.
    fn name(&self) -> &'static str;

    /// Execute the function with evaluated arguments.
    fn call(&self, args: &[Operand<'_>]) -> Result<Value, EvalError>;
}

/// Registry of all built-in functions.
pub struct FunctionRegistry {
    functions: HashMap<&'static str, Box<dyn Function>>,
}

impl FunctionRegistry {
    fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };
        aggregate::register(&mut registry);
        string::register(&mut registry);
        id::register(&mut registry);
        registry
    }

    fn register(&mut self, function: Box<dyn Function>) {
        self.functions.insert(function.name(), function);
    }
}

static REGISTRY: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::new);

/// Look up a function by its exact name.
pub fn lookup(name: &str) -> Option<&'static dyn Function> {
    REGISTRY.functions.get(name).map(|f| f.as_ref())
}

/// Names of every registered function, sorted.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY.functions.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Fail with [`EvalError::ArgumentCount`] unless at least `expected`
/// arguments were passed.
fn require(function: &'static str, args: &[Operand<'_>], expected: usize) -> Result<(), EvalError> {
    if args.len() < expected {
        return Err(EvalError::ArgumentCount {
            function,
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_builtins() {
        assert_eq!(
            names(),
            vec![
                "contains",
                "count",
                "endswith",
                "first",
                "guid",
                "last",
                "max",
                "mean",
                "min",
                "replace",
                "replace_all",
                "startswith",
                "sum",
                "tolower",
                "toupper",
                "trim",
                "uuid",
            ]
        );
        assert!(lookup("SUM").is_none());
    }

    #[test]
    fn registry_is_shared_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| lookup("mean").map(|f| f.name())))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some("mean"));
        }
    }
}
