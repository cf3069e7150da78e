use uuid::Uuid;

use super::{Function, FunctionRegistry};
use crate::{
    expression::{binding::Operand, error::EvalError},
    value::Value,
};

/// Random v4 UUID in hyphenated form. Registered as both `guid` and `uuid`.
#[derive(Debug)]
struct RandomId {
    name: &'static str,
}

impl Function for RandomId {
    fn name(&self) -> &'static str {
        self.name
    }

    fn call(&self, _args: &[Operand<'_>]) -> Result<Value, EvalError> {
        Ok(Value::String(Uuid::new_v4().to_string()))
    }
}

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(Box::new(RandomId { name: "guid" }));
    registry.register(Box::new(RandomId { name: "uuid" }));
}
