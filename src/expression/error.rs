//! Errors raised while compiling and evaluating expressions.

use thiserror::Error;

/// The expression text could not be compiled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The expression is blank.
    #[error("empty expression")]
    Empty,
    /// A character that starts no token.
    #[error("unexpected character '{character}' at {position}")]
    UnexpectedCharacter {
        /// Byte offset in the expression.
        position: usize,
        /// The offending character.
        character: char,
    },
    /// A numeric literal that does not parse as a number.
    #[error("invalid number '{text}' at {position}")]
    InvalidNumber {
        /// Byte offset in the expression.
        position: usize,
        /// The literal text.
        text: String,
    },
    /// A string literal without its closing quote.
    #[error("unterminated string starting at {position}")]
    UnterminatedString {
        /// Byte offset of the opening quote.
        position: usize,
    },
    /// A `[field name]` without its closing bracket.
    #[error("unterminated field reference starting at {position}")]
    UnterminatedBracket {
        /// Byte offset of the opening bracket.
        position: usize,
    },
    /// A token where the grammar does not allow one.
    #[error("unexpected {found} at {position}")]
    UnexpectedToken {
        /// Byte offset in the expression.
        position: usize,
        /// Description of the token.
        found: String,
    },
    /// The expression stops mid-way.
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    /// A call to a function that is not registered.
    #[error("undefined function: {0}")]
    UnknownFunction(String),
    /// A literal `=~`/`!~` pattern that does not compile.
    #[error("invalid regular expression '{pattern}': {message}")]
    InvalidRegex {
        /// The pattern text.
        pattern: String,
        /// Message from the regex compiler.
        message: String,
    },
    /// Parentheses, operators or calls nest too deeply.
    #[error("expression nested deeper than {limit} levels at {position}")]
    TooDeep {
        /// Byte offset where the limit was reached.
        position: usize,
        /// The nesting limit.
        limit: usize,
    },
}

/// Evaluating a compiled expression failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    /// A variable with no binding.
    #[error("no parameter '{0}' found")]
    UnknownParameter(String),
    /// A binary operator applied to operands it does not accept.
    #[error("operator '{op}' cannot be applied to {lhs} and {rhs}")]
    BinaryOperand {
        /// Operator symbol.
        op: &'static str,
        /// Type name of the left operand.
        lhs: &'static str,
        /// Type name of the right operand.
        rhs: &'static str,
    },
    /// A unary operator applied to an operand it does not accept.
    #[error("operator '{op}' cannot be applied to {operand}")]
    UnaryOperand {
        /// Operator symbol.
        op: &'static str,
        /// Type name of the operand.
        operand: &'static str,
    },
    /// A `?:` condition that is not a bool.
    #[error("ternary condition must be a bool, got {0}")]
    TernaryCondition(&'static str),
    /// A computed `=~`/`!~` pattern that does not compile.
    #[error("invalid regular expression '{pattern}': {message}")]
    InvalidRegex {
        /// The pattern text.
        pattern: String,
        /// Message from the regex compiler.
        message: String,
    },
    /// Too few arguments for a function.
    #[error("{function}: expected at least {expected} argument(s), got {got}")]
    ArgumentCount {
        /// Function name.
        function: &'static str,
        /// Minimum argument count.
        expected: usize,
        /// Arguments passed.
        got: usize,
    },
    /// An aggregate was given something other than a field.
    #[error("{function}: argument must be a field, got {found}")]
    NotAField {
        /// Function name.
        function: &'static str,
        /// Type name of the argument.
        found: &'static str,
    },
    /// An aggregate was given a field of a type it cannot reduce.
    #[error("{function}: unsupported field type {found}")]
    FieldType {
        /// Function name.
        function: &'static str,
        /// The field's Arrow type.
        found: String,
    },
    /// An aggregate that needs at least one value got none.
    #[error("{function}: field has no data")]
    NoData {
        /// Function name.
        function: &'static str,
    },
    /// A field or frame used where a scalar is required.
    #[error("a {0} cannot be used as a value here")]
    NotAValue(&'static str),
}
