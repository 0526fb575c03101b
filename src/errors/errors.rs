use std::{fmt::Display, io::Write};

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

/// Broad family an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Type,
    ControlFlow,
    Unsupported,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::WrongUnaryOperand { .. } => "WrongUnaryOperand",
            ErrorImpl::WrongBinaryOperand { .. } => "WrongBinaryOperand",
            ErrorImpl::IncompatibleOperands { .. } => "IncompatibleOperands",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::NotAFunction { .. } => "NotAFunction",
            ErrorImpl::RecursiveCallOutsideFunction => "RecursiveCallOutsideFunction",
            ErrorImpl::VoidDeclaration { .. } => "VoidDeclaration",
            ErrorImpl::ExpectedExplicitValue { .. } => "ExpectedExplicitValue",
            ErrorImpl::ConflictingInitializer { .. } => "ConflictingInitializer",
            ErrorImpl::InvalidIndexBase { .. } => "InvalidIndexBase",
            ErrorImpl::InvalidIndex { .. } => "InvalidIndex",
            ErrorImpl::InvalidAllocationSize { .. } => "InvalidAllocationSize",
            ErrorImpl::InvalidCondition { .. } => "InvalidCondition",
            ErrorImpl::InvalidPrintArgument { .. } => "InvalidPrintArgument",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::ReturnValueMissing { .. } => "ReturnValueMissing",
            ErrorImpl::ReturnValueInVoidFunction => "ReturnValueInVoidFunction",
            ErrorImpl::IncompatibleReturn { .. } => "IncompatibleReturn",
            ErrorImpl::InstructionOutsideLoop { .. } => "InstructionOutsideLoop",
            ErrorImpl::InvalidLoopLevel { .. } => "InvalidLoopLevel",
            ErrorImpl::CannotRead { .. } => "CannotRead",
            ErrorImpl::FailedInitialization { .. } => "FailedInitialization",
            ErrorImpl::UnsupportedConstruct { .. } => "UnsupportedConstruct",
        }
    }

    pub fn get_category(&self) -> ErrorCategory {
        match &self.internal_error {
            ErrorImpl::InstructionOutsideLoop { .. } | ErrorImpl::InvalidLoopLevel { .. } => {
                ErrorCategory::ControlFlow
            }
            ErrorImpl::CannotRead { .. }
            | ErrorImpl::FailedInitialization { .. }
            | ErrorImpl::UnsupportedConstruct { .. } => ErrorCategory::Unsupported,
            _ => ErrorCategory::Type,
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::VariableNotDeclared { variable } => ErrorTip::Suggestion(format!(
                "Declare `{}` before using it",
                variable
            )),
            ErrorImpl::VariableAlreadyDeclared { variable } => ErrorTip::Suggestion(format!(
                "`{}` is already defined in this scope, only forward or external declarations may be redeclared",
                variable
            )),
            ErrorImpl::UnexpectedArguments { expected, received } => ErrorTip::Suggestion(format!(
                "Expected {} arguments, received {}",
                expected, received
            )),
            ErrorImpl::ArgumentTypeMatchError { expected, received } => {
                ErrorTip::Suggestion(format!(
                    "Expected argument type `{}`, received `{}`",
                    expected, received
                ))
            }
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::ExpectedExplicitValue { .. } => ErrorTip::Suggestion(String::from(
                "Expected explicit value when no type is given",
            )),
            ErrorImpl::ConflictingInitializer { expected, .. } => ErrorTip::Suggestion(format!(
                "The initializer must be convertible to `{}`",
                expected
            )),
            ErrorImpl::InvalidCondition { .. } => ErrorTip::Suggestion(String::from(
                "Conditions must be integers",
            )),
            ErrorImpl::InvalidLoopLevel { level, .. } => ErrorTip::Suggestion(format!(
                "Level {} does not name an enclosing loop",
                level
            )),
            ErrorImpl::CannotRead { .. } => ErrorTip::Suggestion(String::from(
                "Only integers and doubles can be read",
            )),
            ErrorImpl::UnsupportedConstruct { .. } => ErrorTip::Suggestion(String::from(
                "This construct is not supported in this context",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.position.line(), self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("undeclared variable '{variable}'")]
    VariableNotDeclared { variable: String },
    #[error("conflicting redeclaration of '{variable}'")]
    VariableAlreadyDeclared { variable: String },
    #[error("wrong type in argument of unary expression '{operator}': {received}")]
    WrongUnaryOperand { operator: String, received: String },
    #[error("wrong type in {side} argument of binary expression '{operator}': {received}")]
    WrongBinaryOperand {
        side: String,
        operator: String,
        received: String,
    },
    #[error("incompatible operand types for '{operator}': {left} and {right}")]
    IncompatibleOperands {
        operator: String,
        left: String,
        right: String,
    },
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("argument types do not match: expected {expected}, received {received}")]
    ArgumentTypeMatchError { expected: String, received: String },
    #[error("wrong number of arguments: expected {expected}, received {received}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("wrong type in function call: {received} is not a function")]
    NotAFunction { received: String },
    #[error("recursive call outside function definition")]
    RecursiveCallOutsideFunction,
    #[error("cannot declare '{variable}' with type void")]
    VoidDeclaration { variable: String },
    #[error("declaration of '{variable}' requires an initializer")]
    ExpectedExplicitValue { variable: String },
    #[error("wrong type for initializer of '{variable}': expected {expected}, received {received}")]
    ConflictingInitializer {
        variable: String,
        expected: String,
        received: String,
    },
    #[error("wrong type in pointer index base: {received}")]
    InvalidIndexBase { received: String },
    #[error("wrong type in pointer index: {received}")]
    InvalidIndex { received: String },
    #[error("wrong type in allocation size: {received}")]
    InvalidAllocationSize { received: String },
    #[error("wrong type in {construct} condition: {received}")]
    InvalidCondition { construct: String, received: String },
    #[error("wrong type in print argument: {received}")]
    InvalidPrintArgument { received: String },
    #[error("return statement outside function definition")]
    ReturnOutsideFunction,
    #[error("return value missing in non-void function (expected {expected})")]
    ReturnValueMissing { expected: String },
    #[error("return value in void function")]
    ReturnValueInVoidFunction,
    #[error("wrong type of return value: expected {expected}, received {received}")]
    IncompatibleReturn { expected: String, received: String },
    #[error("{instruction} instruction outside loop")]
    InstructionOutsideLoop { instruction: String },
    #[error("invalid {instruction} level {level}")]
    InvalidLoopLevel { instruction: String, level: u32 },
    #[error("cannot read type {type_}")]
    CannotRead { type_: String },
    #[error("failed initialization of '{variable}'")]
    FailedInitialization { variable: String },
    #[error("unsupported construct: {construct}")]
    UnsupportedConstruct { construct: String },
}

/// Prints every diagnostic followed by an error count.
///
/// # Arguments
///
/// * `sink` - Where the report is written (usually standard error)
/// * `errors` - The errors to report, in source order
pub fn write_errors(sink: &mut impl Write, errors: &[Error]) -> std::io::Result<()> {
    for error in errors {
        if let ErrorTip::None = error.get_tip() {
            writeln!(sink, "Error: {}", error.get_error_name())?;
        } else {
            writeln!(sink, "Error: {} ({})", error.get_error_name(), error.get_tip())?;
        }
        writeln!(sink, "-> line {}", error)?;
    }

    writeln!(
        sink,
        "{} error{} generated.",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    )
}
