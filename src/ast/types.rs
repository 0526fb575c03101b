//! Type system definitions for the AST.
//!
//! This module defines the types every expression, declaration and symbol
//! is resolved to:
//!
//! - Primitive types (`int`, `double`, `string`, `void`)
//! - The `unspec` placeholder used by context-dependent expressions
//! - Composite types (pointers and function types)
//! - Storage sizes and structural / relaxed comparison
//!
//! Types are immutable values; composite types share their components
//! through `Rc` so cloning a resolved type is cheap.

use std::{fmt::Display, rc::Rc};

/// Size in bytes of one machine word (ints, strings, pointers, function addresses).
pub const WORD_SIZE: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Double,
    String,
    Void,
    /// Placeholder for a type that is decided by the surrounding context.
    Unspec,
    Pointer(Rc<Type>),
    Functional {
        inputs: Rc<Vec<Type>>,
        output: Rc<Type>,
    },
}

impl Type {
    pub fn pointer(referenced: Type) -> Self {
        Type::Pointer(Rc::new(referenced))
    }

    pub fn functional(inputs: Vec<Type>, output: Type) -> Self {
        Type::Functional {
            inputs: Rc::new(inputs),
            output: Rc::new(output),
        }
    }

    /// Storage size in bytes.
    pub fn size(&self) -> usize {
        match self {
            Type::Int | Type::String | Type::Pointer(_) | Type::Functional { .. } => WORD_SIZE,
            Type::Double => 8,
            Type::Void | Type::Unspec => 0,
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Type::Int)
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Type::Double)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_unspec(&self) -> bool {
        matches!(self, Type::Unspec)
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_functional(&self) -> bool {
        matches!(self, Type::Functional { .. })
    }

    /// `int` or `double`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Double)
    }

    /// The type a pointer refers to, `None` for non-pointers.
    pub fn referenced(&self) -> Option<&Type> {
        match self {
            Type::Pointer(referenced) => Some(referenced),
            _ => None,
        }
    }

    /// Pointer to `unspec` or pointer to `void`: compatible with any other pointer.
    pub fn is_generic_pointer(&self) -> bool {
        matches!(self.referenced(), Some(Type::Unspec | Type::Void))
    }

    /// Size of the referenced type, never below one byte, used to scale pointer arithmetic.
    pub fn pointee_stride(&self) -> usize {
        self.referenced().map_or(1, |referenced| referenced.size().max(1))
    }

    /// Return type of a function type.
    pub fn output(&self) -> Option<&Type> {
        match self {
            Type::Functional { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Parameter types of a function type.
    pub fn inputs(&self) -> Option<&[Type]> {
        match self {
            Type::Functional { inputs, .. } => Some(inputs),
            _ => None,
        }
    }
}

/// Compares a `provided` type against an `expected` one.
///
/// Function types match when they have the same arity and their parameter and
/// return types match pairwise; pointers match when their referenced types do.
/// With `relax` set, an `int` is accepted where a `double` is expected and a
/// generic pointer (to `unspec` or `void`) is accepted on either side of a
/// pointer comparison.
pub fn deep_compare(provided: &Type, expected: &Type, relax: bool) -> bool {
    match (provided, expected) {
        (
            Type::Functional {
                inputs: provided_inputs,
                output: provided_output,
            },
            Type::Functional {
                inputs: expected_inputs,
                output: expected_output,
            },
        ) => {
            provided_inputs.len() == expected_inputs.len()
                && provided_inputs
                    .iter()
                    .zip(expected_inputs.iter())
                    .all(|(provided, expected)| deep_compare(provided, expected, relax))
                && deep_compare(provided_output, expected_output, relax)
        }
        (Type::Functional { .. }, _) | (_, Type::Functional { .. }) => false,
        (Type::Pointer(provided_referenced), Type::Pointer(expected_referenced)) => {
            if relax && (provided.is_generic_pointer() || expected.is_generic_pointer()) {
                return true;
            }
            deep_compare(provided_referenced, expected_referenced, relax)
        }
        (Type::Pointer(_), _) | (_, Type::Pointer(_)) => false,
        (Type::Int, Type::Double) if relax => true,
        (provided, expected) => provided == expected,
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Double => write!(f, "double"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Unspec => write!(f, "unspec"),
            Type::Pointer(referenced) => write!(f, "{}!", referenced),
            Type::Functional { inputs, output } => {
                let inputs = inputs
                    .iter()
                    .map(Type::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}({})", output, inputs)
            }
        }
    }
}
