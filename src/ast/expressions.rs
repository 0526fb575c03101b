use std::fmt::Display;

use super::{
    ast::{Expr, LValue},
    statements::{BlockStmt, DeclarationStmt},
    types::Type,
};

// OPERATORS

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negation,
    Identity,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOperator {
    /// Operators that accept `double` and pointer operands with promotion.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add | BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div
        )
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            UnaryOperator::Negation => "-",
            UnaryOperator::Identity => "+",
            UnaryOperator::Not => "~",
        };
        write!(f, "{}", symbol)
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        };
        write!(f, "{}", symbol)
    }
}

// EXPRESSION PAYLOADS

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub operator: UnaryOperator,
    pub argument: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub operator: BinaryOperator,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpr {
    pub lvalue: Box<LValue>,
    pub rvalue: Box<Expr>,
}

/// Function call.
///
/// A call without a callee is a recursive call to the enclosing function.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Option<Box<Expr>>,
    pub arguments: Vec<Expr>,
}

/// Function definition used as a value.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpr {
    pub arguments: Vec<DeclarationStmt>,
    pub output: Type,
    pub block: BlockStmt,
}

impl FunctionExpr {
    /// The function type built from the declared parameter types and the return type.
    pub fn function_type(&self) -> Type {
        let inputs = self
            .arguments
            .iter()
            .map(|argument| argument.declared_type.clone().unwrap_or(Type::Unspec))
            .collect();
        Type::functional(inputs, self.output.clone())
    }
}

/// `base[index]`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexLValue {
    pub base: Box<Expr>,
    pub index: Box<Expr>,
}
