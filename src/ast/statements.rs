use crate::{symbols::symbols::Qualifier, Position};

use super::{
    ast::{Expr, Stmt},
    types::Type,
};

/// Variable declaration.
///
/// `declared_type` is `None` for `var` declarations, whose type is inferred
/// from the initializer. `ty` holds the resolved type once checked.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationStmt {
    pub qualifier: Qualifier,
    pub declared_type: Option<Type>,
    pub identifier: String,
    pub initializer: Option<Expr>,
    pub ty: Type,
    pub position: Position,
}

impl DeclarationStmt {
    pub fn new(
        qualifier: Qualifier,
        declared_type: Option<Type>,
        identifier: &str,
        initializer: Option<Expr>,
        line: u32,
    ) -> Self {
        DeclarationStmt {
            qualifier,
            ty: declared_type.clone().unwrap_or(Type::Unspec),
            declared_type,
            identifier: identifier.to_string(),
            initializer,
            position: Position(line),
        }
    }

    /// `var identifier = initializer`
    pub fn var(identifier: &str, initializer: Expr, line: u32) -> Self {
        DeclarationStmt::new(Qualifier::Private, None, identifier, Some(initializer), line)
    }

    /// `type identifier [= initializer]`
    pub fn typed(ty: Type, identifier: &str, initializer: Option<Expr>, line: u32) -> Self {
        DeclarationStmt::new(Qualifier::Private, Some(ty), identifier, initializer, line)
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = qualifier;
        self
    }
}

/// Declarations followed by instructions, opening a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub declarations: Vec<DeclarationStmt>,
    pub instructions: Vec<Stmt>,
    pub position: Position,
}

impl BlockStmt {
    pub fn new(declarations: Vec<DeclarationStmt>, instructions: Vec<Stmt>, line: u32) -> Self {
        BlockStmt {
            declarations,
            instructions,
            position: Position(line),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub block: BlockStmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfElseStmt {
    pub condition: Expr,
    pub then_block: BlockStmt,
    pub else_block: BlockStmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub arguments: Vec<Expr>,
    pub newline: bool,
}
