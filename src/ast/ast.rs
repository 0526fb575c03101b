use crate::Position;

use super::{
    expressions::{
        AssignmentExpr, BinaryExpr, BinaryOperator, CallExpr, FunctionExpr, IndexLValue,
        UnaryExpr, UnaryOperator,
    },
    statements::{BlockStmt, DeclarationStmt, IfElseStmt, IfStmt, LoopStmt, PrintStmt},
    types::Type,
};

/// Expression Kinds
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Integer(i32),
    Double(f64),
    String(String),
    Nullptr,
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    /// Value stored at an l-value.
    RValue(Box<LValue>),
    Assignment(AssignmentExpr),
    AddressOf(Box<LValue>),
    Call(CallExpr),
    Function(FunctionExpr),
    Read,
    StackAlloc(Box<Expr>),
    Sizeof(Box<Expr>),
}

/// Expression node.
///
/// `ty` starts as `unspec` and is filled in by the type checker.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub position: Position,
}

impl Expr {
    pub fn new(kind: ExprKind, line: u32) -> Self {
        Expr {
            kind,
            ty: Type::Unspec,
            position: Position(line),
        }
    }

    pub fn integer(value: i32, line: u32) -> Self {
        Expr::new(ExprKind::Integer(value), line)
    }

    pub fn double(value: f64, line: u32) -> Self {
        Expr::new(ExprKind::Double(value), line)
    }

    pub fn string(value: &str, line: u32) -> Self {
        Expr::new(ExprKind::String(value.to_string()), line)
    }

    pub fn nullptr(line: u32) -> Self {
        Expr::new(ExprKind::Nullptr, line)
    }

    pub fn unary(operator: UnaryOperator, argument: Expr, line: u32) -> Self {
        Expr::new(
            ExprKind::Unary(UnaryExpr {
                operator,
                argument: Box::new(argument),
            }),
            line,
        )
    }

    pub fn binary(operator: BinaryOperator, left: Expr, right: Expr, line: u32) -> Self {
        Expr::new(
            ExprKind::Binary(BinaryExpr {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            }),
            line,
        )
    }

    pub fn rvalue(lvalue: LValue, line: u32) -> Self {
        Expr::new(ExprKind::RValue(Box::new(lvalue)), line)
    }

    /// Value of a named variable.
    pub fn variable(name: &str, line: u32) -> Self {
        Expr::rvalue(LValue::variable(name, line), line)
    }

    pub fn assignment(lvalue: LValue, rvalue: Expr, line: u32) -> Self {
        Expr::new(
            ExprKind::Assignment(AssignmentExpr {
                lvalue: Box::new(lvalue),
                rvalue: Box::new(rvalue),
            }),
            line,
        )
    }

    pub fn address_of(lvalue: LValue, line: u32) -> Self {
        Expr::new(ExprKind::AddressOf(Box::new(lvalue)), line)
    }

    pub fn call(callee: Expr, arguments: Vec<Expr>, line: u32) -> Self {
        Expr::new(
            ExprKind::Call(CallExpr {
                callee: Some(Box::new(callee)),
                arguments,
            }),
            line,
        )
    }

    /// Call to the enclosing function.
    pub fn recursive_call(arguments: Vec<Expr>, line: u32) -> Self {
        Expr::new(
            ExprKind::Call(CallExpr {
                callee: None,
                arguments,
            }),
            line,
        )
    }

    pub fn function(
        arguments: Vec<DeclarationStmt>,
        output: Type,
        block: BlockStmt,
        line: u32,
    ) -> Self {
        let function = FunctionExpr {
            arguments,
            output,
            block,
        };
        let ty = function.function_type();
        Expr {
            kind: ExprKind::Function(function),
            ty,
            position: Position(line),
        }
    }

    pub fn read(line: u32) -> Self {
        Expr::new(ExprKind::Read, line)
    }

    pub fn stack_alloc(argument: Expr, line: u32) -> Self {
        Expr::new(ExprKind::StackAlloc(Box::new(argument)), line)
    }

    pub fn sizeof(argument: Expr, line: u32) -> Self {
        Expr::new(ExprKind::Sizeof(Box::new(argument)), line)
    }

    pub fn get_position(&self) -> Position {
        self.position
    }
}

/// L-Value Kinds
#[derive(Debug, Clone, PartialEq)]
pub enum LValueKind {
    Variable(String),
    Index(IndexLValue),
}

/// Addressable location.
#[derive(Debug, Clone, PartialEq)]
pub struct LValue {
    pub kind: LValueKind,
    pub ty: Type,
    pub position: Position,
}

impl LValue {
    pub fn variable(name: &str, line: u32) -> Self {
        LValue {
            kind: LValueKind::Variable(name.to_string()),
            ty: Type::Unspec,
            position: Position(line),
        }
    }

    pub fn index(base: Expr, index: Expr, line: u32) -> Self {
        LValue {
            kind: LValueKind::Index(IndexLValue {
                base: Box::new(base),
                index: Box::new(index),
            }),
            ty: Type::Unspec,
            position: Position(line),
        }
    }
}

/// Statement Kinds
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Expression evaluated for its side effects.
    Evaluation(Expr),
    Declaration(DeclarationStmt),
    Block(BlockStmt),
    If(IfStmt),
    IfElse(IfElseStmt),
    Loop(LoopStmt),
    Stop(u32),
    Next(u32),
    Return(Option<Expr>),
    Print(PrintStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub position: Position,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: u32) -> Self {
        Stmt {
            kind,
            position: Position(line),
        }
    }

    pub fn evaluation(argument: Expr, line: u32) -> Self {
        Stmt::new(StmtKind::Evaluation(argument), line)
    }

    pub fn declaration(declaration: DeclarationStmt) -> Self {
        let line = declaration.position.line();
        Stmt::new(StmtKind::Declaration(declaration), line)
    }

    pub fn block(block: BlockStmt) -> Self {
        let line = block.position.line();
        Stmt::new(StmtKind::Block(block), line)
    }

    pub fn if_then(condition: Expr, block: BlockStmt, line: u32) -> Self {
        Stmt::new(StmtKind::If(IfStmt { condition, block }), line)
    }

    pub fn if_else(condition: Expr, then_block: BlockStmt, else_block: BlockStmt, line: u32) -> Self {
        Stmt::new(
            StmtKind::IfElse(IfElseStmt {
                condition,
                then_block,
                else_block,
            }),
            line,
        )
    }

    pub fn loop_while(condition: Expr, body: Stmt, line: u32) -> Self {
        Stmt::new(
            StmtKind::Loop(LoopStmt {
                condition,
                body: Box::new(body),
            }),
            line,
        )
    }

    pub fn stop(level: u32, line: u32) -> Self {
        Stmt::new(StmtKind::Stop(level), line)
    }

    pub fn next(level: u32, line: u32) -> Self {
        Stmt::new(StmtKind::Next(level), line)
    }

    pub fn return_value(value: Option<Expr>, line: u32) -> Self {
        Stmt::new(StmtKind::Return(value), line)
    }

    pub fn print(arguments: Vec<Expr>, newline: bool, line: u32) -> Self {
        Stmt::new(StmtKind::Print(PrintStmt { arguments, newline }), line)
    }

    pub fn get_position(&self) -> Position {
        self.position
    }
}

/// Root of a compilation unit: global declarations and the optional entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub declarations: Vec<DeclarationStmt>,
    pub main: Option<BlockStmt>,
    pub position: Position,
}

impl Program {
    pub fn new(declarations: Vec<DeclarationStmt>, main: Option<BlockStmt>) -> Self {
        Program {
            declarations,
            main,
            position: Position(1),
        }
    }
}
