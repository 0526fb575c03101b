use crate::{
    ast::{
        ast::{Expr, ExprKind, Stmt, StmtKind},
        expressions::UnaryOperator,
        statements::{BlockStmt, DeclarationStmt, PrintStmt},
        types::Type,
    },
    errors::errors::ErrorImpl,
    symbols::symbols::Qualifier,
    type_checker::type_checker::FUNCTION_SYMBOL,
    Position, CHECK_TYPES, THROW_ERROR,
};

use super::{
    compiler::{
        gen_function, Compiler, PRINT_DOUBLE, PRINT_INT, PRINT_NEWLINE, PRINT_STRING,
    },
    expr::{gen_expression, gen_string_literal},
    postfix::{Instruction, SymbolKind},
};

pub fn gen_statement(compiler: &mut Compiler, statement: &mut Stmt) {
    let position = statement.position;

    match &mut statement.kind {
        StmtKind::Evaluation(argument) => {
            CHECK_TYPES!(compiler, |checker| checker.check_evaluation(argument));
            gen_expression(compiler, argument);

            let size = argument.ty.size();
            if size > 0 {
                compiler.emit(Instruction::Trash(size));
            }
        }
        StmtKind::Declaration(declaration) => gen_declaration(compiler, declaration),
        StmtKind::Block(block) => gen_block(compiler, block),
        StmtKind::If(if_stmt) => {
            CHECK_TYPES!(compiler, |checker| checker
                .check_condition(&mut if_stmt.condition, "if"));

            let end = compiler.mklbl();
            gen_expression(compiler, &mut if_stmt.condition);
            compiler.emit(Instruction::Jz(end.clone()));
            gen_block(compiler, &mut if_stmt.block);
            compiler.emit(Instruction::Label(end));
        }
        StmtKind::IfElse(if_else) => {
            CHECK_TYPES!(compiler, |checker| checker
                .check_condition(&mut if_else.condition, "if"));

            let otherwise = compiler.mklbl();
            let end = compiler.mklbl();
            gen_expression(compiler, &mut if_else.condition);
            compiler.emit(Instruction::Jz(otherwise.clone()));
            gen_block(compiler, &mut if_else.then_block);
            compiler.emit(Instruction::Jmp(end.clone()));
            compiler.emit(Instruction::Label(otherwise));
            gen_block(compiler, &mut if_else.else_block);
            compiler.emit(Instruction::Label(end));
        }
        StmtKind::Loop(loop_stmt) => {
            CHECK_TYPES!(compiler, |checker| checker
                .check_condition(&mut loop_stmt.condition, "loop"));

            let start = compiler.mklbl();
            let end = compiler.mklbl();
            compiler.loop_labels.push((start.clone(), end.clone()));
            compiler.symtab.push();

            compiler.emit(Instruction::Label(start.clone()));
            gen_expression(compiler, &mut loop_stmt.condition);
            compiler.emit(Instruction::Jz(end.clone()));
            gen_statement(compiler, &mut loop_stmt.body);
            compiler.emit(Instruction::Jmp(start));
            compiler.emit(Instruction::Label(end));

            compiler.symtab.pop();
            compiler.loop_labels.pop();
        }
        StmtKind::Stop(level) => gen_loop_jump(compiler, LoopJump::Stop, *level, position),
        StmtKind::Next(level) => gen_loop_jump(compiler, LoopJump::Next, *level, position),
        StmtKind::Return(value) => {
            CHECK_TYPES!(compiler, |checker| checker.check_return(value.as_mut(), position));
            gen_return(compiler, value.as_mut(), position);
        }
        StmtKind::Print(print) => gen_print(compiler, print),
    }
}

pub fn gen_block(compiler: &mut Compiler, block: &mut BlockStmt) {
    compiler.symtab.push();

    for declaration in &mut block.declarations {
        gen_declaration(compiler, declaration);
    }
    for instruction in &mut block.instructions {
        gen_statement(compiler, instruction);
    }

    compiler.symtab.pop();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopJump {
    /// Leaves the loop
    Stop,
    /// Restarts the loop
    Next,
}

impl LoopJump {
    fn keyword(self) -> &'static str {
        match self {
            LoopJump::Stop => "stop",
            LoopJump::Next => "next",
        }
    }
}

/// `stop`/`next` jump to the end/start of the `level`-th enclosing loop.
fn gen_loop_jump(compiler: &mut Compiler, jump: LoopJump, level: u32, position: Position) {
    let loops = compiler.loop_labels.len();
    if loops == 0 {
        THROW_ERROR!(
            compiler,
            ErrorImpl::InstructionOutsideLoop {
                instruction: jump.keyword().to_string(),
            },
            position
        );
    }

    let depth = level as usize;
    if depth == 0 || depth > loops {
        THROW_ERROR!(
            compiler,
            ErrorImpl::InvalidLoopLevel {
                instruction: jump.keyword().to_string(),
                level,
            },
            position
        );
    }

    let (start, end) = &compiler.loop_labels[loops - depth];
    let target = match jump {
        LoopJump::Stop => end.clone(),
        LoopJump::Next => start.clone(),
    };
    compiler.emit(Instruction::Jmp(target));
}

fn gen_return(compiler: &mut Compiler, value: Option<&mut Expr>, position: Position) {
    let output = compiler
        .symtab
        .lookup(FUNCTION_SYMBOL)
        .and_then(|function| function.ty.output().cloned())
        .unwrap_or(Type::Void);

    if let Some(value) = value {
        if !output.is_void() {
            gen_expression(compiler, value);

            if output.is_double() {
                if value.ty.is_int() {
                    compiler.emit(Instruction::I2D);
                }
                compiler.emit(Instruction::StFVal64);
            } else {
                compiler.emit(Instruction::StFVal32);
            }
        }
    }

    match compiler.return_labels.last().cloned() {
        Some(return_label) => compiler.emit(Instruction::Jmp(return_label)),
        None => THROW_ERROR!(compiler, ErrorImpl::ReturnOutsideFunction, position),
    }
}

fn gen_print(compiler: &mut Compiler, print: &mut PrintStmt) {
    CHECK_TYPES!(compiler, |checker| checker.check_print(print));

    for argument in &mut print.arguments {
        gen_expression(compiler, argument);

        let (intrinsic, size) = match argument.ty {
            Type::Int => (PRINT_INT, 4),
            Type::String => (PRINT_STRING, 4),
            Type::Double => (PRINT_DOUBLE, 8),
            _ => THROW_ERROR!(
                compiler,
                ErrorImpl::InvalidPrintArgument {
                    received: argument.ty.to_string(),
                },
                argument.position
            ),
        };
        compiler.call_intrinsic(intrinsic);
        compiler.emit(Instruction::Trash(size));
    }

    if print.newline {
        compiler.call_intrinsic(PRINT_NEWLINE);
    }
}

/// Registers a declaration and assigns its storage.
///
/// Parameters only receive an offset above the frame pointer, locals are
/// carved below it and initialised in place, globals get static storage.
pub fn gen_declaration(compiler: &mut Compiler, declaration: &mut DeclarationStmt) {
    CHECK_TYPES!(compiler, |checker| checker.check_declaration(declaration));
    let Some(symbol) = compiler.new_symbol.take() else {
        return;
    };
    let size = declaration.ty.size() as i32;

    if compiler.declaring_arguments {
        compiler.symtab.get_mut(symbol).offset = compiler.offset;
        compiler.offset += size;
        return;
    }

    if !compiler.in_function() {
        compiler.symtab.get_mut(symbol).offset = 0;
        gen_global_declaration(compiler, declaration);
        return;
    }

    compiler.offset -= size;
    compiler.symtab.get_mut(symbol).offset = compiler.offset;
    let offset = compiler.offset;

    let Some(initializer) = &mut declaration.initializer else {
        return;
    };
    if matches!(declaration.ty, Type::Void | Type::Unspec) {
        THROW_ERROR!(
            compiler,
            ErrorImpl::FailedInitialization {
                variable: declaration.identifier.clone(),
            },
            declaration.position
        );
    }

    gen_expression(compiler, initializer);
    if declaration.ty.is_double() {
        if initializer.ty.is_int() {
            compiler.emit(Instruction::I2D);
        }
        compiler.emit(Instruction::Local(offset));
        compiler.emit(Instruction::StDouble);
    } else {
        compiler.emit(Instruction::Local(offset));
        compiler.emit(Instruction::StInt);
    }
}

fn gen_global_declaration(compiler: &mut Compiler, declaration: &mut DeclarationStmt) {
    let name = declaration.identifier.clone();

    match declaration.qualifier {
        Qualifier::External => {
            compiler.emit(Instruction::Extern(name));
            return;
        }
        Qualifier::Forward => return,
        Qualifier::Public => compiler.emit(Instruction::Global(name.clone(), SymbolKind::Object)),
        Qualifier::Private => {}
    }

    match &mut declaration.initializer {
        None => {
            compiler.emit(Instruction::Bss);
            compiler.emit(Instruction::Align);
            compiler.emit(Instruction::Label(name));
            compiler.emit(Instruction::SAlloc(declaration.ty.size()));
        }
        Some(initializer) => gen_global_initializer(compiler, &name, &declaration.ty, initializer),
    }
}

/// Emits the constant data of an initialised global.
fn gen_global_initializer(compiler: &mut Compiler, name: &str, ty: &Type, initializer: &mut Expr) {
    let data = match numeric_constant(initializer, ty) {
        Some(data) => data,
        None => match &mut initializer.kind {
            ExprKind::Nullptr => Instruction::SInt(0),
            ExprKind::Sizeof(argument) => Instruction::SInt(argument.ty.size() as i32),
            ExprKind::String(value) => Instruction::SAddr(gen_string_literal(compiler, value)),
            ExprKind::Function(function) => Instruction::SAddr(gen_function(compiler, function)),
            _ => THROW_ERROR!(
                compiler,
                ErrorImpl::UnsupportedConstruct {
                    construct: format!("non-constant initializer of global '{}'", name),
                },
                initializer.position
            ),
        },
    };

    compiler.emit(Instruction::Data);
    compiler.emit(Instruction::Align);
    compiler.emit(Instruction::Label(name.to_string()));
    compiler.emit(data);
}

/// Static data for a numeric literal, with any leading `-`/`+` folded in.
fn numeric_constant(expr: &Expr, ty: &Type) -> Option<Instruction> {
    match &expr.kind {
        ExprKind::Integer(value) if ty.is_double() => Some(Instruction::SDouble(f64::from(*value))),
        ExprKind::Integer(value) => Some(Instruction::SInt(*value)),
        ExprKind::Double(value) => Some(Instruction::SDouble(*value)),
        ExprKind::Unary(unary) => match (unary.operator, numeric_constant(&unary.argument, ty)?) {
            (UnaryOperator::Identity, data) => Some(data),
            (UnaryOperator::Negation, Instruction::SInt(value)) => {
                Some(Instruction::SInt(value.wrapping_neg()))
            }
            (UnaryOperator::Negation, Instruction::SDouble(value)) => {
                Some(Instruction::SDouble(-value))
            }
            _ => None,
        },
        _ => None,
    }
}
