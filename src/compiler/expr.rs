use crate::{
    ast::{
        ast::{Expr, ExprKind, LValue, LValueKind},
        expressions::{BinaryExpr, BinaryOperator, CallExpr, UnaryOperator},
        types::Type,
    },
    errors::errors::ErrorImpl,
    symbols::symbols::Qualifier,
    type_checker::type_checker::{enclosing_frame_access, FUNCTION_SYMBOL},
    CHECK_TYPES, THROW_ERROR,
};

use super::{
    compiler::{gen_function, Compiler, READ_DOUBLE, READ_INT},
    postfix::Instruction,
};

pub fn gen_expression(compiler: &mut Compiler, expr: &mut Expr) {
    CHECK_TYPES!(compiler, |checker| checker.check_expr(expr));
    let in_function = compiler.in_function();

    match &mut expr.kind {
        ExprKind::Integer(value) => compiler.emit(if in_function {
            Instruction::Int(*value)
        } else {
            Instruction::SInt(*value)
        }),
        ExprKind::Double(value) => compiler.emit(if in_function {
            Instruction::Double(*value)
        } else {
            Instruction::SDouble(*value)
        }),
        ExprKind::String(value) => {
            let label = gen_string_literal(compiler, value);
            if in_function {
                compiler.resume_segment();
                compiler.emit(Instruction::Addr(label));
            } else {
                compiler.emit(Instruction::Data);
                compiler.emit(Instruction::SAddr(label));
            }
        }
        ExprKind::Nullptr => compiler.emit(if in_function {
            Instruction::Int(0)
        } else {
            Instruction::SInt(0)
        }),
        ExprKind::Unary(unary) => {
            gen_expression(compiler, &mut unary.argument);
            match unary.operator {
                UnaryOperator::Negation => compiler.emit(Instruction::Neg),
                UnaryOperator::Identity => {}
                UnaryOperator::Not => {
                    compiler.emit(Instruction::Int(0));
                    compiler.emit(Instruction::Eq);
                }
            }
        }
        ExprKind::Binary(binary) => gen_binary(compiler, binary, &expr.ty),
        ExprKind::RValue(lvalue) => {
            if let Some(name) = external_function(compiler, lvalue) {
                compiler.emit(Instruction::Addr(name));
                return;
            }

            gen_lvalue(compiler, lvalue);
            compiler.emit(if lvalue.ty.is_double() {
                Instruction::LdDouble
            } else {
                Instruction::LdInt
            });
        }
        ExprKind::Assignment(assignment) => {
            gen_expression(compiler, &mut assignment.rvalue);

            if assignment.lvalue.ty.is_double() {
                if assignment.rvalue.ty.is_int() {
                    compiler.emit(Instruction::I2D);
                }
                compiler.emit(Instruction::Dup64);
            } else {
                compiler.emit(Instruction::Dup32);
            }

            gen_lvalue(compiler, &mut assignment.lvalue);
            compiler.emit(if assignment.lvalue.ty.is_double() {
                Instruction::StDouble
            } else {
                Instruction::StInt
            });
        }
        ExprKind::AddressOf(lvalue) => gen_lvalue(compiler, lvalue),
        ExprKind::Call(call) => gen_call(compiler, call, &expr.ty),
        ExprKind::Function(function) => {
            let label = gen_function(compiler, function);
            compiler.resume_segment();
            compiler.emit(if in_function {
                Instruction::Addr(label)
            } else {
                Instruction::SAddr(label)
            });
        }
        ExprKind::Read => match expr.ty {
            Type::Int => {
                compiler.call_intrinsic(READ_INT);
                compiler.emit(Instruction::LdFVal32);
            }
            Type::Double => {
                compiler.call_intrinsic(READ_DOUBLE);
                compiler.emit(Instruction::LdFVal64);
            }
            _ => THROW_ERROR!(
                compiler,
                ErrorImpl::CannotRead {
                    type_: expr.ty.to_string(),
                },
                expr.position
            ),
        },
        ExprKind::StackAlloc(argument) => {
            gen_expression(compiler, argument);
            compiler.emit(Instruction::Int(expr.ty.pointee_stride() as i32));
            compiler.emit(Instruction::Mul);
            compiler.emit(Instruction::Alloc);
            compiler.emit(Instruction::Sp);
        }
        ExprKind::Sizeof(argument) => {
            let size = argument.ty.size() as i32;
            compiler.emit(if in_function {
                Instruction::Int(size)
            } else {
                Instruction::SInt(size)
            });
        }
    }
}

/// Places a string in read-only data.
///
/// # Returns
///
/// The label of the string.
pub fn gen_string_literal(compiler: &mut Compiler, value: &str) -> String {
    let label = compiler.mklbl();
    compiler.emit(Instruction::Rodata);
    compiler.emit(Instruction::Align);
    compiler.emit(Instruction::Label(label.clone()));
    compiler.emit(Instruction::SString(value.to_string()));
    label
}

/// Pushes the address of an l-value.
pub fn gen_lvalue(compiler: &mut Compiler, lvalue: &mut LValue) {
    CHECK_TYPES!(compiler, |checker| checker.check_lvalue(lvalue));

    match &mut lvalue.kind {
        LValueKind::Variable(name) => {
            let frame = compiler.symtab.frame();
            let storage = compiler
                .symtab
                .lookup(name)
                .map(|symbol| (symbol.is_global(), symbol.frame, symbol.offset));

            match storage {
                Some((true, _, _)) => compiler.emit(Instruction::Addr(name.clone())),
                Some((false, owner, offset)) if owner == frame => {
                    compiler.emit(Instruction::Local(offset))
                }
                Some(_) => THROW_ERROR!(compiler, enclosing_frame_access(name), lvalue.position),
                None => THROW_ERROR!(
                    compiler,
                    ErrorImpl::VariableNotDeclared {
                        variable: name.clone(),
                    },
                    lvalue.position
                ),
            }
        }
        LValueKind::Index(index) => {
            gen_expression(compiler, &mut index.base);
            gen_expression(compiler, &mut index.index);
            compiler.emit(Instruction::Int(index.base.ty.pointee_stride() as i32));
            compiler.emit(Instruction::Mul);
            compiler.emit(Instruction::Add);
        }
    }
}

/// Name of the external function an l-value refers to, if any.
///
/// External functions are code symbols rather than variables holding an address.
fn external_function(compiler: &Compiler, lvalue: &LValue) -> Option<String> {
    let LValueKind::Variable(name) = &lvalue.kind else {
        return None;
    };
    let symbol = compiler.symtab.lookup(name)?;

    (symbol.qualifier == Qualifier::External && symbol.ty.is_functional()).then(|| name.clone())
}

fn gen_binary(compiler: &mut Compiler, binary: &mut BinaryExpr, ty: &Type) {
    match binary.operator {
        BinaryOperator::And | BinaryOperator::Or => {
            let end = compiler.mklbl();

            gen_expression(compiler, &mut binary.left);
            compiler.emit(Instruction::Dup32);
            if binary.operator == BinaryOperator::And {
                compiler.emit(Instruction::Jz(end.clone()));
            } else {
                compiler.emit(Instruction::Jnz(end.clone()));
            }
            gen_expression(compiler, &mut binary.right);
            compiler.emit(if binary.operator == BinaryOperator::And {
                Instruction::And
            } else {
                Instruction::Or
            });
            compiler.emit(Instruction::Align);
            compiler.emit(Instruction::Label(end));
        }
        operator if operator.is_arithmetic() => gen_arithmetic(compiler, binary, ty),
        operator => {
            gen_expression(compiler, &mut binary.left);
            gen_expression(compiler, &mut binary.right);
            compiler.emit(match operator {
                BinaryOperator::Mod => Instruction::Mod,
                BinaryOperator::Lt => Instruction::Lt,
                BinaryOperator::Le => Instruction::Le,
                BinaryOperator::Gt => Instruction::Gt,
                BinaryOperator::Ge => Instruction::Ge,
                BinaryOperator::Eq => Instruction::Eq,
                _ => Instruction::Ne,
            });
        }
    }
}

/// Emits one operand of `+ - * /`, converted to the representation of the result.
fn gen_arithmetic_operand(compiler: &mut Compiler, operand: &mut Expr, ty: &Type) {
    gen_expression(compiler, operand);

    if ty.is_double() && operand.ty.is_int() {
        compiler.emit(Instruction::I2D);
    } else if ty.is_pointer() && operand.ty.is_int() {
        compiler.emit(Instruction::Int(ty.pointee_stride() as i32));
        compiler.emit(Instruction::Mul);
    }
}

fn gen_arithmetic(compiler: &mut Compiler, binary: &mut BinaryExpr, ty: &Type) {
    gen_arithmetic_operand(compiler, &mut binary.left, ty);
    gen_arithmetic_operand(compiler, &mut binary.right, ty);

    let double = ty.is_double();
    compiler.emit(match (binary.operator, double) {
        (BinaryOperator::Add, false) => Instruction::Add,
        (BinaryOperator::Add, true) => Instruction::DAdd,
        (BinaryOperator::Sub, false) => Instruction::Sub,
        (BinaryOperator::Sub, true) => Instruction::DSub,
        (BinaryOperator::Mul, false) => Instruction::Mul,
        (BinaryOperator::Mul, true) => Instruction::DMul,
        (_, false) => Instruction::Div,
        (_, true) => Instruction::DDiv,
    });

    // pointer - pointer counts elements
    if binary.operator == BinaryOperator::Sub
        && binary.right.ty.is_pointer()
        && matches!(binary.left.ty.referenced(), Some(referenced) if !referenced.is_void())
    {
        compiler.emit(Instruction::Int(binary.left.ty.pointee_stride() as i32));
        compiler.emit(Instruction::Div);
    }
}

fn gen_call(compiler: &mut Compiler, call: &mut CallExpr, ty: &Type) {
    let function_type = match &call.callee {
        Some(callee) => Some(callee.ty.clone()),
        None => compiler
            .symtab
            .lookup(FUNCTION_SYMBOL)
            .map(|function| function.ty.clone()),
    };
    let inputs = function_type
        .as_ref()
        .and_then(Type::inputs)
        .map(<[Type]>::to_vec)
        .unwrap_or_default();

    let mut arguments_size = 0;
    for (index, argument) in call.arguments.iter_mut().enumerate().rev() {
        gen_expression(compiler, argument);
        arguments_size += argument.ty.size();

        if matches!(inputs.get(index), Some(Type::Double)) && argument.ty.is_int() {
            compiler.emit(Instruction::I2D);
            arguments_size += Type::Double.size() - Type::Int.size();
        }
    }

    match &mut call.callee {
        Some(callee) => {
            let external = match &callee.kind {
                ExprKind::RValue(lvalue) => external_function(compiler, lvalue),
                _ => None,
            };
            match external {
                Some(name) => compiler.emit(Instruction::Call(name)),
                None => {
                    gen_expression(compiler, callee);
                    compiler.emit(Instruction::Branch);
                }
            }
        }
        None => {
            let Some(label) = compiler.function_labels.last().cloned() else {
                return;
            };
            compiler.emit(Instruction::Addr(label));
            compiler.emit(Instruction::Branch);
        }
    }

    if arguments_size > 0 {
        compiler.emit(Instruction::Trash(arguments_size));
    }

    if ty.is_double() {
        compiler.emit(Instruction::LdFVal64);
    } else if !ty.is_void() {
        compiler.emit(Instruction::LdFVal32);
    }
}
