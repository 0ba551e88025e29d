//! Expression lowering: computes an expression tree into a caller-supplied
//! target variable, left operand first, without disturbing any variable
//! mentioned in the expression (other than the target itself).

use crate::ast::{BinOp, Expr, UnOp};
use crate::error::CompileError;
use crate::generator::Generator;
use crate::lower::stmt::inline_call;
use crate::lower::LowerCtx;
use crate::scope::ScopeChain;
use crate::var::Variable;

pub fn lower_expr<'a>(
    gen: &'a Generator,
    ctx: &mut LowerCtx<'a>,
    scopes: &ScopeChain<'a>,
    expr: &Expr,
    target: &Variable<'a>,
) -> Result<(), CompileError> {
    match expr {
        Expr::Literal(value) => {
            target.set(*value);
            Ok(())
        }
        Expr::Var(name) => {
            let source = scopes.lookup(name)?;
            target.copy_from(source);
            Ok(())
        }
        Expr::Call(call) => {
            let ret = inline_call(gen, ctx, scopes, call)?;
            target.copy_from(&ret);
            Ok(())
        }
        Expr::Paren(inner) => lower_expr(gen, ctx, scopes, inner, target),
        Expr::Unary(UnOp::Not, inner) => {
            lower_expr(gen, ctx, scopes, inner, target)?;
            target.bool_not(target);
            Ok(())
        }
        Expr::Binary(op, lhs, rhs) => lower_binary(gen, ctx, scopes, *op, lhs, rhs, target),
    }
}

fn lower_binary<'a>(
    gen: &'a Generator,
    ctx: &mut LowerCtx<'a>,
    scopes: &ScopeChain<'a>,
    op: BinOp,
    lhs: &Expr,
    rhs: &Expr,
    target: &Variable<'a>,
) -> Result<(), CompileError> {
    if matches!(op, BinOp::Or | BinOp::And) {
        if let Expr::Literal(k) = rhs {
            lower_expr(gen, ctx, scopes, lhs, target)?;
            apply_or_and_fold(op, *k, target);
            return Ok(());
        }
        if let Expr::Literal(k) = lhs {
            lower_expr(gen, ctx, scopes, rhs, target)?;
            apply_or_and_fold(op, *k, target);
            return Ok(());
        }
    }

    lower_expr(gen, ctx, scopes, lhs, target)?;

    if let Expr::Literal(k) = rhs {
        match op {
            BinOp::Add => {
                target.add_const(*k);
                return Ok(());
            }
            BinOp::Sub => {
                target.sub_const(*k);
                return Ok(());
            }
            _ => {}
        }
    }

    let scratch = gen.new_var(None, 0);
    lower_expr(gen, ctx, scopes, rhs, &scratch)?;
    apply_binop(op, target, &scratch);
    Ok(())
}

/// `x || 0 = x`; `x || k(k != 0) = 1`; `x && 0 = 0`; `x && k(k != 0) = x`.
fn apply_or_and_fold(op: BinOp, literal: u32, target: &Variable) {
    match (op, literal) {
        (BinOp::Or, 0) => {}
        (BinOp::Or, _) => target.set(1),
        (BinOp::And, 0) => target.set(0),
        (BinOp::And, _) => {}
        _ => unreachable!("only Or/And reach apply_or_and_fold"),
    }
}

fn apply_binop(op: BinOp, target: &Variable, scratch: &Variable) {
    match op {
        BinOp::Or => target.bool_or(scratch),
        BinOp::And => target.bool_and(scratch),
        BinOp::Eq => target.equal(scratch),
        BinOp::Neq => target.not_equal(scratch),
        BinOp::Lt => target.lower_than(scratch),
        BinOp::Leq => target.lower_equal(scratch),
        BinOp::Gt => target.greater_than(scratch),
        BinOp::Geq => target.greater_equal(scratch),
        BinOp::Add => target.add_from(scratch),
        BinOp::Sub => target.sub_from(scratch),
        BinOp::Mul => target.multiply_from(scratch),
    }
}
