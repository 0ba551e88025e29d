//! Statement lowering: translates one AST statement at a time into
//! generator calls, threading the active return-value variable down so
//! that `return` can write into it.

use crate::ast::{Call, Stmt};
use crate::error::{CompileError, SemanticError};
use crate::generator::Generator;
use crate::lower::expr::lower_expr;
use crate::lower::{validate_name, LowerCtx};
use crate::scope::ScopeChain;
use crate::var::Variable;

pub fn lower_stmt<'a>(
    gen: &'a Generator,
    ctx: &mut LowerCtx<'a>,
    scopes: &mut ScopeChain<'a>,
    stmt: &Stmt,
    ret: &Variable<'a>,
) -> Result<(), CompileError> {
    match stmt {
        Stmt::Call(call) => {
            inline_call(gen, ctx, scopes, call)?;
            Ok(())
        }
        Stmt::Decl { name, init } => {
            validate_name(name)?;
            let var = gen.new_var(Some(name.clone()), 0);
            lower_expr(gen, ctx, scopes, init, &var)?;
            scopes.declare(name, var)?;
            Ok(())
        }
        Stmt::Assign { name, value } => {
            // Reborrow immutably: `lookup` and the recursive `lower_expr`
            // call both only read the scope chain, so they can share one
            // borrow instead of needing exclusive access in turn.
            let shared: &ScopeChain<'a> = scopes;
            let target = shared.lookup(name)?;
            lower_expr(gen, ctx, shared, value, target)
        }
        Stmt::PrintExpr(expr) => {
            let scratch = gen.new_var(None, 0);
            lower_expr(gen, ctx, scopes, expr, &scratch)?;
            scratch.write_output();
            Ok(())
        }
        Stmt::PrintText(text) => {
            gen.print_text(text);
            Ok(())
        }
        Stmt::Scan(name) => {
            let var = scopes.lookup(name)?;
            var.read_input();
            Ok(())
        }
        Stmt::Return(expr) => lower_expr(gen, ctx, scopes, expr, ret),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            let cond_var = gen.new_var(None, 0);
            lower_expr(gen, ctx, scopes, cond, &cond_var)?;
            gen.if_begin(&cond_var);
            lower_in_fresh_scope(gen, ctx, scopes, then_branch, ret)?;
            if let Some(else_branch) = else_branch {
                gen.else_begin();
                lower_in_fresh_scope(gen, ctx, scopes, else_branch, ret)?;
            }
            gen.if_end();
            Ok(())
        }
        Stmt::While { cond, body } => {
            let cond_var = gen.new_var(None, 0);
            lower_expr(gen, ctx, scopes, cond, &cond_var)?;
            gen.while_begin(&cond_var);
            lower_in_fresh_scope(gen, ctx, scopes, body, ret)?;
            lower_expr(gen, ctx, scopes, cond, &cond_var)?;
            gen.while_end(&cond_var);
            Ok(())
        }
        Stmt::For {
            init,
            cond,
            post,
            body,
        } => {
            scopes.push();
            let result = (|| -> Result<(), CompileError> {
                if let Some(init) = init {
                    lower_stmt(gen, ctx, scopes, init, ret)?;
                }
                let cond_var = gen.new_var(None, 0);
                refresh_for_condition(gen, ctx, scopes, cond, &cond_var)?;
                gen.while_begin(&cond_var);
                lower_in_fresh_scope(gen, ctx, scopes, body, ret)?;
                if let Some(post) = post {
                    lower_stmt(gen, ctx, scopes, post, ret)?;
                }
                refresh_for_condition(gen, ctx, scopes, cond, &cond_var)?;
                gen.while_end(&cond_var);
                Ok(())
            })();
            scopes.pop();
            result
        }
        Stmt::Block(stmts) => {
            scopes.push();
            let result = (|| -> Result<(), CompileError> {
                for stmt in stmts {
                    lower_stmt(gen, ctx, scopes, stmt, ret)?;
                }
                Ok(())
            })();
            scopes.pop();
            result
        }
    }
}

/// Lowers `stmt` in a scope pushed just for it, popped again on the way out
/// whether or not lowering succeeded. Used for if/else arms and loop bodies,
/// which each get a fresh scope independent of whether the body happens to
/// be a `{ ... }` block.
fn lower_in_fresh_scope<'a>(
    gen: &'a Generator,
    ctx: &mut LowerCtx<'a>,
    scopes: &mut ScopeChain<'a>,
    stmt: &crate::ast::Stmt,
    ret: &Variable<'a>,
) -> Result<(), CompileError> {
    scopes.push();
    let result = lower_stmt(gen, ctx, scopes, stmt, ret);
    scopes.pop();
    result
}

fn refresh_for_condition<'a>(
    gen: &'a Generator,
    ctx: &mut LowerCtx<'a>,
    scopes: &mut ScopeChain<'a>,
    cond: &Option<crate::ast::Expr>,
    cond_var: &Variable<'a>,
) -> Result<(), CompileError> {
    match cond {
        Some(expr) => lower_expr(gen, ctx, scopes, expr, cond_var),
        None => {
            cond_var.set(1);
            Ok(())
        }
    }
}

/// Inlines a call: resolves the callee, checks arity and recursion, lowers
/// each argument against the *caller's* scope into a fresh parameter
/// variable, then lowers the callee's body in a single fresh scope holding
/// just those parameters. Returns the callee's return-value variable.
pub(crate) fn inline_call<'a>(
    gen: &'a Generator,
    ctx: &mut LowerCtx<'a>,
    scopes: &ScopeChain<'a>,
    call: &Call,
) -> Result<Variable<'a>, CompileError> {
    let function = ctx.resolve(&call.name)?;
    if function.parameters.len() != call.args.len() {
        return Err(SemanticError::WrongArity {
            function: call.name.clone(),
            expected: function.parameters.len(),
            found: call.args.len(),
        }
        .into());
    }

    let mut callee_scopes = ScopeChain::new();
    for (param, arg) in function.parameters.iter().zip(&call.args) {
        validate_name(param)?;
        let arg_var = gen.new_var(Some(format!("_arg_{param}")), 0);
        lower_expr(gen, ctx, scopes, arg, &arg_var)?;
        callee_scopes
            .declare(param, arg_var)
            .map_err(|_| SemanticError::DuplicateParameter {
                function: call.name.clone(),
                parameter: param.clone(),
            })?;
    }

    ctx.enter_call(&call.name)?;
    let ret = gen.new_var(Some(format!("_ret_{}", call.name)), 0);
    let body_result = (|| -> Result<(), CompileError> {
        for stmt in &function.body {
            lower_stmt(gen, ctx, &mut callee_scopes, stmt, &ret)?;
        }
        Ok(())
    })();
    ctx.exit_call();
    body_result?;
    Ok(ret)
}
