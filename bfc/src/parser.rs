//! Recursive-descent parser with precedence climbing for binary operators.
//!
//! Trees come out already left-associated at each precedence level (`a - b
//! - c` parses as `(a - b) - c`) without any post-hoc rotation pass: the
//! climbing loop folds left as it goes.

use crate::ast::{BinOp, Call, Expr, Function, Program, Stmt, UnOp};
use crate::error::ParseError;
use crate::token::{Lexer, SpannedTok, Tok};

pub fn parse(source: &str) -> Result<Program, ParseError> {
    let tokens = Lexer::new(source).tokenize()?;
    Parser::new(tokens).parse_program()
}

struct Parser {
    toks: Vec<SpannedTok>,
    pos: usize,
}

impl Parser {
    fn new(toks: Vec<SpannedTok>) -> Self {
        Parser { toks, pos: 0 }
    }

    fn peek(&self) -> &Tok {
        &self.toks[self.pos].tok
    }

    fn here(&self) -> (usize, usize) {
        (self.toks[self.pos].line, self.toks[self.pos].column)
    }

    fn bump(&mut self) -> Tok {
        let tok = self.toks[self.pos].tok.clone();
        if self.pos + 1 < self.toks.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Tok, what: &str) -> Result<(), ParseError> {
        if self.peek() == expected {
            self.bump();
            Ok(())
        } else {
            let (line, column) = self.here();
            Err(ParseError {
                line,
                column,
                expected: what.to_string(),
            })
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek().clone() {
            Tok::Ident(name) => {
                self.bump();
                Ok(name)
            }
            _ => {
                let (line, column) = self.here();
                Err(ParseError {
                    line,
                    column,
                    expected: what.to_string(),
                })
            }
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut functions = Vec::new();
        while *self.peek() != Tok::Eof {
            functions.push(self.parse_function()?);
        }
        Ok(Program { functions })
    }

    fn parse_function(&mut self) -> Result<Function, ParseError> {
        self.expect(&Tok::Function, "'function'")?;
        let name = self.expect_ident("a function name")?;
        self.expect(&Tok::LParen, "'('")?;
        let mut parameters = Vec::new();
        if *self.peek() != Tok::RParen {
            loop {
                parameters.push(self.expect_ident("a parameter name")?);
                if *self.peek() == Tok::Comma {
                    self.bump();
                    continue;
                }
                break;
            }
        }
        self.expect(&Tok::RParen, "')'")?;
        self.expect(&Tok::LBrace, "'{'")?;
        let mut body = Vec::new();
        while *self.peek() != Tok::RBrace {
            body.push(self.parse_stmt()?);
        }
        self.expect(&Tok::RBrace, "'}'")?;
        Ok(Function {
            name,
            parameters,
            body,
        })
    }

    fn parse_block_or_stmt(&mut self) -> Result<Stmt, ParseError> {
        if *self.peek() == Tok::LBrace {
            self.bump();
            let mut stmts = Vec::new();
            while *self.peek() != Tok::RBrace {
                stmts.push(self.parse_stmt()?);
            }
            self.expect(&Tok::RBrace, "'}'")?;
            Ok(Stmt::Block(stmts))
        } else {
            self.parse_stmt()
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek().clone() {
            Tok::LBrace => self.parse_block_or_stmt(),
            Tok::Var => {
                self.bump();
                let name = self.expect_ident("a variable name")?;
                let init = if *self.peek() == Tok::Assign {
                    self.bump();
                    self.parse_expr()?
                } else {
                    Expr::Literal(0)
                };
                self.expect(&Tok::Semi, "';'")?;
                Ok(Stmt::Decl { name, init })
            }
            Tok::Print => {
                self.bump();
                if let Tok::Str(text) = self.peek().clone() {
                    self.bump();
                    self.expect(&Tok::Semi, "';'")?;
                    Ok(Stmt::PrintText(unescape(&text)?))
                } else {
                    let expr = self.parse_expr()?;
                    self.expect(&Tok::Semi, "';'")?;
                    Ok(Stmt::PrintExpr(expr))
                }
            }
            Tok::Scan => {
                self.bump();
                let name = self.expect_ident("a variable name")?;
                self.expect(&Tok::Semi, "';'")?;
                Ok(Stmt::Scan(name))
            }
            Tok::Return => {
                self.bump();
                let expr = self.parse_expr()?;
                self.expect(&Tok::Semi, "';'")?;
                Ok(Stmt::Return(expr))
            }
            Tok::If => {
                self.bump();
                self.expect(&Tok::LParen, "'('")?;
                let cond = self.parse_expr()?;
                self.expect(&Tok::RParen, "')'")?;
                let then_branch = Box::new(self.parse_block_or_stmt()?);
                let else_branch = if *self.peek() == Tok::Else {
                    self.bump();
                    Some(Box::new(self.parse_block_or_stmt()?))
                } else {
                    None
                };
                Ok(Stmt::If {
                    cond,
                    then_branch,
                    else_branch,
                })
            }
            Tok::While => {
                self.bump();
                self.expect(&Tok::LParen, "'('")?;
                let cond = self.parse_expr()?;
                self.expect(&Tok::RParen, "')'")?;
                let body = Box::new(self.parse_block_or_stmt()?);
                Ok(Stmt::While { cond, body })
            }
            Tok::For => {
                self.bump();
                self.expect(&Tok::LParen, "'('")?;
                let init = if *self.peek() == Tok::Semi {
                    None
                } else {
                    Some(Box::new(self.parse_for_clause()?))
                };
                self.expect(&Tok::Semi, "';'")?;
                let cond = if *self.peek() == Tok::Semi {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(&Tok::Semi, "';'")?;
                let post = if *self.peek() == Tok::RParen {
                    None
                } else {
                    Some(Box::new(self.parse_for_clause()?))
                };
                self.expect(&Tok::RParen, "')'")?;
                let body = Box::new(self.parse_block_or_stmt()?);
                Ok(Stmt::For {
                    init,
                    cond,
                    post,
                    body,
                })
            }
            Tok::Ident(name) => {
                // Either an assignment or a call statement; both require
                // one token of lookahead past the identifier.
                if self.toks.get(self.pos + 1).map(|t| &t.tok) == Some(&Tok::LParen) {
                    let call = self.parse_call(name)?;
                    self.expect(&Tok::Semi, "';'")?;
                    Ok(Stmt::Call(call))
                } else {
                    self.bump();
                    self.expect(&Tok::Assign, "'='")?;
                    let value = self.parse_expr()?;
                    self.expect(&Tok::Semi, "';'")?;
                    Ok(Stmt::Assign { name, value })
                }
            }
            _ => {
                let (line, column) = self.here();
                Err(ParseError {
                    line,
                    column,
                    expected: "a statement".to_string(),
                })
            }
        }
    }

    /// init/post clauses of a `for` loop: a declaration or an assignment,
    /// without the trailing `;` (the caller owns the loop's own separators).
    fn parse_for_clause(&mut self) -> Result<Stmt, ParseError> {
        match self.peek().clone() {
            Tok::Var => {
                self.bump();
                let name = self.expect_ident("a variable name")?;
                let init = if *self.peek() == Tok::Assign {
                    self.bump();
                    self.parse_expr()?
                } else {
                    Expr::Literal(0)
                };
                Ok(Stmt::Decl { name, init })
            }
            Tok::Ident(name) => {
                self.bump();
                self.expect(&Tok::Assign, "'='")?;
                let value = self.parse_expr()?;
                Ok(Stmt::Assign { name, value })
            }
            _ => {
                let (line, column) = self.here();
                Err(ParseError {
                    line,
                    column,
                    expected: "a for-loop clause".to_string(),
                })
            }
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Call, ParseError> {
        self.bump(); // identifier
        self.expect(&Tok::LParen, "'('")?;
        let mut args = Vec::new();
        if *self.peek() != Tok::RParen {
            loop {
                args.push(self.parse_expr()?);
                if *self.peek() == Tok::Comma {
                    self.bump();
                    continue;
                }
                break;
            }
        }
        self.expect(&Tok::RParen, "')'")?;
        Ok(Call { name, args })
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(12)
    }

    /// Precedence-climbing: `max_prec` is the loosest (numerically largest)
    /// precedence level still accepted at this recursion depth.
    fn parse_binary(&mut self, max_prec: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let Some(op) = peek_binop(self.peek()) else {
                break;
            };
            if op.precedence() > max_prec {
                break;
            }
            self.bump();
            let rhs = self.parse_binary(op.precedence() - 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if *self.peek() == Tok::Not {
            self.bump();
            let inner = self.parse_unary()?;
            return Ok(Expr::Unary(UnOp::Not, Box::new(inner)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Tok::Int(v) => {
                self.bump();
                Ok(Expr::Literal(v))
            }
            Tok::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(&Tok::RParen, "')'")?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            Tok::Ident(name) => {
                if self.toks.get(self.pos + 1).map(|t| &t.tok) == Some(&Tok::LParen) {
                    Ok(Expr::Call(self.parse_call(name)?))
                } else {
                    self.bump();
                    Ok(Expr::Var(name))
                }
            }
            _ => {
                let (line, column) = self.here();
                Err(ParseError {
                    line,
                    column,
                    expected: "an expression".to_string(),
                })
            }
        }
    }
}

fn peek_binop(tok: &Tok) -> Option<BinOp> {
    Some(match tok {
        Tok::OrOr => BinOp::Or,
        Tok::AndAnd => BinOp::And,
        Tok::EqEq => BinOp::Eq,
        Tok::Neq => BinOp::Neq,
        Tok::Lt => BinOp::Lt,
        Tok::Leq => BinOp::Leq,
        Tok::Gt => BinOp::Gt,
        Tok::Geq => BinOp::Geq,
        Tok::Plus => BinOp::Add,
        Tok::Minus => BinOp::Sub,
        Tok::Star => BinOp::Mul,
        _ => return None,
    })
}

fn unescape(text: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => {
                return Err(ParseError {
                    line: 0,
                    column: 0,
                    expected: format!("a known escape, found '\\{other}'"),
                })
            }
            None => {
                return Err(ParseError {
                    line: 0,
                    column: 0,
                    expected: "a character after '\\'".to_string(),
                })
            }
        }
    }
    Ok(out)
}
