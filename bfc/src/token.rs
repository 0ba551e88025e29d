//! Lexer for the surface language: free-form whitespace, `//` and `/* */`
//! comments, identifiers, decimal and char-literal integers, string
//! literals, and the fixed set of operators/punctuation the grammar needs.

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tok {
    Ident(String),
    Int(u32),
    Str(String),
    Function,
    Var,
    Print,
    Scan,
    If,
    Else,
    While,
    For,
    Return,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Assign,
    Not,
    OrOr,
    AndAnd,
    EqEq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
    Plus,
    Minus,
    Star,
    Eof,
}

#[derive(Debug, Clone)]
pub struct SpannedTok {
    pub tok: Tok,
    pub line: usize,
    pub column: usize,
}

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src: src.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<SpannedTok>, ParseError> {
        let mut out = Vec::new();
        loop {
            let tok = self.next_token()?;
            let eof = tok.tok == Tok::Eof;
            out.push(tok);
            if eof {
                break;
            }
        }
        Ok(out)
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.bump();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while self.peek().is_some() && self.peek() != Some(b'\n') {
                        self.bump();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            None => {
                                return Err(ParseError {
                                    line,
                                    column,
                                    expected: "'*/' to close block comment".into(),
                                })
                            }
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn next_token(&mut self) -> Result<SpannedTok, ParseError> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);

        let Some(c) = self.peek() else {
            return Ok(SpannedTok {
                tok: Tok::Eof,
                line,
                column,
            });
        };

        let tok = match c {
            b'(' => {
                self.bump();
                Tok::LParen
            }
            b')' => {
                self.bump();
                Tok::RParen
            }
            b'{' => {
                self.bump();
                Tok::LBrace
            }
            b'}' => {
                self.bump();
                Tok::RBrace
            }
            b',' => {
                self.bump();
                Tok::Comma
            }
            b';' => {
                self.bump();
                Tok::Semi
            }
            b'+' => {
                self.bump();
                Tok::Plus
            }
            b'-' => {
                self.bump();
                Tok::Minus
            }
            b'*' => {
                self.bump();
                Tok::Star
            }
            b'!' if self.peek_at(1) == Some(b'=') => {
                self.bump();
                self.bump();
                Tok::Neq
            }
            b'!' => {
                self.bump();
                Tok::Not
            }
            b'=' => {
                self.bump();
                if self.peek() == Some(b'=') {
                    self.bump();
                    Tok::EqEq
                } else {
                    Tok::Assign
                }
            }
            b'<' => {
                self.bump();
                if self.peek() == Some(b'=') {
                    self.bump();
                    Tok::Leq
                } else {
                    Tok::Lt
                }
            }
            b'>' => {
                self.bump();
                if self.peek() == Some(b'=') {
                    self.bump();
                    Tok::Geq
                } else {
                    Tok::Gt
                }
            }
            b'|' if self.peek_at(1) == Some(b'|') => {
                self.bump();
                self.bump();
                Tok::OrOr
            }
            b'&' if self.peek_at(1) == Some(b'&') => {
                self.bump();
                self.bump();
                Tok::AndAnd
            }
            b'"' => return self.read_string(line, column),
            b'\'' => return self.read_char_literal(line, column),
            c if c.is_ascii_digit() => return self.read_int(line, column),
            c if c == b'_' || c.is_ascii_alphabetic() => return self.read_ident(line, column),
            other => {
                return Err(ParseError {
                    line,
                    column,
                    expected: format!("a valid token, found '{}'", other as char),
                })
            }
        };

        Ok(SpannedTok { tok, line, column })
    }

    fn read_string(&mut self, line: usize, column: usize) -> Result<SpannedTok, ParseError> {
        self.bump(); // opening quote
        let mut s = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(ParseError {
                        line,
                        column,
                        expected: "closing '\"'".into(),
                    })
                }
                Some(b'"') => break,
                Some(c) => s.push(c as char),
            }
        }
        Ok(SpannedTok {
            tok: Tok::Str(s),
            line,
            column,
        })
    }

    fn read_char_literal(&mut self, line: usize, column: usize) -> Result<SpannedTok, ParseError> {
        self.bump(); // opening quote
        let value = match self.bump() {
            Some(c) => c,
            None => {
                return Err(ParseError {
                    line,
                    column,
                    expected: "a character".into(),
                })
            }
        };
        match self.bump() {
            Some(b'\'') => {}
            _ => {
                return Err(ParseError {
                    line,
                    column,
                    expected: "closing \"'\" after char literal".into(),
                })
            }
        }
        Ok(SpannedTok {
            tok: Tok::Int(value as u32),
            line,
            column,
        })
    }

    fn read_int(&mut self, line: usize, column: usize) -> Result<SpannedTok, ParseError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        let value: u32 = text.parse().map_err(|_| ParseError {
            line,
            column,
            expected: "an integer literal that fits in 32 bits".into(),
        })?;
        Ok(SpannedTok {
            tok: Tok::Int(value),
            line,
            column,
        })
    }

    fn read_ident(&mut self, line: usize, column: usize) -> Result<SpannedTok, ParseError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c == b'_' || c.is_ascii_alphanumeric()) {
            self.bump();
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap();
        let tok = match text {
            "function" => Tok::Function,
            "var" => Tok::Var,
            "print" => Tok::Print,
            "scan" => Tok::Scan,
            "if" => Tok::If,
            "else" => Tok::Else,
            "while" => Tok::While,
            "for" => Tok::For,
            "return" => Tok::Return,
            _ => Tok::Ident(text.to_string()),
        };
        Ok(SpannedTok { tok, line, column })
    }
}
