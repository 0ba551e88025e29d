//! Error taxonomy for the compiler: parse failures, semantic failures,
//! encoding failures, and driver (I/O) failures. All of them abort
//! compilation immediately; there is no partial-program output.

use std::fmt;
use std::io;

/// A failure encountered while lexing or parsing the surface language.
#[derive(Debug)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub expected: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} at line {}, column {}",
            self.expected, self.line, self.column
        )
    }
}

impl std::error::Error for ParseError {}

/// A semantic failure discovered while lowering the AST.
#[derive(Debug)]
pub enum SemanticError {
    DuplicateFunction(String),
    MissingMain,
    Redeclaration(String),
    UndeclaredVariable(String),
    UnknownFunction(String),
    WrongArity {
        function: String,
        expected: usize,
        found: usize,
    },
    DuplicateParameter {
        function: String,
        parameter: String,
    },
    Recursion(Vec<String>),
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticError::DuplicateFunction(name) => {
                write!(f, "function '{name}' is declared more than once")
            }
            SemanticError::MissingMain => write!(f, "no function named 'main'"),
            SemanticError::Redeclaration(name) => {
                write!(f, "variable '{name}' is already declared in this scope")
            }
            SemanticError::UndeclaredVariable(name) => {
                write!(f, "use of undeclared variable '{name}'")
            }
            SemanticError::UnknownFunction(name) => {
                write!(f, "call to unknown function '{name}'")
            }
            SemanticError::WrongArity {
                function,
                expected,
                found,
            } => write!(
                f,
                "function '{function}' expects {expected} argument(s), found {found}"
            ),
            SemanticError::DuplicateParameter { function, parameter } => write!(
                f,
                "function '{function}' declares parameter '{parameter}' more than once"
            ),
            SemanticError::Recursion(chain) => {
                write!(f, "recursion is not supported: {}", chain.join(" -> "))
            }
        }
    }
}

impl std::error::Error for SemanticError {}

/// A failure caused by surface-level text that cannot be safely encoded as
/// Brainfuck (a reserved operator character in a name, or an unknown escape
/// sequence inside a string literal).
#[derive(Debug)]
pub enum EncodingError {
    NameContainsOperator(String),
    UnknownEscape(char),
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::NameContainsOperator(name) => write!(
                f,
                "variable name '{name}' must not contain a Brainfuck operator character (><+-.,[])"
            ),
            EncodingError::UnknownEscape(c) => write!(f, "unknown escape sequence '\\{c}'"),
        }
    }
}

impl std::error::Error for EncodingError {}

/// A failure in the driver itself: I/O reading the source or writing the
/// generated program.
#[derive(Debug)]
pub enum DriverError {
    Io(io::Error),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<io::Error> for DriverError {
    fn from(value: io::Error) -> Self {
        DriverError::Io(value)
    }
}

/// The unified error type returned by [`crate::compile`].
#[derive(Debug)]
pub enum CompileError {
    Parse(ParseError),
    Semantic(SemanticError),
    Encoding(EncodingError),
    Driver(DriverError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(e) => write!(f, "parse error: {e}"),
            CompileError::Semantic(e) => write!(f, "semantic error: {e}"),
            CompileError::Encoding(e) => write!(f, "encoding error: {e}"),
            CompileError::Driver(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Parse(e) => Some(e),
            CompileError::Semantic(e) => Some(e),
            CompileError::Encoding(e) => Some(e),
            CompileError::Driver(e) => Some(e),
        }
    }
}

impl From<ParseError> for CompileError {
    fn from(value: ParseError) -> Self {
        CompileError::Parse(value)
    }
}

impl From<SemanticError> for CompileError {
    fn from(value: SemanticError) -> Self {
        CompileError::Semantic(value)
    }
}

impl From<EncodingError> for CompileError {
    fn from(value: EncodingError) -> Self {
        CompileError::Encoding(value)
    }
}

impl From<DriverError> for CompileError {
    fn from(value: DriverError) -> Self {
        CompileError::Driver(value)
    }
}

impl From<io::Error> for CompileError {
    fn from(value: io::Error) -> Self {
        CompileError::Driver(DriverError::Io(value))
    }
}
