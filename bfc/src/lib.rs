//! Compiles a small C-like imperative language down to Brainfuck.
//!
//! The front end (lexer, parser) produces the [`ast`] defined here; the back
//! end (the [`generator`] and the [`lower`] visitors) walks that tree and
//! drives a simulated tape allocator, emitting `(move, ops, comment)` rows
//! that the [`emitter`] renders as either an annotated listing or a
//! stripped, line-wrapped Brainfuck program. [`driver::compile`] ties the
//! whole pipeline together.

pub mod ast;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod lower;
pub mod parser;
pub mod scope;
pub mod tape;
pub mod token;
pub mod var;

#[cfg(test)]
mod testutil;

pub use driver::{compile, compile_file};
pub use error::CompileError;
