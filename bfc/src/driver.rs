//! Top-level compilation driver: parses, validates function declarations,
//! locates `main`, and drives the lowering compiler to produce a rendered
//! Brainfuck program.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::ast::Call;
use crate::error::{CompileError, SemanticError};
use crate::generator::Generator;
use crate::lower::stmt::inline_call;
use crate::lower::LowerCtx;
use crate::parser;
use crate::scope::ScopeChain;

/// Compiles `source` into a Brainfuck program. `annotated` selects between
/// the human-readable listing and the stripped, line-wrapped minimal
/// rendering.
pub fn compile(source: &str, annotated: bool) -> Result<String, CompileError> {
    log::info!("parsing source ({} bytes)", source.len());
    let program = parser::parse(source)?;

    let mut functions = HashMap::new();
    for function in &program.functions {
        if functions.insert(function.name.clone(), function).is_some() {
            return Err(SemanticError::DuplicateFunction(function.name.clone()).into());
        }
    }
    if !functions.contains_key("main") {
        return Err(SemanticError::MissingMain.into());
    }
    for function in &program.functions {
        let mut seen = HashSet::new();
        for parameter in &function.parameters {
            if !seen.insert(parameter) {
                return Err(SemanticError::DuplicateParameter {
                    function: function.name.clone(),
                    parameter: parameter.clone(),
                }
                .into());
            }
        }
    }
    log::debug!("{} function(s) declared", functions.len());

    let gen = Generator::new();
    let mut ctx = LowerCtx::new(functions);
    let scopes = ScopeChain::new();
    let entry = Call {
        name: "main".to_string(),
        args: Vec::new(),
    };
    log::debug!("lowering from 'main'");
    inline_call(&gen, &mut ctx, &scopes, &entry)?;

    log::info!(
        "rendering emitted program ({} mode)",
        if annotated { "annotated" } else { "minimal" }
    );
    Ok(gen.render(annotated))
}

/// Reads `input`, compiles it, and writes the rendered program to `output`.
pub fn compile_file(input: &Path, output: &Path, annotated: bool) -> Result<(), CompileError> {
    let source = fs::read_to_string(input)?;
    let rendered = compile(&source, annotated)?;
    fs::write(output, rendered)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::interpreter::run;

    #[test]
    fn missing_main_is_rejected() {
        let err = compile("function helper() { return 1; }", false).unwrap_err();
        assert!(matches!(err, CompileError::Semantic(SemanticError::MissingMain)));
    }

    #[test]
    fn duplicate_function_is_rejected() {
        let source = "function main() {} function main() {}";
        let err = compile(source, false).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Semantic(SemanticError::DuplicateFunction(_))
        ));
    }

    #[test]
    fn undeclared_variable_is_rejected() {
        let source = "function main() { x = 1; }";
        let err = compile(source, false).unwrap_err();
        assert!(matches!(
            err,
            CompileError::Semantic(SemanticError::UndeclaredVariable(_))
        ));
    }

    #[test]
    fn recursive_call_is_rejected() {
        let source = "function a() { b(); } function main() { a(); } function b() { a(); }";
        let err = compile(source, false).unwrap_err();
        assert!(matches!(err, CompileError::Semantic(SemanticError::Recursion(_))));
    }

    #[test]
    fn hello_world_prints_x_five_times() {
        let source = "function main() { for (var i = 0; i < 5; i = i + 1) print \"x\"; }";
        let program = compile(source, false).unwrap();
        assert_eq!(run(&program, &[]), b"xxxxx");
    }

    #[test]
    fn function_call_and_arithmetic() {
        let source = "
            function add(a, b) { return a + b; }
            function main() {
                var x = add(2, 3);
                print x;
            }
        ";
        let program = compile(source, false).unwrap();
        assert_eq!(run(&program, &[]), vec![5]);
    }

    #[test]
    fn annotated_rendering_is_non_empty_and_distinct_from_minimal() {
        let source = "function main() { print 'x'; }";
        let annotated = compile(source, true).unwrap();
        let minimal = compile(source, false).unwrap();
        assert!(annotated.contains("Write"));
        assert_ne!(annotated, minimal);
    }
}
