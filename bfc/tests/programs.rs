//! End-to-end tests: compile a source program to Brainfuck with the public
//! API, then execute the emitted program against a small interpreter and
//! check its output.

use std::collections::HashMap;

fn match_brackets(ops: &[char]) -> HashMap<usize, usize> {
    let mut map = HashMap::new();
    let mut stack = Vec::new();
    for (i, &c) in ops.iter().enumerate() {
        match c {
            '[' => stack.push(i),
            ']' => {
                let open = stack.pop().expect("unbalanced brackets");
                map.insert(open, i);
                map.insert(i, open);
            }
            _ => {}
        }
    }
    map
}

fn run_bf(program: &str, input: &[u8]) -> Vec<u8> {
    let ops: Vec<char> = program.chars().filter(|c| "><+-.,[]".contains(*c)).collect();
    let jumps = match_brackets(&ops);

    let mut tape = vec![0u8; 1];
    let mut ptr: usize = 0;
    let mut ip: usize = 0;
    let mut input = input.iter().copied();
    let mut output = Vec::new();

    while ip < ops.len() {
        match ops[ip] {
            '>' => {
                ptr += 1;
                if ptr >= tape.len() {
                    tape.push(0);
                }
            }
            '<' => ptr -= 1,
            '+' => tape[ptr] = tape[ptr].wrapping_add(1),
            '-' => tape[ptr] = tape[ptr].wrapping_sub(1),
            '.' => output.push(tape[ptr]),
            ',' => tape[ptr] = input.next().unwrap_or(0),
            '[' => {
                if tape[ptr] == 0 {
                    ip = jumps[&ip];
                }
            }
            ']' => {
                if tape[ptr] != 0 {
                    ip = jumps[&ip];
                }
            }
            _ => unreachable!(),
        }
        ip += 1;
    }

    output
}

fn compile_and_run(source: &str, input: &[u8]) -> Vec<u8> {
    let program = bfc::compile(source, false).expect("compile should succeed");
    run_bf(&program, input)
}

#[test]
fn prints_a_string_literal() {
    let source = r#"function main() { print "Hello"; }"#;
    assert_eq!(compile_and_run(source, &[]), b"Hello");
}

#[test]
fn for_loop_counts_and_prints_characters() {
    let source = "function main() { for (var i = 0; i < 5; i = i + 1) print \"x\"; }";
    assert_eq!(compile_and_run(source, &[]), b"xxxxx");
}

#[test]
fn while_loop_computes_a_factorial() {
    let source = "
        function main() {
            var n = 5;
            var acc = 1;
            while (n > 1) {
                acc = acc * n;
                n = n - 1;
            }
            print acc;
        }
    ";
    assert_eq!(compile_and_run(source, &[]), vec![120]);
}

#[test]
fn if_else_picks_the_right_branch() {
    let source = r#"
        function main() {
            var x = 3;
            if (x < 5) {
                print "lo";
            } else {
                print "hi";
            }
        }
    "#;
    assert_eq!(compile_and_run(source, &[]), b"lo");
}

#[test]
fn function_calls_compose_and_inline() {
    let source = "
        function square(n) { return n * n; }
        function sum_of_squares(a, b) { return square(a) + square(b); }
        function main() {
            print sum_of_squares(3, 4);
        }
    ";
    assert_eq!(compile_and_run(source, &[]), vec![25]);
}

#[test]
fn scan_reads_one_byte_of_input() {
    let source = "
        function main() {
            var c = 0;
            scan c;
            print c + 1;
        }
    ";
    assert_eq!(compile_and_run(source, &[b'A']), vec![b'A' + 1]);
}

#[test]
fn boolean_operators_short_circuit_on_literals() {
    let source = "
        function main() {
            var a = 0;
            var b = 7;
            print (a || b) && 1;
        }
    ";
    assert_eq!(compile_and_run(source, &[]), vec![1]);
}

#[test]
fn nested_blocks_keep_shadowed_names_independent() {
    let source = "
        function main() {
            var x = 1;
            {
                var x = 2;
                print x;
            }
            print x;
        }
    ";
    assert_eq!(compile_and_run(source, &[]), vec![2, 1]);
}

#[test]
fn undeclared_variable_is_reported_as_a_compile_error() {
    let err = bfc::compile("function main() { y = 1; }", false).unwrap_err();
    assert!(err.to_string().contains("y"));
}
