//! Test-only support code. Not part of the public API: gated entirely behind
//! `#[cfg(test)]` so it never ships in the compiled library.

#[cfg(test)]
pub mod interpreter {
    //! A minimal Brainfuck interpreter, adapted from the shape of
    //! `cpr_bf`'s virtual machine, used only to execute emitted programs in
    //! tests and check their behavior end to end.

    /// Runs `program` (ignoring any non-operator characters, so both
    /// annotated and minimal renderings work) against `input`, and returns
    /// everything written via `.`.
    pub fn run(program: &str, input: &[u8]) -> Vec<u8> {
        let ops: Vec<char> = program
            .chars()
            .filter(|c| "><+-.,[]".contains(*c))
            .collect();
        let matches = match_brackets(&ops);

        let mut memory = vec![0u8; 1024];
        let mut pointer: usize = 0;
        let mut ip: usize = 0;
        let mut input = input.iter().copied();
        let mut output = Vec::new();

        while ip < ops.len() {
            match ops[ip] {
                '>' => {
                    pointer += 1;
                    if pointer >= memory.len() {
                        memory.resize(pointer + 1024, 0);
                    }
                }
                '<' => pointer = pointer.checked_sub(1).expect("tape underflow"),
                '+' => memory[pointer] = memory[pointer].wrapping_add(1),
                '-' => memory[pointer] = memory[pointer].wrapping_sub(1),
                '.' => output.push(memory[pointer]),
                ',' => memory[pointer] = input.next().unwrap_or(0),
                '[' => {
                    if memory[pointer] == 0 {
                        ip = matches[&ip];
                    }
                }
                ']' => {
                    if memory[pointer] != 0 {
                        ip = matches[&ip];
                    }
                }
                _ => unreachable!("filtered to Brainfuck operators above"),
            }
            ip += 1;
        }

        output
    }

    fn match_brackets(ops: &[char]) -> std::collections::HashMap<usize, usize> {
        let mut pairs = std::collections::HashMap::new();
        let mut stack = Vec::new();
        for (i, c) in ops.iter().enumerate() {
            match c {
                '[' => stack.push(i),
                ']' => {
                    let open = stack.pop().expect("unbalanced brackets in test program");
                    pairs.insert(open, i);
                    pairs.insert(i, open);
                }
                _ => {}
            }
        }
        pairs
    }
}
