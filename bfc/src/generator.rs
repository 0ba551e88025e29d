//! The code generator: composes the tape model and the emitter behind
//! shared (`RefCell`-guarded) state, and implements the generator-level
//! control constructs (`while`, `if`/`else`).
//!
//! [`Variable`] handles borrow a [`Generator`] rather than owning a back
//! reference to it, the same way a borrowed allocator is threaded through
//! cell handles in a typical Brainfuck builder.

use std::cell::RefCell;

use crate::emitter::Emitter;
use crate::tape::Tape;
use crate::var::Variable;

struct IfFrame {
    then_flag: usize,
    else_flag: usize,
    copy_addr: usize,
    active: usize,
}

pub struct Generator {
    tape: RefCell<Tape>,
    emitter: RefCell<Emitter>,
    frames: RefCell<Vec<IfFrame>>,
}

impl Generator {
    pub fn new() -> Self {
        Generator {
            tape: RefCell::new(Tape::new()),
            emitter: RefCell::new(Emitter::new()),
            frames: RefCell::new(Vec::new()),
        }
    }

    // ----- low-level plumbing, shared with `Variable` ------------------

    pub(crate) fn alloc(&self, hint: usize) -> usize {
        self.tape.borrow_mut().alloc(hint)
    }

    pub(crate) fn alloc_run(&self, len: usize, hint: usize) -> Vec<usize> {
        self.tape.borrow_mut().alloc_run(len, hint)
    }

    pub(crate) fn free(&self, addr: usize) {
        self.tape.borrow_mut().free(addr);
    }

    pub(crate) fn emit(&self, addr: usize, ops: &str, comment: impl Into<String>) {
        self.emitter.borrow_mut().emit(addr, ops, comment);
    }

    pub(crate) fn note(&self, comment: impl Into<String>) {
        self.emitter.borrow_mut().note(comment);
    }

    pub(crate) fn enter_indent(&self) {
        self.emitter.borrow_mut().enter_indent();
    }

    pub(crate) fn leave_indent(&self) {
        self.emitter.borrow_mut().leave_indent();
    }

    /// Wraps an already-allocated address in a `Variable` handle that does
    /// *not* free the cell when dropped. Used internally to manipulate the
    /// fixed-layout scratch cells of the if/else frame stack and the
    /// comparison sequences, whose lifetime is managed explicitly rather
    /// than by Rust scoping.
    pub(crate) fn raw(&self, addr: usize, name: impl Into<String>) -> Variable<'_> {
        Variable::wrap(self, addr, name.into(), false)
    }

    // ----- variable handle construction ---------------------------------

    /// Allocates a new cell, with an optional name (falling back to an
    /// auto-generated scratch name), and initializes it to `init`.
    pub fn new_var(&self, name: Option<String>, init: u32) -> Variable<'_> {
        let addr = self.alloc(0);
        let name = name.unwrap_or_else(|| format!("_t{addr}"));
        self.note(format!("Declare variable '{name}' at cell {addr}"));
        let var = Variable::wrap(self, addr, name, true);
        var.set(init);
        var
    }

    /// Allocates `N` contiguous, zero-initialized cells, each owned
    /// independently (freed one at a time when each handle drops).
    /// Required by the comparison and boolean-algebra sequences, which
    /// address operands at fixed offsets from each other.
    pub fn new_var_array<const N: usize>(&self, hint: usize) -> [Variable<'_>; N] {
        let run = self.alloc_run(N, hint);
        self.note(format!(
            "Declare contiguous array of {N} cell(s) starting at {}",
            run[0]
        ));
        let vars: Vec<Variable<'_>> = run
            .into_iter()
            .enumerate()
            .map(|(i, addr)| {
                let v = Variable::wrap(self, addr, format!("_arr{addr}_{i}"), true);
                v.zero();
                v
            })
            .collect();
        match vars.try_into() {
            Ok(array) => array,
            Err(_) => unreachable!("alloc_run always returns exactly N addresses"),
        }
    }

    // ----- control constructs --------------------------------------------

    pub fn while_begin(&self, v: &Variable) {
        self.emit(v.addr(), "[", format!("While '{}' is not 0", v.name()));
        self.enter_indent();
    }

    pub fn while_end(&self, v: &Variable) {
        self.leave_indent();
        self.emit(v.addr(), "]", format!("End while '{}'", v.name()));
    }

    /// Opens a two-armed conditional. Allocates the `[then_flag, one,
    /// copy_of_v]` run, normalizes it so that exactly one of
    /// `(then_flag, one)` ends up set, and opens the then-branch bracket.
    pub fn if_begin(&self, v: &Variable) {
        self.note(format!("If '{}' is not 0", v.name()));
        let run = self.alloc_run(3, 0);
        let (then_flag, one, copy) = (run[0], run[1], run[2]);

        self.raw(then_flag, "_then_flag").set(0);
        self.raw(one, "_one").set(1);
        self.raw(copy, "_if_copy").copy_from(v);

        self.emit(
            copy,
            "[<<+>->[-]]",
            "normalize then/else flags from condition copy",
        );
        self.emit(then_flag, "[", format!("Then branch of '{}'", v.name()));
        self.enter_indent();

        self.frames.borrow_mut().push(IfFrame {
            then_flag,
            else_flag: one,
            copy_addr: copy,
            active: then_flag,
        });
    }

    /// Closes the then-branch bracket and opens the else-branch bracket.
    pub fn else_begin(&self) {
        let else_flag = {
            let mut frames = self.frames.borrow_mut();
            let frame = frames
                .last_mut()
                .expect("else_begin called without a matching if_begin");
            assert_eq!(
                frame.active, frame.then_flag,
                "else_begin called twice for the same if"
            );
            frame.active = frame.else_flag;
            frame.else_flag
        };

        let then_flag = self.frames.borrow().last().unwrap().then_flag;
        self.raw(then_flag, "_then_flag").set(0);
        self.emit(then_flag, "]", "End then branch");
        self.leave_indent();

        self.emit(else_flag, "[", "Else branch");
        self.enter_indent();
    }

    /// Closes whichever bracket (then or else) is currently open and pops
    /// the frame, releasing its three scratch cells.
    pub fn if_end(&self) {
        let frame = self
            .frames
            .borrow_mut()
            .pop()
            .expect("if_end called without a matching if_begin");

        self.raw(frame.active, "_active_flag").set(0);
        self.emit(frame.active, "]", "End if/else");
        self.leave_indent();

        self.free(frame.then_flag);
        self.free(frame.else_flag);
        self.free(frame.copy_addr);
    }

    // ----- text printing --------------------------------------------------

    /// Emits a scratch-cell set+write sequence for each byte of `text`.
    pub fn print_text(&self, text: &str) {
        self.note(format!("Print {} byte(s) of text", text.len()));
        let scratch = self.new_var(Some("_print_char".to_string()), 0);
        for byte in text.bytes() {
            scratch.set(byte as u32);
            scratch.write_output();
        }
    }

    // ----- rendering --------------------------------------------------------

    pub fn render(&self, annotated: bool) -> String {
        if annotated {
            self.emitter.borrow().render_annotated()
        } else {
            self.emitter.borrow().render_minimal()
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Generator::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::interpreter::run;

    #[test]
    fn if_then_only_runs_once() {
        let gen = Generator::new();
        let cond = gen.new_var(Some("cond".into()), 1);
        let out = gen.new_var(Some("out".into()), 0);
        gen.if_begin(&cond);
        out.set(9);
        gen.if_end();
        out.write_output();
        let program = gen.render(false);
        assert_eq!(run(&program, &[]), vec![9]);
    }

    #[test]
    fn if_else_takes_else_branch() {
        let gen = Generator::new();
        let cond = gen.new_var(Some("cond".into()), 0);
        let out = gen.new_var(Some("out".into()), 0);
        gen.if_begin(&cond);
        out.set(1);
        gen.else_begin();
        out.set(2);
        gen.if_end();
        out.write_output();
        let program = gen.render(false);
        assert_eq!(run(&program, &[]), vec![2]);
    }

    #[test]
    fn while_loop_counts_down() {
        let gen = Generator::new();
        let n = gen.new_var(Some("n".into()), 3);
        let out = gen.new_var(Some("out".into()), 0);
        gen.while_begin(&n);
        out.increment();
        n.decrement();
        gen.while_end(&n);
        out.write_output();
        let program = gen.render(false);
        assert_eq!(run(&program, &[]), vec![3]);
    }
}
