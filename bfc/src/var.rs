//! `Variable`: a borrowed handle onto a single tape cell. Owns no state of
//! its own beyond the address and a display name; all emission happens
//! through the borrowed [`Generator`]. Frees its cell on drop, the same RAII
//! discipline a scoped allocator handle uses for any scarce resource.
//!
//! Every operation here is destructive to `self`. Operations documented as
//! non-destructive to their other operand restore that operand's value
//! through a scratch cell before returning.

use crate::generator::Generator;

/// The constant threshold above which `set`/`add_const`/`sub_const` switch
/// from a linear run of `+`/`-` to the squared (`p*q + r`) idiom.
const SQUARE_THRESHOLD: u32 = 32;

pub struct Variable<'a> {
    gen: &'a Generator,
    addr: usize,
    name: String,
    owns: bool,
}

impl<'a> Variable<'a> {
    pub(crate) fn wrap(gen: &'a Generator, addr: usize, name: String, owns: bool) -> Self {
        Variable {
            gen,
            addr,
            name,
            owns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn addr(&self) -> usize {
        self.addr
    }

    // ----- primitives -----------------------------------------------------

    pub fn increment(&self) {
        self.gen.emit(self.addr, "+", format!("Increment '{}'", self.name));
    }

    pub fn decrement(&self) {
        self.gen.emit(self.addr, "-", format!("Decrement '{}'", self.name));
    }

    pub(crate) fn zero(&self) {
        self.gen.emit(self.addr, "[-]", format!("Zero '{}'", self.name));
    }

    pub fn set(&self, k: u32) {
        self.zero();
        self.apply_const(k, '+');
    }

    pub fn add_const(&self, k: u32) {
        self.apply_const(k, '+');
    }

    pub fn sub_const(&self, k: u32) {
        self.apply_const(k, '-');
    }

    /// Emits `k` applications of `op` (`'+'` or `'-'`) to the cell's current
    /// value, switching to the squaring idiom for large `k` to avoid an
    /// unreasonably long run of identical operators.
    fn apply_const(&self, k: u32, op: char) {
        if k == 0 {
            return;
        }
        if k <= SQUARE_THRESHOLD {
            self.gen.emit(
                self.addr,
                &op.to_string().repeat(k as usize),
                format!("Apply '{op}' x{k} to '{}'", self.name),
            );
            return;
        }
        let (q, p, r) = square_decompose(k);
        let counter = self.gen.new_var(None, p);
        self.gen.while_begin(&counter);
        self.gen.emit(
            self.addr,
            &op.to_string().repeat(q as usize),
            format!("Squared step of '{}'", self.name),
        );
        counter.decrement();
        self.gen.while_end(&counter);
        if r > 0 {
            self.gen.emit(
                self.addr,
                &op.to_string().repeat(r as usize),
                format!("Squared remainder of '{}'", self.name),
            );
        }
    }

    pub fn read_input(&self) {
        self.gen.emit(self.addr, ",", format!("Read input into '{}'", self.name));
    }

    pub fn write_output(&self) {
        self.gen.emit(self.addr, ".", format!("Write '{}' to output", self.name));
    }

    // ----- compound operations ---------------------------------------------

    /// `self := source`; zeroes `source` as a side effect. A no-op if
    /// `source` is `self` (moving a variable into itself is an identity).
    pub fn move_from(&self, source: &Variable) {
        if self.addr == source.addr {
            return;
        }
        self.zero();
        self.gen.while_begin(source);
        self.increment();
        source.decrement();
        self.gen.while_end(source);
    }

    /// `self := source`, restoring `source` through a scratch cell. A no-op
    /// if `source` is `self` (§8's self-assignment idempotence property).
    pub fn copy_from(&self, source: &Variable) {
        if self.addr == source.addr {
            return;
        }
        self.zero();
        let scratch = self.gen.new_var(None, 0);
        self.gen.while_begin(source);
        self.increment();
        scratch.increment();
        source.decrement();
        self.gen.while_end(source);
        self.gen.while_begin(&scratch);
        source.increment();
        scratch.decrement();
        self.gen.while_end(&scratch);
    }

    /// `self += source`, restoring `source`. If `source` is `self`, routes
    /// through a temporary copy so the drain loop doesn't zero its own
    /// source out from under itself.
    pub fn add_from(&self, source: &Variable) {
        if self.addr == source.addr {
            let copy = self.gen.new_var(None, 0);
            copy.copy_from(self);
            self.add_from(&copy);
            return;
        }
        let scratch = self.gen.new_var(None, 0);
        self.gen.while_begin(source);
        self.increment();
        scratch.increment();
        source.decrement();
        self.gen.while_end(source);
        self.gen.while_begin(&scratch);
        source.increment();
        scratch.decrement();
        self.gen.while_end(&scratch);
    }

    /// `self -= source`, restoring `source`. Subtracting a variable from
    /// itself always yields 0 without needing the drain loop.
    pub fn sub_from(&self, source: &Variable) {
        if self.addr == source.addr {
            self.zero();
            return;
        }
        let scratch = self.gen.new_var(None, 0);
        self.gen.while_begin(source);
        self.decrement();
        scratch.increment();
        source.decrement();
        self.gen.while_end(source);
        self.gen.while_begin(&scratch);
        source.increment();
        scratch.decrement();
        self.gen.while_end(&scratch);
    }

    /// `self *= source`. Captures `self`'s original value in a counter
    /// before zeroing it, then adds `source` into `self` that many times.
    /// If `source` is `self`, a second scratch holds the original
    /// multiplicand so the running total doesn't feed back into itself.
    pub fn multiply_from(&self, source: &Variable) {
        if self.addr == source.addr {
            let multiplicand = self.gen.new_var(None, 0);
            multiplicand.copy_from(self);
            let counter = self.gen.new_var(None, 0);
            counter.copy_from(self);
            self.zero();
            self.gen.while_begin(&counter);
            self.add_from(&multiplicand);
            counter.decrement();
            self.gen.while_end(&counter);
            return;
        }
        let counter = self.gen.new_var(None, 0);
        counter.copy_from(self);
        self.zero();
        self.gen.while_begin(&counter);
        self.add_from(source);
        counter.decrement();
        self.gen.while_end(&counter);
    }

    /// `self := (source == 0) ? 1 : 0`. Non-destructive to `source`.
    pub fn bool_not(&self, source: &Variable) {
        self.gen
            .note(format!("Set '{}' to not '{}'", self.name, source.name));
        let cells = self.gen.new_var_array::<2>(0); // [result, a]
        cells[0].set(1);
        cells[1].copy_from(source);
        self.gen.emit(cells[1].addr, "[<->[-]]", "bool_not sequence");
        self.zero();
        self.move_from(&cells[0]);
    }

    /// `self := (self != 0) && (other != 0)`.
    pub fn bool_and(&self, other: &Variable) {
        self.gen
            .note(format!("Set '{}' to '{}' and '{}'", self.name, self.name, other.name));
        if self.addr == other.addr {
            let cells = self.gen.new_var_array::<2>(0); // [result, a]
            cells[1].move_from(self);
            self.gen.emit(cells[1].addr, "[<+>[-]]", "bool_and (self-aliased) sequence");
            self.move_from(&cells[0]);
            return;
        }
        let cells = self.gen.new_var_array::<3>(0); // [result, a, b]
        cells[1].move_from(self);
        cells[2].copy_from(other);
        self.gen.emit(cells[1].addr, "[>[<<+>>[-]]<[-]]", "bool_and sequence");
        self.move_from(&cells[0]);
    }

    /// `self := (self != 0) || (other != 0)`, via De Morgan's law over
    /// [`Self::bool_not`] and [`Self::bool_and`].
    pub fn bool_or(&self, other: &Variable) {
        self.gen
            .note(format!("Set '{}' to '{}' or '{}'", self.name, self.name, other.name));
        let not_self = self.gen.new_var(None, 0);
        not_self.bool_not(self);
        let not_other = self.gen.new_var(None, 0);
        not_other.bool_not(other);
        not_self.bool_and(&not_other);
        self.bool_not(&not_self);
    }

    /// `self := (self < other) ? 1 : 0`. Clobbers the comparison scratch
    /// run's internal cells only; `other` is read through a copy.
    pub fn lower_than(&self, other: &Variable) {
        self.gen
            .note(format!("Set '{}' to '{}' lower than '{}'", self.name, self.name, other.name));
        let run = self.gen.new_var_array::<6>(0); // [result, one, _, a, b, _]
        run[0].set(1);
        run[1].set(1);
        run[3].move_from(self);
        run[4].copy_from(other);
        self.gen.emit(run[3].addr, "+>+<[->-[>]<<]<[<->>]>", "lower_than sequence");
        self.zero();
        self.move_from(&run[0]);
    }

    pub fn lower_equal(&self, other: &Variable) {
        let plus_one = self.gen.new_var(None, 0);
        plus_one.copy_from(other);
        plus_one.increment();
        self.lower_than(&plus_one);
    }

    pub fn greater_than(&self, other: &Variable) {
        let other_copy = self.gen.new_var(None, 0);
        other_copy.copy_from(other);
        other_copy.lower_than(self);
        self.zero();
        self.move_from(&other_copy);
    }

    pub fn greater_equal(&self, other: &Variable) {
        let other_copy = self.gen.new_var(None, 0);
        other_copy.copy_from(other);
        other_copy.lower_equal(self);
        self.zero();
        self.move_from(&other_copy);
    }

    pub fn equal(&self, other: &Variable) {
        self.gen
            .note(format!("Set '{}' to '{}' equal to '{}'", self.name, self.name, other.name));
        let run = self.gen.new_var_array::<6>(0); // [result, one, _, a, b, _]
        run[1].set(1);
        run[3].move_from(self);
        run[4].copy_from(other);
        self.gen
            .emit(run[3].addr, "+>+<[->-[>]<<]<[<+>>>[<<<->>>[-]]<]>", "equal sequence");
        self.zero();
        self.move_from(&run[0]);
    }

    pub fn not_equal(&self, other: &Variable) {
        self.equal(other);
        let negated = self.gen.new_var(None, 0);
        negated.bool_not(self);
        self.move_from(&negated);
    }
}

impl Drop for Variable<'_> {
    fn drop(&mut self) {
        if self.owns {
            self.gen.free(self.addr);
        }
    }
}

/// Decomposes `k` as `q * p + r` with `q = floor(sqrt(k))`, for the squared
/// constant-application idiom.
fn square_decompose(k: u32) -> (u32, u32, u32) {
    let q = (k as f64).sqrt().floor() as u32;
    let q = q.max(1);
    let p = k / q;
    let r = k - p * q;
    (q, p, r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::interpreter::run;

    #[test]
    fn set_applies_squaring_above_threshold() {
        let gen = Generator::new();
        let v = gen.new_var(Some("v".into()), 0);
        v.set(200);
        v.write_output();
        let program = gen.render(false);
        assert_eq!(run(&program, &[]), vec![200]);
    }

    #[test]
    fn copy_from_self_is_idempotent() {
        let gen = Generator::new();
        let v = gen.new_var(Some("v".into()), 42);
        v.copy_from(&v);
        v.write_output();
        let program = gen.render(false);
        assert_eq!(run(&program, &[]), vec![42]);
    }

    #[test]
    fn copy_from_preserves_source() {
        let gen = Generator::new();
        let a = gen.new_var(Some("a".into()), 7);
        let b = gen.new_var(Some("b".into()), 0);
        b.copy_from(&a);
        a.write_output();
        b.write_output();
        let program = gen.render(false);
        assert_eq!(run(&program, &[]), vec![7, 7]);
    }

    #[test]
    fn add_from_self_doubles() {
        let gen = Generator::new();
        let a = gen.new_var(Some("a".into()), 5);
        a.add_from(&a);
        a.write_output();
        let program = gen.render(false);
        assert_eq!(run(&program, &[]), vec![10]);
    }

    #[test]
    fn multiply_from_self_squares() {
        let gen = Generator::new();
        let a = gen.new_var(Some("a".into()), 4);
        a.multiply_from(&a);
        a.write_output();
        let program = gen.render(false);
        assert_eq!(run(&program, &[]), vec![16]);
    }

    #[test]
    fn comparisons_produce_expected_booleans() {
        let gen = Generator::new();
        let a = gen.new_var(Some("a".into()), 3);
        let b = gen.new_var(Some("b".into()), 5);
        a.lower_than(&b);
        a.write_output();
        let program = gen.render(false);
        assert_eq!(run(&program, &[]), vec![1]);
    }

    #[test]
    fn bool_or_truth_table() {
        for (lhs, rhs, expected) in [(0u32, 0u32, 0u32), (0, 1, 1), (1, 0, 1), (1, 1, 1)] {
            let gen = Generator::new();
            let a = gen.new_var(Some("a".into()), lhs);
            let b = gen.new_var(Some("b".into()), rhs);
            a.bool_or(&b);
            a.write_output();
            let program = gen.render(false);
            assert_eq!(run(&program, &[]), vec![expected], "lhs={lhs} rhs={rhs}");
        }
    }
}
