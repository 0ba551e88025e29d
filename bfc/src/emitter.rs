//! Accumulates `(move_prefix, ops, comment, indent)` rows and renders them
//! either as a human-readable annotated listing or as stripped, line-wrapped
//! Brainfuck.

const BF_OPS: &str = "><+-.,[]";
const INDENT_WIDTH: usize = 4;
const LINE_WIDTH: usize = 80;

struct Row {
    moves: String,
    ops: String,
    comment: String,
    indent: usize,
}

pub struct Emitter {
    rows: Vec<Row>,
    pointer: usize,
    indent: usize,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter {
            rows: Vec::new(),
            pointer: 0,
            indent: 0,
        }
    }

    /// Current simulated data-pointer position.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn enter_indent(&mut self) {
        self.indent += 1;
    }

    pub fn leave_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Computes the `>`/`<` prefix needed to step from the current simulated
    /// pointer to `target`, and advances the simulated pointer to match.
    fn move_prefix(&mut self, target: usize) -> String {
        let prefix = if target >= self.pointer {
            ">".repeat(target - self.pointer)
        } else {
            "<".repeat(self.pointer - target)
        };
        self.pointer = target;
        prefix
    }

    /// Emits a row of Brainfuck `ops` at `target`, with `comment` for the
    /// annotated rendering.
    pub fn emit(&mut self, target: usize, ops: &str, comment: impl Into<String>) {
        let moves = self.move_prefix(target);
        let indent = self.indent;
        self.rows.push(Row {
            moves,
            ops: ops.to_string(),
            comment: comment.into(),
            indent,
        });
    }

    /// Emits a no-op bookkeeping row (used for the "Declare variable ..."
    /// style narration rows that don't move the pointer or touch a cell).
    pub fn note(&mut self, comment: impl Into<String>) {
        let indent = self.indent;
        self.rows.push(Row {
            moves: String::new(),
            ops: String::new(),
            comment: comment.into(),
            indent,
        });
    }

    pub fn render_annotated(&self) -> String {
        let mut col_moves = 0;
        let mut col_ops = 0;
        let mut col_comment = 0;
        for row in &self.rows {
            let indented_len = row.indent * INDENT_WIDTH + row.ops.len();
            col_moves = col_moves.max(row.moves.len());
            col_ops = col_ops.max(indented_len);
            col_comment = col_comment.max(row.comment.len());
        }

        let mut out = String::new();
        for row in &self.rows {
            let indented_ops = format!("{}{}", " ".repeat(row.indent * INDENT_WIDTH), row.ops);
            out.push_str(&format!(
                "{:<mw$} {:<ow$} {:<cw$}\n",
                row.moves,
                indented_ops,
                row.comment,
                mw = col_moves,
                ow = col_ops,
                cw = col_comment,
            ));
        }
        out
    }

    pub fn render_minimal(&self) -> String {
        let mut out = String::new();
        let mut line_len = 0;
        for row in &self.rows {
            for c in row.moves.chars().chain(row.ops.chars()) {
                if !BF_OPS.contains(c) {
                    continue;
                }
                out.push(c);
                line_len += 1;
                if line_len == LINE_WIDTH {
                    out.push('\n');
                    line_len = 0;
                }
            }
        }

        if line_len != 0 {
            let gap = LINE_WIDTH - line_len;
            if gap < 8 {
                out.push_str(&"+".repeat(gap));
            } else {
                out.push_str("[-]");
                out.push_str(&"+".repeat(gap - 6));
                out.push_str("[-]");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_prefix_tracks_pointer() {
        let mut e = Emitter::new();
        e.emit(3, "+", "x");
        assert_eq!(e.pointer(), 3);
        e.emit(1, "-", "y");
        assert_eq!(e.pointer(), 1);
        let annotated = e.render_annotated();
        assert!(annotated.contains(">>>"));
        assert!(annotated.contains("<<"));
    }

    #[test]
    fn minimal_strips_non_operators_and_pads_to_80() {
        let mut e = Emitter::new();
        e.emit(1, "+", "increment");
        let minimal = e.render_minimal();
        let stripped: String = minimal.chars().filter(|c| *c != '\n').collect();
        assert_eq!(stripped.len() % LINE_WIDTH, 0);
        assert!(stripped.chars().all(|c| BF_OPS.contains(c)));
    }
}
