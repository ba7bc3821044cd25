//! Canonical go.mod printer.
//!
//! Top-level statements are separated by one blank line, block contents are
//! indented with a tab, trailing whitespace is trimmed and blank lines never
//! repeat.

use crate::modfile::syntax::{Comments, FileSyntax, Line, LineBlock, Stmt};

#[derive(Default)]
struct Printer {
    out: String,
    margin: usize,
    /// Suffix comments waiting for the end of the current line.
    pending: Vec<String>,
}

impl Printer {
    fn trim(&mut self) {
        let len = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(len);
    }

    fn newline(&mut self) {
        if !self.pending.is_empty() {
            self.out.push(' ');
            for (i, com) in std::mem::take(&mut self.pending).iter().enumerate() {
                if i > 0 {
                    self.trim();
                    self.out.push('\n');
                    self.indent();
                }
                self.out.push_str(com.trim());
            }
        }

        self.trim();
        let at_blank = self.out.is_empty() || self.out.ends_with("\n\n");
        if !at_blank {
            self.out.push('\n');
        }
        self.indent();
    }

    fn indent(&mut self) {
        for _ in 0..self.margin {
            self.out.push('\t');
        }
    }

    fn tokens(&mut self, tokens: &[String]) {
        let mut sep = "";
        for tok in tokens {
            if matches!(tok.as_str(), "," | ")" | "]" | "}") {
                sep = "";
            }
            self.out.push_str(sep);
            self.out.push_str(tok);
            sep = if matches!(tok.as_str(), "(" | "[" | "{") {
                ""
            } else {
                " "
            };
        }
    }

    fn before(&mut self, comments: &Comments) {
        for com in &comments.before {
            self.out.push_str(com.trim());
            self.newline();
        }
    }

    fn line(&mut self, line: &Line) {
        self.before(&line.comments);
        self.tokens(&line.tokens);
        self.pending.extend(line.comments.suffix.iter().cloned());
    }

    fn block(&mut self, block: &LineBlock) {
        self.before(&block.comments);
        self.tokens(&block.verb);
        self.out.push_str(" (");
        self.pending.extend(block.comments.suffix.iter().cloned());

        self.margin += 1;
        for line in &block.lines {
            self.newline();
            self.line(line);
        }
        for com in &block.close.before {
            self.newline();
            self.out.push_str(com.trim());
        }
        self.margin -= 1;

        self.newline();
        self.out.push(')');
        self.pending.extend(block.close.suffix.iter().cloned());
    }

    fn file(&mut self, file: &FileSyntax) {
        let count = file.stmts.len();
        for (i, stmt) in file.stmts.iter().enumerate() {
            match stmt {
                Stmt::Comments(comments) => {
                    for com in comments {
                        self.out.push_str(com.trim());
                        self.newline();
                    }
                }
                Stmt::Line(line) => {
                    self.line(line);
                    self.newline();
                }
                Stmt::Block(block) => {
                    self.block(block);
                    self.newline();
                }
            }
            if i + 1 < count {
                self.newline();
            }
        }
    }
}

/// Renders a syntax tree as go.mod text.
pub fn format(file: &FileSyntax) -> String {
    let mut printer = Printer::default();
    printer.file(file);
    printer.out
}
