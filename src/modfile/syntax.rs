//! Comment-preserving go.mod syntax tree.
//!
//! A file is a sequence of statements: single-line directives, parenthesized
//! blocks of directives sharing a verb, and standalone comment blocks. Lines
//! carry a stable [`LineId`] so the semantic layer can point back at the line
//! a directive came from.
//!
//! Removal only clears a line's tokens; [`FileSyntax::cleanup`] drops cleared
//! lines, empty blocks, and collapses one-line blocks.

/// Stable identifier of a [`Line`] within one [`FileSyntax`].
pub type LineId = usize;

/// Comments attached to a line or block.
///
/// Each entry is the full comment text (`// ...`); an empty entry stands for
/// a blank line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    pub before: Vec<String>,
    pub suffix: Vec<String>,
}

/// One directive line.
///
/// Inside a block the tokens exclude the block's verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub id: LineId,
    pub tokens: Vec<String>,
    pub comments: Comments,
    /// 1-based source line, 0 for synthesized lines.
    pub start: usize,
}

impl Line {
    pub fn is_removed(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// `verb ( ... )`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBlock {
    pub verb: Vec<String>,
    pub lines: Vec<Line>,
    /// Comments above the block and after its `(`.
    pub comments: Comments,
    /// Comments above and after the closing `)`.
    pub close: Comments,
    pub start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Line(Line),
    Block(LineBlock),
    Comments(Vec<String>),
}

/// A directive as seen by the semantic layer.
#[derive(Debug, Clone, Copy)]
pub struct Directive<'a> {
    pub verb: &'a str,
    pub args: &'a [String],
    pub line: &'a Line,
    pub in_block: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSyntax {
    pub name: String,
    pub stmts: Vec<Stmt>,
    next_id: LineId,
}

enum Anchor {
    Top(usize),
    Block(usize),
    InBlock(usize, usize),
}

impl FileSyntax {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stmts: Vec::new(),
            next_id: 0,
        }
    }

    /// Allocates a line with a fresh id.
    pub fn new_line(&mut self, tokens: Vec<String>, comments: Comments, start: usize) -> Line {
        let id = self.next_id;
        self.next_id += 1;
        Line {
            id,
            tokens,
            comments,
            start,
        }
    }

    /// Iterates live directives in file order.
    pub fn directives(&self) -> impl Iterator<Item = Directive<'_>> {
        self.stmts.iter().flat_map(|stmt| {
            let found: Vec<Directive<'_>> = match stmt {
                Stmt::Line(line) if !line.is_removed() => vec![Directive {
                    verb: &line.tokens[0],
                    args: &line.tokens[1..],
                    line,
                    in_block: false,
                }],
                Stmt::Block(block) => block
                    .lines
                    .iter()
                    .filter(|line| !line.is_removed())
                    .map(|line| Directive {
                        verb: &block.verb[0],
                        args: &line.tokens,
                        line,
                        in_block: true,
                    })
                    .collect(),
                _ => Vec::new(),
            };
            found
        })
    }

    /// Returns the line and whether it sits inside a block.
    fn line_mut(&mut self, id: LineId) -> Option<(&mut Line, bool)> {
        self.stmts.iter_mut().find_map(|stmt| match stmt {
            Stmt::Line(line) if line.id == id => Some((line, false)),
            Stmt::Block(block) => block
                .lines
                .iter_mut()
                .find(|line| line.id == id)
                .map(|line| (line, true)),
            _ => None,
        })
    }

    /// Replaces the tokens of a line. `tokens` includes the verb.
    pub fn update_line(&mut self, id: LineId, tokens: &[String]) -> bool {
        match self.line_mut(id) {
            Some((line, in_block)) => {
                line.tokens = if in_block {
                    tokens[1..].to_vec()
                } else {
                    tokens.to_vec()
                };
                true
            }
            None => false,
        }
    }

    /// Marks a line removed. It disappears on the next [`cleanup`](Self::cleanup).
    pub fn remove_line(&mut self, id: LineId) -> bool {
        match self.line_mut(id) {
            Some((line, _)) => {
                line.tokens.clear();
                line.comments.suffix.clear();
                true
            }
            None => false,
        }
    }

    /// Adds a directive line. `tokens` includes the verb.
    ///
    /// With a `hint`, the new line goes right after it (inside the hint's
    /// block if it has one). Without one it goes after the last statement
    /// with the same verb, joining that statement's block if it is a block.
    /// Otherwise it is appended to the file.
    pub fn add_line(&mut self, hint: Option<LineId>, tokens: Vec<String>) -> LineId {
        let anchor = match hint {
            Some(id) => self.anchor_of_line(id),
            None => self.last_stmt_with_verb(&tokens[0]),
        };

        match anchor {
            Some(Anchor::Top(i)) => {
                let line = self.new_line(tokens, Comments::default(), 0);
                let id = line.id;
                self.stmts.insert(i + 1, Stmt::Line(line));
                id
            }
            Some(Anchor::Block(i)) => {
                let line = self.new_line(tokens[1..].to_vec(), Comments::default(), 0);
                let id = line.id;
                if let Stmt::Block(block) = &mut self.stmts[i] {
                    block.lines.push(line);
                }
                id
            }
            Some(Anchor::InBlock(i, j)) => {
                let line = self.new_line(tokens[1..].to_vec(), Comments::default(), 0);
                let id = line.id;
                if let Stmt::Block(block) = &mut self.stmts[i] {
                    block.lines.insert(j + 1, line);
                }
                id
            }
            None => {
                let line = self.new_line(tokens, Comments::default(), 0);
                let id = line.id;
                self.stmts.push(Stmt::Line(line));
                id
            }
        }
    }

    fn anchor_of_line(&self, id: LineId) -> Option<Anchor> {
        self.stmts.iter().enumerate().find_map(|(i, stmt)| match stmt {
            Stmt::Line(line) if line.id == id => Some(Anchor::Top(i)),
            Stmt::Block(block) => block
                .lines
                .iter()
                .position(|line| line.id == id)
                .map(|j| Anchor::InBlock(i, j)),
            _ => None,
        })
    }

    fn last_stmt_with_verb(&self, verb: &str) -> Option<Anchor> {
        self.stmts
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, stmt)| match stmt {
                Stmt::Line(line) if line.tokens.first().is_some_and(|t| t == verb) => {
                    Some(Anchor::Top(i))
                }
                Stmt::Block(block) if block.verb.first().is_some_and(|t| t == verb) => {
                    Some(Anchor::Block(i))
                }
                _ => None,
            })
    }

    /// Drops removed lines and empty blocks; collapses one-line blocks.
    pub fn cleanup(&mut self) {
        let stmts = std::mem::take(&mut self.stmts);
        for stmt in stmts {
            match stmt {
                Stmt::Line(line) if line.is_removed() => {}
                Stmt::Block(mut block) => {
                    block.lines.retain(|line| !line.is_removed());
                    match block.lines.len() {
                        0 => {}
                        1 if block.close.before.is_empty() => {
                            self.stmts.push(Stmt::Line(collapse(block)));
                        }
                        _ => self.stmts.push(Stmt::Block(block)),
                    }
                }
                other => self.stmts.push(other),
            }
        }
    }
}

fn collapse(block: LineBlock) -> Line {
    let LineBlock {
        verb,
        mut lines,
        comments,
        close,
        ..
    } = block;
    let line = lines.remove(0);

    let mut before = comments.before;
    before.extend(line.comments.before);
    let mut suffix = line.comments.suffix;
    suffix.extend(comments.suffix);
    suffix.extend(close.suffix);

    let mut tokens = verb;
    tokens.extend(line.tokens);

    Line {
        id: line.id,
        tokens,
        comments: Comments { before, suffix },
        start: line.start,
    }
}
