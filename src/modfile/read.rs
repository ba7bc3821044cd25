//! go.mod lexer and parser.
//!
//! Produces a [`FileSyntax`]; directive meaning is checked by the caller.
//!
//! # Grammar
//!
//! ```text
//! file    = { stmt | comment | blank }
//! stmt    = tokens [comment] NL
//!         | tokens "(" [comment] NL { line | comment | blank } ")" [comment] NL
//! comment = "//" { any } NL
//! ```
//!
//! Comments directly above a statement attach to it; comments separated
//! from the next statement by a blank line form a standalone block.

use crate::error::{Result, SubmodError};
use crate::modfile::syntax::{Comments, FileSyntax, LineBlock, Stmt};

fn is_punct(c: char) -> bool {
    matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | ',')
}

struct LexedLine {
    tokens: Vec<String>,
    comment: Option<String>,
}

/// Splits one physical line into tokens and an optional trailing comment.
fn lex_line(text: &str) -> std::result::Result<LexedLine, String> {
    let mut tokens = Vec::new();
    let mut comment = None;
    let mut rest = text;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        if rest.starts_with("//") {
            comment = Some(rest.trim_end().to_string());
            break;
        }
        if rest.starts_with("/*") {
            return Err("mod files must use // comments, not /* comments".to_string());
        }

        let first = rest.chars().next().unwrap_or_default();
        let len = if is_punct(first) {
            first.len_utf8()
        } else if first == '"' {
            quoted_len(rest).ok_or("unterminated quoted string")?
        } else if first == '`' {
            rest[1..]
                .find('`')
                .map(|i| i + 2)
                .ok_or("unterminated raw string")?
        } else {
            ident_len(rest)?
        };

        tokens.push(rest[..len].to_string());
        rest = &rest[len..];
    }

    Ok(LexedLine { tokens, comment })
}

fn quoted_len(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i + 1),
            _ => {}
        }
    }
    None
}

fn ident_len(s: &str) -> std::result::Result<usize, String> {
    for (i, c) in s.char_indices() {
        if c.is_whitespace() || is_punct(c) {
            return Ok(i);
        }
        let tail = &s[i..];
        if tail.starts_with("//") {
            return Ok(i);
        }
        if tail.starts_with("/*") {
            return Err("mod files must use // comments, not /* comments".to_string());
        }
        if c.is_control() {
            return Err(format!("unexpected input character {:?}", c));
        }
    }
    Ok(s.len())
}

/// Parses go.mod text into a syntax tree.
pub fn parse(name: &str, text: &str) -> Result<FileSyntax> {
    let err = |line: usize, message: String| SubmodError::ManifestParse {
        file: name.to_string(),
        line,
        message,
    };

    let mut file = FileSyntax::new(name);
    let mut pending: Vec<String> = Vec::new();
    let mut block: Option<LineBlock> = None;

    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let LexedLine { tokens, comment } = lex_line(raw).map_err(|m| err(lineno, m))?;

        if tokens.is_empty() {
            match (comment, &block) {
                (Some(c), _) => pending.push(c),
                (None, Some(open)) => {
                    let keep_blank = match pending.last() {
                        Some(last) => !last.is_empty(),
                        None => !open.lines.is_empty(),
                    };
                    if keep_blank {
                        pending.push(String::new());
                    }
                }
                (None, None) => {
                    if !pending.is_empty() {
                        file.stmts.push(Stmt::Comments(std::mem::take(&mut pending)));
                    }
                }
            }
            continue;
        }

        let suffix: Vec<String> = comment.into_iter().collect();

        if let Some(mut open) = block.take() {
            if tokens[0] == ")" {
                if tokens.len() > 1 {
                    return Err(err(lineno, format!("unexpected token '{}' after ')'", tokens[1])));
                }
                while pending.last().is_some_and(|c| c.is_empty()) {
                    pending.pop();
                }
                open.close = Comments {
                    before: std::mem::take(&mut pending),
                    suffix,
                };
                file.stmts.push(Stmt::Block(open));
                continue;
            }
            if let Some(p) = tokens.iter().find(|t| *t == "(" || *t == ")") {
                return Err(err(lineno, format!("unexpected '{}' in block", p)));
            }
            let before = std::mem::take(&mut pending);
            let line = file.new_line(tokens, Comments { before, suffix }, lineno);
            open.lines.push(line);
            block = Some(open);
            continue;
        }

        let before = std::mem::take(&mut pending);
        let n = tokens.len();
        let opens_block = tokens[n - 1] == "(";
        let empty_block = n >= 3 && tokens[n - 2] == "(" && tokens[n - 1] == ")";

        if opens_block || empty_block {
            let verb_len = if opens_block { n - 1 } else { n - 2 };
            let verb = tokens[..verb_len].to_vec();
            if verb.is_empty() {
                return Err(err(lineno, "unexpected '('".to_string()));
            }
            if verb.iter().any(|t| t == "(" || t == ")") {
                return Err(err(lineno, "unexpected parenthesis".to_string()));
            }
            let new_block = LineBlock {
                verb,
                lines: Vec::new(),
                comments: Comments { before, suffix },
                close: Comments::default(),
                start: lineno,
            };
            if opens_block {
                block = Some(new_block);
            } else {
                file.stmts.push(Stmt::Block(new_block));
            }
            continue;
        }

        if let Some(p) = tokens.iter().find(|t| *t == "(" || *t == ")") {
            return Err(err(lineno, format!("unexpected '{}'", p)));
        }
        let line = file.new_line(tokens, Comments { before, suffix }, lineno);
        file.stmts.push(Stmt::Line(line));
    }

    if let Some(open) = block {
        return Err(err(open.start, "unterminated block: missing ')'".to_string()));
    }
    if !pending.is_empty() {
        file.stmts.push(Stmt::Comments(pending));
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexed(s: &str) -> (Vec<String>, Option<String>) {
        let l = lex_line(s).unwrap();
        (l.tokens, l.comment)
    }

    #[test]
    fn test_lex_tokens_and_comment() {
        let (tokens, comment) = lexed("\texample.com/a v1.0.0 // indirect");
        assert_eq!(tokens, ["example.com/a", "v1.0.0"]);
        assert_eq!(comment.as_deref(), Some("// indirect"));
    }

    #[test]
    fn test_lex_punctuation_and_strings() {
        let (tokens, _) = lexed("retract [v1.0.0, v1.1.0]");
        assert_eq!(tokens, ["retract", "[", "v1.0.0", ",", "v1.1.0", "]"]);

        let (tokens, _) = lexed(r#"replace "a b" => `./c d`"#);
        assert_eq!(tokens, ["replace", "\"a b\"", "=>", "`./c d`"]);

        let (tokens, _) = lexed("require (");
        assert_eq!(tokens, ["require", "("]);
    }

    #[test]
    fn test_lex_rejects_block_comments() {
        assert!(lex_line("module x /* nope */").is_err());
        assert!(lex_line("\"open").is_err());
    }

    #[test]
    fn test_parse_blocks_and_comments() {
        let text = "// header\n\nmodule example.com/a\n\n// deps\nrequire (\n\t// first\n\texample.com/a/b v1.0.0\n\n\texample.com/a/c/v2 v2.0.0 // indirect\n)\n";
        let file = parse("go.mod", text).unwrap();

        assert_eq!(file.stmts.len(), 3);
        assert!(matches!(&file.stmts[0], Stmt::Comments(c) if c == &["// header"]));
        match &file.stmts[2] {
            Stmt::Block(block) => {
                assert_eq!(block.verb, ["require"]);
                assert_eq!(block.comments.before, ["// deps"]);
                assert_eq!(block.lines.len(), 2);
                assert_eq!(block.lines[0].comments.before, ["// first"]);
                assert_eq!(block.lines[1].comments.before, [""]);
                assert_eq!(block.lines[1].comments.suffix, ["// indirect"]);
                assert_eq!(block.lines[1].start, 10);
            }
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let err = parse("go.mod", "module example.com/a\nrequire (\n\tx v1.0.0\n").unwrap_err();
        assert_eq!(err.to_string(), "go.mod:2: unterminated block: missing ')'");

        let err = parse("go.mod", "module a\n( x\n").unwrap_err();
        assert!(err.to_string().starts_with("go.mod:2:"));

        let err = parse("go.mod", "require (\n) extra\n").unwrap_err();
        assert!(err.to_string().contains("after ')'"));
    }

    #[test]
    fn test_parse_empty_block_on_one_line() {
        let file = parse("go.mod", "require ()\n").unwrap();
        assert!(matches!(&file.stmts[0], Stmt::Block(b) if b.lines.is_empty()));
    }
}
