//! go.mod documents.
//!
//! [`ModFile`] is the semantic view (module, requirements, replacements) over
//! a comment-preserving [`FileSyntax`]. Edits go through both layers so that
//! formatting keeps every comment and statement the edit did not touch.
//!
//! - **`read`**: lexer and parser
//! - **`syntax`**: syntax tree and line-level edits
//! - **`print`**: canonical printer
//! - **`token`**: token quoting

pub mod print;
pub mod read;
pub mod syntax;
pub mod token;

use crate::error::{Result, SubmodError};
use crate::module::{ModuleVersion, path, semver};
use regex::Regex;
use std::sync::LazyLock;
use syntax::{Directive, FileSyntax, LineId};

static GO_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([1-9][0-9]*)\.(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*))?([a-z]+[0-9]+)?$")
        .expect("go version pattern is valid")
});

/// The `module` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub module: ModuleVersion,
    pub line: LineId,
}

/// A `require` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    pub module: ModuleVersion,
    pub line: LineId,
}

/// A `replace` entry.
///
/// `new.version` is empty when `new.path` is a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub old: ModuleVersion,
    pub new: ModuleVersion,
    pub line: LineId,
}

/// Parsed go.mod file.
#[derive(Debug, Clone)]
pub struct ModFile {
    pub module: Option<Module>,
    pub go: Option<String>,
    pub require: Vec<Require>,
    pub replace: Vec<Replace>,
    syntax: FileSyntax,
}

/// Reports whether `path` names a directory rather than a module.
///
/// Local paths are rooted or start with `./` or `../`.
pub fn is_directory_path(path: &str) -> bool {
    path == "."
        || path == ".."
        || path.starts_with("./")
        || path.starts_with("../")
        || path.starts_with('/')
        || path.starts_with(".\\")
        || path.starts_with("..\\")
        || is_windows_rooted(path)
}

fn is_windows_rooted(path: &str) -> bool {
    let b = path.as_bytes();
    path.starts_with('\\')
        || (b.len() >= 3
            && b[0].is_ascii_alphabetic()
            && b[1] == b':'
            && (b[2] == b'\\' || b[2] == b'/'))
}

impl ModFile {
    /// Parses go.mod text. `name` is used in error messages.
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let syntax = read::parse(name, text)?;
        let mut file = ModFile {
            module: None,
            go: None,
            require: Vec::new(),
            replace: Vec::new(),
            syntax: FileSyntax::new(name),
        };

        for directive in syntax.directives() {
            file.add_directive(name, directive)?;
        }
        file.syntax = syntax;

        log::debug!(
            "Parsed {}: {} require, {} replace",
            name,
            file.require.len(),
            file.replace.len()
        );
        Ok(file)
    }

    fn add_directive(&mut self, name: &str, d: Directive<'_>) -> Result<()> {
        let err = |message: String| SubmodError::ManifestParse {
            file: name.to_string(),
            line: d.line.start,
            message,
        };
        let string = |tok: &String| token::parse_string(tok).map_err(&err);

        match d.verb {
            "module" | "go" | "toolchain" if d.in_block => {
                return Err(err(format!("{} directive cannot be a block", d.verb)));
            }
            "module" => {
                if self.module.is_some() {
                    return Err(err("repeated module statement".to_string()));
                }
                let [arg] = d.args else {
                    return Err(err("usage: module module/path".to_string()));
                };
                self.module = Some(Module {
                    module: ModuleVersion::unversioned(string(arg)?),
                    line: d.line.id,
                });
            }
            "go" => {
                if self.go.is_some() {
                    return Err(err("repeated go statement".to_string()));
                }
                let [arg] = d.args else {
                    return Err(err("go directive expects exactly one argument".to_string()));
                };
                if !GO_VERSION.is_match(arg) {
                    return Err(err(format!(
                        "invalid go version '{}': must match format 1.23.0",
                        arg
                    )));
                }
                self.go = Some(arg.clone());
            }
            "toolchain" => {
                if d.args.len() != 1 {
                    return Err(err(
                        "toolchain directive expects exactly one argument".to_string()
                    ));
                }
            }
            "godebug" => {
                if d.args.len() != 1 || !d.args[0].contains('=') {
                    return Err(err("usage: godebug key=value".to_string()));
                }
            }
            "require" | "exclude" => {
                let [p, v] = d.args else {
                    return Err(err(format!("usage: {} module/path v1.2.3", d.verb)));
                };
                let module = ModuleVersion::new(string(p)?, self.parse_version(d.verb, v, &err)?);
                if d.verb == "require" {
                    self.require.push(Require {
                        module,
                        line: d.line.id,
                    });
                }
            }
            "replace" => {
                let replace = self.parse_replace(d, &err)?;
                if let Some(existing) = self
                    .replace
                    .iter()
                    .find(|r| r.old == replace.old && r.new != replace.new)
                {
                    return Err(err(format!(
                        "conflicting replacements for {}: {} and {}",
                        replace.old, existing.new, replace.new
                    )));
                }
                self.replace.push(replace);
            }
            "retract" => match d.args {
                [v] => {
                    self.parse_version(d.verb, v, &err)?;
                }
                [open, lo, comma, hi, close] if open == "[" && comma == "," && close == "]" => {
                    self.parse_version(d.verb, lo, &err)?;
                    self.parse_version(d.verb, hi, &err)?;
                }
                _ => {
                    return Err(err(
                        "usage: retract version or retract [low, high]".to_string()
                    ));
                }
            },
            "tool" | "ignore" => {
                if d.args.len() != 1 {
                    return Err(err(format!("usage: {} path", d.verb)));
                }
            }
            other => return Err(err(format!("unknown directive: {}", other))),
        }
        Ok(())
    }

    fn parse_version(
        &self,
        verb: &str,
        token: &str,
        err: &impl Fn(String) -> SubmodError,
    ) -> Result<String> {
        let v = token::parse_string(token).map_err(err)?;
        match semver::canonical_module_version(&v) {
            Some(cv) if cv == v => Ok(v),
            _ => Err(err(format!(
                "{} {}: version must be of the form v1.2.3",
                verb, v
            ))),
        }
    }

    fn parse_replace(
        &self,
        d: Directive<'_>,
        err: &impl Fn(String) -> SubmodError,
    ) -> Result<Replace> {
        let args = d.args;
        let arrow = if args.len() >= 2 && args[1] == "=>" { 1 } else { 2 };
        if args.len() < arrow + 2 || args.len() > arrow + 3 || args[arrow] != "=>" {
            return Err(err(
                "usage: replace module/path [v1.2.3] => other/module v1.4\n\t or replace module/path [v1.2.3] => ../local/directory"
                    .to_string(),
            ));
        }

        let old_path = token::parse_string(&args[0]).map_err(err)?;
        let old_version = if arrow == 2 {
            let v = self.parse_version(d.verb, &args[1], err)?;
            let (_, path_major) = path::split_path_version(&old_path)
                .ok_or_else(|| err(format!("invalid module path {}", old_path)))?;
            path::check_path_major(&v, path_major)
                .map_err(|e| err(format!("replace {}: {}", old_path, e)))?;
            v
        } else {
            String::new()
        };

        let new_path = token::parse_string(&args[arrow + 1]).map_err(err)?;
        let new_version = if args.len() == arrow + 3 {
            if is_directory_path(&new_path) {
                return Err(err(format!(
                    "replacement module directory path '{}' cannot have version",
                    new_path
                )));
            }
            self.parse_version(d.verb, &args[arrow + 2], err)?
        } else {
            check_local_replacement(&new_path).map_err(err)?;
            String::new()
        };

        Ok(Replace {
            old: ModuleVersion::new(old_path, old_version),
            new: ModuleVersion::new(new_path, new_version),
            line: d.line.id,
        })
    }

    /// Path of the `module` directive, if any.
    pub fn module_path(&self) -> Option<&str> {
        self.module.as_ref().map(|m| m.module.path.as_str())
    }

    /// Adds or updates `replace old_path [old_vers] => new_path [new_vers]`.
    ///
    /// The first replacement for the same old module is rewritten in place and
    /// any further ones are removed, so adding the same directive twice is a
    /// no-op. An empty `old_vers` matches every version of `old_path`.
    pub fn add_replace(
        &mut self,
        old_path: &str,
        old_vers: &str,
        new_path: &str,
        new_vers: &str,
    ) -> Result<()> {
        if old_path.is_empty() {
            return Err(SubmodError::ManifestMutation(
                "replace needs a module path".to_string(),
            ));
        }
        if new_vers.is_empty() {
            check_local_replacement(new_path).map_err(SubmodError::ManifestMutation)?;
        } else if is_directory_path(new_path) {
            return Err(SubmodError::ManifestMutation(format!(
                "replacement directory '{}' cannot have version",
                new_path
            )));
        }

        let mut tokens = vec!["replace".to_string(), token::auto_quote(old_path)];
        if !old_vers.is_empty() {
            tokens.push(old_vers.to_string());
        }
        tokens.push("=>".to_string());
        tokens.push(token::auto_quote(new_path));
        if !new_vers.is_empty() {
            tokens.push(new_vers.to_string());
        }

        let new = ModuleVersion::new(new_path, new_vers);
        let mut updated = false;
        let mut hint = None;
        let mut stale = Vec::new();

        for r in &mut self.replace {
            if r.old.path == old_path && (old_vers.is_empty() || r.old.version == old_vers) {
                if !updated {
                    log::debug!("Updating replace for {}", r.old);
                    r.old = ModuleVersion::new(old_path, old_vers);
                    r.new = new.clone();
                    self.syntax.update_line(r.line, &tokens);
                    updated = true;
                } else {
                    stale.push(r.line);
                }
                continue;
            }
            if is_nested_path(&r.old.path, old_path) {
                hint = Some(r.line);
            }
        }

        for line in &stale {
            log::debug!("Removing duplicate replace for {}", old_path);
            self.syntax.remove_line(*line);
        }
        self.replace.retain(|r| !stale.contains(&r.line));

        if !updated {
            let line = self.syntax.add_line(hint, tokens);
            self.replace.push(Replace {
                old: ModuleVersion::new(old_path, old_vers),
                new,
                line,
            });
        }
        Ok(())
    }

    /// Removes every `replace` of exactly `old_path` at `old_vers`.
    pub fn drop_replace(&mut self, old_path: &str, old_vers: &str) -> Result<()> {
        let matching: Vec<LineId> = self
            .replace
            .iter()
            .filter(|r| r.old.path == old_path && r.old.version == old_vers)
            .map(|r| r.line)
            .collect();

        if matching.is_empty() {
            return Err(SubmodError::ManifestMutation(format!(
                "no replace for {} found",
                ModuleVersion::new(old_path, old_vers)
            )));
        }

        for line in &matching {
            self.syntax.remove_line(*line);
        }
        self.replace.retain(|r| !matching.contains(&r.line));
        Ok(())
    }

    /// Drops removed lines and empty blocks from the syntax tree.
    pub fn cleanup(&mut self) {
        self.syntax.cleanup();
    }

    /// Cleans up and renders the file.
    pub fn format(&mut self) -> String {
        self.cleanup();
        print::format(&self.syntax)
    }
}

/// Reports whether `path` is `parent` or lies below it, element-wise.
fn is_nested_path(path: &str, parent: &str) -> bool {
    path.strip_prefix(parent)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn check_local_replacement(path: &str) -> std::result::Result<(), String> {
    if !is_directory_path(path) {
        if path.contains('@') {
            return Err(
                "replacement module must match format 'path version', not 'path@version'"
                    .to_string(),
            );
        }
        return Err(format!(
            "replacement module '{}' without version must be directory path (rooted or starting with . or ..)",
            path
        ));
    }
    if std::path::MAIN_SEPARATOR == '/' && path.contains('\\') {
        return Err(format!(
            "replacement directory '{}' appears to be Windows path (on a non-windows system)",
            path
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WITHOUT_REPLACES: &str = "module example.com/a

require (
\texample.com/a/b v1.0.0
\texample.com/a/c/v2 v2.0.0
)
";

    #[test]
    fn test_parse_semantics() {
        let text = "module example.com/a\n\ngo 1.21\n\nrequire (\n\texample.com/a/b v1.0.0\n\tgolang.org/x/mod v0.14.0 // indirect\n)\n\nexclude example.com/old v1.0.0\n\nreplace example.com/a/b => ./b\n\nreplace golang.org/x/mod v0.14.0 => github.com/fork/mod v0.14.1\n";
        let f = ModFile::parse("go.mod", text).unwrap();

        assert_eq!(f.module_path(), Some("example.com/a"));
        assert_eq!(f.go.as_deref(), Some("1.21"));
        assert_eq!(f.require.len(), 2);
        assert_eq!(f.require[1].module.to_string(), "golang.org/x/mod@v0.14.0");
        assert_eq!(f.replace[0].new, ModuleVersion::unversioned("./b"));
        assert_eq!(f.replace[1].old.version, "v0.14.0");
        assert_eq!(f.replace[1].new.version, "v0.14.1");
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("module a\nmodule b\n", "repeated module statement"),
            ("module a\nfrobnicate x\n", "unknown directive: frobnicate"),
            ("module a\nrequire x 1.0.0\n", "version must be of the form v1.2.3"),
            ("module a\nrequire x v1.0\n", "version must be of the form v1.2.3"),
            ("module a\ngo one\n", "invalid go version"),
            ("module a\nreplace x => y\n", "must be directory path"),
            ("module a\nreplace x => ./y v1.0.0\n", "cannot have version"),
            ("module a\nreplace x => y@v1.0.0\n", "not 'path@version'"),
            ("module a\nreplace x\n", "usage: replace"),
            (
                "module a\nreplace x => ./y\nreplace x => ./z\n",
                "conflicting replacements",
            ),
        ];
        for (text, want) in cases {
            let err = ModFile::parse("go.mod", text).unwrap_err();
            assert!(
                err.to_string().contains(want),
                "{text:?}: got '{err}', want '{want}'"
            );
        }
    }

    #[test]
    fn test_parse_error_line_number() {
        let err = ModFile::parse("go.mod", "module a\n\nrequire (\n\tx v1\n)\n").unwrap_err();
        match err {
            SubmodError::ManifestParse { file, line, .. } => {
                assert_eq!(file, "go.mod");
                assert_eq!(line, 4);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_add_replace_appends_separate_lines() {
        let mut f = ModFile::parse("go.mod", WITHOUT_REPLACES).unwrap();
        f.add_replace("example.com/a/b", "", "./b", "").unwrap();
        f.add_replace("example.com/a/c/v2", "", "./c", "").unwrap();

        assert_eq!(
            f.format(),
            format!(
                "{}\nreplace example.com/a/b => ./b\n\nreplace example.com/a/c/v2 => ./c\n",
                WITHOUT_REPLACES
            )
        );
    }

    #[test]
    fn test_add_replace_updates_existing() {
        let text = "module example.com/a\n\nreplace (\n\texample.com/a/b => ../elsewhere\n\texample.com/a/b => ../again\n)\n";
        assert!(ModFile::parse("go.mod", text).is_err());

        // Version-specific replacements collapse into one unversioned one.
        let mut f = ModFile::parse(
            "go.mod",
            "module example.com/a\n\nreplace (\n\texample.com/a/b v1.0.0 => ../one\n\texample.com/a/b v1.1.0 => ../two\n)\n",
        )
        .unwrap();
        f.add_replace("example.com/a/b", "", "./b", "").unwrap();

        assert_eq!(f.replace.len(), 1);
        assert_eq!(
            f.format(),
            "module example.com/a\n\nreplace example.com/a/b => ./b\n"
        );
    }

    #[test]
    fn test_add_replace_is_idempotent() {
        let mut once = ModFile::parse("go.mod", WITHOUT_REPLACES).unwrap();
        once.add_replace("example.com/a/b", "", "./b", "").unwrap();
        let expected = once.format();

        let mut twice = ModFile::parse("go.mod", WITHOUT_REPLACES).unwrap();
        twice.add_replace("example.com/a/b", "", "./b", "").unwrap();
        twice.add_replace("example.com/a/b", "", "./b", "").unwrap();
        assert_eq!(twice.format(), expected);
    }

    #[test]
    fn test_add_replace_uses_prefix_hint() {
        let text = "module example.com/a\n\nreplace (\n\texample.com/a/b/x => ./b/x\n\texample.com/z => ../z\n)\n";
        let mut f = ModFile::parse("go.mod", text).unwrap();
        f.add_replace("example.com/a/b", "", "./b", "").unwrap();

        assert_eq!(
            f.format(),
            "module example.com/a\n\nreplace (\n\texample.com/a/b/x => ./b/x\n\texample.com/a/b => ./b\n\texample.com/z => ../z\n)\n"
        );
    }

    #[test]
    fn test_add_replace_hint_respects_path_elements() {
        let text = "module example.com/a\n\nreplace (\n\texample.com/ab => ../ab\n\texample.com/z => ../z\n)\n";
        let mut f = ModFile::parse("go.mod", text).unwrap();
        f.add_replace("example.com/a", "", "./a", "").unwrap();

        assert_eq!(
            f.format(),
            "module example.com/a\n\nreplace (\n\texample.com/ab => ../ab\n\texample.com/z => ../z\n\texample.com/a => ./a\n)\n"
        );
    }

    #[test]
    fn test_is_nested_path() {
        assert!(is_nested_path("example.com/a/b", "example.com/a"));
        assert!(is_nested_path("example.com/a", "example.com/a"));
        assert!(!is_nested_path("example.com/ab", "example.com/a"));
    }

    #[test]
    fn test_add_replace_rejects_bad_targets() {
        let mut f = ModFile::parse("go.mod", WITHOUT_REPLACES).unwrap();
        assert!(matches!(
            f.add_replace("example.com/a/b", "", "example.com/fork", ""),
            Err(SubmodError::ManifestMutation(_))
        ));
        assert!(matches!(
            f.add_replace("example.com/a/b", "", "./b", "v1.0.0"),
            Err(SubmodError::ManifestMutation(_))
        ));
        assert!(f.replace.is_empty());
    }

    #[test]
    fn test_add_replace_quotes_paths_with_spaces() {
        let mut f = ModFile::parse("go.mod", "module example.com/a\n").unwrap();
        f.add_replace("example.com/a/b", "", "./my dir", "").unwrap();
        let out = f.format();
        assert!(out.contains("replace example.com/a/b => \"./my dir\""));

        let reparsed = ModFile::parse("go.mod", &out).unwrap();
        assert_eq!(reparsed.replace[0].new.path, "./my dir");
    }

    #[test]
    fn test_drop_replace() {
        let text = "module example.com/a\n\nreplace example.com/a/b => ./b // local\n\nreplace example.com/a/b v1.0.0 => ../pinned\n";
        let mut f = ModFile::parse("go.mod", text).unwrap();

        f.drop_replace("example.com/a/b", "").unwrap();
        assert_eq!(f.replace.len(), 1);
        assert_eq!(
            f.format(),
            "module example.com/a\n\nreplace example.com/a/b v1.0.0 => ../pinned\n"
        );

        match f.drop_replace("example.com/a/b", "") {
            Err(SubmodError::ManifestMutation(msg)) => assert!(msg.contains("example.com/a/b")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_is_directory_path() {
        for p in [".", "..", "./b", "../b", "/abs", ".\\b", "..\\b", "C:\\x", "c:/x"] {
            assert!(is_directory_path(p), "{p}");
        }
        for p in ["b", "example.com/a", ".b", "...", ""] {
            assert!(!is_directory_path(p), "{p}");
        }
    }
}
