//! Token quoting rules for go.mod files.

/// Reports whether `s` must be quoted to survive a round trip through the lexer.
pub fn must_quote(s: &str) -> bool {
    if s.is_empty() || s.contains("//") || s.contains("/*") {
        return true;
    }
    s.chars().any(|c| match c {
        ' ' | '"' | '\'' | '`' => true,
        '(' | ')' | '[' | ']' | '{' | '}' | ',' => s.len() > 1,
        c => c.is_control() || c.is_whitespace(),
    })
}

/// Returns `s`, quoted if [`must_quote`] says so.
pub fn auto_quote(s: &str) -> String {
    if must_quote(s) {
        quote(s)
    } else {
        s.to_string()
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Interprets a raw token: `"..."` and `` `...` `` are unquoted, anything
/// else is returned as is.
pub fn parse_string(token: &str) -> Result<String, String> {
    if let Some(raw) = token.strip_prefix('`') {
        return raw
            .strip_suffix('`')
            .map(str::to_string)
            .ok_or_else(|| format!("invalid quoted string {}", token));
    }
    if !token.starts_with('"') {
        return Ok(token.to_string());
    }

    let invalid = || format!("invalid quoted string {}", token);
    let inner = token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .filter(|_| token.len() >= 2)
        .ok_or_else(invalid)?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(invalid)?;
                out.push(decoded);
            }
            _ => return Err(invalid()),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_quote() {
        assert_eq!(auto_quote("example.com/a"), "example.com/a");
        assert_eq!(auto_quote("./b"), "./b");
        assert_eq!(auto_quote("./my dir"), "\"./my dir\"");
        assert_eq!(auto_quote(""), "\"\"");
        assert_eq!(auto_quote("a//b"), "\"a//b\"");
        assert_eq!(auto_quote("("), "(");
        assert_eq!(auto_quote("(x"), "\"(x\"");
    }

    #[test]
    fn test_parse_string() {
        assert_eq!(parse_string("plain").unwrap(), "plain");
        assert_eq!(parse_string("\"./my dir\"").unwrap(), "./my dir");
        assert_eq!(parse_string("\"a\\\"b\"").unwrap(), "a\"b");
        assert_eq!(parse_string("`raw\\path`").unwrap(), "raw\\path");
        assert!(parse_string("\"open").is_err());
        assert!(parse_string("\"bad \\q\"").is_err());
    }

    #[test]
    fn test_quote_parses_back() {
        for s in ["./with space", "quote\"d", "tab\there"] {
            assert_eq!(parse_string(&auto_quote(s)).unwrap(), s);
        }
    }
}
