//! Small string utilities shared by the compiler passes.

/// `my-prop` → `myProp`.
pub fn kebab_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// `fontSize` → `font-size`.
pub fn camel_to_kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `my-card` / `my_card` / `myCard` → `MyCard`.
pub fn to_pascal_case(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// An integer or decimal literal, optionally signed.
pub fn is_numeric(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() {
        return false;
    }
    let mut parts = digits.splitn(2, '.');
    let int = parts.next().unwrap_or("");
    let frac = parts.next();
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match frac {
        Some(frac) => all_digits(int) && all_digits(frac),
        None => all_digits(int),
    }
}

/// `'abc'` or `"abc"` → `abc`.
pub fn unquote(value: &str) -> Option<&str> {
    let first = value.chars().next()?;
    if (first == '"' || first == '\'') && value.len() >= 2 && value.ends_with(first) {
        let inner = &value[1..value.len() - 1];
        let escaped_close = inner.ends_with('\\');
        if !escaped_close && !contains_unescaped(inner, first) {
            return Some(inner);
        }
    }
    None
}

fn contains_unescaped(s: &str, quote: char) -> bool {
    let mut last = None;
    for c in s.chars() {
        if c == quote && last != Some('\\') {
            return true;
        }
        last = Some(c);
    }
    false
}

/// Split on `separator` where it is outside quotes and brackets. Parts are
/// trimmed; empty parts are dropped.
pub fn split_top_level(source: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut last = None;
    let mut start = 0;

    for (i, c) in source.char_indices() {
        match quote {
            Some(q) => {
                if c == q && last != Some('\\') {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' | '`' => quote = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                _ if c == separator && depth == 0 => {
                    parts.push(source[start..i].trim());
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
        last = Some(c);
    }
    parts.push(source[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Split once on `separator` outside quotes and brackets.
pub fn split_once_top_level(source: &str, separator: char) -> Option<(&str, &str)> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut last = None;

    for (i, c) in source.char_indices() {
        match quote {
            Some(q) => {
                if c == q && last != Some('\\') {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' | '`' => quote = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                _ if c == separator && depth == 0 => {
                    return Some((&source[..i], &source[i + c.len_utf8()..]));
                }
                _ => {}
            },
        }
        last = Some(c);
    }
    None
}

pub fn hex_encode(value: &str) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(value.len() * 2);
    for byte in value.bytes() {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// Inverse of [`hex_encode`]. `None` on malformed input.
pub fn hex_decode(value: &str) -> Option<String> {
    if value.len() % 2 != 0 {
        return None;
    }
    let bytes = (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(value.get(i..i + 2)?, 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_case_conversion() {
        assert_eq!(kebab_to_camel("my-long-prop"), "myLongProp");
        assert_eq!(kebab_to_camel("plain"), "plain");
        assert_eq!(camel_to_kebab("fontSize"), "font-size");
        assert_eq!(to_pascal_case("my-card"), "MyCard");
        assert_eq!(to_pascal_case("Button"), "Button");
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("1"));
        assert!(is_numeric("-12.5"));
        assert!(!is_numeric("1."));
        assert!(!is_numeric("a1"));
        assert!(!is_numeric(""));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'a b'"), Some("a b"));
        assert_eq!(unquote("\"x\""), Some("x"));
        assert_eq!(unquote("'a' + 'b'"), None);
        assert_eq!(unquote("foo"), None);
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("a, fn(b, c), 'd,e', [f, g]", ','),
            vec!["a", "fn(b, c)", "'d,e'", "[f, g]"]
        );
        assert_eq!(split_once_top_level("'a:b': c ? 1 : 2", ':'), Some(("'a:b'", " c ? 1 : 2")));
    }

    #[test]
    fn test_hex_round_trip() {
        let encoded = hex_encode("{{ foo == 1 }}");
        assert!(encoded.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(hex_decode(&encoded).as_deref(), Some("{{ foo == 1 }}"));
        assert_eq!(hex_decode("zz"), None);
    }
}
