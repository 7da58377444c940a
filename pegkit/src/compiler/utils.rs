use crate::runtime::RuntimeError;
use std::str::Chars;

/// Prefix of the internal symbol of every rule
pub const RULE_SYMBOL_PREFIX: &str = "PEG_RULE_";

/// Turn a rule's name into the internal symbol used by generated code
///
/// Rule names may start with a digit and may collide with the runtime's own names, symbols can't.
pub fn rule_symbol(name: &str) -> String {
    format!("{}{}", RULE_SYMBOL_PREFIX, name)
}

/// Get the character an escape sequence (without its backslash) stands for
pub fn unescape_char(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        '0' => '\0',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'v' => '\u{b}',
        _ => c,
    }
}

/// Read the code point of a `\x` or `\u` escape, its letter already consumed
///
/// `\xHH` and `\uHHHH` take a fixed number of digits, `\u{H...}` any non-zero number of them.
/// Returns the text that was read if it doesn't form a valid character.
fn code_point(chars: &mut Chars, kind: char) -> Result<char, String> {
    let (read, hex) = if kind == 'u' && chars.as_str().starts_with('{') {
        let rest = chars.as_str();

        match rest.find('}') {
            Some(end) => {
                let read = &rest[..=end];
                *chars = rest[end + 1..].chars();
                (read.to_string(), read[1..end].to_string())
            }
            None => {
                *chars = "".chars();
                return Err(rest.to_string());
            }
        }
    } else {
        let len = if kind == 'x' { 2 } else { 4 };
        let read: String = chars.by_ref().take(len).collect();

        if read.chars().count() != len {
            return Err(read);
        }

        (read.clone(), read)
    };

    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(read);
    }

    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or(read)
}

/// Resolve all escape sequences in a string
///
/// On failure, returns the invalid escape sequence.
pub fn unescape(input: &str) -> Result<String, String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some(kind @ ('x' | 'u')) => out.push(
                code_point(&mut chars, kind)
                    .map_err(|digits| format!("\\{}{}", kind, digits))?,
            ),
            Some(other) => out.push(unescape_char(other)),
            // A trailing backslash stands for itself
            None => out.push('\\'),
        }
    }

    Ok(out)
}

/// Get the text a quoted string literal matches
///
/// `raw` must include the delimiting quotes, as captured by the lexer.
pub fn literal_value(raw: &str) -> Result<String, RuntimeError> {
    let mut chars = raw.chars();
    chars.next();
    chars.next_back();

    unescape(chars.as_str()).map_err(|sequence| {
        RuntimeError::action(format!(
            "Invalid escape sequence [{}] in string literal {}",
            sequence, raw
        ))
    })
}

/// Write a character so it is read back as a single character inside a character class
pub fn escape_class_char(c: char, first: bool) -> String {
    match c {
        ']' | '\\' | '-' => format!("\\{}", c),
        '^' if first => "\\^".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '\0' => "\\0".to_string(),
        _ => c.to_string(),
    }
}
