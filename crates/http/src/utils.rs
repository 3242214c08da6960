//! Utility macros and functions for the value and message model.
//!
//! This module provides helpers used internally by the parsers and the
//! lazily initialized collections of the message model.

use std::borrow::Cow;

use once_cell::sync::OnceCell;

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
///
/// # Example
///
/// ```ignore
/// ensure!(!name.is_empty(), ParseError::invalid_tag(literal));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Mutable access to a lazily initialized cell, creating the value on first use.
pub(crate) fn lazy_mut<T, F>(cell: &mut OnceCell<T>, init: F) -> &mut T
where
    F: FnOnce() -> T,
{
    if cell.get().is_none() {
        *cell = OnceCell::with_value(init());
    }
    // the cell was filled right above and we hold the only reference to it
    cell.get_mut().expect("lazy cell initialized")
}

/// Wraps `value` in double quotes, escaping embedded quotes and backslashes.
pub(crate) fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Removes one level of double quotes and the backslash escapes inside them.
///
/// Unquoted values are returned as is.
pub(crate) fn unquote(value: &str) -> Cow<'_, str> {
    let Some(inner) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) else {
        return Cow::Borrowed(value);
    };
    if !inner.contains('\\') {
        return Cow::Borrowed(inner);
    }

    let mut unescaped = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        // a trailing lone backslash is kept
        let c = if c == '\\' { chars.next().unwrap_or(c) } else { c };
        unescaped.push(c);
    }
    Cow::Owned(unescaped)
}

/// Splits `value` on `separator`, except inside double quoted strings.
pub(crate) fn split_unquoted(value: &str, separator: char) -> Vec<&str> {
    let mut parts = vec![];
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c == separator && !in_quotes => {
                parts.push(&value[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}
