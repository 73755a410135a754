//! Composite formatting for localized templates.
//!
//! Templates use positional placeholders:
//! - `{0}` inserts the first argument
//! - `{1,8}` right-aligns the second argument in 8 columns, `{1,-8}` left-aligns it
//! - `{0:N2}` is accepted; arguments are rendered through `Display`, so the
//!   specifier after the colon does not change the output
//! - `{{` and `}}` produce literal braces

use std::fmt::Display;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("placeholder {{{index}}} has no matching argument ({count} supplied)")]
    MissingArgument { index: usize, count: usize },

    #[error("invalid placeholder `{{{placeholder}}}` at byte {position}")]
    InvalidPlaceholder { placeholder: String, position: usize },

    #[error("unterminated placeholder starting at byte {position}")]
    Unterminated { position: usize },

    #[error("unmatched `}}` at byte {position}")]
    UnmatchedBrace { position: usize },
}

/// Formats `template` with positional `args`.
pub fn format(template: &str, args: &[&dyn Display]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        match ch {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let close = template[i + 1..]
                    .find('}')
                    .map(|offset| i + 1 + offset)
                    .ok_or(FormatError::Unterminated { position: i })?;
                let inner = &template[i + 1..close];
                write_placeholder(&mut out, inner, i, args)?;
                // Skip everything up to and including the closing brace.
                for (j, _) in chars.by_ref() {
                    if j == close {
                        break;
                    }
                }
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(FormatError::UnmatchedBrace { position: i });
                }
            }
            c => out.push(c),
        }
    }

    Ok(out)
}

fn write_placeholder(
    out: &mut String,
    inner: &str,
    position: usize,
    args: &[&dyn Display],
) -> Result<(), FormatError> {
    let invalid = || FormatError::InvalidPlaceholder {
        placeholder: inner.to_string(),
        position,
    };

    if inner.contains('{') {
        return Err(invalid());
    }
    // The specifier is only meaningful for typed formatting.
    let spec_free = match inner.split_once(':') {
        Some((head, _)) => head,
        None => inner,
    };

    let (index, width) = match spec_free.split_once(',') {
        Some((index, width)) => (index, Some(width)),
        None => (spec_free, None),
    };
    let index = index.trim().parse::<usize>().map_err(|_| invalid())?;
    let width = width
        .map(|w| w.trim().parse::<isize>().map_err(|_| invalid()))
        .transpose()?;

    let arg = args.get(index).ok_or(FormatError::MissingArgument {
        index,
        count: args.len(),
    })?;
    let rendered = arg.to_string();

    match width {
        Some(w) if w < 0 => out.push_str(&format!("{:<1$}", rendered, w.unsigned_abs())),
        Some(w) => out.push_str(&format!("{:>1$}", rendered, w.unsigned_abs())),
        None => out.push_str(&rendered),
    }
    Ok(())
}
