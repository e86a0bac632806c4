//! Handling of yt-dlp output templates (`%(title)s.%(ext)s`).

use std::path::Path;

use sanitize_filename::Options;

use crate::{Error, Result};

/// A run of a template: literal text, or a `%(...)` field with its
/// contents left as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Literal(&'a str),
    Field(&'a str),
}

impl<'a> Piece<'a> {
    fn as_str(self) -> &'a str {
        match self {
            Piece::Literal(text) | Piece::Field(text) => text,
        }
    }
}

fn pieces(template: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("%(") {
        let Some(len) = field_len(&rest[start..]) else {
            break;
        };
        if start > 0 {
            pieces.push(Piece::Literal(&rest[..start]));
        }
        pieces.push(Piece::Field(&rest[start..start + len]));
        rest = &rest[start + len..];
    }
    if !rest.is_empty() {
        pieces.push(Piece::Literal(rest));
    }
    pieces
}

/// Length of the `%(...)` group at the start of `s`, through its matching
/// parenthesis. `None` when it is never closed.
fn field_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn clean_literal(text: &str) -> String {
    // `.` and `..` components are rejected by the caller
    if text.chars().all(|c| c == '.') {
        return text.to_string();
    }
    sanitize_filename::sanitize_with_options(
        text,
        Options {
            windows: false,
            truncate: false,
            replacement: "",
        },
    )
}

/// Cleans a user-supplied output template.
///
/// Characters that are unsafe in file names are stripped from the literal
/// text. `%(...)` fields are kept verbatim, including yt-dlp's `|`
/// defaults and `>` date formats. `/` outside a field separates
/// subdirectories below the output directory. Absolute paths, empty
/// components and `.`/`..` components are rejected.
pub fn sanitize_template(template: &str) -> Result<String> {
    let unusable = || Error::InvalidArgument(format!("'{}' is not a usable output template", template));

    let trimmed = template.trim();
    if trimmed.starts_with('/') || Path::new(trimmed).is_absolute() {
        return Err(unusable());
    }

    let mut components = Vec::new();
    let mut current = String::new();
    for piece in pieces(trimmed) {
        match piece {
            Piece::Field(field) => current.push_str(field),
            Piece::Literal(text) => {
                let mut parts = text.split('/');
                if let Some(first) = parts.next() {
                    current.push_str(&clean_literal(first));
                }
                for part in parts {
                    components.push(std::mem::take(&mut current));
                    current.push_str(&clean_literal(part));
                }
            }
        }
    }
    components.push(current);

    if components
        .iter()
        .any(|c| c.trim().is_empty() || c == "." || c == "..")
    {
        return Err(unusable());
    }
    Ok(components.join("/"))
}

/// Byte offset where the file-name part of a template starts, i.e. just
/// past the last `/` outside a field.
pub fn file_name_start(template: &str) -> usize {
    let mut offset = 0;
    let mut start = 0;
    for piece in pieces(template) {
        if let Piece::Literal(text) = piece {
            if let Some(i) = text.rfind('/') {
                start = offset + i + 1;
            }
        }
        offset += piece.as_str().len();
    }
    start
}
