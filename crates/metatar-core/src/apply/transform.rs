//! Text transforms applied to file bodies.

/// Collapses every pair of consecutive newlines into one.
///
/// The replacement is a single left-to-right pass over non-overlapping
/// pairs, so three newlines become two and four become two.
#[must_use]
pub fn strip_blank_lines(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        if body[i] == b'\n' && body.get(i + 1) == Some(&b'\n') {
            out.push(b'\n');
            i += 2;
        } else {
            out.push(body[i]);
            i += 1;
        }
    }
    out
}

/// Drops lines whose first non-blank character is `#`.
///
/// Lines starting with `#!` are kept.
#[must_use]
pub fn strip_comments(body: &[u8]) -> Vec<u8> {
    let kept: Vec<&[u8]> = body
        .split(|&b| b == b'\n')
        .filter(|line| line.starts_with(b"#!") || !line.trim_ascii_start().starts_with(b"#"))
        .collect();
    kept.join(&b'\n')
}

/// Applies the requested transforms, blank lines first.
///
/// # Examples
///
/// ```
/// use metatar_core::apply::transform::apply_transforms;
///
/// let script = b"#!/bin/sh\n# setup\n\n\necho hi\n";
/// assert_eq!(apply_transforms(script, true, true), b"#!/bin/sh\n\necho hi\n");
/// ```
#[must_use]
pub fn apply_transforms(body: &[u8], blank_lines: bool, comments: bool) -> Vec<u8> {
    let body = if blank_lines {
        strip_blank_lines(body)
    } else {
        body.to_vec()
    };
    if comments {
        strip_comments(&body)
    } else {
        body
    }
}
